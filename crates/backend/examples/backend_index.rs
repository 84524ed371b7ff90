//! A typical backend entry point: auth and data, wired together, plus one
//! hand-made alarm.
//!
//! ```text
//! KEYSTONE_SCOPE=sandbox KEYSTONE_LOG=debug cargo run --example backend_index
//! ```

use keystone_backend::stock::{self, Access, AuthDescriptor, DataDescriptor};
use keystone_backend::{
    Backend, Composition, Construct, CustomResources, DeploymentScope, SynthConfig, Synthesizer,
    define_backend,
};

#[derive(Debug, Backend)]
pub struct Config {
    auth: AuthDescriptor,
    data: DataDescriptor,
}

fn main() -> anyhow::Result<()> {
    let settings = SynthConfig::default().with_env_overrides()?;
    let _guard = keystone_log::init_with(settings.log.clone())?;

    let backend = define_backend(Config {
        auth: stock::define_auth().with_group("admins"),
        data: stock::define_data().with_model("Note", ["title", "body"]),
    })?
    .compose(|resources: &mut ConfigResources| {
        resources.data.grant(&resources.auth, Access::ReadWrite);
        Ok(Composition::new().link("auth", "data", "read_write"))
    })
    .custom(|resources: &mut ConfigResources, scope: &mut DeploymentScope| {
        scope.add(
            Construct::new("apiErrors", "monitoring.alarm")
                .with_property("api", resources.data.api_arn.clone())
                .with_property("threshold", 5),
        )?;
        Ok(CustomResources::new().output("endpoint", resources.data.endpoint.clone()))
    });

    let mut scope = DeploymentScope::from_config(&settings.scope);
    let synthesis = Synthesizer::new(stock::provisioner()).run(backend, &mut scope)?;

    println!("{}", serde_json::to_string_pretty(&synthesis.report.to_json())?);
    println!("{}", serde_json::to_string_pretty(&scope.manifest())?);
    Ok(())
}
