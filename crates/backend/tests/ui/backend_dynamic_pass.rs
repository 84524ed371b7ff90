//! A plain registry used directly as a backend.

use keystone_backend::stock::{self, Access, FunctionResources, StorageResources};
use keystone_backend::{DeploymentScope, RealizedRegistry, Registry, Synthesizer, define_backend};

fn main() {
    let registry = Registry::builder()
        .with("handler", stock::define_function())
        .with("fileStorage", stock::define_storage())
        .build()
        .unwrap();

    let backend = define_backend(registry)
        .unwrap()
        .compose(|resources: &mut RealizedRegistry| {
            let handler = resources.get::<FunctionResources>("handler")?.clone();
            resources
                .get_mut::<StorageResources>("fileStorage")?
                .grant(&handler, Access::Read);
            Ok(())
        });

    let mut scope = DeploymentScope::new("dev");
    let synthesis = Synthesizer::new(stock::provisioner())
        .run(backend, &mut scope)
        .unwrap();
    let storage = synthesis
        .resources
        .get::<StorageResources>("fileStorage")
        .unwrap();
    assert_eq!(storage.grants().len(), 1);
}
