//! Synthesis driver: one pass from a [`BackendDefinition`] to a populated
//! [`DeploymentScope`].
//!
//! Order is fixed: provision every registry entry in registry order,
//! realize the typed view, run the composition hook, then the custom hook.
//! The first error aborts the pass; nothing is retried or rolled back.

use serde::Serialize;

use crate::backend::{Backend, BackendDefinition, DefinitionParts};
use crate::error::{Error, Result};
use crate::hooks::{Composition, CustomResources, HookKind, HookOutcome};
use crate::key::ResourceKey;
use crate::provision::Provision;
use crate::realized::RealizedRegistry;
use crate::registry::Registry;
use crate::scope::{ConstructId, DeploymentScope};

/// What a pass did, for the caller to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    /// Name of the scope the pass ran against.
    pub scope: String,
    /// Keys in the order they were provisioned.
    pub provisioned: Vec<ResourceKey>,
    /// Outcome of the composition hook.
    pub compose: HookOutcome<Composition>,
    /// Outcome of the custom hook.
    pub custom: HookOutcome<CustomResources>,
    /// Constructs the custom hook attached, in attachment order.
    pub attached: Vec<ConstructId>,
}

/// Result of a successful pass.
#[derive(Debug)]
pub struct Synthesis<R> {
    /// The backend's realized resources, after both hooks ran.
    pub resources: R,
    /// What happened.
    pub report: SynthesisReport,
}

/// Runs synthesis passes with a given provisioner.
#[derive(Debug, Clone)]
pub struct Synthesizer<P> {
    provisioner: P,
}

impl<P: Provision> Synthesizer<P> {
    /// Driver backed by `provisioner`.
    pub fn new(provisioner: P) -> Self {
        Self { provisioner }
    }

    /// The provisioner in use.
    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    /// Run one pass, consuming the definition so neither hook can run twice.
    ///
    /// # Errors
    ///
    /// Any provisioning or realization error, [`Error::UnknownResourceKey`]
    /// for a composition link outside the key set, and [`Error::Hook`]
    /// carrying whatever a hook returned.
    pub fn run<B: Backend>(
        &self,
        definition: BackendDefinition<B>,
        scope: &mut DeploymentScope,
    ) -> Result<Synthesis<B::Realized>> {
        let span = tracing::info_span!("synthesis", scope = %scope.name());
        let _enter = span.enter();

        let DefinitionParts {
            config,
            registry,
            compose,
            custom,
        } = definition.into_parts();

        tracing::info!(resources = registry.len(), "Starting synthesis");

        let realized = self.provision_all(&registry, scope)?;
        let provisioned: Vec<ResourceKey> = realized.keys().cloned().collect();
        let mut resources = config.realize(realized)?;

        let compose = match compose {
            Some(hook) => {
                tracing::info!(hook = %HookKind::Compose, "Invoking hook");
                let composition = hook
                    .invoke(&mut resources)
                    .map_err(|source| hook_failed(HookKind::Compose, source))?;
                check_links(&registry, &composition)?;
                HookOutcome::Completed(composition)
            }
            None => HookOutcome::Absent,
        };

        let before = scope.len();
        let custom = match custom {
            Some(hook) => {
                tracing::info!(hook = %HookKind::Custom, "Invoking hook");
                let outputs = hook
                    .invoke(&mut resources, scope)
                    .map_err(|source| hook_failed(HookKind::Custom, source))?;
                HookOutcome::Completed(outputs)
            }
            None => HookOutcome::Absent,
        };
        let attached = scope.ids_since(before);

        tracing::info!(
            provisioned = provisioned.len(),
            attached = attached.len(),
            constructs = scope.len(),
            "Synthesis complete"
        );

        Ok(Synthesis {
            resources,
            report: SynthesisReport {
                scope: scope.name().to_string(),
                provisioned,
                compose,
                custom,
                attached,
            },
        })
    }

    fn provision_all(
        &self,
        registry: &Registry,
        scope: &mut DeploymentScope,
    ) -> Result<RealizedRegistry> {
        let mut entries = Vec::with_capacity(registry.len());
        for (key, descriptor) in registry {
            let resource = self.provisioner.provision(key, descriptor, scope)?;
            if resource.value_type_id() != descriptor.realized_type_id() {
                return Err(Error::RealizedTypeMismatch {
                    key: key.to_string(),
                    expected: descriptor.realized_type(),
                    found: resource.value_type(),
                });
            }
            tracing::debug!(
                resource = %key,
                kind = %resource.kind(),
                "Provisioned resource"
            );
            entries.push((key.clone(), resource));
        }
        RealizedRegistry::from_entries(entries)
    }
}

fn hook_failed(hook: HookKind, source: crate::hooks::HookError) -> Error {
    tracing::warn!(%hook, error = %source, "Hook failed");
    Error::Hook { hook, source }
}

fn check_links(registry: &Registry, composition: &Composition) -> Result<()> {
    for link in composition.links() {
        for end in [&link.from, &link.to] {
            if !registry.contains(end) {
                return Err(registry.unknown_key(end));
            }
        }
    }
    Ok(())
}

/// Compact serializable view of a report, e.g. for logs or snapshots.
#[derive(Debug, Serialize)]
struct ReportView<'a> {
    scope: &'a str,
    provisioned: &'a [ResourceKey],
    compose: Option<&'a Composition>,
    custom: Option<&'a CustomResources>,
    attached: &'a [ConstructId],
}

impl SynthesisReport {
    /// JSON rendering of the report. Absent hooks render as `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let view = ReportView {
            scope: &self.scope,
            provisioned: &self.provisioned,
            compose: self.compose.completed(),
            custom: self.custom.completed(),
            attached: &self.attached,
        };
        serde_json::to_value(view).unwrap_or(serde_json::Value::Null)
    }
}
