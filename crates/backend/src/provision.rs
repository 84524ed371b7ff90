//! Provisioning: turning descriptors into realized resources.
//!
//! The [`Provision`] trait is the seam to whatever actually provisions
//! infrastructure. [`Provisioner`] is a ready-made implementation that
//! dispatches on the concrete descriptor type to typed handlers.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::descriptor::{AnyDescriptor, Descriptor};
use crate::error::{Error, Result};
use crate::key::ResourceKey;
use crate::realized::RealizedResource;
use crate::scope::DeploymentScope;

/// Key-preserving `descriptor -> realized` transformation.
///
/// Called once per registry entry, in registry order, before any hook runs.
/// The returned resource must wrap the descriptor's declared realized type;
/// the synthesis driver rejects anything else.
pub trait Provision {
    /// Realize one descriptor into `scope`.
    fn provision(
        &self,
        key: &ResourceKey,
        descriptor: &dyn AnyDescriptor,
        scope: &mut DeploymentScope,
    ) -> Result<RealizedResource>;
}

impl<F> Provision for F
where
    F: Fn(&ResourceKey, &dyn AnyDescriptor, &mut DeploymentScope) -> Result<RealizedResource>,
{
    fn provision(
        &self,
        key: &ResourceKey,
        descriptor: &dyn AnyDescriptor,
        scope: &mut DeploymentScope,
    ) -> Result<RealizedResource> {
        self(key, descriptor, scope)
    }
}

/// Handler table entry, erased over the descriptor type.
trait ErasedHandler: Send + Sync {
    fn provision(
        &self,
        key: &ResourceKey,
        descriptor: &dyn AnyDescriptor,
        scope: &mut DeploymentScope,
    ) -> Result<RealizedResource>;
}

/// Concrete adapter from a typed handler to `ErasedHandler`.
struct TypedHandler<D, F> {
    handler: F,
    _descriptor: std::marker::PhantomData<fn(&D)>,
}

impl<D, F> ErasedHandler for TypedHandler<D, F>
where
    D: Descriptor,
    F: Fn(&ResourceKey, &D, &mut DeploymentScope) -> Result<D::Realized> + Send + Sync,
{
    fn provision(
        &self,
        key: &ResourceKey,
        descriptor: &dyn AnyDescriptor,
        scope: &mut DeploymentScope,
    ) -> Result<RealizedResource> {
        let typed = descriptor.downcast_ref::<D>().ok_or_else(|| Error::DescriptorTypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<D>(),
        })?;
        let realized = (self.handler)(key, typed, scope)?;
        Ok(RealizedResource::new(typed.kind(), realized))
    }
}

/// Table-driven [`Provision`] implementation.
///
/// Each handler covers one descriptor type and returns that descriptor's
/// realized type, so a handler can never hand back the wrong kind of
/// resource.
#[derive(Default)]
pub struct Provisioner {
    handlers: HashMap<TypeId, Box<dyn ErasedHandler>>,
}

impl Provisioner {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for descriptors of type `D`, replacing any
    /// previous one.
    pub fn handle<D, F>(mut self, handler: F) -> Self
    where
        D: Descriptor,
        F: Fn(&ResourceKey, &D, &mut DeploymentScope) -> Result<D::Realized>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(
            TypeId::of::<D>(),
            Box::new(TypedHandler::<D, F> {
                handler,
                _descriptor: std::marker::PhantomData,
            }),
        );
        self
    }

    /// Whether a handler for `D` is registered.
    #[must_use]
    pub fn handles<D: Descriptor>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<D>())
    }
}

impl Provision for Provisioner {
    fn provision(
        &self,
        key: &ResourceKey,
        descriptor: &dyn AnyDescriptor,
        scope: &mut DeploymentScope,
    ) -> Result<RealizedResource> {
        let handler = self
            .handlers
            .get(&descriptor.as_any().type_id())
            .ok_or_else(|| {
                Error::provisioning(
                    key.as_str(),
                    format!(
                        "no handler for {} descriptor {}",
                        descriptor.resource_kind(),
                        descriptor.descriptor_type()
                    ),
                )
            })?;
        handler.provision(key, descriptor, scope)
    }
}

impl fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provisioner")
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceKind;
    use crate::scope::Construct;

    #[derive(Debug)]
    struct Topic {
        name: &'static str,
    }

    #[derive(Debug, PartialEq)]
    struct TopicArn(String);

    impl Descriptor for Topic {
        type Realized = TopicArn;

        fn kind(&self) -> ResourceKind {
            ResourceKind::Custom("topic")
        }
    }

    #[derive(Debug)]
    struct Unhandled;

    impl Descriptor for Unhandled {
        type Realized = ();

        fn kind(&self) -> ResourceKind {
            ResourceKind::Custom("unhandled")
        }
    }

    fn provisioner() -> Provisioner {
        Provisioner::new().handle::<Topic, _>(|key, topic, scope| {
            scope.add(Construct::new(key.as_str(), "messaging.topic"))?;
            Ok(TopicArn(format!("arn:{}:{}", scope.name(), topic.name)))
        })
    }

    #[test]
    fn dispatches_on_descriptor_type() {
        let provisioner = provisioner();
        let mut scope = DeploymentScope::new("dev");
        let key = ResourceKey::new("events").unwrap();

        let realized = provisioner
            .provision(&key, &Topic { name: "orders" }, &mut scope)
            .unwrap();

        assert_eq!(realized.kind(), ResourceKind::Custom("topic"));
        assert_eq!(
            realized.downcast_ref::<TopicArn>(),
            Some(&TopicArn("arn:dev:orders".into()))
        );
        assert!(scope.contains("events"));
        assert!(provisioner.handles::<Topic>());
        assert!(!provisioner.handles::<Unhandled>());
    }

    #[test]
    fn missing_handler_is_a_provisioning_error() {
        let mut scope = DeploymentScope::new("dev");
        let key = ResourceKey::new("other").unwrap();
        let err = provisioner()
            .provision(&key, &Unhandled, &mut scope)
            .unwrap_err();
        assert!(matches!(err, Error::Provisioning { ref key, .. } if key == "other"));
    }

    #[test]
    fn closures_are_provisioners() {
        let closure = |_: &ResourceKey,
                       d: &dyn AnyDescriptor,
                       _: &mut DeploymentScope|
         -> Result<RealizedResource> {
            Ok(RealizedResource::new(d.resource_kind(), 7_u32))
        };
        let mut scope = DeploymentScope::new("dev");
        let key = ResourceKey::new("n").unwrap();
        let realized = closure.provision(&key, &Unhandled, &mut scope).unwrap();
        assert_eq!(realized.downcast_ref::<u32>(), Some(&7));
    }
}
