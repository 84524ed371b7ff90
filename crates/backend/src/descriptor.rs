//! Resource descriptors: the pre-provisioning form of one capability.
//!
//! A descriptor is produced by a builder collaborator (see the `stock`
//! module for the reference set) and is opaque to the registry. The only
//! thing the core needs from it is its kind, its own validation and the
//! type it turns into once provisioned.

use std::any::{Any, TypeId, type_name};
use std::fmt;

/// Capability a descriptor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// User authentication
    Auth,
    /// Data / schema
    Data,
    /// File storage
    Storage,
    /// Handler function
    Function,
    /// Anything outside the standard vocabulary
    Custom(&'static str),
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => f.write_str("auth"),
            Self::Data => f.write_str("data"),
            Self::Storage => f.write_str("storage"),
            Self::Function => f.write_str("function"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Core descriptor trait.
///
/// `Realized` is the provisioned counterpart; it is what composition and
/// custom hooks receive under the same key.
///
/// A descriptor must be self-contained: it never refers to another
/// descriptor. Relationships between resources are only ever expressed in
/// a composition hook.
pub trait Descriptor: fmt::Debug + Send + Sync + 'static {
    /// The realized resource this descriptor provisions into.
    type Realized: fmt::Debug + Send + Sync + 'static;

    /// Capability of this descriptor.
    fn kind(&self) -> ResourceKind;

    /// Reject a descriptor that cannot be provisioned. The returned string
    /// is the reason reported in [`Error::InvalidDescriptor`](crate::Error::InvalidDescriptor).
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Object-safe view of a [`Descriptor`], used by the registry.
///
/// Implemented for every `Descriptor`; there is no reason to implement it
/// by hand.
pub trait AnyDescriptor: fmt::Debug + Send + Sync {
    /// See [`Descriptor::kind`].
    fn resource_kind(&self) -> ResourceKind;

    /// See [`Descriptor::validate`].
    fn check(&self) -> Result<(), String>;

    /// Type name of the concrete descriptor.
    fn descriptor_type(&self) -> &'static str;

    /// `TypeId` of [`Descriptor::Realized`].
    fn realized_type_id(&self) -> TypeId;

    /// Type name of [`Descriptor::Realized`].
    fn realized_type(&self) -> &'static str;

    /// Upcast for downcasting to the concrete descriptor.
    fn as_any(&self) -> &dyn Any;
}

impl<D: Descriptor> AnyDescriptor for D {
    fn resource_kind(&self) -> ResourceKind {
        self.kind()
    }

    fn check(&self) -> Result<(), String> {
        self.validate()
    }

    fn descriptor_type(&self) -> &'static str {
        type_name::<D>()
    }

    fn realized_type_id(&self) -> TypeId {
        TypeId::of::<D::Realized>()
    }

    fn realized_type(&self) -> &'static str {
        type_name::<D::Realized>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyDescriptor + '_ {
    /// Borrow the concrete descriptor, if it is a `D`.
    #[must_use]
    pub fn downcast_ref<D: Descriptor>(&self) -> Option<&D> {
        self.as_any().downcast_ref::<D>()
    }

    /// Whether the concrete descriptor is a `D`.
    #[must_use]
    pub fn is<D: Descriptor>(&self) -> bool {
        self.as_any().is::<D>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Queue {
        fifo: bool,
    }

    #[derive(Debug, PartialEq)]
    struct QueueUrl(String);

    impl Descriptor for Queue {
        type Realized = QueueUrl;

        fn kind(&self) -> ResourceKind {
            ResourceKind::Custom("queue")
        }

        fn validate(&self) -> Result<(), String> {
            if self.fifo {
                Ok(())
            } else {
                Err("only FIFO queues are supported".into())
            }
        }
    }

    #[test]
    fn erased_view_forwards_to_descriptor() {
        let queue: Box<dyn AnyDescriptor> = Box::new(Queue { fifo: false });
        assert_eq!(queue.resource_kind(), ResourceKind::Custom("queue"));
        assert_eq!(queue.check().unwrap_err(), "only FIFO queues are supported");
        assert_eq!(queue.realized_type_id(), TypeId::of::<QueueUrl>());
        assert!(queue.realized_type().ends_with("QueueUrl"));
    }

    #[test]
    fn downcast_to_concrete_descriptor() {
        let queue: Box<dyn AnyDescriptor> = Box::new(Queue { fifo: true });
        assert!(queue.is::<Queue>());
        assert!(queue.downcast_ref::<Queue>().unwrap().fifo);
    }

    #[test]
    fn kind_display() {
        assert_eq!(ResourceKind::Storage.to_string(), "storage");
        assert_eq!(ResourceKind::Custom("queue").to_string(), "queue");
    }
}
