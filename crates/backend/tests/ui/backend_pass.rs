//! Tests for the Backend derive macro - successful cases.

use keystone_backend::stock::{self, AuthDescriptor, DataDescriptor, FunctionResources};
use keystone_backend::{Backend, Descriptor, RealizedRegistry, RealizedResource, ResourceKey, ResourceKind};

/// Plain backend.
#[derive(Debug, Backend)]
pub struct Config {
    auth: AuthDescriptor,
    data: DataDescriptor,
}

/// Renamed keys, custom realized name, raw identifier.
#[derive(Debug, Backend)]
#[backend(realized = Provisioned)]
pub struct Renamed {
    #[backend(rename = "preSignUp")]
    handler: stock::FunctionDescriptor,
    r#type: DataDescriptor,
}

/// A descriptor defined outside the stock set.
#[derive(Debug, Clone)]
pub struct Queue;

impl Descriptor for Queue {
    type Realized = String;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Custom("queue")
    }
}

#[derive(Debug, Backend)]
struct WithQueue {
    jobs: Queue,
}

fn takes_function(_: &FunctionResources) {}

fn main() {
    assert_eq!(Config::KEYS, ["auth", "data"]);
    assert_eq!(Renamed::KEYS, ["preSignUp", "type"]);

    let config = Config {
        auth: stock::define_auth(),
        data: stock::define_data(),
    };
    let registry = config.registry().unwrap();
    assert_eq!(registry.len(), 2);

    let renamed = Renamed {
        handler: stock::define_function(),
        r#type: stock::define_data(),
    };
    assert!(renamed.registry().unwrap().contains("preSignUp"));

    let with_queue = WithQueue { jobs: Queue };
    let realized = RealizedRegistry::from_entries([(
        ResourceKey::new("jobs").unwrap(),
        RealizedResource::new(ResourceKind::Custom("queue"), "jobs-queue".to_string()),
    )])
    .unwrap();
    let resources: WithQueueResources = with_queue.realize(realized).unwrap();
    assert_eq!(resources.jobs, "jobs-queue");

    let _typed: fn(&Provisioned) = |p| takes_function(&p.handler);
}
