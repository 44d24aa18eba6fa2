#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod policy;

pub use k8s_openapi::api::{self, coordination::v1::Lease};
pub use kube::{
    api::{Api, ObjectMeta, Patch, PatchParams, ResourceExt},
    runtime::watcher,
    Client, Error, Resource,
};
