#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use authz_watcher_core as core;
pub use authz_watcher_k8s_api as k8s;
pub use authz_watcher_k8s_index as index;
pub use authz_watcher_notify as notify;

mod args;
mod lease;

pub use self::args::Args;
