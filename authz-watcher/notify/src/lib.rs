//! Delivers alerts to the configured webhook.
//!
//! Each alert gets exactly one delivery attempt. Failures are logged and
//! counted, never retried.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod dispatch;
mod metrics;
mod notifier;

pub use self::{
    dispatch::{Dispatch, DispatchError, Webhook},
    metrics::NotifyMetrics,
    notifier::Notifier,
};
