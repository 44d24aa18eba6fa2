//! Tracks the last observed field set of every `AuthorizationPolicy` so that
//! watch updates can be turned into transitions.
//!
//! The watch only delivers the current state of an object. The index keeps
//! the field set extracted from the previous state, keyed by namespace and
//! name, and pairs it with the new one on each apply or delete. Events for a
//! single object are applied in the order the watch delivers them.
//!
//! Transitions that pass the [`filter`] are handed to the event handler, which
//! queues an alert for the notifier when the change is alert-worthy. The
//! queue is bounded and never waited on: the index must not stall the watch.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod filter;
mod index;
mod metrics;

#[cfg(test)]
mod tests;

pub use self::{
    index::{Index, SharedIndex},
    metrics::IndexMetrics,
};
