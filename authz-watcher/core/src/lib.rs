//! Change detection for Istio `AuthorizationPolicy` resources.
//!
//! Only two parts of a policy are considered security-relevant: the remote IP
//! blocks its rules admit (`from[].source.remoteIpBlocks`) and the hosts its
//! rules target (`to[].operation.hosts`). A [`FieldSet`] holds both; a
//! [`Transition`] pairs the field sets observed before and after a watch event;
//! and [`is_alert_worthy`] decides whether that transition must be reported.
//!
//! ```text
//! [ AuthorizationPolicy ] -> [ FieldSet ] -> [ Transition ] -> is_alert_worthy -> format_message
//! ```

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod alert;
mod detect;
pub mod fields;
mod message;
mod resource_id;
mod transition;

pub use self::{
    alert::Alert,
    detect::is_alert_worthy,
    fields::FieldSet,
    message::format_message,
    resource_id::ResourceId,
    transition::{EventKind, Transition},
};
