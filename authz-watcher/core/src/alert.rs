use crate::{EventKind, ResourceId};

/// A notification to be dispatched for a single alert-worthy transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub id: ResourceId,
    pub kind: EventKind,
    pub message: String,
}
