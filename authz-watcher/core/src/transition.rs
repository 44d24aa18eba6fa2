use crate::FieldSet;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

/// The field sets of a single object observed across one watch event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Created {
        current: FieldSet,
    },
    Updated {
        previous: FieldSet,
        current: FieldSet,
    },
    /// The previous field set is unknown when the object was never observed
    /// before its deletion.
    Deleted {
        previous: Option<FieldSet>,
    },
}

// === impl EventKind ===

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl Transition ===

impl Transition {
    /// Builds the transition for an object that was applied, given the field
    /// set last observed for it, if any.
    pub fn applied(previous: Option<FieldSet>, current: FieldSet) -> Self {
        match previous {
            None => Self::Created { current },
            Some(previous) => Self::Updated { previous, current },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created { .. } => EventKind::Created,
            Self::Updated { .. } => EventKind::Updated,
            Self::Deleted { .. } => EventKind::Deleted,
        }
    }

    /// The object's field set after the event; `None` once it is deleted.
    pub fn current(&self) -> Option<&FieldSet> {
        match self {
            Self::Created { current } | Self::Updated { current, .. } => Some(current),
            Self::Deleted { .. } => None,
        }
    }
}
