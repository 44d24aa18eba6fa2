//! Cheap admission check applied to every watch event before it is handled.
//!
//! The filter must agree with [`authz_watcher_core::is_alert_worthy`]: an event
//! it rejects is never reported, and an admitted event that the detector then
//! rejects is wasted work.

use authz_watcher_core::Transition;

/// Applies the same criteria as [`authz_watcher_core::is_alert_worthy`], so
/// anything it admits is reported.
pub fn admit(transition: &Transition) -> bool {
    match transition {
        // New policies are only interesting when they admit something.
        Transition::Created { current } => !current.is_empty(),

        Transition::Updated { previous, current } => previous.differs(current),

        Transition::Deleted { .. } => true,
    }
}
