use crate::Transition;

/// Decides whether a transition must be reported.
///
/// - A creation is reported when the new policy admits any remote IP block
///   or host.
/// - An update is reported when either sequence changed, order included.
/// - A deletion is always reported.
pub fn is_alert_worthy(transition: &Transition) -> bool {
    match transition {
        Transition::Created { current } => !current.is_empty(),
        Transition::Updated { previous, current } => previous.differs(current),
        Transition::Deleted { .. } => true,
    }
}
