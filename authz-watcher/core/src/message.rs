use crate::{EventKind, FieldSet};

/// Renders the notification text for a policy event.
///
/// Creations and updates list the policy's current remote IP blocks and
/// hosts. Deletions only name the policy.
pub fn format_message(
    kind: EventKind,
    namespace: &str,
    name: &str,
    fields: Option<&FieldSet>,
) -> String {
    match (kind, fields) {
        (EventKind::Deleted, _) => format!("AuthorizationPolicy {namespace}/{name} deleted"),
        (kind, fields) => {
            let empty = FieldSet::default();
            let FieldSet {
                remote_ip_blocks,
                hosts,
            } = fields.unwrap_or(&empty);
            format!(
                "AuthorizationPolicy {namespace}/{name} {kind}: IPBlocks=[{}], Hosts=[{}]",
                remote_ip_blocks.join(", "),
                hosts.join(", "),
            )
        }
    }
}
