use authz_watcher_k8s_api::policy::{AuthorizationPolicy, Rule};

/// The security-relevant fields of an `AuthorizationPolicy`.
///
/// Values are kept in rule order, then matcher order, and are not
/// deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub remote_ip_blocks: Vec<String>,
    pub hosts: Vec<String>,
}

// === impl FieldSet ===

impl FieldSet {
    pub fn extract(policy: &AuthorizationPolicy) -> Self {
        Self {
            remote_ip_blocks: remote_ip_blocks(policy),
            hosts: hosts(policy),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remote_ip_blocks.is_empty() && self.hosts.is_empty()
    }

    /// Compares both sequences positionally: any addition, removal or
    /// reordering is a difference.
    pub fn differs(&self, other: &Self) -> bool {
        self.remote_ip_blocks != other.remote_ip_blocks || self.hosts != other.hosts
    }
}

/// Collects the `remoteIpBlocks` of every source matcher of every rule.
pub fn remote_ip_blocks(policy: &AuthorizationPolicy) -> Vec<String> {
    rules(policy)
        .flat_map(|rule| rule.from.iter().flatten())
        .filter_map(|from| from.source.as_ref())
        .flat_map(|source| source.remote_ip_blocks.iter().flatten())
        .cloned()
        .collect()
}

/// Collects the `hosts` of every operation matcher of every rule.
pub fn hosts(policy: &AuthorizationPolicy) -> Vec<String> {
    rules(policy)
        .flat_map(|rule| rule.to.iter().flatten())
        .filter_map(|to| to.operation.as_ref())
        .flat_map(|operation| operation.hosts.iter().flatten())
        .cloned()
        .collect()
}

fn rules(policy: &AuthorizationPolicy) -> impl Iterator<Item = &Rule> {
    policy.spec.rules.iter().flatten()
}
