use crate::{filter, IndexMetrics};
use ahash::AHashMap as HashMap;
use authz_watcher_core::{format_message, is_alert_worthy, Alert, FieldSet, ResourceId, Transition};
use authz_watcher_k8s_api::{policy::AuthorizationPolicy, ResourceExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc::{error::TrySendError, Sender};

pub type SharedIndex = Arc<RwLock<Index>>;

pub struct Index {
    policies: HashMap<ResourceId, FieldSet>,
    alerts: Sender<Alert>,
    metrics: IndexMetrics,
}

// === impl Index ===

impl Index {
    pub fn shared(alerts: Sender<Alert>, metrics: IndexMetrics) -> SharedIndex {
        Arc::new(RwLock::new(Self {
            policies: HashMap::new(),
            alerts,
            metrics,
        }))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    fn observe(&mut self, id: ResourceId, transition: Transition) {
        let kind = transition.kind();
        self.metrics.event(kind);
        self.metrics.set_policies(self.policies.len());

        if !filter::admit(&transition) {
            tracing::trace!(namespace = %id.namespace, name = %id.name, %kind, "Filtered");
            self.metrics.filtered(kind);
            return;
        }

        self.on_event(id, transition);
    }

    /// Handles a single admitted event, queueing an alert when the transition
    /// is alert-worthy.
    ///
    /// Never fails: a full or closed queue drops the alert.
    pub fn on_event(&mut self, id: ResourceId, transition: Transition) {
        let kind = transition.kind();
        if !is_alert_worthy(&transition) {
            tracing::debug!(namespace = %id.namespace, name = %id.name, %kind, "No changes detected");
            return;
        }

        let message = format_message(kind, &id.namespace, &id.name, transition.current());
        match self.alerts.try_send(Alert { id, kind, message }) {
            Ok(()) => {
                self.metrics.alert_queued(kind);
            }
            Err(TrySendError::Full(Alert { id, .. })) => {
                tracing::warn!(namespace = %id.namespace, name = %id.name, %kind, "Alert queue is full; dropping alert");
                self.metrics.alert_dropped(kind);
            }
            Err(TrySendError::Closed(Alert { id, .. })) => {
                tracing::error!(namespace = %id.namespace, name = %id.name, %kind, "Alert queue is closed; dropping alert");
                self.metrics.alert_dropped(kind);
            }
        }
    }
}

impl kubert::index::IndexNamespacedResource<AuthorizationPolicy> for Index {
    fn apply(&mut self, policy: AuthorizationPolicy) {
        let Some(namespace) = policy.namespace() else {
            tracing::warn!(name = %policy.name_any(), "Ignoring AuthorizationPolicy without a namespace");
            return;
        };
        let id = ResourceId::new(namespace, policy.name_unchecked());

        let current = FieldSet::extract(&policy);
        let previous = self.policies.insert(id.clone(), current.clone());
        self.observe(id, Transition::applied(previous, current));
    }

    fn delete(&mut self, namespace: String, name: String) {
        let id = ResourceId::new(namespace, name);
        let previous = self.policies.remove(&id);
        self.observe(id, Transition::Deleted { previous });
    }
}
