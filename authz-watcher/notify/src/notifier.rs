use crate::{Dispatch, NotifyMetrics};
use authz_watcher_core::Alert;
use kubert::lease::Claim;
use std::{future::Future, sync::Arc};
use tokio::{
    sync::{mpsc, watch},
    time,
};

/// Drains the alert queue, making one delivery attempt per alert.
pub struct Notifier<D> {
    dispatch: D,
    alerts: mpsc::Receiver<Alert>,
    leadership: Option<Leadership>,
    metrics: NotifyMetrics,
}

struct Leadership {
    claims: watch::Receiver<Arc<Claim>>,
    claimant: String,
}

// === impl Notifier ===

impl<D: Dispatch> Notifier<D> {
    pub fn new(dispatch: D, alerts: mpsc::Receiver<Alert>, metrics: NotifyMetrics) -> Self {
        Self {
            dispatch,
            alerts,
            leadership: None,
            metrics,
        }
    }

    /// Only deliver alerts while `claimant` holds the lease.
    pub fn with_leadership(
        mut self,
        claims: watch::Receiver<Arc<Claim>>,
        claimant: impl ToString,
    ) -> Self {
        self.leadership = Some(Leadership {
            claims,
            claimant: claimant.to_string(),
        });
        self
    }

    /// Processes alerts until the queue closes or `shutdown` completes.
    ///
    /// A dispatch that is still pending when `shutdown` completes is abandoned.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            let alert = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                alert = self.alerts.recv() => match alert {
                    Some(alert) => alert,
                    None => break,
                },
            };
            let Alert { id, kind, message } = alert;

            if !self.is_leader() {
                tracing::debug!(namespace = %id.namespace, name = %id.name, %kind, "Not the leader; skipping alert");
                self.metrics.outcome(kind, "not_leader");
                continue;
            }

            let start = time::Instant::now();
            let result = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::warn!(namespace = %id.namespace, name = %id.name, %kind, "Shutting down; abandoning notification");
                    self.metrics.outcome(kind, "abandoned");
                    break;
                }
                result = self.dispatch.dispatch(&message) => result,
            };

            match result {
                Ok(()) => {
                    tracing::info!(namespace = %id.namespace, name = %id.name, %kind, "Sent notification");
                    self.metrics.dispatched(kind, "delivered", start);
                }
                Err(error) => {
                    tracing::error!(namespace = %id.namespace, name = %id.name, %kind, %error, "Failed to send notification");
                    self.metrics.dispatched(kind, error.as_label(), start);
                }
            }
        }

        tracing::debug!("Notifier stopped");
    }

    fn is_leader(&self) -> bool {
        match &self.leadership {
            None => true,
            Some(Leadership { claims, claimant }) => claims.borrow().is_current_for(claimant),
        }
    }
}
