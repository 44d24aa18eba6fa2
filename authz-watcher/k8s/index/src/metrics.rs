use authz_watcher_core::EventKind;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct IndexMetrics {
    events: Family<EventLabels, Counter>,
    filtered: Family<EventLabels, Counter>,
    alerts_queued: Family<EventLabels, Counter>,
    alerts_dropped: Family<EventLabels, Counter>,
    policies: Gauge,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct EventLabels {
    kind: &'static str,
}

impl IndexMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let events = Family::default();
        prom.register(
            "events",
            "Count of AuthorizationPolicy watch events observed by the index",
            events.clone(),
        );

        let filtered = Family::default();
        prom.register(
            "filtered_events",
            "Count of watch events rejected by the event filter",
            filtered.clone(),
        );

        let alerts_queued = Family::default();
        prom.register(
            "alerts_queued",
            "Count of alerts queued for dispatch",
            alerts_queued.clone(),
        );

        let alerts_dropped = Family::default();
        prom.register(
            "alerts_dropped",
            "Count of alerts dropped because the dispatch queue was full or closed",
            alerts_dropped.clone(),
        );

        let policies = Gauge::default();
        prom.register(
            "policies",
            "Gauge of the number of AuthorizationPolicies in the index",
            policies.clone(),
        );

        Self {
            events,
            filtered,
            alerts_queued,
            alerts_dropped,
            policies,
        }
    }

    pub(crate) fn event(&self, kind: EventKind) {
        self.events.get_or_create(&EventLabels::from(kind)).inc();
    }

    pub(crate) fn filtered(&self, kind: EventKind) {
        self.filtered.get_or_create(&EventLabels::from(kind)).inc();
    }

    pub(crate) fn alert_queued(&self, kind: EventKind) {
        self.alerts_queued.get_or_create(&EventLabels::from(kind)).inc();
    }

    pub(crate) fn alert_dropped(&self, kind: EventKind) {
        self.alerts_dropped.get_or_create(&EventLabels::from(kind)).inc();
    }

    pub(crate) fn set_policies(&self, size: usize) {
        self.policies.set(size as i64);
    }
}

impl From<EventKind> for EventLabels {
    fn from(kind: EventKind) -> Self {
        Self {
            kind: kind.as_str(),
        }
    }
}
