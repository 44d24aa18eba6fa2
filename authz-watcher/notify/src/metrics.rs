use authz_watcher_core::EventKind;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, histogram::Histogram},
    registry::{Registry, Unit},
};
use tokio::time;

#[derive(Clone, Debug)]
pub struct NotifyMetrics {
    dispatches: Family<DispatchLabels, Counter>,
    duration: Histogram,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct DispatchLabels {
    kind: &'static str,
    result: &'static str,
}

impl NotifyMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let dispatches = Family::default();
        prom.register(
            "dispatches",
            "Count of alerts handled by the notifier, by outcome",
            dispatches.clone(),
        );

        let duration = Histogram::new([0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]);
        prom.register_with_unit(
            "dispatch_duration",
            "Histogram of webhook call durations",
            Unit::Seconds,
            duration.clone(),
        );

        Self {
            dispatches,
            duration,
        }
    }

    pub(crate) fn dispatched(&self, kind: EventKind, result: &'static str, start: time::Instant) {
        self.duration.observe(start.elapsed().as_secs_f64());
        self.outcome(kind, result);
    }

    pub(crate) fn outcome(&self, kind: EventKind, result: &'static str) {
        self.dispatches
            .get_or_create(&DispatchLabels {
                kind: kind.as_str(),
                result,
            })
            .inc();
    }
}
