use crate::{Index, IndexMetrics, SharedIndex};
use authz_watcher_core::{Alert, EventKind, ResourceId};
use authz_watcher_k8s_api::policy::{
    AuthorizationPolicy, AuthorizationPolicySpec, Operation, Rule, RuleFrom, RuleTo, Source,
};
use kubert::index::IndexNamespacedResource;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

fn mk_index(capacity: usize) -> (SharedIndex, mpsc::Receiver<Alert>) {
    let (alerts_tx, alerts_rx) = mpsc::channel(capacity);
    let index = Index::shared(alerts_tx, IndexMetrics::register(&mut Default::default()));
    (index, alerts_rx)
}

fn mk_policy(
    ns: &str,
    name: &str,
    remote_ip_blocks: &[&str],
    hosts: &[&str],
) -> AuthorizationPolicy {
    let rule = Rule {
        from: Some(vec![RuleFrom {
            source: Some(Source {
                remote_ip_blocks: Some(remote_ip_blocks.iter().map(ToString::to_string).collect()),
                ..Default::default()
            }),
        }]),
        to: Some(vec![RuleTo {
            operation: Some(Operation {
                hosts: Some(hosts.iter().map(ToString::to_string).collect()),
                ..Default::default()
            }),
        }]),
        when: None,
    };
    let mut policy = AuthorizationPolicy::new(
        name,
        AuthorizationPolicySpec {
            rules: Some(vec![rule]),
            ..Default::default()
        },
    );
    policy.metadata.namespace = Some(ns.to_string());
    policy
}

fn id(ns: &str, name: &str) -> ResourceId {
    ResourceId::new(ns.to_string(), name.to_string())
}

#[test]
fn created_policy_alerts() {
    let (index, mut alerts) = mk_index(10);

    index
        .write()
        .apply(mk_policy("ns", "p", &["10.0.0.1"], &["foo.com"]));

    assert_eq!(
        alerts.try_recv().expect("alert must be queued"),
        Alert {
            id: id("ns", "p"),
            kind: EventKind::Created,
            message: "AuthorizationPolicy ns/p created: IPBlocks=[10.0.0.1], Hosts=[foo.com]"
                .to_string(),
        }
    );
    assert!(alerts.try_recv().is_err());
    assert_eq!(index.read().len(), 1);
}

#[test]
fn created_empty_policy_is_ignored() {
    let (index, mut alerts) = mk_index(10);

    let mut policy = mk_policy("ns", "allow-nothing", &[], &[]);
    index.write().apply(policy.clone());
    assert!(alerts.try_recv().is_err());

    // The policy is still tracked, so gaining a host is an update.
    policy.spec.rules.as_mut().unwrap()[0].to = Some(vec![RuleTo {
        operation: Some(Operation {
            hosts: Some(vec!["foo.com".to_string()]),
            ..Default::default()
        }),
    }]);
    index.write().apply(policy);
    let alert = alerts.try_recv().expect("alert must be queued");
    assert_eq!(alert.kind, EventKind::Updated);
    assert_eq!(
        alert.message,
        "AuthorizationPolicy ns/allow-nothing updated: IPBlocks=[], Hosts=[foo.com]"
    );
}

#[test]
fn unchanged_update_does_not_alert() {
    let (index, mut alerts) = mk_index(10);

    let policy = mk_policy("ns", "p", &["10.0.0.1"], &["foo.com"]);
    index.write().apply(policy.clone());
    assert!(alerts.try_recv().is_ok());

    // Metadata-only changes leave the field set untouched.
    let mut relabeled = policy.clone();
    relabeled.metadata.labels = Some([("team".to_string(), "a".to_string())].into());
    index.write().apply(relabeled);
    index.write().apply(policy);
    assert!(alerts.try_recv().is_err());
}

#[test]
fn host_added() {
    let (index, mut alerts) = mk_index(10);

    index
        .write()
        .apply(mk_policy("ns", "p", &["10.0.0.1"], &["foo.com"]));
    assert!(alerts.try_recv().is_ok());

    index
        .write()
        .apply(mk_policy("ns", "p", &["10.0.0.1"], &["foo.com", "bar.com"]));
    assert_eq!(
        alerts.try_recv().expect("alert must be queued"),
        Alert {
            id: id("ns", "p"),
            kind: EventKind::Updated,
            message:
                "AuthorizationPolicy ns/p updated: IPBlocks=[10.0.0.1], Hosts=[foo.com, bar.com]"
                    .to_string(),
        }
    );
    assert!(alerts.try_recv().is_err());
}

#[test]
fn range_removed() {
    let (index, mut alerts) = mk_index(10);

    index
        .write()
        .apply(mk_policy("ns", "p", &["10.0.0.1", "10.0.0.2"], &[]));
    assert!(alerts.try_recv().is_ok());

    index.write().apply(mk_policy("ns", "p", &["10.0.0.1"], &[]));
    let alert = alerts.try_recv().expect("alert must be queued");
    assert_eq!(alert.kind, EventKind::Updated);
    assert_eq!(
        alert.message,
        "AuthorizationPolicy ns/p updated: IPBlocks=[10.0.0.1], Hosts=[]"
    );
}

#[test]
fn deleted_policy_alerts() {
    let (index, mut alerts) = mk_index(10);

    index
        .write()
        .apply(mk_policy("ns", "p", &["10.0.0.1"], &["foo.com"]));
    assert!(alerts.try_recv().is_ok());

    index.write().delete("ns".to_string(), "p".to_string());
    assert_eq!(
        alerts.try_recv().expect("alert must be queued"),
        Alert {
            id: id("ns", "p"),
            kind: EventKind::Deleted,
            message: "AuthorizationPolicy ns/p deleted".to_string(),
        }
    );
    assert!(index.read().is_empty());

    // A policy that is created again after deletion is a new policy.
    index.write().apply(mk_policy("ns", "p", &[], &["foo.com"]));
    assert_eq!(
        alerts.try_recv().expect("alert must be queued").kind,
        EventKind::Created
    );
}

#[test]
fn deleted_empty_policy_alerts() {
    let (index, mut alerts) = mk_index(10);

    index.write().apply(mk_policy("ns", "p", &[], &[]));
    assert!(alerts.try_recv().is_err());

    index.write().delete("ns".to_string(), "p".to_string());
    assert_eq!(
        alerts.try_recv().expect("alert must be queued").kind,
        EventKind::Deleted
    );
}

#[test]
fn policies_are_tracked_per_namespace() {
    let (index, mut alerts) = mk_index(10);

    index
        .write()
        .apply(mk_policy("ns-a", "p", &["10.0.0.1"], &[]));
    index
        .write()
        .apply(mk_policy("ns-b", "p", &["10.0.0.1"], &[]));

    let kinds = [alerts.try_recv().unwrap(), alerts.try_recv().unwrap()]
        .into_iter()
        .map(|a| (a.id, a.kind))
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            (id("ns-a", "p"), EventKind::Created),
            (id("ns-b", "p"), EventKind::Created),
        ]
    );
    assert_eq!(index.read().len(), 2);
}

#[test]
fn reset_does_not_realert_unchanged_policies() {
    let (index, mut alerts) = mk_index(10);

    let policy = mk_policy("ns", "p", &["10.0.0.1"], &["foo.com"]);
    index.write().apply(policy.clone());
    assert!(alerts.try_recv().is_ok());

    // A watch restart replays the live state of every policy.
    index.write().reset(
        vec![policy, mk_policy("ns", "q", &["10.0.0.0/8"], &[])],
        Default::default(),
    );
    let alert = alerts.try_recv().expect("alert must be queued");
    assert_eq!((alert.id, alert.kind), (id("ns", "q"), EventKind::Created));
    assert!(alerts.try_recv().is_err());
}

#[test]
fn full_queue_drops_alerts() {
    let (index, mut alerts) = mk_index(1);

    index.write().apply(mk_policy("ns", "a", &["10.0.0.1"], &[]));
    index.write().apply(mk_policy("ns", "b", &["10.0.0.2"], &[]));

    assert_eq!(alerts.try_recv().unwrap().id, id("ns", "a"));
    assert!(alerts.try_recv().is_err());
    assert_eq!(index.read().len(), 2);

    // Later transitions are still evaluated against the latest snapshot.
    index.write().apply(mk_policy("ns", "b", &["10.0.0.3"], &[]));
    assert_eq!(alerts.try_recv().unwrap().kind, EventKind::Updated);
}

#[test]
fn closed_queue_is_tolerated() {
    let (index, alerts) = mk_index(10);
    drop(alerts);

    index.write().apply(mk_policy("ns", "p", &["10.0.0.1"], &[]));
    index.write().delete("ns".to_string(), "p".to_string());
    assert!(index.read().is_empty());
}

#[test]
fn policy_without_namespace_is_ignored() {
    let (index, mut alerts) = mk_index(10);

    let mut policy = mk_policy("ns", "p", &["10.0.0.1"], &[]);
    policy.metadata.namespace = None;
    index.write().apply(policy);

    assert!(alerts.try_recv().is_err());
    assert!(index.read().is_empty());
}
