use crate::{
    index::{Index, IndexMetrics},
    k8s::{self, policy::AuthorizationPolicy, watcher, Client, Resource},
    lease,
    notify::{Dispatch, Notifier, NotifyMetrics, Webhook},
};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::future::Future;
use tokio::{sync::mpsc, time::Duration};
use tracing::{info_span, Instrument};

// The maximum number of alerts to buffer while the webhook is slow or
// unreachable. Alerts beyond this are dropped.
const ALERT_QUEUE_SIZE: usize = 1_000;

#[derive(Debug, Parser)]
#[clap(
    name = "authz-watcher",
    about = "Notifies a webhook when AuthorizationPolicy network fields change"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "authz_watcher=info,warn",
        env = "AUTHZ_WATCHER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Slack-style incoming webhook that receives notifications.
    #[clap(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    webhook_url: Option<String>,

    #[clap(long, default_value = "5000")]
    notify_timeout_ms: u64,

    /// Only watch policies in this namespace.
    #[clap(long)]
    namespace: Option<String>,

    /// Only watch policies matching this label selector.
    #[clap(long)]
    selector: Option<String>,

    /// Only send notifications while holding the lease.
    #[clap(long)]
    leader_election: bool,

    #[clap(long, default_value = "default", env = "POD_NAMESPACE")]
    lease_namespace: String,

    #[clap(long, default_value = "authz-watcher")]
    lease_name: String,

    #[clap(long, env = "HOSTNAME")]
    hostname: Option<String>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            webhook_url,
            notify_timeout_ms,
            namespace,
            selector,
            leader_election,
            lease_namespace,
            lease_name,
            hostname,
        } = self;

        let mut prom = <Registry>::default();
        let authz_watcher = prom.sub_registry_with_prefix("authz_watcher");
        let index_metrics = IndexMetrics::register(authz_watcher);
        let notify_metrics = NotifyMetrics::register(authz_watcher);
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        if !api_resource_exists::<AuthorizationPolicy>(&runtime.client()).await {
            bail!(
                "authorizationpolicies.{} resource kind not found",
                k8s::policy::SECURITY_API_GROUP
            );
        }

        let webhook = Webhook::new(webhook_url, Duration::from_millis(notify_timeout_ms));
        if !webhook.is_configured() {
            tracing::warn!("No valid webhook URL is configured; notifications will fail");
        }

        let (alerts_tx, alerts_rx) = mpsc::channel(ALERT_QUEUE_SIZE);
        let mut notifier = Notifier::new(webhook, alerts_rx, notify_metrics);
        if leader_election {
            let Some(hostname) = hostname else {
                bail!("--hostname must be set when leader election is enabled");
            };
            let claims = lease::init(&runtime, &lease_namespace, &lease_name, &hostname).await?;
            notifier = notifier.with_leadership(claims, hostname);
        }

        // Spawn the policy watch.
        let index = Index::shared(alerts_tx, index_metrics);
        let mut config = watcher::Config::default();
        if let Some(selector) = selector.as_deref() {
            config = config.labels(selector);
        }
        match namespace {
            Some(ns) => {
                let policies = runtime.watch_namespaced::<AuthorizationPolicy>(ns, config);
                tokio::spawn(
                    kubert::index::namespaced(index, policies)
                        .instrument(info_span!("authorizationpolicies")),
                );
            }
            None => {
                let policies = runtime.watch_all::<AuthorizationPolicy>(config);
                tokio::spawn(
                    kubert::index::namespaced(index, policies)
                        .instrument(info_span!("authorizationpolicies")),
                );
            }
        }

        let drain = runtime.shutdown_handle();
        let signaled = drain.clone().signaled();
        tokio::spawn(
            notify_until_shutdown(
                notifier,
                async move {
                    let _ = signaled.await;
                },
                drain,
            )
            .instrument(info_span!("notifier")),
        );

        // Block the main thread on the shutdown signal. Once it fires, wait for
        // the notifier to release its handle before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

/// Runs the notifier until `shutdown` fires, holding `handle` until the
/// notifier has stopped.
async fn notify_until_shutdown<D: Dispatch, H>(
    notifier: Notifier<D>,
    shutdown: impl Future<Output = ()>,
    handle: H,
) {
    notifier.run(shutdown).await;
    drop(handle);
}

async fn api_resource_exists<T>(client: &Client) -> bool
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    client
        .list_api_group_resources(&T::api_version(&dt))
        .await
        .ok()
        .iter()
        .flat_map(|r| r.resources.iter())
        .any(|r| r.kind == T::kind(&dt))
}
