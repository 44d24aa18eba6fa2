use crate::k8s::{self, Api, Lease, ObjectMeta, Patch, PatchParams};
use anyhow::Result;
use kubert::lease::{Claim, ClaimParams, LeaseManager};
use std::sync::Arc;
use tokio::{sync::watch, time};

const LEASE_DURATION: time::Duration = time::Duration::from_secs(30);
const RENEW_GRACE_PERIOD: time::Duration = time::Duration::from_secs(1);
const FIELD_MANAGER: &str = "authz-watcher";

/// Ensures the Lease exists and spawns a task that keeps trying to claim it
/// for `hostname`.
pub(crate) async fn init<T>(
    runtime: &kubert::Runtime<T>,
    ns: &str,
    name: &str,
    hostname: &str,
) -> Result<watch::Receiver<Arc<Claim>>> {
    let lease = Lease {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(ns.to_string()),
            // Only create the Lease if it does not already exist.
            resource_version: Some("0".to_string()),
            labels: Some(
                [(
                    "app.kubernetes.io/name".to_string(),
                    "authz-watcher".to_string(),
                )]
                .into_iter()
                .collect(),
            ),
            ..Default::default()
        },
        spec: None,
    };

    let api = Api::<Lease>::namespaced(runtime.client(), ns);
    let params = PatchParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    };
    match api.patch(name, &params, &Patch::Apply(lease)).await {
        Ok(lease) => tracing::info!(?lease, "Created Lease resource"),
        Err(k8s::Error::Api(_)) => tracing::debug!("Lease already exists, no need to create it"),
        Err(error) => return Err(error.into()),
    }

    let params = ClaimParams {
        lease_duration: LEASE_DURATION,
        renew_grace_period: RENEW_GRACE_PERIOD,
    };
    let (claims, _task) = LeaseManager::init(api, name)
        .await?
        .spawn(hostname, params)
        .await?;
    Ok(claims)
}
