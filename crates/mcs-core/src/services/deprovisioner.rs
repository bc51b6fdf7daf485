use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{HostingError, Result};
use crate::models::DeletedServer;
use crate::services::cluster::ClusterControlPlane;
use crate::services::naming::is_instance_name;

pub struct ServerDeprovisioner {
    cluster: Arc<dyn ClusterControlPlane>,
}

impl ServerDeprovisioner {
    pub fn new(cluster: Arc<dyn ClusterControlPlane>) -> Self {
        Self { cluster }
    }

    /// Delete the workload and exposure objects of `instance_name`.
    ///
    /// Both deletions are always attempted. The call only succeeds when both
    /// objects were removed; if neither existed the server is `NotFound`.
    /// Names the allocator could never have generated are `NotFound` without
    /// reaching the cluster.
    pub async fn delete(&self, instance_name: &str) -> Result<DeletedServer> {
        if !is_instance_name(instance_name) {
            warn!(instance = %instance_name, "delete of non-instance name");
            return Err(HostingError::NotFound(instance_name.to_string()));
        }

        let (workload, exposure) = tokio::join!(
            self.cluster.delete_workload(instance_name),
            self.cluster.delete_exposure(instance_name)
        );

        match (workload, exposure) {
            (Ok(()), Ok(())) => {
                info!(instance = %instance_name, "server deleted");
                Ok(DeletedServer {
                    instance_name: instance_name.to_string(),
                })
            }
            (Err(w), Err(e)) if w.is_not_found() && e.is_not_found() => {
                warn!(instance = %instance_name, "delete of unknown server");
                Err(HostingError::NotFound(instance_name.to_string()))
            }
            (workload, exposure) => {
                let status = [&workload, &exposure]
                    .into_iter()
                    .find_map(|r| r.as_ref().err())
                    .map(HostingError::status_code)
                    .unwrap_or(500);
                let message = format!(
                    "workload: {}; exposure: {}",
                    describe(&workload),
                    describe(&exposure)
                );
                warn!(instance = %instance_name, status, %message, "server delete incomplete");
                Err(HostingError::Delete { status, message })
            }
        }
    }
}

fn describe(outcome: &Result<()>) -> String {
    match outcome {
        Ok(()) => "deleted".to_string(),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Plan, Service};
    use crate::services::cluster::InMemoryCluster;
    use crate::services::manifest::{render_exposure, render_workload, WorkloadParams};

    const NAME: &str = "minecraft-server-abc123";
    const OTHER: &str = "minecraft-server-zzz999";

    async fn deploy(cluster: &InMemoryCluster, name: &str, port: u16) {
        let plan = Plan::new("basic", 2);
        let workload = render_workload(&WorkloadParams {
            instance_name: name,
            namespace: "default",
            image: "itzg/minecraft-server",
            plan: &plan,
            owner: "alice",
            display_name: None,
        });
        cluster.submit_workload(&workload).await.unwrap();
        let exposure: Service = render_exposure(name, "default", port);
        cluster.submit_exposure(&exposure).await.unwrap();
    }

    #[tokio::test]
    async fn deletes_both_objects() {
        let cluster = Arc::new(InMemoryCluster::new("default"));
        deploy(&cluster, NAME, 30000).await;
        let deprovisioner = ServerDeprovisioner::new(cluster.clone());

        let deleted = deprovisioner.delete(NAME).await.unwrap();
        assert_eq!(deleted.message(), format!("Server {NAME} deleted successfully"));
        assert!(cluster.workload_names().await.is_empty());
        assert!(cluster.exposure_names().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_instance_is_not_found_and_leaves_others() {
        let cluster = Arc::new(InMemoryCluster::new("default"));
        deploy(&cluster, OTHER, 30000).await;
        let deprovisioner = ServerDeprovisioner::new(cluster.clone());

        let err = deprovisioner.delete(NAME).await.unwrap_err();
        assert!(matches!(err, HostingError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(cluster.workload_names().await, vec![OTHER.to_string()]);
        assert_eq!(cluster.exposure_names().await, vec![OTHER.to_string()]);
    }

    #[tokio::test]
    async fn half_present_instance_is_reported() {
        let cluster = Arc::new(InMemoryCluster::new("default"));
        deploy(&cluster, NAME, 30000).await;
        cluster.delete_exposure(NAME).await.unwrap();
        let deprovisioner = ServerDeprovisioner::new(cluster.clone());

        let err = deprovisioner.delete(NAME).await.unwrap_err();
        match err {
            HostingError::Delete { status, message } => {
                assert_eq!(status, 404);
                assert!(message.starts_with("workload: deleted"));
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(cluster.workload_names().await.is_empty());
    }

    #[tokio::test]
    async fn names_outside_the_allocator_are_not_found() {
        let cluster = Arc::new(InMemoryCluster::new("default"));
        deploy(&cluster, "my-server", 30000).await;
        let deprovisioner = ServerDeprovisioner::new(cluster.clone());

        let err = deprovisioner.delete("my-server").await.unwrap_err();
        assert!(matches!(err, HostingError::NotFound(ref name) if name == "my-server"));
        assert_eq!(err.status_code(), 404);
        assert_eq!(cluster.workload_names().await, vec!["my-server".to_string()]);
        assert_eq!(cluster.exposure_names().await, vec!["my-server".to_string()]);
    }
}
