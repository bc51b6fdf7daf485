use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ClusterControlPlane;
use crate::error::{HostingError, Result};
use crate::models::{Deployment, ExposedService, Service};

/// Process-local cluster for development and tests. Rejects duplicate names
/// and duplicate NodePorts the way the API server does.
pub struct InMemoryCluster {
    namespace: String,
    state: RwLock<ClusterState>,
}

#[derive(Default)]
struct ClusterState {
    workloads: HashMap<String, Deployment>,
    exposures: HashMap<String, Service>,
    /// Ports held by objects outside the allocator's namespace.
    foreign_ports: BTreeSet<u16>,
    fail_exposures: bool,
}

impl InMemoryCluster {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            state: RwLock::new(ClusterState::default()),
        }
    }

    /// Mark ports as bound by some other service in the cluster.
    pub async fn occupy_ports(&self, ports: impl IntoIterator<Item = u16>) {
        self.state.write().await.foreign_ports.extend(ports);
    }

    /// Make every following exposure submission fail.
    pub async fn fail_exposures(&self, fail: bool) {
        self.state.write().await.fail_exposures = fail;
    }

    pub async fn workload(&self, name: &str) -> Option<Deployment> {
        self.state.read().await.workloads.get(name).cloned()
    }

    pub async fn exposure(&self, name: &str) -> Option<Service> {
        self.state.read().await.exposures.get(name).cloned()
    }

    pub async fn workload_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.state.read().await.workloads.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn exposure_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.state.read().await.exposures.keys().cloned().collect();
        names.sort();
        names
    }
}

fn already_exists(kind: &str, name: &str) -> HostingError {
    HostingError::Cluster {
        status: 409,
        message: format!("{kind} \"{name}\" already exists"),
    }
}

fn not_found(kind: &str, name: &str) -> HostingError {
    HostingError::Cluster {
        status: 404,
        message: format!("{kind} \"{name}\" not found"),
    }
}

#[async_trait]
impl ClusterControlPlane for InMemoryCluster {
    async fn list_exposures(&self) -> Result<Vec<ExposedService>> {
        let state = self.state.read().await;
        let mut exposures: Vec<ExposedService> = state
            .exposures
            .values()
            .map(|s| ExposedService {
                name: s.metadata.name.clone(),
                namespace: self.namespace.clone(),
                node_ports: s.spec.ports.iter().map(|p| p.node_port).collect(),
            })
            .collect();
        if !state.foreign_ports.is_empty() {
            exposures.push(ExposedService {
                name: "external".to_string(),
                namespace: "kube-system".to_string(),
                node_ports: state.foreign_ports.clone(),
            });
        }
        Ok(exposures)
    }

    async fn submit_workload(&self, workload: &Deployment) -> Result<()> {
        let mut state = self.state.write().await;
        let name = &workload.metadata.name;
        if state.workloads.contains_key(name) {
            return Err(already_exists("deployments.apps", name));
        }
        state.workloads.insert(name.clone(), workload.clone());
        Ok(())
    }

    async fn submit_exposure(&self, exposure: &Service) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_exposures {
            return Err(HostingError::Cluster {
                status: 500,
                message: "exposure submission rejected".to_string(),
            });
        }
        let name = &exposure.metadata.name;
        if state.exposures.contains_key(name) {
            return Err(already_exists("services", name));
        }
        for port in exposure.spec.ports.iter().map(|p| p.node_port) {
            let bound = state.foreign_ports.contains(&port)
                || state
                    .exposures
                    .values()
                    .any(|s| s.spec.ports.iter().any(|p| p.node_port == port));
            if bound {
                return Err(HostingError::Cluster {
                    status: 422,
                    message: format!(
                        "Service \"{name}\" is invalid: spec.ports[0].nodePort: Invalid value: {port}: provided port is already allocated"
                    ),
                });
            }
        }
        state.exposures.insert(name.clone(), exposure.clone());
        Ok(())
    }

    async fn delete_workload(&self, name: &str) -> Result<()> {
        match self.state.write().await.workloads.remove(name) {
            Some(_) => Ok(()),
            None => Err(not_found("deployments.apps", name)),
        }
    }

    async fn delete_exposure(&self, name: &str) -> Result<()> {
        match self.state.write().await.exposures.remove(name) {
            Some(_) => Ok(()),
            None => Err(not_found("services", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::manifest::{ObjectMeta, ServicePort, ServiceSpec};
    use crate::models::Service;

    fn exposure(name: &str, node_port: u16) -> Service {
        Service {
            api_version: "v1".into(),
            kind: "Service".into(),
            metadata: ObjectMeta {
                name: name.into(),
                ..Default::default()
            },
            spec: ServiceSpec {
                service_type: "NodePort".into(),
                selector: Default::default(),
                ports: vec![ServicePort {
                    port: 25565,
                    target_port: 25565,
                    node_port,
                }],
            },
        }
    }

    #[tokio::test]
    async fn lists_own_and_foreign_ports() {
        let cluster = InMemoryCluster::new("default");
        cluster.occupy_ports([30000]).await;
        cluster.submit_exposure(&exposure("a", 30001)).await.unwrap();
        let ports: BTreeSet<u16> = cluster
            .list_exposures()
            .await
            .unwrap()
            .into_iter()
            .flat_map(|e| e.node_ports)
            .collect();
        assert_eq!(ports.into_iter().collect::<Vec<_>>(), vec![30000, 30001]);
    }

    #[tokio::test]
    async fn rejects_duplicate_node_port() {
        let cluster = InMemoryCluster::new("default");
        cluster.submit_exposure(&exposure("a", 30001)).await.unwrap();
        let err = cluster.submit_exposure(&exposure("b", 30001)).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert!(err.to_string().contains("already allocated"));
    }

    #[tokio::test]
    async fn delete_missing_is_404() {
        let cluster = InMemoryCluster::new("default");
        let err = cluster.delete_exposure("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
