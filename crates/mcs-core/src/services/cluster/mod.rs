//! Capability surface of the cluster control plane.

pub mod kubectl;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Deployment, ExposedService, Service};

pub use kubectl::KubectlCluster;
pub use memory::InMemoryCluster;

/// Desired-state submission and removal. Failures come back as
/// `HostingError::Cluster` carrying the control plane's status code.
#[async_trait]
pub trait ClusterControlPlane: Send + Sync {
    /// Every exposure object across all namespaces.
    async fn list_exposures(&self) -> Result<Vec<ExposedService>>;

    async fn submit_workload(&self, workload: &Deployment) -> Result<()>;

    async fn submit_exposure(&self, exposure: &Service) -> Result<()>;

    async fn delete_workload(&self, name: &str) -> Result<()>;

    async fn delete_exposure(&self, name: &str) -> Result<()>;
}
