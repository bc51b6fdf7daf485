use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use tracing::{error, info, warn};

use crate::error::{HostingError, Result};
use crate::models::{Principal, ProvisionedServer};
use crate::services::cluster::ClusterControlPlane;
use crate::services::entitlement::EntitlementGate;
use crate::services::manifest::{render_exposure, render_workload, WorkloadParams};
use crate::services::naming::generate_instance_name;
use crate::services::plan_catalog::PlanCatalog;
use crate::services::ports::PortAllocator;

const NAME_ATTEMPTS: usize = 5;

pub struct ServerProvisioner {
    cluster: Arc<dyn ClusterControlPlane>,
    catalog: Arc<PlanCatalog>,
    gate: EntitlementGate,
    ports: PortAllocator,
    namespace: String,
    image: String,
}

impl ServerProvisioner {
    pub fn new(
        cluster: Arc<dyn ClusterControlPlane>,
        catalog: Arc<PlanCatalog>,
        gate: EntitlementGate,
        ports: PortAllocator,
        namespace: &str,
        image: &str,
    ) -> Self {
        Self {
            cluster,
            catalog,
            gate,
            ports,
            namespace: namespace.to_string(),
            image: image.to_string(),
        }
    }

    pub fn ports(&self) -> &PortAllocator {
        &self.ports
    }

    /// Create a server for `principal` on `plan_id`.
    ///
    /// Plan and entitlement are checked before the cluster is touched. The
    /// workload is submitted first; if the exposure object is then rejected
    /// the workload is deleted again so no half-created server is left behind.
    pub async fn create(
        &self,
        principal: &Principal,
        plan_id: &str,
        display_name: Option<&str>,
    ) -> Result<ProvisionedServer> {
        let plan = self.catalog.lookup(plan_id).ok_or_else(|| {
            warn!(principal = %principal.id, plan_id, "create rejected: unknown plan");
            HostingError::InvalidPlan(plan_id.to_string())
        })?;

        if !self.gate.check(&principal.id, plan_id).await? {
            warn!(principal = %principal.id, plan_id, "create rejected: no paid entitlement");
            return Err(HostingError::PaymentRequired {
                principal_id: principal.id.clone(),
                plan_id: plan_id.to_string(),
            });
        }

        let scan = self
            .ports
            .scan()
            .await
            .map_err(|e| HostingError::Provision(e.to_string()))?;

        let taken_names = scan.exposure_names();
        let instance_name = unique_instance_name(&mut rand::thread_rng(), &taken_names)?;
        let reservation = self.ports.reserve(&scan)?;
        let port = reservation.port();

        let workload = render_workload(&WorkloadParams {
            instance_name: &instance_name,
            namespace: &self.namespace,
            image: &self.image,
            plan,
            owner: &principal.id,
            display_name,
        });
        self.cluster
            .submit_workload(&workload)
            .await
            .map_err(|e| HostingError::Provision(e.to_string()))?;

        let exposure = render_exposure(&instance_name, &self.namespace, port);
        if let Err(submit_err) = self.cluster.submit_exposure(&exposure).await {
            warn!(
                instance = %instance_name,
                port,
                error = %submit_err,
                "exposure rejected, removing workload"
            );
            let mut message = submit_err.to_string();
            if let Err(cleanup_err) = self.cluster.delete_workload(&instance_name).await {
                error!(
                    instance = %instance_name,
                    error = %cleanup_err,
                    "failed to remove workload after exposure was rejected"
                );
                message = format!("{message} (workload cleanup also failed: {cleanup_err})");
            }
            return Err(HostingError::Provision(message));
        }
        reservation.commit();

        info!(
            instance = %instance_name,
            principal = %principal.id,
            plan = %plan.id,
            port,
            "server created"
        );
        Ok(ProvisionedServer {
            instance_name,
            port,
            memory: plan.memory_quantity(),
        })
    }
}

/// Generate a name not present in `taken`, retrying a few times.
pub(crate) fn unique_instance_name<R: Rng + ?Sized>(
    rng: &mut R,
    taken: &HashSet<String>,
) -> Result<String> {
    for _ in 0..NAME_ATTEMPTS {
        let name = generate_instance_name(rng);
        if !taken.contains(&name) {
            return Ok(name);
        }
        warn!(instance = %name, "generated instance name already in use, retrying");
    }
    Err(HostingError::Provision(format!(
        "could not generate an unused instance name after {NAME_ATTEMPTS} attempts"
    )))
}
