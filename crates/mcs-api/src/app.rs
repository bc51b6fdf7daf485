use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use mcs_core::models::{ClusterBackend, HostingConfig};
use mcs_core::services::cluster::{ClusterControlPlane, InMemoryCluster, KubectlCluster};
use mcs_core::services::deprovisioner::ServerDeprovisioner;
use mcs_core::services::entitlement::{EntitlementGate, EntitlementLedger, EntitlementStore};
use mcs_core::services::plan_catalog::PlanCatalog;
use mcs_core::services::ports::PortAllocator;
use mcs_core::services::provisioner::ServerProvisioner;
use mcs_core::Result;

use crate::auth::{IdentityProvider, TokenIdentityProvider};
use crate::routes;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<PlanCatalog>,
    pub provisioner: Arc<ServerProvisioner>,
    pub deprovisioner: Arc<ServerDeprovisioner>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wire the components around one shared cluster handle and ledger.
    pub fn new(
        config: &HostingConfig,
        cluster: Arc<dyn ClusterControlPlane>,
        ledger: Arc<dyn EntitlementLedger>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let catalog = Arc::new(PlanCatalog::new(config.plans.clone())?);
        let provisioner = ServerProvisioner::new(
            cluster.clone(),
            catalog.clone(),
            EntitlementGate::new(ledger),
            PortAllocator::new(cluster.clone(), config.port_range),
            &config.namespace,
            &config.image,
        );
        Ok(Self {
            catalog,
            provisioner: Arc::new(provisioner),
            deprovisioner: Arc::new(ServerDeprovisioner::new(cluster)),
            identity,
        })
    }

    /// Build the state the config describes: cluster backend, file ledger
    /// and bearer tokens.
    pub fn from_config(config: &HostingConfig) -> Result<Self> {
        let cluster: Arc<dyn ClusterControlPlane> = match config.cluster.backend {
            ClusterBackend::Kubectl => {
                Arc::new(KubectlCluster::new(&config.cluster, &config.namespace))
            }
            ClusterBackend::Memory => Arc::new(InMemoryCluster::new(&config.namespace)),
        };
        info!(
            backend = ?config.cluster.backend,
            namespace = %config.namespace,
            ports = %format!("{}-{}", config.port_range.start, config.port_range.end),
            "cluster backend ready"
        );
        let ledger = Arc::new(EntitlementStore::new(&config.ledger_path));
        let identity = Arc::new(TokenIdentityProvider::new(config.tokens.clone()));
        Self::new(config, cluster, ledger, identity)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/healthz", get(routes::healthz))
        .route("/plans", get(routes::list_plans))
        .route("/servers/create/", post(routes::create_server))
        .route("/servers/delete/:instance_name", post(routes::delete_server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
