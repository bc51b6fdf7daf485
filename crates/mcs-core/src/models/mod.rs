pub mod config;
pub mod entitlement;
pub mod manifest;
pub mod plan;
pub mod server;

pub use config::{ClusterBackend, ClusterSettings, HostingConfig, PortRange};
pub use entitlement::{Entitlement, EntitlementStatus};
pub use manifest::{Deployment, Service};
pub use plan::Plan;
pub use server::{DeletedServer, ExposedService, Principal, ProvisionedServer};
