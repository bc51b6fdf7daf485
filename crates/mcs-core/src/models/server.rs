use std::collections::BTreeSet;

use serde::Serialize;

/// Authenticated caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
}

impl Principal {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

/// An exposure object as seen when listing the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedService {
    pub name: String,
    pub namespace: String,
    pub node_ports: BTreeSet<u16>,
}

/// Result of a successful create.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedServer {
    pub instance_name: String,
    pub port: u16,
    pub memory: String,
}

impl ProvisionedServer {
    pub fn message(&self) -> String {
        format!(
            "Server {} created successfully with NodePort {}",
            self.instance_name, self.port
        )
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedServer {
    pub instance_name: String,
}

impl DeletedServer {
    pub fn message(&self) -> String {
        format!("Server {} deleted successfully", self.instance_name)
    }
}
