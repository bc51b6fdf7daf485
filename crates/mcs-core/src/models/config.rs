use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::plan::Plan;

pub const DEFAULT_IMAGE: &str = "itzg/minecraft-server";

#[derive(Debug, Clone, Deserialize)]
pub struct HostingConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub port_range: PortRange,
    #[serde(default)]
    pub cluster: ClusterSettings,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    pub plans: Vec<Plan>,
    /// Bearer token to principal id.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

/// Inclusive NodePort range servers are exposed on.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: 30000,
            end: 32767,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClusterBackend {
    #[default]
    Kubectl,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSettings {
    #[serde(default)]
    pub backend: ClusterBackend,
    #[serde(default = "default_kubectl_path")]
    pub kubectl_path: String,
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default)]
    pub context: Option<String>,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            backend: ClusterBackend::default(),
            kubectl_path: default_kubectl_path(),
            kubeconfig: None,
            context: None,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("entitlements.json")
}

fn default_kubectl_path() -> String {
    "kubectl".to_string()
}
