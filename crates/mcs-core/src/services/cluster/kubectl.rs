use std::process::Stdio;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::ClusterControlPlane;
use crate::error::{HostingError, Result};
use crate::models::manifest::ServiceList;
use crate::models::{ClusterSettings, Deployment, ExposedService, Service};

static SERVER_REASON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((NotFound|AlreadyExists|Conflict|Invalid|Forbidden|Unauthorized|BadRequest)\)")
        .unwrap()
});

static INVALID_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^The \w+ "[^"]*" is invalid:"#).unwrap());

/// Talks to the cluster by running `kubectl`.
pub struct KubectlCluster {
    kubectl_path: String,
    global_args: Vec<String>,
    namespace: String,
}

impl KubectlCluster {
    pub fn new(settings: &ClusterSettings, namespace: &str) -> Self {
        let mut global_args = Vec::new();
        if let Some(kubeconfig) = &settings.kubeconfig {
            global_args.push("--kubeconfig".to_string());
            global_args.push(kubeconfig.to_string_lossy().to_string());
        }
        if let Some(context) = &settings.context {
            global_args.push("--context".to_string());
            global_args.push(context.clone());
        }
        Self {
            kubectl_path: settings.kubectl_path.clone(),
            global_args,
            namespace: namespace.to_string(),
        }
    }

    async fn run_kubectl(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<String> {
        debug!(args = %args.join(" "), "running kubectl");
        let mut cmd = Command::new(&self.kubectl_path);
        cmd.args(&self.global_args);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = cmd.spawn().map_err(|e| HostingError::Cluster {
            status: 503,
            message: format!("failed to start kubectl: {e}"),
        })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input).await?;
            // Closing stdin lets kubectl see end of input.
            drop(pipe);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(HostingError::Cluster {
                status: classify_error(&stderr),
                message: stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn create_from_json(&self, manifest: &[u8]) -> Result<()> {
        self.run_kubectl(&["create", "-n", &self.namespace, "-f", "-"], Some(manifest))
            .await?;
        Ok(())
    }

    async fn delete(&self, kind: &str, name: &str) -> Result<()> {
        self.run_kubectl(
            &["delete", kind, name, "-n", &self.namespace, "--wait=false"],
            None,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ClusterControlPlane for KubectlCluster {
    async fn list_exposures(&self) -> Result<Vec<ExposedService>> {
        let output = self
            .run_kubectl(&["get", "services", "--all-namespaces", "-o", "json"], None)
            .await?;
        parse_service_list(&output)
    }

    async fn submit_workload(&self, workload: &Deployment) -> Result<()> {
        let manifest = serde_json::to_vec(workload)?;
        self.create_from_json(&manifest).await
    }

    async fn submit_exposure(&self, exposure: &Service) -> Result<()> {
        let manifest = serde_json::to_vec(exposure)?;
        self.create_from_json(&manifest).await
    }

    async fn delete_workload(&self, name: &str) -> Result<()> {
        self.delete("deployment", name).await
    }

    async fn delete_exposure(&self, name: &str) -> Result<()> {
        self.delete("service", name).await
    }
}

/// Map kubectl's error output to the API server's HTTP status.
pub fn classify_error(stderr: &str) -> u16 {
    if let Some(caps) = SERVER_REASON_RE.captures(stderr) {
        return match &caps[1] {
            "NotFound" => 404,
            "AlreadyExists" | "Conflict" => 409,
            "Invalid" => 422,
            "Forbidden" => 403,
            "Unauthorized" => 401,
            "BadRequest" => 400,
            _ => 500,
        };
    }
    if INVALID_OBJECT_RE.is_match(stderr) {
        return 422;
    }
    500
}

/// Collect NodePorts from `kubectl get services -o json` output.
pub fn parse_service_list(json: &str) -> Result<Vec<ExposedService>> {
    let list: ServiceList = serde_json::from_str(json)?;
    Ok(list
        .items
        .into_iter()
        .map(|svc| ExposedService {
            name: svc.metadata.name,
            namespace: svc.metadata.namespace.unwrap_or_default(),
            node_ports: svc.spec.ports.iter().filter_map(|p| p.node_port).collect(),
        })
        .collect())
}
