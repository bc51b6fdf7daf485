use std::path::Path;

use crate::error::{HostingError, Result};
use crate::models::HostingConfig;

pub const DEFAULT_CONFIG_FILENAME: &str = "mcs.yaml";

pub fn load(config_path: &Path) -> Result<HostingConfig> {
    if !config_path.exists() {
        return Err(HostingError::ConfigNotFound(config_path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(config_path)?;
    parse(&contents)
}

pub fn parse(contents: &str) -> Result<HostingConfig> {
    let config: HostingConfig = serde_yaml::from_str(contents)
        .map_err(|e| HostingError::InvalidConfig(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &HostingConfig) -> Result<()> {
    if config.namespace.is_empty() {
        return Err(HostingError::InvalidConfig(
            "namespace must not be empty".into(),
        ));
    }
    if config.image.is_empty() {
        return Err(HostingError::InvalidConfig("image must not be empty".into()));
    }
    if config.port_range.start > config.port_range.end {
        return Err(HostingError::InvalidConfig(format!(
            "port_range start {} is above end {}",
            config.port_range.start, config.port_range.end
        )));
    }
    if config.plans.is_empty() {
        return Err(HostingError::InvalidConfig(
            "at least one plan is required".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClusterBackend, PortRange};
    use std::fs;

    #[test]
    fn parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = r#"
bind_address: 0.0.0.0:9000
namespace: games
image: itzg/minecraft-server:java21
port_range:
  start: 31000
  end: 31010
cluster:
  backend: kubectl
  kubectl_path: /usr/local/bin/kubectl
  kubeconfig: /etc/mcs/kubeconfig
  context: prod
ledger_path: /var/lib/mcs/entitlements.json
plans:
  - id: basic
    memory_gb: 2
    price_ref: price_basic
  - id: pro
    memory_gb: 8
tokens:
  secret-token: alice
"#;
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, yaml).unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.namespace, "games");
        assert_eq!(config.image, "itzg/minecraft-server:java21");
        assert_eq!(
            config.port_range,
            PortRange {
                start: 31000,
                end: 31010
            }
        );
        assert_eq!(config.cluster.backend, ClusterBackend::Kubectl);
        assert_eq!(config.cluster.context.as_deref(), Some("prod"));
        assert_eq!(config.plans.len(), 2);
        assert_eq!(config.plans[0].price_ref, "price_basic");
        assert_eq!(config.plans[1].memory_gb, 8);
        assert_eq!(config.tokens.get("secret-token").map(String::as_str), Some("alice"));
    }

    #[test]
    fn parse_minimal_config() {
        let yaml = "plans:\n  - id: basic\n    memory_gb: 2\n";
        let config = parse(yaml).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8000");
        assert_eq!(config.namespace, "default");
        assert_eq!(config.image, "itzg/minecraft-server");
        assert_eq!(config.port_range, PortRange::default());
        assert_eq!(config.cluster.backend, ClusterBackend::Kubectl);
        assert_eq!(config.cluster.kubectl_path, "kubectl");
        assert!(config.tokens.is_empty());
    }

    #[test]
    fn missing_config_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join(DEFAULT_CONFIG_FILENAME)),
            Err(HostingError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn rejects_empty_plans() {
        assert!(matches!(
            parse("plans: []\n"),
            Err(HostingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_inverted_port_range() {
        let yaml = "port_range:\n  start: 32000\n  end: 31000\nplans:\n  - id: basic\n    memory_gb: 2\n";
        assert!(matches!(parse(yaml), Err(HostingError::InvalidConfig(_))));
    }
}
