use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{HostingError, Result};
use crate::models::Entitlement;

/// Source of payment facts.
#[async_trait]
pub trait EntitlementLedger: Send + Sync {
    async fn has_paid_entitlement(&self, principal_id: &str, plan_id: &str) -> Result<bool>;
}

/// Decides whether a principal may create a server on a plan.
#[derive(Clone)]
pub struct EntitlementGate {
    ledger: Arc<dyn EntitlementLedger>,
}

impl EntitlementGate {
    pub fn new(ledger: Arc<dyn EntitlementLedger>) -> Self {
        Self { ledger }
    }

    /// A missing record and an unpaid one both answer `false`.
    pub async fn check(&self, principal_id: &str, plan_id: &str) -> Result<bool> {
        self.ledger.has_paid_entitlement(principal_id, plan_id).await
    }
}

/// JSON-file ledger. The file is re-read on every check so the payment side
/// can update it without restarting the server.
pub struct EntitlementStore {
    ledger_path: PathBuf,
    write_lock: Mutex<()>,
}

impl EntitlementStore {
    pub fn new(ledger_path: &Path) -> Self {
        Self {
            ledger_path: ledger_path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<Vec<Entitlement>> {
        if !self.ledger_path.exists() {
            return Ok(Vec::new());
        }
        let json = tokio::fs::read_to_string(&self.ledger_path)
            .await
            .map_err(|e| HostingError::Ledger(format!("failed to read ledger file: {e}")))?;
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<Entitlement> = serde_json::from_str(&json)?;
        Ok(records)
    }

    /// Append a record.
    pub async fn record(&self, entitlement: Entitlement) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        records.push(entitlement);
        self.save(&records).await
    }

    async fn save(&self, records: &[Entitlement]) -> Result<()> {
        if let Some(parent) = self.ledger_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    HostingError::Ledger(format!("failed to create ledger dir: {e}"))
                })?;
            }
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.ledger_path, json)
            .await
            .map_err(|e| HostingError::Ledger(format!("failed to write ledger file: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl EntitlementLedger for EntitlementStore {
    async fn has_paid_entitlement(&self, principal_id: &str, plan_id: &str) -> Result<bool> {
        let records = self.load().await?;
        Ok(records.iter().any(|r| r.grants(principal_id, plan_id)))
    }
}
