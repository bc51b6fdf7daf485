use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EntitlementStatus {
    Pending,
    Paid,
    Failed,
}

/// A payment record for one principal and plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub principal_id: String,
    pub plan_id: String,
    pub status: EntitlementStatus,
    pub recorded_at: DateTime<Utc>,
}

impl Entitlement {
    pub fn new(principal_id: &str, plan_id: &str, status: EntitlementStatus) -> Self {
        Self {
            principal_id: principal_id.to_string(),
            plan_id: plan_id.to_string(),
            status,
            recorded_at: Utc::now(),
        }
    }

    pub fn grants(&self, principal_id: &str, plan_id: &str) -> bool {
        self.status == EntitlementStatus::Paid
            && self.principal_id == principal_id
            && self.plan_id == plan_id
    }
}
