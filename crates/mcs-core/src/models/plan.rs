use serde::{Deserialize, Serialize};

/// A hosting tier: how much memory a server on this plan gets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub id: String,
    pub memory_gb: u32,
    /// Price reference owned by the payment provider; never interpreted here.
    #[serde(default)]
    pub price_ref: String,
}

impl Plan {
    pub fn new(id: &str, memory_gb: u32) -> Self {
        Self {
            id: id.to_string(),
            memory_gb,
            price_ref: String::new(),
        }
    }

    /// Memory quantity as rendered into container resources, e.g. `8Gi`.
    pub fn memory_quantity(&self) -> String {
        format!("{}Gi", self.memory_gb)
    }
}
