use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    #[error("invalid plan ID '{0}'")]
    InvalidPlan(String),

    #[error("no paid entitlement for plan '{plan_id}'")]
    PaymentRequired { principal_id: String, plan_id: String },

    #[error("no available NodePorts in the range {start}-{end}")]
    NoCapacity { start: u16, end: u16 },

    #[error("an error occurred: {0}")]
    Provision(String),

    #[error("server '{0}' not found")]
    NotFound(String),

    #[error("error deleting server: {message}")]
    Delete { status: u16, message: String },

    #[error("not authenticated")]
    Unauthenticated,

    #[error("cluster request failed ({status}): {message}")]
    Cluster { status: u16, message: String },

    #[error("entitlement ledger failed: {0}")]
    Ledger(String),

    #[error("config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl HostingError {
    /// HTTP status the error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            HostingError::InvalidPlan(_) => 400,
            HostingError::Unauthenticated => 401,
            HostingError::PaymentRequired { .. } => 402,
            HostingError::NotFound(_) => 404,
            HostingError::Delete { status, .. } | HostingError::Cluster { status, .. } => *status,
            _ => 500,
        }
    }

    /// True when the cluster reported the target object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            HostingError::NotFound(_) | HostingError::Cluster { status: 404, .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HostingError>;
