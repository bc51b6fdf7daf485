use std::collections::HashMap;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use mcs_core::models::Principal;
use mcs_core::{HostingError, Result};

/// Turns request headers into an authenticated principal.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal>;
}

/// Static bearer tokens from config, each mapped to a principal id.
pub struct TokenIdentityProvider {
    tokens: HashMap<String, String>,
}

impl TokenIdentityProvider {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

impl IdentityProvider for TokenIdentityProvider {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(HostingError::Unauthenticated)?;
        self.tokens
            .get(token)
            .map(|id| Principal::new(id))
            .ok_or(HostingError::Unauthenticated)
    }
}
