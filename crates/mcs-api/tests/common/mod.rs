// Each test binary compiles this module independently and uses a different
// subset of helpers, so unused-function warnings are expected.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use mcs_api::app::{build_router, AppState};
use mcs_api::auth::TokenIdentityProvider;
use mcs_core::models::{Entitlement, EntitlementStatus};
use mcs_core::services::cluster::InMemoryCluster;
use mcs_core::services::config_loader;
use mcs_core::services::entitlement::EntitlementStore;

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

const CONFIG: &str = r#"
namespace: default
cluster:
  backend: memory
plans:
  - id: basic
    memory_gb: 2
  - id: pro
    memory_gb: 8
tokens:
  alice-token: alice
  bob-token: bob
"#;

pub struct TestApp {
    pub router: Router,
    pub cluster: Arc<InMemoryCluster>,
    pub ledger: Arc<EntitlementStore>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn grant(&self, principal_id: &str, plan_id: &str, status: EntitlementStatus) {
        self.ledger
            .record(Entitlement::new(principal_id, plan_id, status))
            .await
            .unwrap();
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        send(&self.router, request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(&self.router, request).await
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// An app on an in-memory cluster with plans basic (2Gi) and pro (8Gi).
pub fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = config_loader::parse(CONFIG).unwrap();
    let cluster = Arc::new(InMemoryCluster::new(&config.namespace));
    let ledger = Arc::new(EntitlementStore::new(&dir.path().join("entitlements.json")));
    let identity = Arc::new(TokenIdentityProvider::new(config.tokens.clone()));
    let state = AppState::new(&config, cluster.clone(), ledger.clone(), identity).unwrap();
    TestApp {
        router: build_router(state),
        cluster,
        ledger,
        _dir: dir,
    }
}
