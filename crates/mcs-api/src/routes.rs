use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateServerRequest {
    /// Display name chosen by the user; the instance name is generated.
    #[serde(default)]
    pub name: Option<String>,
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateServerResponse {
    pub message: String,
    pub instance_name: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: String,
    pub memory_gb: u32,
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Minecraft Server Hosting API!".to_string(),
    })
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<PlanSummary>> {
    Json(
        state
            .catalog
            .plans()
            .map(|p| PlanSummary {
                id: p.id.clone(),
                memory_gb: p.memory_gb,
            })
            .collect(),
    )
}

pub async fn create_server(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateServerRequest>, JsonRejection>,
) -> Result<Json<CreateServerResponse>, ApiError> {
    let principal = state.identity.authenticate(&headers)?;
    let Json(request) = body?;
    let server = state
        .provisioner
        .create(&principal, &request.plan_id, request.name.as_deref())
        .await?;
    Ok(Json(CreateServerResponse {
        message: server.message(),
        instance_name: server.instance_name,
        port: server.port,
    }))
}

pub async fn delete_server(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(instance_name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let principal = state.identity.authenticate(&headers)?;
    info!(principal = %principal.id, instance = %instance_name, "delete requested");
    let deleted = state.deprovisioner.delete(&instance_name).await?;
    Ok(Json(MessageResponse {
        message: deleted.message(),
    }))
}
