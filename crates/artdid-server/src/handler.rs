use artdid_registry::{Registered, Registry, Resolution, Transferred, Updated};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct DidQuery {
    pub did: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub did: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub did: Option<String>,
    pub new_owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub data: CheckData,
}

#[derive(Debug, Serialize)]
pub struct CheckData {
    pub exists: bool,
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| ApiError::invalid_input(format!("missing required field '{name}'")))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))
}

fn did_param(query: Result<Query<DidQuery>, QueryRejection>) -> Result<String, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    required(query.did, "did")
}

/// `GET /resolve?did=`
pub async fn resolve_handler(
    State(registry): State<Registry>,
    query: Result<Query<DidQuery>, QueryRejection>,
) -> ApiResult<Resolution> {
    let did = did_param(query)?;
    Ok(Json(registry.resolve(&did).await?))
}

/// `GET /check?did=`
pub async fn check_handler(
    State(registry): State<Registry>,
    query: Result<Query<DidQuery>, QueryRejection>,
) -> ApiResult<CheckResponse> {
    let did = did_param(query)?;
    let exists = registry.check(&did).await?;
    Ok(Json(CheckResponse {
        success: true,
        data: CheckData { exists },
    }))
}

/// `POST /register {metadata}`
pub async fn register_handler(
    State(registry): State<Registry>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Registered> {
    let request = body(payload)?;
    let metadata = required(request.metadata, "metadata")?;
    Ok(Json(registry.register(metadata).await?))
}

/// `PUT /update {did, metadata}`
pub async fn update_handler(
    State(registry): State<Registry>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<Updated> {
    let request = body(payload)?;
    let did = required(request.did, "did")?;
    let metadata = required(request.metadata, "metadata")?;
    Ok(Json(registry.update(&did, metadata).await?))
}

/// `POST /transfer {did, newOwner}`
pub async fn transfer_handler(
    State(registry): State<Registry>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Transferred> {
    let request = body(payload)?;
    let did = required(request.did, "did")?;
    let new_owner = required(request.new_owner, "newOwner")?;
    Ok(Json(registry.transfer(&did, &new_owner).await?))
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
