//! Owners API endpoints

use api_types::owner::{OwnerNew, OwnerUpdate, OwnerView, OwnersResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

fn view(owner: engine::Owner) -> OwnerView {
    OwnerView {
        id: owner.id,
        name: owner.name,
        created_at: owner.created_at,
        updated_at: owner.updated_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Path(account_uuid): Path<String>,
    Json(payload): Json<OwnerNew>,
) -> Result<Json<OwnerView>, ServerError> {
    let owner = state.engine.new_owner(&account_uuid, &payload.name).await?;
    Ok(Json(view(owner)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(account_uuid): Path<String>,
) -> Result<Json<OwnersResponse>, ServerError> {
    let owners = state.engine.account_owners(&account_uuid).await?;
    Ok(Json(OwnersResponse {
        owners: owners.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path((account_uuid, id)): Path<(String, i64)>,
) -> Result<Json<OwnerView>, ServerError> {
    let owner = state.engine.owner(id, &account_uuid).await?;
    Ok(Json(view(owner)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((account_uuid, id)): Path<(String, i64)>,
    Json(payload): Json<OwnerUpdate>,
) -> Result<Json<OwnerView>, ServerError> {
    let owner = state
        .engine
        .update_owner(id, &account_uuid, &payload.name)
        .await?;
    Ok(Json(view(owner)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((account_uuid, id)): Path<(String, i64)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_owner(id, &account_uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
