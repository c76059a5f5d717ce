//! Accounts API endpoints

use api_types::account::{AccountNew, AccountUpdate, AccountView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Cad => api_types::Currency::Cad,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Eur => api_types::Currency::Eur,
    }
}

pub fn map_currency_api(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Cad => engine::Currency::Cad,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Eur => engine::Currency::Eur,
    }
}

fn view(account: engine::Account) -> AccountView {
    AccountView {
        account_uuid: account.uuid,
        name: account.name,
        default_currency: map_currency(account.default_currency),
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

/// Handle requests for creating a new account.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .new_account(
            &payload.name,
            payload.default_currency.map(map_currency_api),
        )
        .await?;

    Ok(Json(view(account)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(account_uuid): Path<String>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(&account_uuid).await?;
    Ok(Json(view(account)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(account_uuid): Path<String>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    if payload.name.is_none() && payload.default_currency.is_none() {
        return Err(ServerError::Generic(
            "name or default_currency required".to_string(),
        ));
    }

    let account = state
        .engine
        .update_account(
            &account_uuid,
            payload.name.as_deref(),
            payload.default_currency.map(map_currency_api),
        )
        .await?;

    Ok(Json(view(account)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(account_uuid): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(&account_uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
