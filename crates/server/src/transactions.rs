//! Transactions API endpoints

use api_types::transaction::{
    AllocationEntry, SharedWithEntry, SharingInfo, SharingMethod as ApiMethod,
    TransactionKind as ApiKind, TransactionNew, TransactionUpdate, TransactionView,
    TransactionsResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::MoneyCents;

use crate::{
    ServerError,
    accounts::{map_currency, map_currency_api},
    server::ServerState,
};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
    }
}

fn map_kind_api(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
    }
}

fn map_method(method: engine::SharingMethod) -> ApiMethod {
    match method {
        engine::SharingMethod::Equally => ApiMethod::Equally,
        engine::SharingMethod::Shares => ApiMethod::Shares,
        engine::SharingMethod::Amounts => ApiMethod::Amounts,
    }
}

fn map_sharing_api(sharing: SharingInfo) -> engine::SharingDescription {
    engine::SharingDescription {
        method: match sharing.method {
            ApiMethod::Equally => engine::SharingMethod::Equally,
            ApiMethod::Shares => engine::SharingMethod::Shares,
            ApiMethod::Amounts => engine::SharingMethod::Amounts,
        },
        entries: sharing
            .shared_with
            .into_iter()
            .map(|entry| engine::ShareEntry {
                owner_id: entry.id,
                take: entry.take,
            })
            .collect(),
    }
}

fn map_sharing(sharing: &engine::SharingDescription) -> SharingInfo {
    SharingInfo {
        method: map_method(sharing.method),
        shared_with: sharing
            .entries
            .iter()
            .map(|entry| SharedWithEntry {
                id: entry.owner_id,
                take: entry.take,
            })
            .collect(),
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    // A stored description can lack a defined allocation (shares weights
    // summing to zero); expose that as a missing field, not an error.
    let allocation = tx.sharing.allocate(tx.amount).ok().map(|shares| {
        shares
            .into_iter()
            .map(|share| AllocationEntry {
                owner_id: share.owner_id,
                amount_minor: share.amount.cents(),
            })
            .collect()
    });

    TransactionView {
        id: tx.id,
        name: tx.name,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount.cents(),
        currency: map_currency(tx.currency),
        sharing_info: map_sharing(&tx.sharing),
        allocation,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Path(account_uuid): Path<String>,
    Json(payload): Json<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .new_transaction(
            &account_uuid,
            &payload.name,
            map_kind_api(payload.kind),
            MoneyCents::new(payload.amount_minor),
            map_currency_api(payload.currency),
            map_sharing_api(payload.sharing_info),
        )
        .await?;

    Ok(Json(view(tx)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(account_uuid): Path<String>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let txs = state.engine.account_transactions(&account_uuid).await?;
    Ok(Json(TransactionsResponse {
        transactions: txs.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path((account_uuid, id)): Path<(String, i64)>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &account_uuid).await?;
    Ok(Json(view(tx)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((account_uuid, id)): Path<(String, i64)>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(
            id,
            &account_uuid,
            &payload.name,
            map_kind_api(payload.kind),
            MoneyCents::new(payload.amount_minor),
            map_currency_api(payload.currency),
            map_sharing_api(payload.sharing_info),
        )
        .await?;

    Ok(Json(view(tx)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((account_uuid, id)): Path<(String, i64)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, &account_uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
