//! Transaction entity.
//!
//! A transaction carries its total in minor units and the sharing
//! description that divides it among the account's owners. The description
//! is persisted as a JSON column and replaced wholesale on update.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, MoneyCents, SharingDescription};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::KeyNotFound(format!(
                "transaction kind {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_uuid: String,
    pub name: String,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub currency: Currency,
    pub sharing: SharingDescription,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub account_uuid: String,
    pub name: String,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub sharing_info: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountUuid",
        to = "super::accounts::Column::Uuid",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Serializes a sharing description for the JSON column.
pub(crate) fn encode_sharing(sharing: &SharingDescription) -> Result<String, EngineError> {
    serde_json::to_string(sharing)
        .map_err(|err| EngineError::MalformedSharing(format!("invalid shared_with format: {err}")))
}

/// Builds the active model for inserting a new transaction row.
///
/// The id column stays unset so the database assigns it.
pub(crate) fn insert_model(
    account_uuid: &str,
    name: &str,
    kind: TransactionKind,
    amount: MoneyCents,
    currency: Currency,
    sharing: &SharingDescription,
    now: DateTime<Utc>,
) -> Result<ActiveModel, EngineError> {
    Ok(ActiveModel {
        id: ActiveValue::NotSet,
        account_uuid: ActiveValue::Set(account_uuid.to_string()),
        name: ActiveValue::Set(name.to_string()),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        amount_minor: ActiveValue::Set(amount.cents()),
        currency: ActiveValue::Set(currency.code().to_string()),
        sharing_info: ActiveValue::Set(encode_sharing(sharing)?),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    })
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let sharing: SharingDescription =
            serde_json::from_str(&model.sharing_info).map_err(|err| {
                EngineError::MalformedSharing(format!("invalid shared_with format: {err}"))
            })?;

        Ok(Self {
            id: model.id,
            account_uuid: model.account_uuid,
            name: model.name,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            sharing,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
