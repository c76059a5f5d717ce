use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

pub use accounts::Account;
pub use currency::Currency;
pub use error::EngineError;
pub use money::MoneyCents;
pub use owners::Owner;
pub use sharing::{OwnerShare, ShareEntry, SharingDescription, SharingMethod};
pub use transactions::{Transaction, TransactionKind};

mod accounts;
mod currencies;
mod currency;
mod error;
mod money;
mod owners;
mod sharing;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

/// Facade over the database for accounts, owners and transactions.
///
/// All sharing validation goes through [`Engine::validate_sharing`], which
/// reads the account's owner roster fresh on every call. The engine keeps
/// no in-memory state: owners can be added or removed between requests and
/// a stale cache would validate against the wrong roster.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn account_model(&self, account_uuid: &str) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_uuid.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(account_uuid.to_string()))
    }

    // ── Accounts ────────────────────────────────────────────────────────

    /// Create a new account with a server-generated UUID.
    pub async fn new_account(
        &self,
        name: &str,
        default_currency: Option<Currency>,
    ) -> ResultEngine<Account> {
        let account = Account::new(
            name.to_string(),
            default_currency.unwrap_or_default(),
            Utc::now(),
        );
        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        Ok(account)
    }

    /// Return an account by UUID.
    pub async fn account(&self, account_uuid: &str) -> ResultEngine<Account> {
        Account::try_from(self.account_model(account_uuid).await?)
    }

    /// Rename an account and/or change its default currency.
    pub async fn update_account(
        &self,
        account_uuid: &str,
        name: Option<&str>,
        default_currency: Option<Currency>,
    ) -> ResultEngine<Account> {
        let model = self.account_model(account_uuid).await?;

        let mut active = accounts::ActiveModel {
            uuid: ActiveValue::Set(model.uuid.clone()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = name {
            active.name = ActiveValue::Set(name.to_string());
        }
        if let Some(currency) = default_currency {
            active.default_currency = ActiveValue::Set(currency.code().to_string());
        }
        active.update(&self.database).await?;

        self.account(account_uuid).await
    }

    /// Delete an account. Owners and transactions cascade.
    pub async fn delete_account(&self, account_uuid: &str) -> ResultEngine<()> {
        let model = self.account_model(account_uuid).await?;
        model.delete(&self.database).await?;
        Ok(())
    }

    // ── Owners ──────────────────────────────────────────────────────────

    /// Add an owner to an account. Names are unique per account.
    pub async fn new_owner(&self, account_uuid: &str, name: &str) -> ResultEngine<Owner> {
        self.account_model(account_uuid).await?;

        let existing = owners::Entity::find()
            .filter(owners::Column::AccountUuid.eq(account_uuid.to_string()))
            .filter(owners::Column::Name.eq(name.to_string()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }

        let now = Utc::now();
        let model = owners::ActiveModel {
            id: ActiveValue::NotSet,
            account_uuid: ActiveValue::Set(account_uuid.to_string()),
            name: ActiveValue::Set(name.to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await?;

        Ok(Owner::from(model))
    }

    /// Return one owner of an account.
    pub async fn owner(&self, id: i64, account_uuid: &str) -> ResultEngine<Owner> {
        let model = owners::Entity::find_by_id(id)
            .filter(owners::Column::AccountUuid.eq(account_uuid.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("owner not exists".to_string()))?;
        Ok(Owner::from(model))
    }

    /// List the owners of an account, oldest first.
    pub async fn account_owners(&self, account_uuid: &str) -> ResultEngine<Vec<Owner>> {
        self.account_model(account_uuid).await?;

        let models = owners::Entity::find()
            .filter(owners::Column::AccountUuid.eq(account_uuid.to_string()))
            .order_by_asc(owners::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Owner::from).collect())
    }

    /// Rename an owner.
    pub async fn update_owner(
        &self,
        id: i64,
        account_uuid: &str,
        name: &str,
    ) -> ResultEngine<Owner> {
        // Lookup first so a missing owner beats a name conflict.
        self.owner(id, account_uuid).await?;

        let conflict = owners::Entity::find()
            .filter(owners::Column::AccountUuid.eq(account_uuid.to_string()))
            .filter(owners::Column::Name.eq(name.to_string()))
            .filter(owners::Column::Id.ne(id))
            .one(&self.database)
            .await?;
        if conflict.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }

        owners::ActiveModel {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set(name.to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.database)
        .await?;

        self.owner(id, account_uuid).await
    }

    /// Remove an owner from an account.
    ///
    /// Existing transactions keep their stored sharing descriptions; only
    /// future validations see the shrunken roster.
    pub async fn delete_owner(&self, id: i64, account_uuid: &str) -> ResultEngine<()> {
        let model = owners::Entity::find_by_id(id)
            .filter(owners::Column::AccountUuid.eq(account_uuid.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("owner not exists".to_string()))?;
        model.delete(&self.database).await?;
        Ok(())
    }

    // ── Owner directory ─────────────────────────────────────────────────

    /// Return the current set of owner ids of an account.
    ///
    /// This is the validator's only data dependency. The read is fresh on
    /// every call; results are never cached across validations.
    pub async fn fetch_owner_ids(&self, account_uuid: &str) -> ResultEngine<HashSet<i64>> {
        self.account_model(account_uuid).await?;

        let models = owners::Entity::find()
            .filter(owners::Column::AccountUuid.eq(account_uuid.to_string()))
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(|owner| owner.id).collect())
    }

    // ── Sharing ─────────────────────────────────────────────────────────

    /// Validate a sharing description against the account's current roster.
    ///
    /// Fail-fast, in order: structure, field presence, uniqueness, owner
    /// membership (one roster read; [`EngineError::AccountNotFound`] if the
    /// account is missing), then exact sum reconciliation for `amounts`.
    ///
    /// The checks that need no external data run before the roster read, so
    /// a malformed description is reported without touching the database.
    pub async fn validate_sharing(
        &self,
        account_uuid: &str,
        amount: MoneyCents,
        sharing: &SharingDescription,
    ) -> ResultEngine<()> {
        sharing.check_structure()?;
        let owner_ids = self.fetch_owner_ids(account_uuid).await?;
        sharing.check_owners(&owner_ids)?;
        sharing.check_total(amount)
    }

    // ── Transactions ────────────────────────────────────────────────────

    /// Create a transaction after validating its sharing description.
    ///
    /// Between this validation and the insert an owner could be removed
    /// concurrently; the insert does not re-verify membership.
    pub async fn new_transaction(
        &self,
        account_uuid: &str,
        name: &str,
        kind: TransactionKind,
        amount: MoneyCents,
        currency: Currency,
        sharing: SharingDescription,
    ) -> ResultEngine<Transaction> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        self.currency_row(currency).await?;
        self.validate_sharing(account_uuid, amount, &sharing).await?;

        let model = transactions::insert_model(
            account_uuid,
            name,
            kind,
            amount,
            currency,
            &sharing,
            Utc::now(),
        )?
        .insert(&self.database)
        .await?;

        Transaction::try_from(model)
    }

    /// Return one transaction of an account.
    pub async fn transaction(&self, id: i64, account_uuid: &str) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(id)
            .filter(transactions::Column::AccountUuid.eq(account_uuid.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// List the transactions of an account, newest first.
    pub async fn account_transactions(&self, account_uuid: &str) -> ResultEngine<Vec<Transaction>> {
        self.account_model(account_uuid).await?;

        let models = transactions::Entity::find()
            .filter(transactions::Column::AccountUuid.eq(account_uuid.to_string()))
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Update a transaction, replacing its sharing description wholesale.
    ///
    /// The new description is re-validated against the account's current
    /// roster before anything is written.
    pub async fn update_transaction(
        &self,
        id: i64,
        account_uuid: &str,
        name: &str,
        kind: TransactionKind,
        amount: MoneyCents,
        currency: Currency,
        sharing: SharingDescription,
    ) -> ResultEngine<Transaction> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        self.transaction(id, account_uuid).await?;
        self.currency_row(currency).await?;
        self.validate_sharing(account_uuid, amount, &sharing).await?;

        transactions::ActiveModel {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set(name.to_string()),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(amount.cents()),
            currency: ActiveValue::Set(currency.code().to_string()),
            sharing_info: ActiveValue::Set(transactions::encode_sharing(&sharing)?),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.database)
        .await?;

        self.transaction(id, account_uuid).await
    }

    /// Delete a transaction.
    pub async fn delete_transaction(&self, id: i64, account_uuid: &str) -> ResultEngine<()> {
        let model = transactions::Entity::find_by_id(id)
            .filter(transactions::Column::AccountUuid.eq(account_uuid.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        model.delete(&self.database).await?;
        Ok(())
    }

    async fn currency_row(&self, currency: Currency) -> ResultEngine<currencies::Model> {
        currencies::Entity::find_by_id(currency.code().to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(currency.code().to_string()))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
