use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Cad,
    Usd,
    Eur,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub default_currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub default_currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        /// Account UUID, serialized as a string in JSON.
        pub account_uuid: String,
        pub name: String,
        pub default_currency: Currency,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod owner {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerView {
        pub id: i64,
        pub name: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnersResponse {
        pub owners: Vec<OwnerView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        #[default]
        Expense,
        Income,
        Transfer,
    }

    /// Method to share the transaction between owners.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SharingMethod {
        Equally,
        Shares,
        Amounts,
    }

    /// One shared_with row: the owner id plus the method-dependent `take`
    /// (absent for `equally`, a weight for `shares`, minor units for
    /// `amounts`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SharedWithEntry {
        pub id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub take: Option<i64>,
    }

    /// Details about how the transaction is shared.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SharingInfo {
        pub method: SharingMethod,
        pub shared_with: Vec<SharedWithEntry>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub name: String,
        #[serde(default)]
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub currency: Currency,
        pub sharing_info: SharingInfo,
    }

    /// Full replacement of a transaction, including its sharing
    /// description; entries are never patched individually.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub name: String,
        #[serde(default)]
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub currency: Currency,
        pub sharing_info: SharingInfo,
    }

    /// Computed share of one owner, in entry order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationEntry {
        pub owner_id: i64,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub name: String,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub currency: Currency,
        pub sharing_info: SharingInfo,
        /// Per-owner allocation implied by the sharing description.
        ///
        /// `None` when the stored description has no defined allocation
        /// (e.g. `shares` weights summing to zero).
        pub allocation: Option<Vec<AllocationEntry>>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<TransactionView>,
    }
}
