//! Expense-sharing primitives.
//!
//! A [`SharingDescription`] records how a transaction's total is divided
//! among a subset of the account's owners. Validation is fail-fast and runs
//! in a fixed order so the first reported failure is deterministic:
//!
//! 1. structure (non-empty entry list)
//! 2. field presence keyed by the method
//! 3. owner-id uniqueness
//! 4. owner membership against the account's current roster
//! 5. exact sum reconciliation (`amounts` only)
//!
//! The description is validated wholesale on create and on update; entries
//! are never patched individually. Allocation turns a validated description
//! into concrete per-owner amounts using largest-remainder rounding, so the
//! shares always reconcile exactly to the total.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

/// How a transaction's total is divided among the referenced owners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingMethod {
    /// Every entry receives the same share; `take` must be absent.
    Equally,
    /// `take` is a relative weight; shares are weight-proportional.
    Shares,
    /// `take` is an absolute minor-unit amount; the takes must sum to the
    /// transaction total exactly.
    Amounts,
}

impl SharingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equally => "equally",
            Self::Shares => "shares",
            Self::Amounts => "amounts",
        }
    }
}

impl TryFrom<&str> for SharingMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equally" => Ok(Self::Equally),
            "shares" => Ok(Self::Shares),
            "amounts" => Ok(Self::Amounts),
            other => Err(EngineError::MalformedSharing(format!(
                "invalid sharing method: {other}"
            ))),
        }
    }
}

/// One row of a sharing description.
///
/// `take` semantics depend on the method: absent for `equally`, a relative
/// weight for `shares`, an absolute minor-unit amount for `amounts`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    #[serde(rename = "id")]
    pub owner_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<i64>,
}

/// The method plus per-owner entries describing one transaction's split.
///
/// Serializes to the wire/storage shape
/// `{"method": "...", "shared_with": [{"id": 1, "take": 40}]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingDescription {
    pub method: SharingMethod,
    #[serde(rename = "shared_with")]
    pub entries: Vec<ShareEntry>,
}

/// The concrete amount allocated to one owner, in entry order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerShare {
    pub owner_id: i64,
    pub amount: MoneyCents,
}

impl SharingDescription {
    /// Checks structure, field presence and owner-id uniqueness.
    ///
    /// These checks need no external data and run before the owner roster
    /// is fetched, so a duplicated id is always reported as
    /// [`EngineError::DuplicateOwner`] even when the id is also unknown.
    pub fn check_structure(&self) -> ResultEngine<()> {
        if self.entries.is_empty() {
            return Err(EngineError::MalformedSharing(
                "shared_with must contain at least one entry".to_string(),
            ));
        }

        match self.method {
            SharingMethod::Equally => {
                if self.entries.iter().any(|entry| entry.take.is_some()) {
                    return Err(EngineError::FieldPresenceViolation(
                        "when method is \"equally\", \"take\" must not be provided in shared_with entries"
                            .to_string(),
                    ));
                }
            }
            SharingMethod::Shares | SharingMethod::Amounts => {
                if self.entries.iter().any(|entry| entry.take.is_none()) {
                    return Err(EngineError::FieldPresenceViolation(
                        "when method is not \"equally\", \"take\" must be provided in shared_with entries"
                            .to_string(),
                    ));
                }
            }
        }

        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.owner_id) {
                return Err(EngineError::DuplicateOwner(entry.owner_id));
            }
        }

        Ok(())
    }

    /// Checks that every referenced owner belongs to the account roster.
    pub fn check_owners(&self, owner_ids: &HashSet<i64>) -> ResultEngine<()> {
        for entry in &self.entries {
            if !owner_ids.contains(&entry.owner_id) {
                return Err(EngineError::UnknownOwner(entry.owner_id));
            }
        }
        Ok(())
    }

    /// Checks that `amounts` takes sum to the transaction total, exactly.
    ///
    /// No tolerance: amounts are integer minor units. Methods other than
    /// `amounts` are not reconciled (`shares` weights are free-form).
    pub fn check_total(&self, total: MoneyCents) -> ResultEngine<()> {
        if self.method != SharingMethod::Amounts {
            return Ok(());
        }

        // Widened sum: extreme takes must surface as a mismatch, never wrap.
        let computed: i128 = self
            .entries
            .iter()
            .filter_map(|entry| entry.take)
            .map(i128::from)
            .sum();
        if computed != i128::from(total.cents()) {
            return Err(EngineError::AmountMismatch {
                computed: computed.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
                expected: total.cents(),
            });
        }
        Ok(())
    }

    /// Runs the full validation given the account's current owner roster.
    ///
    /// Fail-fast: the first failing check in the fixed order is returned.
    pub fn validate(&self, total: MoneyCents, owner_ids: &HashSet<i64>) -> ResultEngine<()> {
        self.check_structure()?;
        self.check_owners(owner_ids)?;
        self.check_total(total)
    }

    /// Computes the per-owner allocation of `total` for this description.
    ///
    /// Callers must validate the description first. Shares preserve entry
    /// order and always sum to `total` exactly:
    ///
    /// - `equally`: integer quotient per entry, the remainder distributed
    ///   one minor unit each to the first entries.
    /// - `shares`: weight-proportional, rounded down, with leftover units
    ///   handed out largest-fractional-remainder first (ties broken by
    ///   entry order). Rejects negative weights and non-positive weight
    ///   sums with [`EngineError::InvalidWeight`].
    /// - `amounts`: the `take` values verbatim.
    pub fn allocate(&self, total: MoneyCents) -> ResultEngine<Vec<OwnerShare>> {
        if self.entries.is_empty() {
            return Err(EngineError::MalformedSharing(
                "shared_with must contain at least one entry".to_string(),
            ));
        }

        match self.method {
            SharingMethod::Equally => Ok(self.allocate_equally(total)),
            SharingMethod::Shares => self.allocate_by_weight(total),
            SharingMethod::Amounts => self
                .entries
                .iter()
                .map(|entry| {
                    let take = entry.take.ok_or_else(|| {
                        EngineError::FieldPresenceViolation(
                            "when method is not \"equally\", \"take\" must be provided in shared_with entries"
                                .to_string(),
                        )
                    })?;
                    Ok(OwnerShare {
                        owner_id: entry.owner_id,
                        amount: MoneyCents::new(take),
                    })
                })
                .collect(),
        }
    }

    fn allocate_equally(&self, total: MoneyCents) -> Vec<OwnerShare> {
        let n = self.entries.len() as i64;
        let base = total.cents().div_euclid(n);
        let remainder = total.cents().rem_euclid(n);

        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let extra = i64::from((index as i64) < remainder);
                OwnerShare {
                    owner_id: entry.owner_id,
                    amount: MoneyCents::new(base + extra),
                }
            })
            .collect()
    }

    fn allocate_by_weight(&self, total: MoneyCents) -> ResultEngine<Vec<OwnerShare>> {
        let mut weights = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let weight = entry.take.ok_or_else(|| {
                EngineError::FieldPresenceViolation(
                    "when method is not \"equally\", \"take\" must be provided in shared_with entries"
                        .to_string(),
                )
            })?;
            if weight < 0 {
                return Err(EngineError::InvalidWeight(format!(
                    "owner {} has negative weight {weight}",
                    entry.owner_id
                )));
            }
            weights.push(weight);
        }

        // Weights are unbounded, so the sum accumulates in i128 too.
        let divisor: i128 = weights.iter().copied().map(i128::from).sum();
        if divisor <= 0 {
            return Err(EngineError::InvalidWeight(
                "sum of weights must be positive".to_string(),
            ));
        }

        // Floor each proportional share using 128-bit intermediates, then
        // hand out the leftover minor units largest remainder first. Stable
        // sort keeps entry order for equal remainders.
        let mut shares = Vec::with_capacity(self.entries.len());
        let mut remainders = Vec::with_capacity(self.entries.len());
        let mut assigned: i64 = 0;

        for (index, weight) in weights.iter().enumerate() {
            let numerator = i128::from(total.cents()) * i128::from(*weight);
            let base = numerator.div_euclid(divisor) as i64;
            remainders.push((index, numerator.rem_euclid(divisor)));
            shares.push(base);
            assigned += base;
        }

        let mut leftover = total.cents() - assigned;
        remainders.sort_by(|a, b| b.1.cmp(&a.1));
        for (index, _) in remainders {
            if leftover == 0 {
                break;
            }
            shares[index] += 1;
            leftover -= 1;
        }

        Ok(self
            .entries
            .iter()
            .zip(shares)
            .map(|(entry, amount)| OwnerShare {
                owner_id: entry.owner_id,
                amount: MoneyCents::new(amount),
            })
            .collect())
    }
}
