use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::schema;

/// Current ledger state for one tenant as reported by the billing provider.
///
/// Every numeric field defaults to zero so a partially populated payload still
/// produces a usable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSnapshot {
    #[serde(default, deserialize_with = "schema::amount")]
    pub outstanding_balance: Decimal,
    #[serde(default, deserialize_with = "schema::amount")]
    pub deposit: Decimal,
    #[serde(default, deserialize_with = "schema::amount")]
    pub monthly_rent: Decimal,
    #[serde(default, deserialize_with = "schema::amount")]
    pub utilities: Decimal,
    #[serde(
        default,
        deserialize_with = "schema::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_monthly_cost: Option<Decimal>,
    #[serde(default, deserialize_with = "schema::sequence")]
    pub billing_cycles: Vec<BillingCycle>,
    #[serde(
        default,
        deserialize_with = "schema::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub corrected_outstanding_balance: Option<Decimal>,
}

impl BillingSnapshot {
    /// Reported monthly total, falling back to rent plus utilities when the
    /// provider omits it or reports zero.
    pub fn total_monthly(&self) -> Decimal {
        match self.total_monthly_cost {
            Some(total) if !total.is_zero() => total,
            _ => self.monthly_rent + self.utilities,
        }
    }

    pub fn deposit_already_applied(&self) -> bool {
        self.billing_cycles
            .iter()
            .any(|cycle| cycle.deposit_applied > Decimal::ZERO)
    }

    pub fn latest_cycle(&self) -> Option<&BillingCycle> {
        self.billing_cycles.last()
    }
}

/// One closed billing period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycle {
    #[serde(default, deserialize_with = "schema::text")]
    pub month: String,
    #[serde(default, deserialize_with = "schema::amount")]
    pub previous_balance: Decimal,
    #[serde(default, deserialize_with = "schema::amount")]
    pub deposit_applied: Decimal,
    #[serde(default, deserialize_with = "schema::amount")]
    pub charges: Decimal,
    #[serde(default, deserialize_with = "schema::amount")]
    pub payments_made: Decimal,
    #[serde(default, deserialize_with = "schema::amount")]
    pub final_balance: Decimal,
}
