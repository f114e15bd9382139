use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use super::snapshot::BillingSnapshot;
use crate::telemetry::{DiagnosticEvent, DiagnosticSink};
use crate::workflows::dashboard::domain::TenantId;

/// Where the displayed balance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    NoSnapshot,
    Upstream,
    DepositCredit,
    Unadjusted,
}

impl BalanceSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoSnapshot => "No billing data",
            Self::Upstream => "Ledger corrected balance",
            Self::DepositCredit => "Deposit credit pending posting",
            Self::Unadjusted => "Ledger balance",
        }
    }
}

/// Displayed balance plus the inputs that explain it.
///
/// `corrected` always lies in `[0, outstanding]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub outstanding: Decimal,
    pub corrected: Decimal,
    pub deposit_credit: Decimal,
    pub source: BalanceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_reported: Option<Decimal>,
}

impl Reconciliation {
    fn unadjusted(outstanding: Decimal) -> Self {
        Self {
            outstanding,
            corrected: outstanding,
            deposit_credit: Decimal::ZERO,
            source: BalanceSource::Unadjusted,
            upstream_reported: None,
        }
    }

    /// True when the ledger's own corrected figure fell outside `[0, outstanding]`.
    pub fn upstream_clamped(&self) -> bool {
        self.upstream_reported
            .is_some_and(|reported| reported != self.corrected)
    }
}

/// Balance to display for a snapshot. Never fails; missing data yields zero.
pub fn corrected_balance(snapshot: Option<&BillingSnapshot>) -> Decimal {
    reconcile(snapshot).corrected
}

pub fn reconcile(snapshot: Option<&BillingSnapshot>) -> Reconciliation {
    let Some(snapshot) = snapshot else {
        return Reconciliation {
            source: BalanceSource::NoSnapshot,
            ..Reconciliation::unadjusted(Decimal::ZERO)
        };
    };

    let outstanding = snapshot.outstanding_balance.max(Decimal::ZERO);

    if let Some(reported) = snapshot.corrected_outstanding_balance {
        return Reconciliation {
            corrected: reported.clamp(Decimal::ZERO, outstanding),
            source: BalanceSource::Upstream,
            upstream_reported: Some(reported),
            ..Reconciliation::unadjusted(outstanding)
        };
    }

    let deposit = snapshot.deposit;
    let total_monthly = snapshot.total_monthly();

    if snapshot.deposit_already_applied()
        || deposit <= Decimal::ZERO
        || total_monthly <= Decimal::ZERO
    {
        return Reconciliation::unadjusted(outstanding);
    }

    // The deposit never covers more than one month of charges.
    let credit = deposit.min(total_monthly);
    Reconciliation {
        corrected: (outstanding - credit).max(Decimal::ZERO),
        deposit_credit: credit,
        source: BalanceSource::DepositCredit,
        ..Reconciliation::unadjusted(outstanding)
    }
}

/// Reconciliation with diagnostics routed to the injected sink.
#[derive(Clone)]
pub struct BalanceReconciler {
    sink: Arc<dyn DiagnosticSink>,
}

impl BalanceReconciler {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    pub fn reconcile(
        &self,
        tenant_id: &TenantId,
        snapshot: Option<&BillingSnapshot>,
    ) -> Reconciliation {
        let outcome = reconcile(snapshot);

        match outcome.source {
            BalanceSource::DepositCredit => {
                self.sink.record(DiagnosticEvent::DepositCreditApplied {
                    tenant_id: tenant_id.clone(),
                    credit: outcome.deposit_credit,
                    corrected: outcome.corrected,
                });
            }
            BalanceSource::Upstream if outcome.upstream_clamped() => {
                self.sink.record(DiagnosticEvent::UpstreamBalanceClamped {
                    tenant_id: tenant_id.clone(),
                    reported: outcome.upstream_reported.unwrap_or_default(),
                    corrected: outcome.corrected,
                });
            }
            _ => {}
        }

        outcome
    }
}
