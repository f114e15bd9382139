//! Billing snapshots and the displayed-balance correction for unposted deposits.

mod reconcile;
mod snapshot;

pub use reconcile::{corrected_balance, reconcile, BalanceReconciler, BalanceSource, Reconciliation};
pub use snapshot::{BillingCycle, BillingSnapshot};
