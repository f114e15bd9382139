use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;

use super::domain::{AccountId, MaintenanceRequest, Payment, RoomInfo, Tenant, TenantId};
use super::fanout::{Isolation, Settled, Slice};
use crate::config::DashboardConfig;
use crate::telemetry::{DiagnosticEvent, DiagnosticSink, TracingSink};
use crate::workflows::billing::{BalanceReconciler, BillingSnapshot, Reconciliation};
use crate::workflows::providers::{
    BillingProvider, IdentityProvider, MaintenanceProvider, PaymentProvider, ProviderError,
    RoomProvider,
};

/// Upstream services feeding the tenant dashboard.
#[derive(Clone)]
pub struct DashboardProviders {
    pub identity: Arc<dyn IdentityProvider>,
    pub billing: Arc<dyn BillingProvider>,
    pub rooms: Arc<dyn RoomProvider>,
    pub maintenance: Arc<dyn MaintenanceProvider>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl DashboardProviders {
    /// Wires every slice to one backend that serves all of them.
    pub fn from_shared<P>(provider: Arc<P>) -> Self
    where
        P: IdentityProvider
            + BillingProvider
            + RoomProvider
            + MaintenanceProvider
            + PaymentProvider
            + 'static,
    {
        Self {
            identity: provider.clone(),
            billing: provider.clone(),
            rooms: provider.clone(),
            maintenance: provider.clone(),
            payments: provider,
        }
    }
}

/// Per-slice failure flags for the composite view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SliceErrors {
    pub billing: bool,
    pub room: bool,
    pub maintenance: bool,
}

impl SliceErrors {
    pub fn any(&self) -> bool {
        self.billing || self.room || self.maintenance
    }

    pub fn failed_slices(&self) -> Vec<Slice> {
        [
            (Slice::Billing, self.billing),
            (Slice::Room, self.room),
            (Slice::Maintenance, self.maintenance),
        ]
        .into_iter()
        .filter_map(|(slice, failed)| failed.then_some(slice))
        .collect()
    }
}

/// Everything the tenant dashboard renders, with defaults standing in for failed slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantDashboard {
    pub tenant: Tenant,
    pub billing: BillingSnapshot,
    pub balance: Reconciliation,
    pub room: Option<RoomInfo>,
    pub maintenance_requests: Vec<MaintenanceRequest>,
    pub errors: SliceErrors,
    pub fetched_at: DateTime<Utc>,
}

impl TenantDashboard {
    pub fn corrected_balance(&self) -> Decimal {
        self.balance.corrected
    }

    pub fn open_maintenance_requests(&self) -> usize {
        self.maintenance_requests
            .iter()
            .filter(|request| request.status.is_open())
            .count()
    }
}

/// Fatal dashboard failure: there is no tenant to aggregate around.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("unable to load tenant for account {account_id}")]
    TenantLookup {
        account_id: AccountId,
        #[source]
        source: ProviderError,
    },
    #[error("no tenant is linked to account {account_id}")]
    TenantNotFound { account_id: AccountId },
}

impl DashboardError {
    /// Human-readable summary suitable for a banner.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Raw diagnostic detail from the failing provider.
    pub fn detail(&self) -> String {
        match self {
            DashboardError::TenantLookup { source, .. } => source.to_string(),
            DashboardError::TenantNotFound { .. } => {
                "identity provider returned no tenant record".to_string()
            }
        }
    }
}

/// Orchestrates the tenant lookup and the isolated slice fan-out.
pub struct TenantDashboardService {
    providers: DashboardProviders,
    reconciler: BalanceReconciler,
    sink: Arc<dyn DiagnosticSink>,
    payment_limit: usize,
    loading: watch::Sender<bool>,
    in_flight: Mutex<usize>,
}

impl TenantDashboardService {
    pub fn new(providers: DashboardProviders, config: &DashboardConfig) -> Self {
        Self::with_sink(providers, config, Arc::new(TracingSink))
    }

    pub fn with_sink(
        providers: DashboardProviders,
        config: &DashboardConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let (loading, _) = watch::channel(false);

        Self {
            providers,
            reconciler: BalanceReconciler::new(sink.clone()),
            sink,
            payment_limit: config.payment_history_limit,
            loading,
            in_flight: Mutex::new(0),
        }
    }

    /// Loading state: `true` while at least one load is in flight.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Counter and published flag change under one lock so overlapping loads
    /// never publish a stale value.
    fn update_in_flight(&self, change: impl FnOnce(&mut usize)) {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        change(&mut count);
        self.loading.send_replace(*count > 0);
    }

    /// Resolve the tenant, then fetch billing, room, and maintenance concurrently.
    ///
    /// Only the tenant lookup can fail the call. Slice failures are reported in
    /// `TenantDashboard::errors` with default values in place of the data.
    pub async fn load(&self, account_id: &AccountId) -> Result<TenantDashboard, DashboardError> {
        let _loading = LoadingGuard::begin(self);
        self.sink.record(DiagnosticEvent::LoadStarted {
            account_id: account_id.clone(),
        });

        let tenant = self.resolve_tenant(account_id).await?;
        let isolation = Isolation::new(&tenant.id, self.sink.as_ref());

        let room_lookup = async {
            match &tenant.room_id {
                Some(room_id) => self.providers.rooms.room_by_id(room_id).await.map(Some),
                None => Ok(None),
            }
        };

        let (billing, room, maintenance) = tokio::join!(
            isolation.isolate(
                Slice::Billing,
                self.providers.billing.billing_info(&tenant.id)
            ),
            isolation.isolate(Slice::Room, room_lookup),
            isolation.isolate(
                Slice::Maintenance,
                self.providers.maintenance.list_by_tenant(&tenant.id)
            ),
        );

        let errors = SliceErrors {
            billing: billing.failed,
            room: room.failed,
            maintenance: maintenance.failed,
        };
        let balance = self
            .reconciler
            .reconcile(&tenant.id, (!billing.failed).then_some(&billing.value));

        self.sink.record(DiagnosticEvent::LoadFinished {
            tenant_id: tenant.id.clone(),
            failed: errors.failed_slices(),
        });

        Ok(TenantDashboard {
            tenant,
            billing: billing.value,
            balance,
            room: room.value,
            maintenance_requests: maintenance.value,
            errors,
            fetched_at: Utc::now(),
        })
    }

    /// Most recent payments, newest first. Failure yields an empty, flagged history.
    pub async fn recent_payments(
        &self,
        tenant_id: &TenantId,
        limit: Option<usize>,
    ) -> Settled<Vec<Payment>> {
        let limit = limit.unwrap_or(self.payment_limit);
        if limit == 0 {
            return Settled::ok(Vec::new());
        }

        let isolation = Isolation::new(tenant_id, self.sink.as_ref());
        let mut history = isolation
            .isolate(
                Slice::Payments,
                self.providers.payments.payments_by_tenant(tenant_id, limit),
            )
            .await;

        history
            .value
            .sort_by(|left, right| right.paid_on.cmp(&left.paid_on));
        history.value.truncate(limit);
        history
    }

    async fn resolve_tenant(&self, account_id: &AccountId) -> Result<Tenant, DashboardError> {
        match self.providers.identity.tenant_by_account_id(account_id).await {
            Ok(Some(tenant)) => Ok(tenant),
            Ok(None) => {
                self.sink.record(DiagnosticEvent::TenantMissing {
                    account_id: account_id.clone(),
                });
                Err(DashboardError::TenantNotFound {
                    account_id: account_id.clone(),
                })
            }
            Err(source) => {
                self.sink.record(DiagnosticEvent::TenantLookupFailed {
                    account_id: account_id.clone(),
                    error: source.to_string(),
                });
                Err(DashboardError::TenantLookup {
                    account_id: account_id.clone(),
                    source,
                })
            }
        }
    }
}

struct LoadingGuard<'a> {
    service: &'a TenantDashboardService,
}

impl<'a> LoadingGuard<'a> {
    fn begin(service: &'a TenantDashboardService) -> Self {
        service.update_in_flight(|count| *count += 1);
        Self { service }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.service.update_in_flight(|count| *count -= 1);
    }
}
