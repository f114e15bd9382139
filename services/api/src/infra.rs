use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tenant_ledger::error::AppError;
use tenant_ledger::workflows::billing::BillingSnapshot;
use tenant_ledger::workflows::dashboard::domain::{
    AccountId, MaintenanceRequest, Payment, RoomId, RoomInfo, Tenant, TenantId,
};
use tenant_ledger::workflows::dashboard::TenantDashboardService;
use tenant_ledger::workflows::overdue::{OverdueCheckSummary, OverdueEntry, OverdueService};
use tenant_ledger::workflows::providers::{
    BillingProvider, IdentityProvider, MaintenanceProvider, OverdueProvider, PaymentProvider,
    ProviderError, RoomProvider,
};

const DEMO_DIRECTORY: &str = include_str!("../fixtures/demo_directory.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) dashboard: Arc<TenantDashboardService>,
    pub(crate) overdue: Arc<OverdueService>,
}

/// Upstream source a fixture can mark as failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FixtureSource {
    Identity,
    Billing,
    Room,
    Maintenance,
    Payments,
    Overdue,
}

/// Snapshot of every upstream service, loaded from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DirectoryFixture {
    pub(crate) tenants: HashMap<AccountId, Tenant>,
    pub(crate) billing: HashMap<TenantId, BillingSnapshot>,
    pub(crate) rooms: HashMap<RoomId, RoomInfo>,
    pub(crate) maintenance: HashMap<TenantId, Vec<MaintenanceRequest>>,
    pub(crate) payments: HashMap<TenantId, Vec<Payment>>,
    pub(crate) overdue: Vec<OverdueEntry>,
    pub(crate) unavailable: Vec<FixtureSource>,
}

impl DirectoryFixture {
    pub(crate) fn demo() -> Result<Self, AppError> {
        Ok(serde_json::from_str(DEMO_DIRECTORY)?)
    }

    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OverdueNotification {
    pub(crate) tenant_id: TenantId,
    pub(crate) email: String,
    pub(crate) days_overdue: u32,
    pub(crate) outstanding_balance: Decimal,
}

/// Serves every provider trait from a [`DirectoryFixture`].
#[derive(Clone)]
pub(crate) struct InMemoryDirectory {
    fixture: Arc<DirectoryFixture>,
    notifications: Arc<Mutex<Vec<OverdueNotification>>>,
}

impl InMemoryDirectory {
    pub(crate) fn new(fixture: DirectoryFixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
            notifications: Arc::default(),
        }
    }

    /// Fixture file when given, else the bundled demo directory.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let fixture = match path {
            Some(path) => DirectoryFixture::from_path(path)?,
            None => DirectoryFixture::demo()?,
        };
        Ok(Self::new(fixture))
    }

    pub(crate) fn accounts(&self) -> Vec<AccountId> {
        let mut accounts: Vec<AccountId> = self.fixture.tenants.keys().cloned().collect();
        accounts.sort();
        accounts
    }

    pub(crate) fn notifications(&self) -> Vec<OverdueNotification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn available(&self, source: FixtureSource) -> Result<(), ProviderError> {
        if self.fixture.unavailable.contains(&source) {
            return Err(ProviderError::Unavailable(format!(
                "{source:?} service is marked unavailable"
            )));
        }
        Ok(())
    }

    fn sweep(&self, today: NaiveDate) -> OverdueCheckSummary {
        let notices: Vec<OverdueNotification> = self
            .fixture
            .overdue
            .iter()
            .filter_map(|entry| {
                let days_overdue = entry.days_overdue_on(today);
                (days_overdue > 0).then(|| OverdueNotification {
                    tenant_id: entry.tenant_id.clone(),
                    email: entry.email.clone(),
                    days_overdue,
                    outstanding_balance: entry.outstanding_balance,
                })
            })
            .collect();

        let overdue = notices.len() as u64;
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(notices);

        OverdueCheckSummary {
            checked: self.fixture.overdue.len() as u64,
            overdue,
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryDirectory {
    async fn tenant_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Tenant>, ProviderError> {
        self.available(FixtureSource::Identity)?;
        Ok(self.fixture.tenants.get(account_id).cloned())
    }
}

#[async_trait]
impl BillingProvider for InMemoryDirectory {
    async fn billing_info(&self, tenant_id: &TenantId) -> Result<BillingSnapshot, ProviderError> {
        self.available(FixtureSource::Billing)?;
        self.fixture
            .billing
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("billing for tenant {tenant_id}")))
    }
}

#[async_trait]
impl RoomProvider for InMemoryDirectory {
    async fn room_by_id(&self, room_id: &RoomId) -> Result<RoomInfo, ProviderError> {
        self.available(FixtureSource::Room)?;
        self.fixture
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("room {room_id}")))
    }
}

#[async_trait]
impl MaintenanceProvider for InMemoryDirectory {
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<MaintenanceRequest>, ProviderError> {
        self.available(FixtureSource::Maintenance)?;
        Ok(self
            .fixture
            .maintenance
            .get(tenant_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl PaymentProvider for InMemoryDirectory {
    async fn payments_by_tenant(
        &self,
        tenant_id: &TenantId,
        limit: usize,
    ) -> Result<Vec<Payment>, ProviderError> {
        self.available(FixtureSource::Payments)?;
        let mut payments = self
            .fixture
            .payments
            .get(tenant_id)
            .cloned()
            .unwrap_or_default();
        payments.sort_by(|left, right| right.paid_on.cmp(&left.paid_on));
        payments.truncate(limit);
        Ok(payments)
    }
}

#[async_trait]
impl OverdueProvider for InMemoryDirectory {
    async fn overdue_tenants(&self) -> Result<Vec<OverdueEntry>, ProviderError> {
        self.available(FixtureSource::Overdue)?;
        Ok(self.fixture.overdue.clone())
    }

    async fn check_overdue_payments(&self) -> Result<OverdueCheckSummary, ProviderError> {
        self.available(FixtureSource::Overdue)?;
        Ok(self.sweep(Local::now().date_naive()))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_directory_parses() {
        let fixture = DirectoryFixture::demo().expect("bundled fixture parses");
        assert_eq!(fixture.tenants.len(), 3);
        assert_eq!(fixture.overdue.len(), 4);

        let ines = &fixture.tenants[&AccountId("acct-ines".to_string())];
        assert_eq!(ines.room_id, None);
    }

    #[tokio::test]
    async fn check_notifies_each_overdue_tenant_once_per_sweep() {
        let fixture: DirectoryFixture = serde_json::from_value(serde_json::json!({
            "overdue": [
                { "tenantId": "t-1", "email": "a@example.com", "daysOverdue": 12 },
                { "tenantId": "t-2", "email": "b@example.com", "daysOverdue": 0 },
                { "tenantId": "t-3", "email": "c@example.com", "daysOverdue": -3 }
            ]
        }))
        .expect("fixture parses");
        let directory = InMemoryDirectory::new(fixture);

        let summary = directory
            .check_overdue_payments()
            .await
            .expect("check runs");

        assert_eq!(summary, OverdueCheckSummary { checked: 3, overdue: 1 });
        let notices = directory.notifications();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].tenant_id, TenantId("t-1".to_string()));
        assert_eq!(notices[0].days_overdue, 12);
    }

    #[tokio::test]
    async fn unavailable_sources_fail() {
        let directory = InMemoryDirectory::new(DirectoryFixture {
            unavailable: vec![FixtureSource::Billing],
            ..DirectoryFixture::default()
        });

        let outcome = directory.billing_info(&TenantId("t-1".to_string())).await;
        assert!(matches!(outcome, Err(ProviderError::Unavailable(_))));
        assert!(directory
            .list_by_tenant(&TenantId("t-1".to_string()))
            .await
            .expect("maintenance available")
            .is_empty());
    }

    #[tokio::test]
    async fn payments_are_returned_newest_first() {
        let directory = InMemoryDirectory::load(None).expect("demo loads");

        let payments = directory
            .payments_by_tenant(&TenantId("t-200".to_string()), 2)
            .await
            .expect("payments load");

        let ids: Vec<&str> = payments.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-9100", "p-9087"]);
    }
}
