//! Contracts for the upstream services that own tenant state.
//!
//! Every provider fails independently. The dashboard orchestrator treats only
//! the identity lookup as fatal; the rest are isolated per slice.

use async_trait::async_trait;

use super::billing::BillingSnapshot;
use super::dashboard::domain::{
    AccountId, MaintenanceRequest, Payment, RoomId, RoomInfo, Tenant, TenantId,
};
use super::overdue::{OverdueCheckSummary, OverdueEntry};

/// Error surfaced by any provider call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider request timed out")]
    Timeout,
    #[error("malformed provider payload: {0}")]
    Malformed(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("operation not supported by this provider: {0}")]
    Unsupported(&'static str),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the account exists upstream but has no tenant record.
    async fn tenant_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Tenant>, ProviderError>;
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn billing_info(&self, tenant_id: &TenantId) -> Result<BillingSnapshot, ProviderError>;
}

#[async_trait]
pub trait RoomProvider: Send + Sync {
    async fn room_by_id(&self, room_id: &RoomId) -> Result<RoomInfo, ProviderError>;
}

#[async_trait]
pub trait MaintenanceProvider: Send + Sync {
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<MaintenanceRequest>, ProviderError>;
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Most recent payments first, at most `limit` entries.
    async fn payments_by_tenant(
        &self,
        tenant_id: &TenantId,
        limit: usize,
    ) -> Result<Vec<Payment>, ProviderError>;
}

#[async_trait]
pub trait OverdueProvider: Send + Sync {
    async fn overdue_tenants(&self) -> Result<Vec<OverdueEntry>, ProviderError>;

    /// Asks the upstream service to re-evaluate overdue status and notify tenants.
    async fn check_overdue_payments(&self) -> Result<OverdueCheckSummary, ProviderError>;
}
