use crate::config::TelemetryConfig;
use crate::workflows::dashboard::domain::{AccountId, TenantId};
use crate::workflows::dashboard::Slice;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
                value: config.log_level.clone(),
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// Structured events emitted by the dashboard, billing, and overdue components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    LoadStarted {
        account_id: AccountId,
    },
    TenantLookupFailed {
        account_id: AccountId,
        error: String,
    },
    TenantMissing {
        account_id: AccountId,
    },
    SliceFailed {
        tenant_id: TenantId,
        slice: Slice,
        error: String,
    },
    LoadFinished {
        tenant_id: TenantId,
        failed: Vec<Slice>,
    },
    DepositCreditApplied {
        tenant_id: TenantId,
        credit: Decimal,
        corrected: Decimal,
    },
    UpstreamBalanceClamped {
        tenant_id: TenantId,
        reported: Decimal,
        corrected: Decimal,
    },
    RosterClassified {
        total: usize,
        critical: usize,
    },
    RosterFetchFailed {
        error: String,
    },
    OverdueCheckCompleted {
        checked: u64,
        overdue: u64,
    },
}

/// Destination for component diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Forwards diagnostics to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::LoadStarted { account_id } => {
                tracing::debug!(%account_id, "tenant dashboard load started");
            }
            DiagnosticEvent::TenantLookupFailed { account_id, error } => {
                tracing::error!(%account_id, %error, "tenant identity lookup failed");
            }
            DiagnosticEvent::TenantMissing { account_id } => {
                tracing::warn!(%account_id, "no tenant linked to account");
            }
            DiagnosticEvent::SliceFailed {
                tenant_id,
                slice,
                error,
            } => {
                tracing::warn!(%tenant_id, slice = slice.label(), %error, "dashboard slice defaulted");
            }
            DiagnosticEvent::LoadFinished { tenant_id, failed } => {
                let failed: Vec<&str> = failed.iter().map(|slice| slice.label()).collect();
                tracing::info!(%tenant_id, ?failed, "tenant dashboard assembled");
            }
            DiagnosticEvent::DepositCreditApplied {
                tenant_id,
                credit,
                corrected,
            } => {
                tracing::debug!(%tenant_id, %credit, %corrected, "unposted deposit credited");
            }
            DiagnosticEvent::UpstreamBalanceClamped {
                tenant_id,
                reported,
                corrected,
            } => {
                tracing::warn!(%tenant_id, %reported, %corrected, "ledger corrected balance out of range");
            }
            DiagnosticEvent::RosterClassified { total, critical } => {
                tracing::info!(total, critical, "overdue roster classified");
            }
            DiagnosticEvent::RosterFetchFailed { error } => {
                tracing::error!(%error, "overdue roster unavailable");
            }
            DiagnosticEvent::OverdueCheckCompleted { checked, overdue } => {
                tracing::info!(checked, overdue, "overdue check dispatched");
            }
        }
    }
}

/// Keeps every event in memory; used by tests and the CLI demo.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, event: DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
