use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::{OverdueEntry, OverdueRecord};
use super::severity::Severity;
use super::stats::AggregateStats;
use crate::telemetry::{DiagnosticEvent, DiagnosticSink, TracingSink};
use crate::workflows::providers::{OverdueProvider, ProviderError};

/// Result of an upstream overdue sweep; counts are reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueCheckSummary {
    pub checked: u64,
    pub overdue: u64,
}

/// Classified roster ordered for triage: most severe tier first, then longest overdue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverdueRoster {
    pub records: Vec<OverdueRecord>,
    pub stats: AggregateStats,
}

impl OverdueRoster {
    pub fn from_entries(entries: Vec<OverdueEntry>, today: NaiveDate) -> Self {
        let mut records: Vec<OverdueRecord> = entries
            .into_iter()
            .map(|entry| OverdueRecord::classify(entry, today))
            .collect();

        records.sort_by(|left, right| {
            right
                .severity
                .cmp(&left.severity)
                .then_with(|| right.days_overdue.cmp(&left.days_overdue))
                .then_with(|| left.tenant_id.cmp(&right.tenant_id))
        });

        Self::from_records(records)
    }

    fn from_records(records: Vec<OverdueRecord>) -> Self {
        let stats = AggregateStats::from_records(&records);
        Self { records, stats }
    }

    /// Records in one tier, with stats recomputed over that subset.
    pub fn filtered(&self, severity: Severity) -> Self {
        let records = self
            .records
            .iter()
            .filter(|record| record.severity == severity)
            .cloned()
            .collect();
        Self::from_records(records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverdueError {
    #[error("overdue roster is unavailable")]
    Roster(#[source] ProviderError),
    #[error("overdue payment check failed")]
    Check(#[source] ProviderError),
}

impl OverdueError {
    pub fn summary(&self) -> String {
        self.to_string()
    }

    pub fn detail(&self) -> String {
        match self {
            OverdueError::Roster(source) | OverdueError::Check(source) => source.to_string(),
        }
    }
}

/// Operations view over the overdue provider.
pub struct OverdueService {
    provider: Arc<dyn OverdueProvider>,
    sink: Arc<dyn DiagnosticSink>,
}

impl OverdueService {
    pub fn new(provider: Arc<dyn OverdueProvider>) -> Self {
        Self::with_sink(provider, Arc::new(TracingSink))
    }

    pub fn with_sink(provider: Arc<dyn OverdueProvider>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { provider, sink }
    }

    pub async fn roster(&self, today: NaiveDate) -> Result<OverdueRoster, OverdueError> {
        let entries = self.provider.overdue_tenants().await.map_err(|error| {
            self.sink.record(DiagnosticEvent::RosterFetchFailed {
                error: error.to_string(),
            });
            OverdueError::Roster(error)
        })?;

        let roster = OverdueRoster::from_entries(entries, today);
        self.sink.record(DiagnosticEvent::RosterClassified {
            total: roster.stats.total_overdue,
            critical: roster.stats.by_severity.critical,
        });
        Ok(roster)
    }

    pub async fn stats(&self, today: NaiveDate) -> Result<AggregateStats, OverdueError> {
        Ok(self.roster(today).await?.stats)
    }

    /// Triggers the upstream sweep. The counts are passed through untouched.
    pub async fn check_overdue_payments(&self) -> Result<OverdueCheckSummary, OverdueError> {
        let summary = self
            .provider
            .check_overdue_payments()
            .await
            .map_err(OverdueError::Check)?;

        self.sink.record(DiagnosticEvent::OverdueCheckCompleted {
            checked: summary.checked,
            overdue: summary.overdue,
        });
        Ok(summary)
    }
}
