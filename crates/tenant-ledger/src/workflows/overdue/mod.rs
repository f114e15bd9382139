//! Delinquency triage: severity tiers per tenant and roll-up statistics.

mod record;
mod roster_csv;
mod service;
mod severity;
mod stats;

pub use record::{OverdueEntry, OverdueRecord};
pub use roster_csv::{CsvRosterProvider, RosterImportError};
pub use service::{OverdueCheckSummary, OverdueError, OverdueRoster, OverdueService};
pub use severity::{Severity, UnknownSeverity, SEVERITY_TIERS};
pub use stats::{AggregateStats, SeverityCounts};
