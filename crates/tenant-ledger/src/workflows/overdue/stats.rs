use rust_decimal::Decimal;
use serde::Serialize;

use super::record::OverdueRecord;
use super::severity::Severity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub warning: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Warning => self.warning,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    fn increment(&mut self, severity: Severity) {
        let slot = match severity {
            Severity::Warning => &mut self.warning,
            Severity::Medium => &mut self.medium,
            Severity::High => &mut self.high,
            Severity::Critical => &mut self.critical,
        };
        *slot += 1;
    }
}

/// Roll-up over a classified roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub total_overdue: usize,
    pub by_severity: SeverityCounts,
    pub total_outstanding: Decimal,
    pub average_days_overdue: u32,
}

impl AggregateStats {
    pub fn from_records(records: &[OverdueRecord]) -> Self {
        let mut by_severity = SeverityCounts::default();
        let mut total_outstanding = Decimal::ZERO;
        let mut total_days: u64 = 0;

        for record in records {
            by_severity.increment(record.severity);
            total_outstanding += record.outstanding_balance;
            total_days += u64::from(record.days_overdue);
        }

        Self {
            total_overdue: records.len(),
            by_severity,
            total_outstanding,
            average_days_overdue: rounded_average(total_days, records.len() as u64),
        }
    }
}

/// Mean rounded half up; zero for an empty roster.
fn rounded_average(total: u64, count: u64) -> u32 {
    if count == 0 {
        return 0;
    }

    let rounded = (2 * total + count) / (2 * count);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
