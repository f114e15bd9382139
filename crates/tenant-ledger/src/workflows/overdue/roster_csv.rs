use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::record::OverdueEntry;
use super::service::OverdueCheckSummary;
use crate::workflows::dashboard::domain::TenantId;
use crate::workflows::providers::{OverdueProvider, ProviderError};
use crate::workflows::schema;

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read overdue roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid overdue roster CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Overdue provider backed by an exported roster file.
#[derive(Debug, Clone, Default)]
pub struct CsvRosterProvider {
    entries: Vec<OverdueEntry>,
}

impl CsvRosterProvider {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = Vec::new();

        for row in csv_reader.deserialize::<RosterRow>() {
            let row = row?;
            if row.tenant_id.trim().is_empty() {
                continue;
            }
            entries.push(row.into_entry());
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[OverdueEntry] {
        &self.entries
    }
}

#[async_trait]
impl OverdueProvider for CsvRosterProvider {
    async fn overdue_tenants(&self) -> Result<Vec<OverdueEntry>, ProviderError> {
        Ok(self.entries.clone())
    }

    async fn check_overdue_payments(&self) -> Result<OverdueCheckSummary, ProviderError> {
        Err(ProviderError::Unsupported(
            "a roster file cannot dispatch overdue notifications",
        ))
    }
}

/// Raw export row. Columns stay text until conversion so identifiers such as
/// `00123` are never reinterpreted as numbers.
#[derive(Debug, Deserialize)]
struct RosterRow {
    tenant_id: String,
    #[serde(default)]
    tenant_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    room_number: Option<String>,
    #[serde(default)]
    outstanding_balance: Option<String>,
    #[serde(default)]
    days_overdue: Option<String>,
    #[serde(default)]
    next_due_date: Option<String>,
    #[serde(default)]
    last_payment_date: Option<String>,
}

impl RosterRow {
    fn into_entry(self) -> OverdueEntry {
        let outstanding_balance = self
            .outstanding_balance
            .as_deref()
            .and_then(schema::parse_amount)
            .unwrap_or(Decimal::ZERO);
        let days_overdue = self
            .days_overdue
            .as_deref()
            .and_then(schema::parse_amount)
            .and_then(|days| days.trunc().to_i64());

        OverdueEntry {
            tenant_id: TenantId(self.tenant_id),
            tenant_name: self.tenant_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            room_number: non_empty(self.room_number),
            outstanding_balance,
            days_overdue,
            next_due_date: self.next_due_date.as_deref().and_then(schema::parse_date),
            last_payment_date: self.last_payment_date.as_deref().and_then(schema::parse_date),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const ROSTER: &str = "\
tenant_id,tenant_name,email,room_number,outstanding_balance,days_overdue,next_due_date,last_payment_date
t-1,Ana Ruiz,ana@example.com,101,1200.50,35,2025-05-01,2025-04-01
t-2,Ben Ode,ben@example.com,,abc,,2025-06-10,
,Ghost Row,,,,,,
";

    #[test]
    fn parses_rows_and_coerces_fields() {
        let provider = CsvRosterProvider::from_reader(Cursor::new(ROSTER)).expect("roster parses");
        let entries = provider.entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tenant_id, TenantId("t-1".to_string()));
        assert_eq!(entries[0].outstanding_balance, Decimal::new(120050, 2));
        assert_eq!(entries[0].days_overdue, Some(35));
        assert_eq!(entries[0].room_number.as_deref(), Some("101"));

        assert_eq!(entries[1].outstanding_balance, Decimal::ZERO);
        assert_eq!(entries[1].days_overdue, None);
        assert_eq!(entries[1].room_number, None);
        assert_eq!(entries[1].last_payment_date, None);
        assert_eq!(
            entries[1].next_due_date,
            NaiveDate::from_ymd_opt(2025, 6, 10)
        );
    }

    #[test]
    fn identifier_columns_keep_their_exact_text() {
        let csv = "\
tenant_id,tenant_name,email,room_number,outstanding_balance,days_overdue
00123,NaN,true,0101,250,9
1e3,Lee Park,lee@example.com,,12.5,
";
        let provider = CsvRosterProvider::from_reader(Cursor::new(csv)).expect("roster parses");
        let entries = provider.entries();

        assert_eq!(entries[0].tenant_id, TenantId("00123".to_string()));
        assert_eq!(entries[0].tenant_name, "NaN");
        assert_eq!(entries[0].email, "true");
        assert_eq!(entries[0].room_number.as_deref(), Some("0101"));
        assert_eq!(entries[0].outstanding_balance, Decimal::from(250));
        assert_eq!(entries[0].days_overdue, Some(9));

        assert_eq!(entries[1].tenant_id, TenantId("1e3".to_string()));
        assert_eq!(entries[1].room_number, None);
        assert_eq!(entries[1].days_overdue, None);
    }

    #[tokio::test]
    async fn check_is_unsupported_for_files() {
        let provider = CsvRosterProvider::default();
        assert!(matches!(
            provider.check_overdue_payments().await,
            Err(ProviderError::Unsupported(_))
        ));
    }
}
