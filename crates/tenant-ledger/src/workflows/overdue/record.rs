use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::severity::Severity;
use crate::workflows::dashboard::domain::TenantId;
use crate::workflows::schema;

/// Roster row as reported by the overdue provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueEntry {
    #[serde(deserialize_with = "tenant_reference")]
    pub tenant_id: TenantId,
    #[serde(default, deserialize_with = "schema::text")]
    pub tenant_name: String,
    #[serde(default, deserialize_with = "schema::text")]
    pub email: String,
    #[serde(default, deserialize_with = "schema::optional_text")]
    pub room_number: Option<String>,
    #[serde(default, deserialize_with = "schema::amount")]
    pub outstanding_balance: Decimal,
    #[serde(default, deserialize_with = "schema::optional_count")]
    pub days_overdue: Option<i64>,
    #[serde(default, deserialize_with = "schema::optional_date")]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "schema::optional_date")]
    pub last_payment_date: Option<NaiveDate>,
}

fn tenant_reference<'de, D>(deserializer: D) -> Result<TenantId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(TenantId(schema::text(deserializer)?))
}

impl OverdueEntry {
    /// Provider day count clamped at zero, else days past `next_due_date`, else zero.
    pub fn days_overdue_on(&self, today: NaiveDate) -> u32 {
        let days = match (self.days_overdue, self.next_due_date) {
            (Some(days), _) => days,
            (None, Some(due)) => (today - due).num_days(),
            (None, None) => 0,
        };

        u32::try_from(days.max(0)).unwrap_or(u32::MAX)
    }
}

/// Classified roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueRecord {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    pub outstanding_balance: Decimal,
    pub days_overdue: u32,
    pub next_due_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub severity: Severity,
}

impl OverdueRecord {
    pub fn classify(entry: OverdueEntry, today: NaiveDate) -> Self {
        let days_overdue = entry.days_overdue_on(today);

        Self {
            tenant_id: entry.tenant_id,
            tenant_name: entry.tenant_name,
            email: entry.email,
            room_number: entry.room_number,
            outstanding_balance: entry.outstanding_balance,
            days_overdue,
            next_due_date: entry.next_due_date,
            last_payment_date: entry.last_payment_date,
            severity: Severity::from_days_overdue(days_overdue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
    }

    fn entry(value: serde_json::Value) -> OverdueEntry {
        serde_json::from_value(value).expect("entry deserializes")
    }

    #[test]
    fn provider_day_count_takes_precedence() {
        let record = OverdueRecord::classify(
            entry(json!({
                "tenantId": "t-9",
                "daysOverdue": 31,
                "nextDueDate": "2025-06-29"
            })),
            today(),
        );

        assert_eq!(record.days_overdue, 31);
        assert_eq!(record.severity, Severity::Critical);
    }

    #[test]
    fn day_count_derived_from_due_date_when_missing() {
        let record = OverdueRecord::classify(
            entry(json!({ "tenantId": "t-9", "nextDueDate": "2025-06-15" })),
            today(),
        );

        assert_eq!(record.days_overdue, 15);
        assert_eq!(record.severity, Severity::High);
    }

    #[test]
    fn negative_and_missing_counts_become_zero() {
        let future_due = entry(json!({ "tenantId": 12, "nextDueDate": "2025-07-10" }));
        assert_eq!(future_due.tenant_id, TenantId("12".to_string()));
        assert_eq!(future_due.days_overdue_on(today()), 0);

        let negative = entry(json!({ "tenantId": "t-1", "daysOverdue": -4 }));
        assert_eq!(negative.days_overdue_on(today()), 0);

        let bare = entry(json!({ "tenantId": "t-2", "daysOverdue": "soon" }));
        assert_eq!(bare.days_overdue_on(today()), 0);
    }
}
