//! Boundary coercion for provider payloads.
//!
//! Providers hand back loosely typed numbers and dates. The deserializers here
//! are the only place a malformed value turns into a default, so everything
//! downstream works with plain `Decimal` and `NaiveDate` values.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decimal field defaulting to zero when missing, null, or non-numeric.
pub fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_amount(deserializer)?.unwrap_or_default())
}

/// Decimal field that is `None` when missing, null, or non-numeric.
pub fn optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_amount))
}

/// Whole-number field (day counts, floors). Fractions truncate toward zero.
pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = optional_amount(deserializer)?;
    Ok(amount.and_then(|value| value.trunc().to_i64()))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(value)) => parse_date(&value),
        _ => None,
    })
}

pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(value)) => parse_datetime(&value),
        _ => None,
    })
}

/// String field where null and non-string scalars collapse to text or empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(value)) => value,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = text(deserializer)?;
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Sequence field where `null` means empty.
pub fn sequence<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn coerce_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .map(Decimal::from)
            .or_else(|| number.as_u64().map(Decimal::from))
            .or_else(|| number.as_f64().and_then(Decimal::from_f64)),
        Value::String(raw) => parse_amount(raw),
        _ => None,
    }
}

pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<Decimal>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Decimal::from_f64)
    })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_datetime(raw).map(|dt| dt.date_naive())
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "amount")]
        value: Decimal,
        #[serde(default, deserialize_with = "optional_amount")]
        maybe: Option<Decimal>,
        #[serde(default, deserialize_with = "optional_date")]
        due: Option<NaiveDate>,
        #[serde(default, deserialize_with = "sequence")]
        items: Vec<u8>,
    }

    fn sample(value: serde_json::Value) -> Sample {
        serde_json::from_value(value).expect("sample deserializes")
    }

    #[test]
    fn numeric_strings_and_numbers_are_accepted() {
        assert_eq!(sample(json!({ "value": 12 })).value, Decimal::from(12));
        assert_eq!(
            sample(json!({ "value": " 12.50 " })).value,
            Decimal::new(1250, 2)
        );
        assert_eq!(sample(json!({ "value": 0.5 })).value, Decimal::new(5, 1));
    }

    #[test]
    fn malformed_numbers_collapse_to_zero() {
        for raw in [
            json!({ "value": "abc" }),
            json!({ "value": null }),
            json!({ "value": true }),
            json!({ "value": { "nested": 1 } }),
            json!({ "value": "NaN" }),
            json!({}),
        ] {
            assert_eq!(sample(raw).value, Decimal::ZERO);
        }
    }

    #[test]
    fn optional_amounts_stay_absent_when_malformed() {
        assert_eq!(sample(json!({ "maybe": "n/a" })).maybe, None);
        assert_eq!(sample(json!({ "maybe": "40" })).maybe, Some(Decimal::from(40)));
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(sample(json!({ "due": "2025-03-01" })).due, expected);
        assert_eq!(sample(json!({ "due": "2025-03-01T10:00:00Z" })).due, expected);
        assert_eq!(sample(json!({ "due": "soon" })).due, None);
    }

    #[test]
    fn null_sequences_are_empty() {
        assert!(sample(json!({ "items": null })).items.is_empty());
        assert_eq!(sample(json!({ "items": [1, 2] })).items, vec![1, 2]);
    }
}
