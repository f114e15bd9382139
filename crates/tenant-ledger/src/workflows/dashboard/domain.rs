use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::schema;

/// Login account identifier owned by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

/// Identifier for a resident record in the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    Inactive,
    MovedOut,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TenantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::MovedOut => "Moved Out",
            Self::Unknown => "Unknown",
        }
    }
}

/// Resident identity as published by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    #[serde(default, deserialize_with = "schema::text")]
    pub name: String,
    #[serde(default, deserialize_with = "schema::text")]
    pub email: String,
    #[serde(default, deserialize_with = "room_reference")]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub status: TenantStatus,
}

fn room_reference<'de, D>(deserializer: D) -> Result<Option<RoomId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(schema::optional_text(deserializer)?.map(RoomId))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub id: RoomId,
    #[serde(default, deserialize_with = "schema::text")]
    pub room_number: String,
    #[serde(default, deserialize_with = "schema::optional_count")]
    pub floor: Option<i64>,
    #[serde(default, deserialize_with = "schema::optional_text")]
    pub room_type: Option<String>,
    #[serde(default, deserialize_with = "schema::amount")]
    pub monthly_rent: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MaintenanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    Low,
    Medium,
    High,
    Urgent,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    #[serde(deserialize_with = "schema::text")]
    pub id: String,
    #[serde(default, deserialize_with = "schema::text")]
    pub title: String,
    #[serde(default, deserialize_with = "schema::text")]
    pub description: String,
    #[serde(default)]
    pub status: MaintenanceStatus,
    #[serde(default)]
    pub priority: MaintenancePriority,
    #[serde(default, deserialize_with = "schema::optional_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(deserialize_with = "schema::text")]
    pub id: String,
    #[serde(default, deserialize_with = "schema::amount")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "schema::optional_date")]
    pub paid_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "schema::optional_text")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "schema::optional_text")]
    pub reference: Option<String>,
}
