use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Delinquency tier, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Medium,
    High,
    Critical,
}

/// Exclusive lower bounds on days overdue, highest first. Anything at or below
/// the last bound is a warning.
pub const SEVERITY_TIERS: [(u32, Severity); 3] = [
    (30, Severity::Critical),
    (14, Severity::High),
    (7, Severity::Medium),
];

impl Severity {
    pub fn from_days_overdue(days_overdue: u32) -> Self {
        SEVERITY_TIERS
            .iter()
            .find(|(lower_bound, _)| days_overdue > *lower_bound)
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Warning)
    }

    /// Most severe first, the order the operations view lists tiers in.
    pub const fn ordered() -> [Self; 4] {
        [Self::Critical, Self::High, Self::Medium, Self::Warning]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Warning => "Up to 7 days overdue",
            Self::Medium => "8 to 14 days overdue",
            Self::High => "15 to 30 days overdue",
            Self::Critical => "More than 30 days overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}' (expected warning, medium, high, or critical)")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "warning" => Ok(Self::Warning),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownSeverity(raw.to_string())),
        }
    }
}
