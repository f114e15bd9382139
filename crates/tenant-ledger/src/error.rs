use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::dashboard::DashboardError;
use crate::workflows::overdue::{OverdueError, RosterImportError, UnknownSeverity};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Dashboard(DashboardError),
    Overdue(OverdueError),
    Roster(RosterImportError),
    Fixture(serde_json::Error),
    InvalidInput(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Dashboard(DashboardError::TenantNotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Dashboard(DashboardError::TenantLookup { .. }) | AppError::Overdue(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Roster(_) | AppError::Fixture(_) | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic text for operators; the provider's own message where one exists.
    pub fn detail(&self) -> String {
        match self {
            AppError::Dashboard(err) => err.detail(),
            AppError::Overdue(err) => err.detail(),
            other => std::error::Error::source(other)
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Dashboard(err) => write!(f, "{}", err.summary()),
            AppError::Overdue(err) => write!(f, "{}", err.summary()),
            AppError::Roster(err) => write!(f, "roster import error: {}", err),
            AppError::Fixture(err) => write!(f, "fixture error: {}", err),
            AppError::InvalidInput(message) => write!(f, "invalid input: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Dashboard(err) => Some(err),
            AppError::Overdue(err) => Some(err),
            AppError::Roster(err) => Some(err),
            AppError::Fixture(err) => Some(err),
            AppError::InvalidInput(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "detail": self.detail(),
        }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DashboardError> for AppError {
    fn from(value: DashboardError) -> Self {
        Self::Dashboard(value)
    }
}

impl From<OverdueError> for AppError {
    fn from(value: OverdueError) -> Self {
        Self::Overdue(value)
    }
}

impl From<RosterImportError> for AppError {
    fn from(value: RosterImportError) -> Self {
        Self::Roster(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Fixture(value)
    }
}

impl From<UnknownSeverity> for AppError {
    fn from(value: UnknownSeverity) -> Self {
        Self::InvalidInput(value.to_string())
    }
}
