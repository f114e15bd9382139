use crate::infra::{parse_date, AppState};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tenant_ledger::error::AppError;
use tenant_ledger::workflows::dashboard::domain::{AccountId, Payment, TenantId};
use tenant_ledger::workflows::dashboard::TenantDashboard;
use tenant_ledger::workflows::overdue::{OverdueCheckSummary, OverdueRoster, Severity};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PaymentsQuery {
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentsResponse {
    pub(crate) tenant_id: TenantId,
    pub(crate) payments: Vec<Payment>,
    pub(crate) failed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OverdueQuery {
    pub(crate) severity: Option<String>,
    pub(crate) today: Option<String>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/tenants/:account_id/dashboard",
            get(dashboard_endpoint),
        )
        .route("/api/v1/tenants/:tenant_id/payments", get(payments_endpoint))
        .route("/api/v1/overdue", get(overdue_endpoint))
        .route("/api/v1/overdue/check", post(overdue_check_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_endpoint(
    Extension(state): Extension<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<TenantDashboard>, AppError> {
    let dashboard = state.dashboard.load(&AccountId(account_id)).await?;
    Ok(Json(dashboard))
}

pub(crate) async fn payments_endpoint(
    Extension(state): Extension<AppState>,
    Path(tenant_id): Path<String>,
    Query(query): Query<PaymentsQuery>,
) -> Json<PaymentsResponse> {
    let tenant_id = TenantId(tenant_id);
    let (payments, failed) = state
        .dashboard
        .recent_payments(&tenant_id, query.limit)
        .await
        .into_parts();

    Json(PaymentsResponse {
        tenant_id,
        payments,
        failed,
    })
}

pub(crate) async fn overdue_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<OverdueQuery>,
) -> Result<Json<OverdueRoster>, AppError> {
    let severity = query
        .severity
        .as_deref()
        .map(str::parse::<Severity>)
        .transpose()?;
    let today = resolve_today(query.today.as_deref())?;

    let roster = state.overdue.roster(today).await?;
    let roster = match severity {
        Some(severity) => roster.filtered(severity),
        None => roster,
    };
    Ok(Json(roster))
}

pub(crate) async fn overdue_check_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<OverdueCheckSummary>, AppError> {
    Ok(Json(state.overdue.check_overdue_payments().await?))
}

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) => parse_date(raw).map_err(AppError::InvalidInput),
        None => Ok(Local::now().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{DirectoryFixture, FixtureSource, InMemoryDirectory};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tenant_ledger::config::DashboardConfig;
    use tenant_ledger::telemetry::MemorySink;
    use tenant_ledger::workflows::dashboard::{DashboardProviders, TenantDashboardService};
    use tenant_ledger::workflows::overdue::OverdueService;
    use tower::ServiceExt;

    fn app(fixture: DirectoryFixture) -> Router {
        let directory = Arc::new(InMemoryDirectory::new(fixture));
        let sink = Arc::new(MemorySink::default());
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            dashboard: Arc::new(TenantDashboardService::with_sink(
                DashboardProviders::from_shared(directory.clone()),
                &DashboardConfig::default(),
                sink.clone(),
            )),
            overdue: Arc::new(OverdueService::with_sink(directory, sink)),
        };
        router().layer(Extension(state))
    }

    fn demo_app() -> Router {
        app(DirectoryFixture::demo().expect("demo fixture"))
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn dashboard_returns_corrected_balance() {
        let (status, body) = call(demo_app(), "GET", "/api/v1/tenants/acct-maya/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tenant"]["name"], "Maya Lindqvist");
        assert_eq!(body["balance"]["corrected"], "700");
        assert_eq!(body["balance"]["source"], "deposit_credit");
        assert_eq!(body["errors"]["billing"], false);
        assert_eq!(body["room"]["roomNumber"], "12B");
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let (status, body) = call(demo_app(), "GET", "/api/v1/tenants/acct-none/dashboard").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no tenant is linked to account acct-none");
        assert_eq!(body["detail"], "identity provider returned no tenant record");
    }

    #[tokio::test]
    async fn identity_outage_is_bad_gateway_but_slice_outage_is_not() {
        let mut fixture = DirectoryFixture::demo().expect("demo fixture");
        fixture.unavailable = vec![FixtureSource::Identity];
        let (status, body) = call(app(fixture), "GET", "/api/v1/tenants/acct-maya/dashboard").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["detail"],
            "provider unavailable: Identity service is marked unavailable"
        );

        let mut fixture = DirectoryFixture::demo().expect("demo fixture");
        fixture.unavailable = vec![FixtureSource::Maintenance];
        let (status, body) = call(app(fixture), "GET", "/api/v1/tenants/acct-maya/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["errors"]["maintenance"], true);
        assert_eq!(body["maintenance_requests"], Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn payments_honour_limit() {
        let (status, body) = call(demo_app(), "GET", "/api/v1/tenants/t-200/payments?limit=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["failed"], false);
        assert_eq!(body["payments"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["payments"][0]["id"], "p-9100");
    }

    #[tokio::test]
    async fn overdue_roster_can_be_filtered_by_severity() {
        let (status, body) = call(
            demo_app(),
            "GET",
            "/api/v1/overdue?severity=critical&today=2025-06-05",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["total_overdue"], 1);
        assert_eq!(body["records"][0]["tenant_id"], "t-100");
        assert_eq!(body["records"][0]["severity"], "critical");
    }

    #[tokio::test]
    async fn unknown_severity_is_rejected() {
        let (status, body) = call(demo_app(), "GET", "/api/v1/overdue?severity=dire").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("dire")));
    }

    #[tokio::test]
    async fn overdue_check_reports_counts() {
        let (status, body) = call(demo_app(), "POST", "/api/v1/overdue/check").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checked"], 4);
        assert_eq!(body["overdue"], 4);
    }

    #[tokio::test]
    async fn health_and_readiness_respond() {
        let (status, body) = call(demo_app(), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = call(demo_app(), "GET", "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }
}
