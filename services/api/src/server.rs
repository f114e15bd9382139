use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDirectory};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tenant_ledger::config::{AppConfig, DataConfig};
use tenant_ledger::error::AppError;
use tenant_ledger::telemetry;
use tenant_ledger::workflows::dashboard::{DashboardProviders, TenantDashboardService};
use tenant_ledger::workflows::overdue::{CsvRosterProvider, OverdueService};
use tenant_ledger::workflows::providers::OverdueProvider;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let directory = Arc::new(InMemoryDirectory::load(config.data.fixture_path.as_deref())?);
    let dashboard = Arc::new(TenantDashboardService::new(
        DashboardProviders::from_shared(directory.clone()),
        &config.dashboard,
    ));
    let overdue = Arc::new(OverdueService::new(overdue_source(&config.data, directory)?));

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        dashboard,
        overdue,
    };

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tenant ledger service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The exported roster file takes over the overdue view when configured.
pub(crate) fn overdue_source(
    data: &DataConfig,
    directory: Arc<InMemoryDirectory>,
) -> Result<Arc<dyn OverdueProvider>, AppError> {
    match &data.overdue_roster_csv {
        Some(path) => {
            let roster = CsvRosterProvider::from_path(path)?;
            info!(path = %path.display(), entries = roster.entries().len(), "loaded overdue roster export");
            Ok(Arc::new(roster))
        }
        None => Ok(directory),
    }
}
