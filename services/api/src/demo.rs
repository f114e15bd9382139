use crate::infra::{DirectoryFixture, FixtureSource, InMemoryDirectory, OverdueNotification};
use crate::server::overdue_source;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tenant_ledger::config::{AppConfig, DashboardConfig};
use tenant_ledger::error::AppError;
use tenant_ledger::telemetry::{DiagnosticEvent, MemorySink};
use tenant_ledger::workflows::dashboard::domain::{AccountId, Payment};
use tenant_ledger::workflows::dashboard::{
    DashboardError, DashboardProviders, Settled, TenantDashboard, TenantDashboardService,
};
use tenant_ledger::workflows::overdue::{
    OverdueCheckSummary, OverdueRoster, OverdueService, Severity,
};

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// Login account whose tenant dashboard should be rendered
    #[arg(long)]
    pub(crate) account_id: String,
    /// JSON directory fixture (defaults to APP_FIXTURE_PATH, then the bundled demo data)
    #[arg(long)]
    pub(crate) fixture: Option<PathBuf>,
    /// Number of recent payments to list (defaults to APP_PAYMENT_HISTORY_LIMIT)
    #[arg(long)]
    pub(crate) payments: Option<usize>,
    /// Keep refreshing on APP_REFRESH_INTERVAL_SECS until interrupted
    #[arg(long)]
    pub(crate) watch: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OverdueReportArgs {
    /// CSV roster export; takes precedence over the directory fixture
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// JSON directory fixture supplying the roster when no CSV is given
    #[arg(long)]
    pub(crate) fixture: Option<PathBuf>,
    /// Only list tenants in this tier (warning, medium, high, critical)
    #[arg(long, value_parser = parse_severity)]
    pub(crate) severity: Option<Severity>,
    /// Evaluation date used to derive missing day counts (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OverdueCheckArgs {
    /// JSON directory fixture (defaults to APP_FIXTURE_PATH, then the bundled demo data)
    #[arg(long)]
    pub(crate) fixture: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date for the overdue roster (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn parse_severity(raw: &str) -> Result<Severity, String> {
    raw.parse::<Severity>().map_err(|err| err.to_string())
}

pub(crate) async fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        account_id,
        fixture,
        payments,
        watch,
    } = args;

    let config = AppConfig::load()?;
    let fixture = fixture.or(config.data.fixture_path.clone());
    let directory = Arc::new(InMemoryDirectory::load(fixture.as_deref())?);
    let sink = Arc::new(MemorySink::default());
    let service = TenantDashboardService::with_sink(
        DashboardProviders::from_shared(directory),
        &config.dashboard,
        sink.clone(),
    );
    let account_id = AccountId(account_id);

    if !watch {
        let outcome = show_dashboard(&service, &account_id, payments).await;
        render_diagnostics(&sink.events());
        return outcome;
    }

    let mut ticker = tokio::time::interval(config.dashboard.refresh_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut seen = 0;

    println!(
        "Watching {account_id} every {}s (Ctrl+C to stop)",
        config.dashboard.refresh_interval.as_secs()
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                println!("\n{}", Local::now().format("%Y-%m-%d %H:%M:%S"));
                // A failed refresh is reported and the next tick retries.
                if let Err(err) = show_dashboard(&service, &account_id, payments).await {
                    println!("Refresh failed: {err}");
                }
                let events = sink.events();
                render_diagnostics(&events[seen..]);
                seen = events.len();
            }
            _ = &mut shutdown => {
                println!("Stopped watching {account_id}");
                return Ok(());
            }
        }
    }
}

pub(crate) async fn run_overdue_report(args: OverdueReportArgs) -> Result<(), AppError> {
    let OverdueReportArgs {
        roster,
        fixture,
        severity,
        today,
    } = args;

    let config = AppConfig::load()?;
    let mut data = config.data;
    if roster.is_some() {
        data.overdue_roster_csv = roster;
    }
    if fixture.is_some() {
        data.fixture_path = fixture;
    }

    let directory = Arc::new(InMemoryDirectory::load(data.fixture_path.as_deref())?);
    let sink = Arc::new(MemorySink::default());
    let service = OverdueService::with_sink(overdue_source(&data, directory)?, sink.clone());
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let roster = service.roster(today).await?;
    let roster = match severity {
        Some(severity) => roster.filtered(severity),
        None => roster,
    };
    render_roster(&roster, today, severity);
    Ok(())
}

pub(crate) async fn run_overdue_check(args: OverdueCheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let fixture = args.fixture.or(config.data.fixture_path);
    let directory = Arc::new(InMemoryDirectory::load(fixture.as_deref())?);
    let service = OverdueService::new(directory.clone());

    let summary = service.check_overdue_payments().await?;
    render_check(&summary, &directory.notifications());
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let config = DashboardConfig::default();
    let directory = Arc::new(InMemoryDirectory::load(None)?);
    let sink = Arc::new(MemorySink::default());
    let service = TenantDashboardService::with_sink(
        DashboardProviders::from_shared(directory.clone()),
        &config,
        sink.clone(),
    );

    println!("Tenant ledger demo");
    for account_id in directory.accounts() {
        println!();
        if let Err(err) = show_dashboard(&service, &account_id, None).await {
            println!("{err}");
        }
    }

    println!("\nBilling outage drill");
    let mut outage = DirectoryFixture::demo()?;
    outage.unavailable = vec![FixtureSource::Billing];
    let degraded = TenantDashboardService::with_sink(
        DashboardProviders::from_shared(Arc::new(InMemoryDirectory::new(outage))),
        &config,
        sink.clone(),
    );
    if let Some(account_id) = directory.accounts().first() {
        show_dashboard(&degraded, account_id, Some(0)).await?;
    }

    println!();
    let overdue = OverdueService::with_sink(directory.clone(), sink.clone());
    let roster = overdue.roster(today).await?;
    render_roster(&roster, today, None);

    println!();
    let summary = overdue.check_overdue_payments().await?;
    render_check(&summary, &directory.notifications());

    render_diagnostics(&sink.events());
    Ok(())
}

async fn show_dashboard(
    service: &TenantDashboardService,
    account_id: &AccountId,
    payment_limit: Option<usize>,
) -> Result<(), AppError> {
    let dashboard = match service.load(account_id).await {
        Ok(dashboard) => dashboard,
        Err(err) => {
            render_load_failure(&err);
            return Err(err.into());
        }
    };
    let payments = service
        .recent_payments(&dashboard.tenant.id, payment_limit)
        .await;
    render_dashboard(&dashboard, &payments);
    Ok(())
}

fn render_load_failure(err: &DashboardError) {
    println!("Dashboard unavailable: {}", err.summary());
    println!("- detail: {}", err.detail());
}

pub(crate) fn render_dashboard(dashboard: &TenantDashboard, payments: &Settled<Vec<Payment>>) {
    let tenant = &dashboard.tenant;
    println!(
        "Tenant dashboard for {} ({}) | {}",
        tenant.name,
        tenant.id,
        tenant.status.label()
    );
    println!("- Contact: {}", tenant.email);

    match (&dashboard.room, dashboard.errors.room) {
        (_, true) => println!("- Room: unavailable"),
        (Some(room), false) => {
            let floor = room
                .floor
                .map(|floor| format!(", floor {floor}"))
                .unwrap_or_default();
            println!(
                "- Room: {} ({}{}) | rent ${:.2}",
                room.room_number,
                room.room_type.as_deref().unwrap_or("unspecified"),
                floor,
                room.monthly_rent
            );
        }
        (None, false) => println!("- Room: not assigned"),
    }

    println!("Balance");
    if dashboard.errors.billing {
        println!("- Billing data unavailable; showing $0.00");
    } else {
        let balance = &dashboard.balance;
        println!("- Outstanding: ${:.2}", balance.outstanding);
        println!(
            "- Balance due: ${:.2} ({})",
            balance.corrected,
            balance.source.label()
        );
        if !balance.deposit_credit.is_zero() {
            println!("- Deposit credit: ${:.2}", balance.deposit_credit);
        }
        if let Some(reported) = balance.upstream_reported.filter(|_| balance.upstream_clamped()) {
            println!("- Ledger reported ${reported:.2}; clamped into range");
        }
        println!(
            "- Monthly total ${:.2} | deposit ${:.2}",
            dashboard.billing.total_monthly(),
            dashboard.billing.deposit
        );
        if let Some(cycle) = dashboard.billing.latest_cycle() {
            println!(
                "- Last cycle {}: charges ${:.2}, paid ${:.2}, closed at ${:.2}",
                cycle.month, cycle.charges, cycle.payments_made, cycle.final_balance
            );
        }
    }

    if dashboard.errors.maintenance {
        println!("Maintenance: unavailable");
    } else {
        println!(
            "Maintenance ({} open of {})",
            dashboard.open_maintenance_requests(),
            dashboard.maintenance_requests.len()
        );
        for request in &dashboard.maintenance_requests {
            println!(
                "  - [{}] {} ({:?} priority)",
                request.status.label(),
                request.title,
                request.priority
            );
        }
    }

    if payments.failed {
        println!("Recent payments: unavailable");
    } else if !payments.value.is_empty() {
        println!("Recent payments");
        for payment in &payments.value {
            let paid_on = payment
                .paid_on
                .map(|date| date.to_string())
                .unwrap_or_else(|| "undated".to_string());
            println!(
                "  - {} ${:.2} {}{}",
                paid_on,
                payment.amount,
                payment.method.as_deref().unwrap_or("unknown method"),
                payment
                    .reference
                    .as_deref()
                    .map(|reference| format!(" ({reference})"))
                    .unwrap_or_default()
            );
        }
    }

    if dashboard.errors.any() {
        let failed: Vec<&str> = dashboard
            .errors
            .failed_slices()
            .into_iter()
            .map(|slice| slice.label())
            .collect();
        println!("Sections showing defaults: {}", failed.join(", "));
    }
    println!(
        "Fetched at {}",
        dashboard.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

pub(crate) fn render_roster(roster: &OverdueRoster, today: NaiveDate, filter: Option<Severity>) {
    let stats = &roster.stats;
    match filter {
        Some(severity) => println!(
            "Overdue roster as of {today} ({} tier only)",
            severity.label()
        ),
        None => println!("Overdue roster as of {today}"),
    }
    println!(
        "- {} tenants overdue | ${:.2} outstanding | {} days average",
        stats.total_overdue, stats.total_outstanding, stats.average_days_overdue
    );

    println!("By severity:");
    for severity in Severity::ordered() {
        println!(
            "  - {} ({}): {}",
            severity.label(),
            severity.description(),
            stats.by_severity.get(severity)
        );
    }

    if roster.is_empty() {
        println!("No overdue tenants.");
        return;
    }

    println!("Tenants:");
    for record in &roster.records {
        let room = record
            .room_number
            .as_deref()
            .map(|room| format!(" room {room}"))
            .unwrap_or_default();
        let last_paid = record
            .last_payment_date
            .map(|date| format!(" | last paid {date}"))
            .unwrap_or_default();
        println!(
            "  - [{}] {} ({}){} | {} days | ${:.2}{}",
            record.severity.label(),
            record.tenant_name,
            record.tenant_id,
            room,
            record.days_overdue,
            record.outstanding_balance,
            last_paid
        );
    }
}

fn render_check(summary: &OverdueCheckSummary, notifications: &[OverdueNotification]) {
    println!(
        "Overdue check: {} tenants checked, {} overdue",
        summary.checked, summary.overdue
    );
    for notice in notifications {
        println!(
            "  - notified {} <{}>: {} days, ${:.2}",
            notice.tenant_id, notice.email, notice.days_overdue, notice.outstanding_balance
        );
    }
}

fn render_diagnostics(events: &[DiagnosticEvent]) {
    let notes: Vec<String> = events.iter().filter_map(describe).collect();
    if notes.is_empty() {
        return;
    }

    println!("\nDiagnostics");
    for note in notes {
        println!("- {note}");
    }
}

fn describe(event: &DiagnosticEvent) -> Option<String> {
    match event {
        DiagnosticEvent::SliceFailed {
            tenant_id,
            slice,
            error,
        } => Some(format!("{} for {tenant_id} defaulted: {error}", slice.label())),
        DiagnosticEvent::TenantLookupFailed { account_id, error } => {
            Some(format!("identity lookup for {account_id} failed: {error}"))
        }
        DiagnosticEvent::UpstreamBalanceClamped {
            tenant_id,
            reported,
            corrected,
        } => Some(format!(
            "ledger balance for {tenant_id} clamped from ${reported:.2} to ${corrected:.2}"
        )),
        DiagnosticEvent::RosterFetchFailed { error } => {
            Some(format!("overdue roster unavailable: {error}"))
        }
        _ => None,
    }
}
