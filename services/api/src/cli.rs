use crate::demo::{
    run_dashboard, run_demo, run_overdue_check, run_overdue_report, DashboardArgs, DemoArgs,
    OverdueCheckArgs, OverdueReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tenant_ledger::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tenant Ledger",
    about = "Serve and inspect tenant dashboards, balances, and overdue rent from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render one tenant's dashboard, optionally refreshing on an interval
    Dashboard(DashboardArgs),
    /// Overdue rent triage for the operations team
    Overdue {
        #[command(subcommand)]
        command: OverdueCommand,
    },
    /// Walk through every dashboard and the overdue roster using the bundled demo data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum OverdueCommand {
    /// Classify the overdue roster by severity and print aggregate statistics
    Report(OverdueReportArgs),
    /// Trigger the overdue sweep and list the notifications it produced
    Check(OverdueCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Dashboard(args) => run_dashboard(args).await,
        Command::Overdue {
            command: OverdueCommand::Report(args),
        } => run_overdue_report(args).await,
        Command::Overdue {
            command: OverdueCommand::Check(args),
        } => run_overdue_check(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
