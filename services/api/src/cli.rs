use crate::demo::{run_demo, run_flows_list, run_flows_show, run_report_export, DemoArgs, ExportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kyc_review::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KYC Review",
    about = "Resolve onboarding flow requirements and compile verification reports",
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
    /// Compile verification reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Inspect the onboarding flow catalog
    Flows {
        #[command(subcommand)]
        command: FlowsCommand,
    },
    /// Compile a report for a synthetic applicant
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Compile a report from an applicant JSON file and save it as a PDF
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
enum FlowsCommand {
    /// List every flow with its required steps
    List,
    /// Show the resolved steps and field visibility for one flow name
    Show {
        /// Flow name; unknown names resolve to the default flow
        name: String,
    },
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
        Command::Report {
            command: ReportCommand::Export(args),
        } => run_report_export(args),
        Command::Flows {
            command: FlowsCommand::List,
        } => run_flows_list(),
        Command::Flows {
            command: FlowsCommand::Show { name },
        } => run_flows_show(&name),
        Command::Demo(args) => run_demo(args),
    }
}
