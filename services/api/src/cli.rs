use crate::report::{run_report, ReportArgs};
use crate::server;
use crate::weights::{run_set_weights, run_show_weights, SetWeightsArgs};
use clap::{Args, Parser, Subcommand};
use settlement_readiness::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Settlement Readiness",
    about = "Score settlement readiness, risk and response priority",
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
    /// Score a snapshot export and print the ranked dashboard
    Report(ReportArgs),
    /// Inspect or replace the active scoring weights
    Weights {
        #[command(subcommand)]
        command: WeightsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WeightsCommand {
    /// Print the active weights and who saved them
    Show,
    /// Validate and save a weights JSON document
    Set(SetWeightsArgs),
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
        Command::Report(args) => run_report(args),
        Command::Weights {
            command: WeightsCommand::Show,
        } => run_show_weights(),
        Command::Weights {
            command: WeightsCommand::Set(args),
        } => run_set_weights(args),
    }
}
