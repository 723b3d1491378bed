use crate::report::{run_evaluate, run_weights_show, EvaluateArgs, WeightsShowArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use store_kpi::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Store KPI Scoring",
    about = "Score retail store performance and sanction tiers from the command line or over HTTP",
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
    /// Score a batch of store/period inputs from a JSON file
    Evaluate(EvaluateArgs),
    /// Inspect the complaint weight configuration
    Weights {
        #[command(subcommand)]
        command: WeightsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WeightsCommand {
    /// Print the resolved weight for every complaint channel
    Show(WeightsShowArgs),
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
        Command::Evaluate(args) => run_evaluate(args),
        Command::Weights {
            command: WeightsCommand::Show(args),
        } => run_weights_show(args),
    }
}
