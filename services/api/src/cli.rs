use crate::demo::{
    run_demo, run_nps_summary, run_nps_template, run_transform, DemoArgs, NpsSummaryArgs,
    NpsTemplateArgs, TransformArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use prototype_config::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Prototype Configuration Service",
    about = "Turn discovery questionnaire answers into tool configurations from the command line",
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
    /// Transform a discovery answers document into a tool configuration
    Transform(TransformArgs),
    /// Work with NPS account data under a discovered configuration
    Nps {
        #[command(subcommand)]
        command: NpsCommand,
    },
    /// Walk through all three tools with sample discovery answers
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum NpsCommand {
    /// Import an NPS CSV export and print the account hub summary
    Summary(NpsSummaryArgs),
    /// Print the CSV import template for the configured attributes
    Template(NpsTemplateArgs),
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
        Command::Transform(args) => run_transform(args),
        Command::Nps {
            command: NpsCommand::Summary(args),
        } => run_nps_summary(args),
        Command::Nps {
            command: NpsCommand::Template(args),
        } => run_nps_template(args),
        Command::Demo(args) => run_demo(args),
    }
}
