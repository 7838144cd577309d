use crate::console::{run_chat, run_extract, run_vacuum, ChatArgs, ExtractArgs, VacuumArgs};
use crate::server;
use agent_lab::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Agent Lab",
    about = "Collect job application details from chat and resumes, or run the reflex vacuum demo",
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
    /// Collect name, email, and skills interactively on the terminal
    Chat(ChatArgs),
    /// Run the extractor once and print the resulting record as JSON
    Extract(ExtractArgs),
    /// Step the reflex vacuum agent through the 2x2 room grid
    Vacuum(VacuumArgs),
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
        Command::Chat(args) => run_chat(args),
        Command::Extract(args) => run_extract(args),
        Command::Vacuum(args) => run_vacuum(args),
    }
}
