pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "engineers-api")]
#[command(about = "HTTP API server for engineer profiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the API server")]
    Start(commands::start::StartArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Start(args) => commands::start::handle(args).await,
    }
}
