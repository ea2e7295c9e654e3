use anyhow::Result;
use clap::Parser;
use minutegraph::{
    app,
    cli::{
        handle_cleanup_command, handle_diagram_command, handle_meetings_command, handle_search_command,
        handle_watch_command, Cli, CliCommand,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("minutegraph {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(CliCommand::Meetings(args)) => {
            handle_meetings_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::Diagram(args)) => {
            handle_diagram_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::Cleanup) => {
            handle_cleanup_command().await?;
            return Ok(());
        }
        Some(CliCommand::Watch(args)) => {
            handle_watch_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::Search(args)) => {
            handle_search_command(args).await?;
            return Ok(());
        }
        None => {}
    }

    app::run_service().await
}
