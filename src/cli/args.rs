use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "minutegraph")]
#[command(about = "Meeting transcripts, summaries and diagrams", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// List recent meetings and their recordings
    Meetings(MeetingsCliArgs),
    /// Print the Mermaid diagram built from a meeting's stored summary
    Diagram(DiagramCliArgs),
    /// Delete recordings and diagrams past the retention window
    Cleanup,
    /// Follow a meeting on a running server, printing changes as they arrive
    Watch(WatchCliArgs),
    /// Search a meeting's transcripts
    Search(SearchCliArgs),
}

#[derive(ClapArgs, Debug)]
pub struct MeetingsCliArgs {
    /// Maximum number of meetings to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

#[derive(ClapArgs, Debug)]
pub struct DiagramCliArgs {
    pub meeting_id: String,
}

#[derive(ClapArgs, Debug)]
pub struct WatchCliArgs {
    pub meeting_id: String,
    /// Base URL of the minutegraph server (defaults to the configured bind address)
    #[arg(long)]
    pub server: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct SearchCliArgs {
    pub meeting_id: String,
    /// Text to look for (case-insensitive, literal)
    pub term: String,
}
