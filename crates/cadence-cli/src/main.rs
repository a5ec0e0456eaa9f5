mod client;
mod commands;
mod daemon_launcher;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence CLI - Study cycles with random micro-breaks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a study cycle, launching the daemon if needed
    Start {
        /// Cycle length in minutes for this session (1-180)
        #[arg(short, long)]
        minutes: Option<u64>,
    },
    /// Stop the session and record the time studied so far
    Stop,
    /// Pause the session (toggles back when already paused)
    Pause,
    /// Resume a paused session
    Resume,
    /// Close the break currently shown
    Dismiss,
    /// Show the timer status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change the study settings
    Settings {
        /// Default cycle length in minutes (1-180)
        #[arg(long)]
        cycle: Option<u64>,
        /// Short break spacing, e.g. 3-5min or 10-15min
        #[arg(long)]
        interval: Option<String>,
        /// Pause playing media during breaks
        #[arg(long)]
        auto_pause_media: Option<bool>,
        /// Resume media paused by a break
        #[arg(long)]
        auto_resume_media: Option<bool>,
    },
    /// Delete the recorded study history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Study totals per day, week, month or year
    Stats {
        #[arg(short, long, default_value = "day")]
        period: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sessions recorded on one day
    History {
        /// Day as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { minutes } => commands::start(minutes).await,
        Commands::Stop => commands::stop().await,
        Commands::Pause => commands::pause().await,
        Commands::Resume => commands::resume().await,
        Commands::Dismiss => commands::dismiss().await,
        Commands::Status { json } => commands::status(json).await,
        Commands::Settings {
            cycle,
            interval,
            auto_pause_media,
            auto_resume_media,
        } => {
            commands::settings(commands::SettingsArgs {
                cycle,
                interval,
                auto_pause_media,
                auto_resume_media,
            })
            .await
        }
        Commands::Clear { yes } => commands::clear(yes).await,
        Commands::Stats { period, json } => commands::stats(&period, json),
        Commands::History { date } => commands::history(date.as_deref()),
    }
}
