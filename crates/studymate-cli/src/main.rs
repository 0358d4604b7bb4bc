use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studymate-cli", version, about = "Studymate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily check-in
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Points ledger
    Points {
        #[command(subcommand)]
        action: commands::points::PointsAction,
    },
    /// Study statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Achievement catalog and progress
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
    /// Drive a study session from the terminal
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Preference management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Points { action } => commands::points::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Achievements { action } => commands::achievements::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
