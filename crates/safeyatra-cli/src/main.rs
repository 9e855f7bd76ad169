use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "safeyatra-cli", version, about = "SafeYatra tourist safety CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Safety check-ins
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Send an immediate emergency alert
    Panic(commands::emergency::PanicArgs),
    /// Call the police emergency number
    Sos(commands::emergency::SosArgs),
    /// Register a tourist and print the profile
    Register(commands::register::RegisterArgs),
    /// Nearby facilities, police stations and region briefings
    Directory {
        #[command(subcommand)]
        action: commands::directory::DirectoryAction,
    },
    /// Safety news feed
    News(commands::directory::NewsArgs),
    /// Chat with a police station
    Chat(commands::chat::ChatArgs),
    /// Authority dashboard
    Authority {
        #[command(subcommand)]
        action: commands::authority::AuthorityAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SAFEYATRA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Panic(args) => commands::emergency::panic(args),
        Commands::Sos(args) => commands::emergency::sos(args),
        Commands::Register(args) => commands::register::run(args),
        Commands::Directory { action } => commands::directory::run(action),
        Commands::News(args) => commands::directory::news(args),
        Commands::Chat(args) => commands::chat::run(args),
        Commands::Authority { action } => commands::authority::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
