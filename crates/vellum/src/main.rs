//! # vellum
//!
//! Vellum - Component feature scanning and resolution for web component sources.
//!
//! ## Name Origin
//!
//! **Vellum** is the fine parchment that drafts were traced on, one sheet
//! over another until the full figure showed through. This binary does the
//! same with components: each file is traced on its own, then the sheets are
//! stacked along the inheritance chain to show the complete element.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, `RUST_LOG` syntax.
const LOG_ENV: &str = "VELLUM_LOG";

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "Component feature scanning and resolution", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = clap::ArgAction::Version)]
    version: (),
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the features each file declares
    #[command(visible_alias = "croquis")]
    Scan(commands::scan::ScanArgs),

    /// Resolve every entity against its inheritance chain (default command)
    Resolve(commands::resolve::ResolveArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scan(args)) => commands::scan::run(args),
        Some(Commands::Resolve(args)) => commands::resolve::run(args),
        None => commands::resolve::run(commands::resolve::ResolveArgs::default()),
    }
}
