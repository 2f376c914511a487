//! Subcommands.

pub mod resolve;
pub mod scan;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use vellum::config::load_config;
use vellum::project::{collect_files, Project};

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable outline
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Arguments shared by every analysis command.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Files, directories or glob patterns to analyze
    #[arg(default_value = ".")]
    pub patterns: Vec<PathBuf>,

    /// Project root that document URLs are relative to
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file path (default: <root>/vellum.config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Number of threads (default: number of CPUs)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Only show the summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Default for ProjectArgs {
    fn default() -> Self {
        Self {
            patterns: vec![PathBuf::from(".")],
            root: PathBuf::from("."),
            config: None,
            format: OutputFormat::Text,
            threads: None,
            quiet: false,
        }
    }
}

/// Load config and sources. Exits the process on a bad config or when no
/// source file matches.
pub fn open_project(args: &ProjectArgs) -> (Project, usize) {
    if let Some(threads) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            eprintln!("\x1b[33mWarning:\x1b[0m Failed to configure thread pool: {}", e);
        }
    }

    let config = match load_config(args.config.as_deref(), &args.root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            std::process::exit(2);
        }
    };

    let patterns: Vec<String> = args
        .patterns
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let files = collect_files(&patterns);
    if files.is_empty() {
        eprintln!("No source files found matching patterns: {:?}", patterns);
        std::process::exit(2);
    }

    let project = Project::load(Path::new(&args.root), &files, config.analyzer);
    for failure in &project.failures {
        eprintln!("Failed to read {}: {}", failure.path.display(), failure.error);
    }
    (project, files.len())
}
