//! Resolve command - Resolve every entity against its inheritance chain

use std::time::Instant;

use clap::Args;
use rayon::prelude::*;
use vellum::croquis::{ResolutionCache, Resolver};
use vellum::report::{format_summary, resolve_json, resolve_text, Totals};

use super::{open_project, OutputFormat, ProjectArgs};

#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Override the longest inheritance chain to follow
    #[arg(long)]
    pub max_chain_depth: Option<usize>,
}

pub fn run(args: ResolveArgs) {
    let start = Instant::now();
    let (project, file_count) = open_project(&args.project);
    let analysis = &project.analysis;

    let cache = ResolutionCache::new();
    let mut resolver = Resolver::new(analysis, &cache);
    if let Some(depth) = args.max_chain_depth {
        resolver = resolver.with_max_chain_depth(depth);
    }

    // Each document settles on its own; one failure does not stop the rest.
    let results: Vec<_> = analysis
        .urls()
        .into_par_iter()
        .map(|url| {
            let result = resolver.resolve_document(&url);
            (url, result)
        })
        .collect();

    let mut resolutions = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for (url, result) in results {
        match result {
            Ok(resolution) => resolutions.push(resolution),
            Err(e) => {
                eprintln!("Failed to resolve {}: {}", url, e);
                failed += 1;
            }
        }
    }
    let totals = Totals::of_resolutions(&resolutions);
    tracing::debug!("resolution cache holds {} entries", cache.len());

    match args.project.format {
        OutputFormat::Json => match resolve_json(&resolutions) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize output: {}", e);
                std::process::exit(2);
            }
        },
        OutputFormat::Text => {
            if !args.project.quiet {
                let docs: Vec<_> = resolutions
                    .iter()
                    .filter_map(|r| analysis.scan(&r.url).ok())
                    .collect();
                print!("{}", resolve_text(&resolutions, &docs));
            }
            println!("\n{}", format_summary(totals, file_count));
            println!("Resolved {} files in {:.4?}", file_count, start.elapsed());
        }
    }

    if totals.errors > 0 || failed > 0 || !project.failures.is_empty() {
        std::process::exit(1);
    }
}
