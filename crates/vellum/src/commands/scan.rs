//! Scan command - List the features each file declares

use std::time::Instant;

use clap::Args;
use vellum::report::{format_summary, scan_json, scan_text, Totals};

use super::{open_project, OutputFormat, ProjectArgs};

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run(args: ScanArgs) {
    let start = Instant::now();
    let (project, file_count) = open_project(&args.project);

    let mut docs = Vec::with_capacity(file_count);
    let mut failed = 0usize;
    for (url, result) in project.analysis.scan_all() {
        match result {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                eprintln!("Failed to scan {}: {}", url, e);
                failed += 1;
            }
        }
    }
    let totals = Totals::of_documents(&docs);

    match args.project.format {
        OutputFormat::Json => match scan_json(&docs) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize output: {}", e);
                std::process::exit(2);
            }
        },
        OutputFormat::Text => {
            if !args.project.quiet {
                print!("{}", scan_text(&docs));
            }
            println!("\n{}", format_summary(totals, file_count));
            println!("Scanned {} files in {:.4?}", file_count, start.elapsed());
        }
    }

    if totals.errors > 0 || failed > 0 || !project.failures.is_empty() {
        std::process::exit(1);
    }
}
