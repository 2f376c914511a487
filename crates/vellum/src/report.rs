//! Text and JSON output for scans and resolutions.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use vellum_croquis::{Document, DocumentResolution, ResolvedEntity};
use vellum_relief::{Severity, Warning};

/// Warning counts across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Totals {
    pub fn count<'w>(&mut self, warnings: impl IntoIterator<Item = &'w Warning>) {
        for warning in warnings {
            match warning.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Info => self.infos += 1,
            }
        }
    }

    pub fn of_documents(docs: &[Arc<Document>]) -> Self {
        let mut totals = Self::default();
        for doc in docs {
            totals.count(doc.all_warnings());
        }
        totals
    }

    pub fn of_resolutions(resolutions: &[DocumentResolution]) -> Self {
        let mut totals = Self::default();
        for resolution in resolutions {
            totals.count(&resolution.warnings);
        }
        totals
    }
}

/// One line per problem, compiler style.
pub fn format_summary(totals: Totals, files: usize) -> String {
    let problems = totals.errors + totals.warnings;
    if problems == 0 {
        return format!("✓ {} files, no problems", files);
    }
    format!(
        "✖ {} problems ({} errors, {} warnings) in {} files",
        problems, totals.errors, totals.warnings, files
    )
}

fn push_warnings<'w>(out: &mut String, warnings: impl IntoIterator<Item = &'w Warning>) {
    for warning in warnings {
        let _ = writeln!(out, "  {}", warning);
    }
}

/// Scanned features of each document, then its warnings.
pub fn scan_text(docs: &[Arc<Document>]) -> String {
    let mut out = String::new();
    for doc in docs {
        if doc.features.is_empty() && doc.all_warnings().next().is_none() {
            continue;
        }
        let _ = writeln!(out, "{}", doc.url);
        for feature in &doc.features {
            let _ = write!(out, "  {} {}", feature.kind.as_str(), feature.display_name());
            if let Some(tag) = &feature.tag_name {
                let _ = write!(out, " <{}>", tag);
            }
            out.push('\n');
        }
        push_warnings(&mut out, doc.all_warnings());
    }
    out
}

/// Resolved entities of each document. Document-level warnings that no
/// entity carries are listed after the entities.
pub fn resolve_text(resolutions: &[DocumentResolution], docs: &[Arc<Document>]) -> String {
    let mut out = String::new();
    for resolution in resolutions {
        for entity in &resolution.entities {
            out.push_str(&entity.summary());
        }
        if let Some(doc) = docs.iter().find(|d| d.url == resolution.url) {
            push_warnings(&mut out, &doc.warnings);
        }
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanJson<'r> {
    documents: Vec<&'r Document>,
    totals: Totals,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolutionJson<'r> {
    url: &'r str,
    version: u64,
    entities: Vec<&'r ResolvedEntity>,
    warnings: &'r [Warning],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveJson<'r> {
    documents: Vec<ResolutionJson<'r>>,
    totals: Totals,
}

pub fn scan_json(docs: &[Arc<Document>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ScanJson {
        documents: docs.iter().map(|d| d.as_ref()).collect(),
        totals: Totals::of_documents(docs),
    })
}

pub fn resolve_json(resolutions: &[DocumentResolution]) -> serde_json::Result<String> {
    let documents = resolutions
        .iter()
        .map(|r| ResolutionJson {
            url: &r.url,
            version: r.version,
            entities: r.entities.iter().map(|e| e.as_ref()).collect(),
            warnings: &r.warnings,
        })
        .collect();
    serde_json::to_string_pretty(&ResolveJson {
        documents,
        totals: Totals::of_resolutions(resolutions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_croquis::{resolve_document, Analysis, ResolutionCache};

    fn fixture() -> Analysis {
        let analysis = Analysis::default();
        analysis.add_file("base.js", "export class Base { greet() {} }");
        analysis.add_file(
            "el.js",
            "import './base.js';\nclass El extends Base {}\ncustomElements.define('x-el', El);\nclass Bad extends Missing {}",
        );
        analysis
    }

    #[test]
    fn test_scan_text_lists_features_and_warnings() {
        let analysis = fixture();
        let docs = vec![analysis.scan("el.js").unwrap()];
        let text = scan_text(&docs);
        assert!(text.starts_with("el.js\n"));
        assert!(text.contains("  element El <x-el>\n"));
        assert!(text.contains("  class Bad\n"));
        assert_eq!(Totals::of_documents(&docs), Totals::default());
    }

    #[test]
    fn test_resolve_output() {
        let analysis = fixture();
        let cache = ResolutionCache::new();
        let resolutions = vec![resolve_document("el.js", &analysis, &cache).unwrap()];
        let docs = vec![analysis.scan("el.js").unwrap()];

        let text = resolve_text(&resolutions, &docs);
        assert!(text.contains("element El <x-el> (el.js#0)"));
        assert!(text.contains("could-not-resolve-reference"));

        let totals = Totals::of_resolutions(&resolutions);
        assert_eq!(totals.warnings, 1);
        assert_eq!(totals.errors, 0);
        assert_eq!(format_summary(totals, 2), "✖ 1 problems (0 errors, 1 warnings) in 2 files");

        let json: serde_json::Value = serde_json::from_str(&resolve_json(&resolutions).unwrap()).unwrap();
        assert_eq!(json["totals"]["warnings"], 1);
        assert_eq!(json["documents"][0]["url"], "el.js");
        assert_eq!(json["documents"][0]["entities"][0]["tagName"], "x-el");
    }

    #[test]
    fn test_scan_json_shape() {
        let analysis = fixture();
        let docs = vec![analysis.scan("base.js").unwrap()];
        let json: serde_json::Value = serde_json::from_str(&scan_json(&docs).unwrap()).unwrap();
        assert_eq!(json["documents"][0]["kind"], "script");
        assert_eq!(json["documents"][0]["features"][0]["name"], "Base");
        assert_eq!(json["totals"]["errors"], 0);
    }
}
