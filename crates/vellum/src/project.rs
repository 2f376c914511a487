//! Source discovery and loading.
//!
//! Files are addressed by URL: their path relative to the project root with
//! `/` separators, so that `import './base.js'` in `app/el.js` finds
//! `app/base.js` through the same URL arithmetic the scanner uses.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use glob::glob;
use ignore::Walk;
use rayon::prelude::*;
use vellum_carton::CompactString;
use vellum_croquis::{Analysis, AnalyzerOptions};

/// Extensions the scanner knows how to read.
pub const SOURCE_EXTENSIONS: [&str; 6] = ["js", "mjs", "cjs", "ts", "html", "htm"];

pub fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn in_node_modules(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "node_modules")
}

/// Collect source files from glob patterns and directories.
///
/// Directories are walked respecting `.gitignore`; globs are expanded as
/// written. `node_modules` is always skipped. The result is sorted and free
/// of duplicates.
pub fn collect_files(patterns: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = patterns
        .iter()
        .flat_map(|pattern| {
            if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
                glob(pattern)
                    .ok()
                    .into_iter()
                    .flatten()
                    .filter_map(|r| r.ok())
                    .filter(|p| p.is_file() && is_source(p) && !in_node_modules(p))
                    .collect::<Vec<_>>()
            } else {
                Walk::new(pattern)
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
                    .map(|e| e.into_path())
                    .filter(|p| is_source(p) && !in_node_modules(p))
                    .collect::<Vec<_>>()
            }
        })
        .collect();
    files.sort();
    files.dedup();
    files
}

/// URL of `path` relative to `root`.
///
/// Paths outside the root keep their own components.
pub fn url_for(root: &Path, path: &Path) -> CompactString {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut url = String::new();
    for component in relative.components() {
        let part = match component {
            Component::Normal(part) => part.to_string_lossy(),
            Component::ParentDir => "..".into(),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
        };
        if !url.is_empty() {
            url.push('/');
        }
        url.push_str(&part);
    }
    CompactString::from(url)
}

/// A file that could not be read.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// An analysis over files on disk.
pub struct Project {
    pub root: PathBuf,
    pub analysis: Analysis,
    pub failures: Vec<LoadFailure>,
}

impl Project {
    /// Read `files` in parallel and register them under their URLs.
    pub fn load(root: &Path, files: &[PathBuf], options: AnalyzerOptions) -> Self {
        let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let analysis = Analysis::new(options);

        let failures: Vec<LoadFailure> = files
            .par_iter()
            .filter_map(|path| {
                let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                match fs::read_to_string(&absolute) {
                    Ok(source) => {
                        analysis.add_file(url_for(&root, &absolute), source);
                        None
                    }
                    Err(error) => {
                        tracing::warn!("failed to read {}: {}", path.display(), error);
                        Some(LoadFailure {
                            path: path.clone(),
                            error,
                        })
                    }
                }
            })
            .collect();

        tracing::debug!(
            "loaded {} files from {} ({} unreadable)",
            analysis.len(),
            root.display(),
            failures.len()
        );

        Self {
            root,
            analysis,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_croquis::{resolve_document, ResolutionCache};

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_url_for() {
        let root = Path::new("/work/app");
        assert_eq!(url_for(root, Path::new("/work/app/src/el.js")), "src/el.js");
        assert_eq!(url_for(Path::new("."), Path::new("./el.js")), "el.js");
        assert_eq!(url_for(root, Path::new("lib/../x.js")), "lib/../x.js");
    }

    #[test]
    fn test_is_source() {
        assert!(is_source(Path::new("a/b.js")));
        assert!(is_source(Path::new("index.html")));
        assert!(!is_source(Path::new("README.md")));
        assert!(!is_source(Path::new("Makefile")));
    }

    #[test]
    fn test_collect_files_skips_node_modules_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/el.js", "class El {}");
        write(root, "src/index.html", "<p></p>");
        write(root, "src/notes.md", "# notes");
        write(root, "node_modules/dep/index.js", "class Dep {}");

        let pattern = root.to_string_lossy().to_string();
        let files = collect_files(&[pattern.clone(), pattern]);
        let urls: Vec<CompactString> = files.iter().map(|f| url_for(root, f)).collect();
        assert_eq!(urls, vec!["src/el.js", "src/index.html"]);
    }

    #[test]
    fn test_load_resolves_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let files = vec![
            write(root, "app/base.js", "export class Base { greet() {} }"),
            write(
                root,
                "app/el.js",
                "import { Base } from './base.js';\nclass El extends Base {}\ncustomElements.define('x-el', El);",
            ),
        ];

        let project = Project::load(root, &files, AnalyzerOptions::default());
        assert!(project.failures.is_empty());
        assert_eq!(project.analysis.urls(), vec!["app/base.js", "app/el.js"]);

        let cache = ResolutionCache::new();
        let resolution = resolve_document("app/el.js", &project.analysis, &cache).unwrap();
        let el = &resolution.entities[0];
        assert_eq!(el.tag_name.as_deref(), Some("x-el"));
        assert_eq!(el.methods["greet"].inherited_from.as_deref(), Some("Base"));
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.js");
        let project = Project::load(dir.path(), &[missing.clone()], AnalyzerOptions::default());
        assert_eq!(project.failures.len(), 1);
        assert_eq!(project.failures[0].path, missing);
        assert!(project.analysis.is_empty());
    }
}
