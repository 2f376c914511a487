//! The document set: where references are looked up.
//!
//! [`DocumentSet`] is the lookup contract the resolver consumes. [`Analysis`]
//! is the in-memory implementation: it holds sources, scans a document the
//! first time anything asks for it and keeps the result until the file
//! changes.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;
use serde::Serialize;
use vellum_carton::{content_version, CompactString, FxHashSet, FxIndexMap};
use vellum_relief::{EntityKind, ReferenceKind, ScannedEntity};

use crate::document::Document;
use crate::error::{ScanError, ScanResult};
use crate::options::{AnalyzerOptions, DEFAULT_MAX_CHAIN_DEPTH};

/// Address of a feature: its document and its index in that document's
/// feature list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FeatureId {
    pub document: CompactString,
    pub index: usize,
}

impl FeatureId {
    pub fn new(document: impl Into<CompactString>, index: usize) -> Self {
        Self {
            document: document.into(),
            index,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document, self.index)
    }
}

/// Whether a reference of this kind may point at an entity of that kind.
pub fn accepts(reference: ReferenceKind, entity: EntityKind) -> bool {
    match reference {
        ReferenceKind::Superclass => matches!(entity, EntityKind::Class | EntityKind::Element),
        ReferenceKind::Mixin => entity == EntityKind::Mixin,
        ReferenceKind::Behavior => entity == EntityKind::Behavior,
    }
}

fn find_in(doc: &Document, name: &str, kind: ReferenceKind) -> Option<usize> {
    doc.features
        .iter()
        .position(|f: &ScannedEntity| accepts(kind, f.kind) && f.matches_name(name))
}

/// Version of every document a computation read, by URL. `None` records a
/// URL that was looked up but not present.
pub type Dependencies = FxIndexMap<CompactString, Option<u64>>;

/// Lookup collaborator for resolution.
pub trait DocumentSet: Sync {
    /// The scanned document at `url`, or `None` if the set has no such file.
    fn document(&self, url: &str) -> ScanResult<Option<Arc<Document>>>;

    /// Longest acyclic chain the resolver follows.
    fn max_chain_depth(&self) -> usize {
        DEFAULT_MAX_CHAIN_DEPTH
    }

    /// Documents `url` imports directly, in import order. Imports the set
    /// does not know are skipped.
    fn imported_documents(&self, url: &str) -> ScanResult<Vec<Arc<Document>>> {
        let Some(doc) = self.document(url)? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(doc.imports.len());
        for import in &doc.imports {
            if let Some(imported) = self.document(import)? {
                out.push(imported);
            }
        }
        Ok(out)
    }

    /// Find the entity a reference names, looking in `from` first and then
    /// through its transitive imports breadth-first.
    fn resolve(&self, name: &str, from: &str, kind: ReferenceKind) -> ScanResult<Option<FeatureId>> {
        self.resolve_recorded(name, from, kind, &mut Dependencies::default())
    }

    /// [`DocumentSet::resolve`], recording every document the search read.
    ///
    /// Whatever the outcome, a change to any recorded document may change
    /// it, including a recorded import that the set does not have yet.
    fn resolve_recorded(
        &self,
        name: &str,
        from: &str,
        kind: ReferenceKind,
        read: &mut Dependencies,
    ) -> ScanResult<Option<FeatureId>> {
        let mut seen: FxHashSet<CompactString> = FxHashSet::default();
        let mut queue: VecDeque<Arc<Document>> = VecDeque::new();
        seen.insert(CompactString::new(from));
        match self.document(from)? {
            Some(doc) => {
                read.entry(doc.url.clone()).or_insert(Some(doc.version));
                queue.push_back(doc);
            }
            None => {
                read.entry(CompactString::new(from)).or_insert(None);
            }
        }
        while let Some(doc) = queue.pop_front() {
            if let Some(index) = find_in(&doc, name, kind) {
                return Ok(Some(FeatureId::new(doc.url.clone(), index)));
            }
            for import in &doc.imports {
                if !seen.insert(import.clone()) {
                    continue;
                }
                match self.document(import)? {
                    Some(imported) => {
                        read.entry(imported.url.clone())
                            .or_insert(Some(imported.version));
                        queue.push_back(imported);
                    }
                    None => {
                        read.entry(import.clone()).or_insert(None);
                    }
                }
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone)]
struct Source {
    text: Arc<str>,
    version: u64,
}

/// In-memory document set with scan-on-demand.
pub struct Analysis {
    options: AnalyzerOptions,
    sources: DashMap<CompactString, Source>,
    documents: DashMap<CompactString, Arc<Document>>,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(AnalyzerOptions::default())
    }
}

impl Analysis {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            sources: DashMap::new(),
            documents: DashMap::new(),
        }
    }

    #[inline]
    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Register a file. Replaces any earlier source for the same URL.
    pub fn add_file(&self, url: impl Into<CompactString>, source: impl Into<Arc<str>>) {
        let text: Arc<str> = source.into();
        let version = content_version(&text);
        let url = url.into();
        self.documents.remove(&url);
        self.sources.insert(url, Source { text, version });
    }

    /// Replace a file's source. Its scanned document is dropped and rebuilt on
    /// the next lookup.
    pub fn update_file(&self, url: impl Into<CompactString>, source: impl Into<Arc<str>>) {
        self.add_file(url, source);
    }

    /// Forget a file. Returns whether it was registered.
    pub fn remove_file(&self, url: &str) -> bool {
        self.documents.remove(url);
        self.sources.remove(url).is_some()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.sources.contains_key(url)
    }

    /// Registered URLs, sorted.
    pub fn urls(&self) -> Vec<CompactString> {
        let mut urls: Vec<CompactString> = self.sources.iter().map(|r| r.key().clone()).collect();
        urls.sort();
        urls
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The scanned document for `url`, scanning it if needed.
    pub fn scan(&self, url: &str) -> ScanResult<Arc<Document>> {
        let source = self
            .sources
            .get(url)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ScanError::MissingSource(CompactString::new(url)))?;

        let cached = self.documents.get(url).map(|entry| Arc::clone(entry.value()));
        if let Some(doc) = cached {
            if doc.version == source.version {
                return Ok(doc);
            }
            tracing::debug!("dropping stale scan of {}", url);
        }

        let doc = Arc::new(Document::parse(url, &source.text, &self.options)?);
        self.documents
            .insert(CompactString::new(url), Arc::clone(&doc));
        Ok(doc)
    }

    /// Scan every registered file in parallel.
    ///
    /// Returns one settled result per URL, sorted by URL. A failing document
    /// does not affect the others.
    pub fn scan_all(&self) -> Vec<(CompactString, ScanResult<Arc<Document>>)> {
        self.urls()
            .into_par_iter()
            .map(|url| {
                let result = self.scan(&url);
                if let Err(e) = &result {
                    tracing::warn!("failed to scan {}: {}", url, e);
                }
                (url, result)
            })
            .collect()
    }
}

impl DocumentSet for Analysis {
    fn document(&self, url: &str) -> ScanResult<Option<Arc<Document>>> {
        if !self.contains(url) {
            return Ok(None);
        }
        self.scan(url).map(Some)
    }

    fn max_chain_depth(&self) -> usize {
        self.options.max_chain_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(files: &[(&str, &str)]) -> Analysis {
        let analysis = Analysis::default();
        for (url, source) in files {
            analysis.add_file(*url, *source);
        }
        analysis
    }

    #[test]
    fn test_reference_kind_filter() {
        assert!(accepts(ReferenceKind::Superclass, EntityKind::Class));
        assert!(accepts(ReferenceKind::Superclass, EntityKind::Element));
        assert!(!accepts(ReferenceKind::Superclass, EntityKind::Mixin));
        assert!(accepts(ReferenceKind::Mixin, EntityKind::Mixin));
        assert!(!accepts(ReferenceKind::Behavior, EntityKind::Class));
    }

    #[test]
    fn test_scan_is_cached_until_update() {
        let set = analysis(&[("a.js", "class A {}")]);
        let first = set.scan("a.js").unwrap();
        let again = set.scan("a.js").unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        set.update_file("a.js", "class A {}\nclass B {}");
        let updated = set.scan("a.js").unwrap();
        assert_ne!(first.version, updated.version);
        assert_eq!(updated.features.len(), 2);
    }

    #[test]
    fn test_missing_source() {
        let set = Analysis::default();
        assert_eq!(
            set.scan("nope.js").unwrap_err(),
            ScanError::MissingSource("nope.js".into())
        );
        assert!(set.document("nope.js").unwrap().is_none());
    }

    #[test]
    fn test_resolve_prefers_local_then_nearest_import() {
        let set = analysis(&[
            ("app/el.js", "import './near.js';\nclass Local {}"),
            ("app/near.js", "import './far.js';\nclass Base {}"),
            ("app/far.js", "class Base {}\nclass Deep {}"),
        ]);
        let local = set.resolve("Local", "app/el.js", ReferenceKind::Superclass).unwrap();
        assert_eq!(local, Some(FeatureId::new("app/el.js", 0)));

        let base = set.resolve("Base", "app/el.js", ReferenceKind::Superclass).unwrap();
        assert_eq!(base, Some(FeatureId::new("app/near.js", 0)));

        let deep = set.resolve("Deep", "app/el.js", ReferenceKind::Superclass).unwrap();
        assert_eq!(deep, Some(FeatureId::new("app/far.js", 1)));

        let wrong_kind = set.resolve("Base", "app/el.js", ReferenceKind::Mixin).unwrap();
        assert_eq!(wrong_kind, None);
    }

    #[test]
    fn test_resolve_records_every_document_read() {
        let set = analysis(&[
            ("app/el.js", "import './near.js';\nimport './gone.js';"),
            ("app/near.js", "import './far.js';"),
            ("app/far.js", "class Base {}"),
        ]);
        let mut read = Dependencies::default();
        let base = set
            .resolve_recorded("Base", "app/el.js", ReferenceKind::Superclass, &mut read)
            .unwrap();
        assert_eq!(base, Some(FeatureId::new("app/far.js", 0)));
        let urls: Vec<&str> = read.keys().map(|k| k.as_str()).collect();
        assert_eq!(urls, vec!["app/el.js", "app/near.js", "app/gone.js", "app/far.js"]);
        assert_eq!(read["app/gone.js"], None);
        assert_eq!(
            read["app/near.js"],
            Some(set.scan("app/near.js").unwrap().version)
        );

        let mut read = Dependencies::default();
        let missing = set
            .resolve_recorded("Nope", "app/far.js", ReferenceKind::Superclass, &mut read)
            .unwrap();
        assert_eq!(missing, None);
        assert_eq!(read.len(), 1);
    }

    #[test]
    fn test_imported_documents_skip_unknown_urls() {
        let set = analysis(&[
            ("app/el.js", "import './a.js';\nimport './gone.js';\nimport 'pkg';"),
            ("app/a.js", ""),
        ]);
        let imported = set.imported_documents("app/el.js").unwrap();
        let urls: Vec<&str> = imported.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["app/a.js"]);
        assert!(set.imported_documents("nope.js").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_survives_import_cycles() {
        let set = analysis(&[
            ("a.js", "import './b.js';"),
            ("b.js", "import './a.js';"),
        ]);
        assert_eq!(set.resolve("Nope", "a.js", ReferenceKind::Superclass).unwrap(), None);
    }

    #[test]
    fn test_scan_all_is_settled_and_sorted() {
        let set = analysis(&[("b.js", "class B {}"), ("a.js", "class A {}")]);
        let results = set.scan_all();
        let urls: Vec<&str> = results.iter().map(|(url, _)| url.as_str()).collect();
        assert_eq!(urls, vec!["a.js", "b.js"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn test_remove_file() {
        let set = analysis(&[("a.js", "class A {}")]);
        assert!(set.remove_file("a.js"));
        assert!(!set.remove_file("a.js"));
        assert!(set.is_empty());
    }
}
