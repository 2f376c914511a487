//! Documents: one parsed and scanned source file.
//!
//! A document owns its features in an arena (`Vec<ScannedEntity>`) and is
//! immutable once built. Editing a file means building a new document with a
//! new version.

use once_cell::sync::Lazy;
use oxc_allocator::Allocator;
use oxc_ast::ast::{Program, Statement};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use regex::Regex;
use serde::Serialize;
use vellum_carton::{content_version, CompactString, LineIndex};
use vellum_relief::{ScannedEntity, SourcePosition, SourceRange, Warning, WarningCode};

use crate::error::ScanResult;
use crate::options::AnalyzerOptions;
use crate::scanner::{scan_program, ScanContext};

/// Maps spans of one parse back to positions in the host file.
///
/// `base` is the byte offset of the parsed text inside the file, non-zero for
/// a script embedded in markup.
#[derive(Debug, Clone, Copy)]
pub struct SourceMapper<'d> {
    url: &'d str,
    index: &'d LineIndex,
    base: u32,
}

impl<'d> SourceMapper<'d> {
    pub fn new(url: &'d str, index: &'d LineIndex, base: u32) -> Self {
        Self { url, index, base }
    }

    #[inline]
    pub fn position(&self, offset: u32) -> SourcePosition {
        let (line, column) = self.index.line_col(self.base + offset);
        SourcePosition::new(line, column)
    }

    pub fn range(&self, span: Span) -> SourceRange {
        SourceRange::new(self.url, self.position(span.start), self.position(span.end))
    }
}

/// What kind of file a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Script,
    Html,
    Css,
}

impl DocumentKind {
    /// Guess the kind from a URL's extension. Anything unknown is a script.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        match path.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
            Some("html") | Some("htm") => Self::Html,
            Some("css") => Self::Css,
            _ => Self::Script,
        }
    }
}

/// A scanned document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub url: CompactString,
    pub kind: DocumentKind,
    /// Content hash of the source.
    pub version: u64,
    /// Resolved URLs of everything this document imports, in source order.
    pub imports: Vec<CompactString>,
    pub features: Vec<ScannedEntity>,
    /// Parse errors and warnings not owned by any feature.
    pub warnings: Vec<Warning>,
}

impl Document {
    /// Parse and scan a source file.
    pub fn parse(
        url: impl Into<CompactString>,
        source: &str,
        options: &AnalyzerOptions,
    ) -> ScanResult<Self> {
        let url = url.into();
        let kind = DocumentKind::from_url(&url);
        let index = LineIndex::new(source);
        let mut doc = Document {
            kind,
            version: content_version(source),
            imports: Vec::new(),
            features: Vec::new(),
            warnings: Vec::new(),
            url,
        };

        match kind {
            DocumentKind::Script => {
                let source_type = SourceType::from_path(doc.url.as_str()).unwrap_or_default();
                doc.scan_script(&index, source, 0, source_type, options)?;
            }
            DocumentKind::Html => {
                for link in html_imports(source) {
                    let url = resolve_href(&doc.url, &link);
                    doc.push_import(url);
                }
                for script in inline_scripts(source) {
                    let source_type = SourceType::from_path("inline.js").unwrap_or_default();
                    doc.scan_script(&index, script.text, script.base, source_type, options)?;
                }
            }
            DocumentKind::Css => {}
        }

        tracing::debug!(
            "scanned {}: {} features, {} warnings",
            doc.url,
            doc.features.len(),
            doc.warnings.len()
        );
        Ok(doc)
    }

    fn scan_script(
        &mut self,
        index: &LineIndex,
        text: &str,
        base: u32,
        source_type: SourceType,
        options: &AnalyzerOptions,
    ) -> ScanResult<()> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, text, source_type).parse();
        let url = self.url.clone();
        let mapper = SourceMapper::new(&url, index, base);
        let start = mapper.range(Span::new(0, 0));

        if ret.panicked {
            let message = match ret.errors.first() {
                Some(error) => CompactString::from(error.to_string()),
                None => CompactString::new("unrecoverable syntax error"),
            };
            self.warnings
                .push(Warning::new(WarningCode::ParseError, message, start));
            return Ok(());
        }
        for error in ret.errors.iter() {
            self.warnings.push(Warning::new(
                WarningCode::ParseError,
                error.to_string(),
                start.clone(),
            ));
        }

        for specifier in module_imports(&ret.program) {
            self.add_import(specifier);
        }

        let ctx = ScanContext::new(text, mapper, options);
        let scan = scan_program(&ctx, &ret.program)?;
        self.features.extend(scan.features);
        self.warnings.extend(scan.warnings);
        Ok(())
    }

    fn add_import(&mut self, specifier: &str) {
        let url = resolve_url(&self.url, specifier);
        self.push_import(url);
    }

    fn push_import(&mut self, url: CompactString) {
        if !self.imports.contains(&url) {
            self.imports.push(url);
        }
    }

    #[inline]
    pub fn feature(&self, index: usize) -> Option<&ScannedEntity> {
        self.features.get(index)
    }

    /// Index of the first feature with this plain or namespaced name.
    pub fn find_feature(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.matches_name(name))
    }

    /// Document warnings followed by every feature's own warnings.
    pub fn all_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .chain(self.features.iter().flat_map(|f| f.warnings.iter()))
    }
}

/// Module specifiers of `import` and re-export statements.
fn module_imports<'p>(program: &'p Program<'_>) -> impl Iterator<Item = &'p str> {
    program.body.iter().filter_map(|stmt| match stmt {
        Statement::ImportDeclaration(decl) => Some(decl.source.value.as_str()),
        Statement::ExportAllDeclaration(decl) => Some(decl.source.value.as_str()),
        Statement::ExportNamedDeclaration(decl) => {
            decl.source.as_ref().map(|source| source.value.as_str())
        }
        _ => None,
    })
}

/// Resolve a markup `href`/`src` against the host document's URL.
///
/// Unlike a module specifier, a bare path is relative to the host's
/// directory. Absolute paths and URLs with a scheme are kept as written; a
/// query or fragment is dropped.
pub fn resolve_href(from: &str, href: &str) -> CompactString {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    let path = &href[..end];
    if path.starts_with('/') || path.contains(':') {
        return CompactString::new(path);
    }
    if path.starts_with("./") || path.starts_with("../") {
        resolve_url(from, path)
    } else {
        resolve_url(from, &format!("./{path}"))
    }
}

/// Resolve an import specifier against the importing URL.
///
/// `./` and `../` specifiers are joined to the importer's directory and
/// normalized. Absolute paths and bare specifiers are kept as written.
pub fn resolve_url(from: &str, specifier: &str) -> CompactString {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return CompactString::new(specifier);
    }
    let dir = from.rfind('/').map_or("", |slash| &from[..slash]);
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    let mut escaped = 0usize;
    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    escaped += 1;
                }
            }
            part => segments.push(part),
        }
    }
    let mut url = String::new();
    if from.starts_with('/') {
        url.push('/');
    }
    for _ in 0..escaped {
        url.push_str("../");
    }
    url.push_str(&segments.join("/"));
    CompactString::from(url)
}

/// An inline script inside markup.
struct InlineScript<'s> {
    text: &'s str,
    base: u32,
}

static SCRIPT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").ok());

static LINK_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?is)<link\b([^>]*)>").ok());

static ATTR_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"(?i)\b([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).ok()
});

fn attribute<'t>(attrs: &'t str, name: &str) -> Option<&'t str> {
    ATTR_RE.as_ref()?.captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?;
        if !key.as_str().eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|value| value.as_str())
    })
}

fn is_script_type(attrs: &str) -> bool {
    match attribute(attrs, "type") {
        None => true,
        Some(kind) => {
            let kind = kind.to_ascii_lowercase();
            kind == "module" || kind.contains("javascript") || kind.contains("ecmascript")
        }
    }
}

fn inline_scripts(source: &str) -> Vec<InlineScript<'_>> {
    let Some(re) = SCRIPT_RE.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(source)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let body = caps.get(2)?;
            if attribute(attrs, "src").is_some() || !is_script_type(attrs) {
                return None;
            }
            if body.as_str().trim().is_empty() {
                return None;
            }
            Some(InlineScript {
                text: body.as_str(),
                base: u32::try_from(body.start()).ok()?,
            })
        })
        .collect()
}

/// `<link rel="import" href>` targets and `<script src>` sources.
fn html_imports(source: &str) -> Vec<CompactString> {
    let mut out = Vec::new();
    if let Some(re) = LINK_RE.as_ref() {
        for caps in re.captures_iter(source) {
            let Some(attrs) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            let is_import = attribute(attrs, "rel").is_some_and(|rel| rel.eq_ignore_ascii_case("import"));
            if let (true, Some(href)) = (is_import, attribute(attrs, "href")) {
                out.push(CompactString::new(href));
            }
        }
    }
    if let Some(re) = SCRIPT_RE.as_ref() {
        for caps in re.captures_iter(source) {
            if let Some(src) = caps.get(1).and_then(|attrs| attribute(attrs.as_str(), "src")) {
                out.push(CompactString::new(src));
            }
        }
    }
    out
}
