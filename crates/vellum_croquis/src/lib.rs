//! # vellum_croquis
//!
//! Croquis - Feature scanning and cross-file resolution for Vellum.
//!
//! ## Name Origin
//!
//! **Croquis** (/kʁɔ.ki/) is a French term for a quick, sketchy drawing that captures
//! the essential features of a subject. `vellum_croquis` sketches components the
//! same way: a fast pass over each file that captures what it declares, then a
//! second look across files to fill in what each component inherits.
//!
//! ## Purpose
//!
//! - **Scanning**: walk an oxc syntax tree with independent declaration
//!   scanners (classes, mixins, registrations, prototype members, behaviors,
//!   `Polymer({...})` calls) and produce [`vellum_relief::ScannedEntity`] values
//! - **Classification**: split classes into elements, mixins and plain classes
//! - **Merging**: combine partial declarations of the same member
//! - **Resolution**: linearize an entity's mixins, superclass and behaviors
//!   across documents and fold them into one effective shape
//!
//! ## Architecture
//!
//! ```text
//!   oxc_parser (Parse)
//!        ↓
//!   walker → scanner/* → classify → merge   (one document)
//!        ↓
//!   analysis::DocumentSet                   (many documents)
//!        ↓
//!   resolve::Resolver → ResolvedEntity
//! ```
//!
//! ## Usage
//!
//! ```
//! use vellum_croquis::{resolve_document, Analysis, ResolutionCache};
//!
//! let analysis = Analysis::default();
//! analysis.add_file("base.js", "export class Base { greet() {} }");
//! analysis.add_file(
//!     "el.js",
//!     "import { Base } from './base.js';\n\
//!      class El extends Base {}\n\
//!      customElements.define('x-el', El);",
//! );
//!
//! let cache = ResolutionCache::new();
//! let resolved = resolve_document("el.js", &analysis, &cache).unwrap();
//! let el = &resolved.entities[0];
//! assert_eq!(el.tag_name.as_deref(), Some("x-el"));
//! assert!(el.methods.contains_key("greet"));
//! ```

// Leaf modules
pub mod annotation;
pub mod helpers;
pub mod walker;

// Scanning
mod members;
pub mod classify;
pub mod document;
pub mod merge;
pub mod scanner;

// Cross-file
pub mod analysis;
pub mod resolve;

pub mod error;
pub mod options;

pub use analysis::{Analysis, Dependencies, DocumentSet, FeatureId};
pub use classify::{classify, Classification};
pub use document::{resolve_url, Document, DocumentKind, SourceMapper};
pub use error::{MergeError, ResolveError, ResolveResult, ScanError, ScanResult};
pub use merge::{merge, merge_into, merge_over, Mergeable};
pub use options::AnalyzerOptions;
pub use resolve::{
    resolve_document, resolve_feature, DocumentResolution, ResolutionCache, ResolvedEntity,
    Resolver,
};
pub use scanner::{scan_program, ScanContext, ScriptScan};
pub use walker::{walk, Node, NodeKind, Visitor, WalkAction, WalkOutcome, WalkPath};
