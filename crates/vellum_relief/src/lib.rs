//! Relief - The sculptured feature surface for Vellum.
//!
//! Everything the scanners discover and the resolver hands to the IDE and build
//! layers is described here. Types are plain owned data: nothing in this crate
//! borrows from a syntax tree, so a scanned entity outlives the parse that
//! produced it and points back at its node only through a [`SyntaxNodeId`].
//!
//! ## Layout
//!
//! - [`source`]: positions, ranges and syntax node identities
//! - [`warning`]: structured, non-fatal diagnostics
//! - [`annotation`]: parsed documentation comments
//! - [`privacy`]: public / protected / private, explicit or inferred
//! - [`feature`]: scanned entities and their members

pub mod annotation;
pub mod feature;
pub mod privacy;
pub mod source;
pub mod warning;

pub use annotation::{Annotation, AnnotationTag};
pub use feature::*;
pub use privacy::{get_or_infer_privacy, infer_privacy, Privacy};
pub use source::{SourcePosition, SourceRange, SyntaxNodeId};
pub use warning::{Severity, Warning, WarningCode};
