//! # Vellum
//!
//! Component feature scanning and cross-file resolution, written in Rust.
//!
//! This crate re-exports the Vellum sub-crates for unified documentation and
//! holds the pieces the command-line interface is built from.
//!
//! ## Crates
//!
//! - [`carton`] - Shared containers, hashing and line indexing
//! - [`relief`] - Feature records, source ranges and warnings
//! - [`croquis`] - Scanners, merge, classification and resolution
//!
//! ## Modules
//!
//! - [`config`] - `vellum.config.json` loading
//! - [`project`] - Source discovery and loading into an analysis
//! - [`report`] - Text and JSON output

/// Shared containers, hashing and line indexing.
pub use vellum_carton as carton;

/// Feature records, source ranges and warnings.
pub use vellum_relief as relief;

/// Scanners, merge, classification and resolution.
pub use vellum_croquis as croquis;

pub mod config;
pub mod project;
pub mod report;
