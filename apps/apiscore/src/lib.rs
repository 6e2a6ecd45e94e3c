//! apiscore core library.
//!
//! This crate exposes programmatic APIs for scoring OpenAPI 3.x documents:
//! seven independent analyzers each produce a criterion score and issues,
//! and an aggregator folds them into a 0-100 score with a letter grade.
//!
//! High-level modules:
//! - `analyzers`: The seven criterion analyzers and the shared score helper.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `error`: Error enums for loading, analysis, reports, and config.
//! - `gate`: Pass/fail verdict for CI use.
//! - `load`: JSON/YAML acquisition, structural validation, `$ref` checks.
//! - `models`: Issues, results, the criterion registry, and document views.
//! - `output`: Human/JSON/Markdown printers for the CLI.
//! - `report`: JSON, Markdown, and HTML report rendering and export.
//! - `scoring`: The aggregator running analyzers fail-soft.
//! - `utils`: Supporting helpers.
//!
//! ```no_run
//! use apiscore::{load, scoring::ScoringEngine};
//!
//! let doc = load::load_document(std::path::Path::new("openapi.yaml")).unwrap();
//! let result = ScoringEngine::default().score(&doc);
//! println!("{} ({})", result.overall_score, result.grade);
//! ```
pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod load;
pub mod models;
pub mod output;
pub mod report;
pub mod scoring;
pub mod utils;
