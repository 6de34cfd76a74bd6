//! repolens - Static analysis and dependency graphs for Python codebases
//!
//! Parses Python sources into structured metadata, resolves imports to
//! file-level dependencies, and audits changed files for structural
//! problems: cycles, unused imports, complexity hot-spots, god classes,
//! and wide blast radius.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{QualityAuditor, QualityIssue, RepoAnalyzer};
pub use config::Config;
pub use error::{Error, Result};
pub use output::MermaidRenderer;
pub use parser::FileAnalysis;
