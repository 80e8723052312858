//! pyqual: static code-quality analysis for Python.
//!
//! Source text is reduced to a [`StructuralSummary`] by the builder in
//! [`analyzers::python`]; metrics, review rules and documentation coverage
//! all read that summary. Fixes attached to findings are applied by
//! [`fixes::apply`] without touching the original text.

pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod core;
pub mod docstring;
pub mod fixes;
pub mod io;
pub mod metrics;
pub mod rules;

pub use crate::analyzers::{analyze_file_contents, get_analyzer, Analysis, Analyzer};
pub use crate::config::{load_config, PyqualConfig};
pub use crate::core::{Entity, Error, Language, Result, Span, StructuralSummary, SyntaxError};
pub use crate::docstring::{
    coverage, detect_style, generate_missing, DocCoverage, DocStyle, EntityInfo, EntityKind,
    GeneratedDoc,
};
pub use crate::fixes::{AppliedFix, AutoFix, FixConflict, FixOutcome};
pub use crate::metrics::{Grade, Metrics};
pub use crate::rules::{review, Category, Finding, Severity};

/// Analyze Python source with the default configuration. Never fails:
/// unparseable input yields a single critical syntax finding.
pub fn analyze(text: &str) -> Analysis {
    analyze_with_config(text, &PyqualConfig::default())
}

pub fn analyze_with_config(text: &str, config: &PyqualConfig) -> Analysis {
    get_analyzer(Language::Python).analyze(text, config, true)
}

/// Apply the fixes carried by `findings` to `text`.
pub fn fix(text: &str, findings: &[Finding]) -> FixOutcome {
    fixes::apply(text, findings)
}

pub fn generate_doc(info: &EntityInfo, style: DocStyle) -> String {
    docstring::generate(info, style)
}
