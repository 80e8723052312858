//! Documentation coverage, completeness checks and docstring generation.

pub mod coverage;
pub mod generator;
pub mod style;

pub use coverage::{
    completeness, coverage, coverage_of, generate_missing, has_docstring, DocCoverage,
    GeneratedDoc, MissingItem,
};
pub use generator::{generate, infer_type, EntityInfo, EntityKind};
pub use style::{detect_style, parse, DocStyle, ParsedDocstring};
