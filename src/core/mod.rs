pub mod errors;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use errors::{Error, Result, SyntaxError};

/// Half-open byte range into the analyzed source text.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn encloses(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Two edits conflict when they share any byte, or when they are both
    /// insertions at the same offset, or when an insertion lands strictly
    /// inside a replaced range.
    pub fn overlaps(&self, other: &Span) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => self.start == other.start,
            (true, false) => other.start < self.start && self.start < other.end,
            (false, true) => self.start < other.start && other.start < self.end,
            (false, false) => self.start < other.end && other.start < self.end,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        static EXTENSION_MAP: &[(&[&str], Language)] = &[
            (&["py", "pyi"], Language::Python),
            (&["rs"], Language::Rust),
            (&["js", "jsx", "mjs", "cjs"], Language::JavaScript),
            (&["ts", "tsx", "mts", "cts"], Language::TypeScript),
        ];

        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext))
            .map(|(_, lang)| *lang)
            .unwrap_or(Language::Unknown)
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::Python => "Python",
            Language::Rust => "Rust",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Regular,
    /// `*args`
    VarArgs,
    /// `**kwargs`
    KwArgs,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
    pub kind: ParamKind,
}

impl Parameter {
    pub fn is_receiver(&self) -> bool {
        self.kind == ParamKind::Regular && matches!(self.name.as_str(), "self" | "cls")
    }
}

/// A name bound by an assignment, augmented assignment or loop target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionEntity {
    pub name: String,
    /// Line of the `def` keyword (1-indexed).
    pub line: usize,
    /// First line of the declaration, including decorators.
    pub start_line: usize,
    pub end_line: usize,
    pub span: Span,
    pub name_span: Span,
    pub parameters: Vec<Parameter>,
    pub return_annotation: Option<String>,
    pub decorators: Vec<String>,
    pub is_async: bool,
    /// Set when the function is defined directly in a class body.
    pub class_name: Option<String>,
    /// Set when the function is defined inside another function.
    pub is_nested: bool,
    /// Branching constructs enclosing the declaration itself.
    pub enclosing_depth: u32,
    /// Depth of the deepest branch inside the body.
    pub nesting_depth: u32,
    pub cyclomatic: u32,
    pub cognitive: u32,
    pub docstring: Option<String>,
    pub returns_value: bool,
    pub raises: Vec<String>,
    pub locals: Vec<Binding>,
    pub bare_excepts: Vec<usize>,
}

impl FunctionEntity {
    pub fn is_method(&self) -> bool {
        self.class_name.is_some()
    }

    pub fn is_dunder(&self) -> bool {
        self.name.len() > 4 && self.name.starts_with("__") && self.name.ends_with("__")
    }

    pub fn length(&self) -> usize {
        self.end_line - self.line + 1
    }

    /// Parameters a caller actually supplies (`self`/`cls` of methods dropped).
    pub fn signature_parameters(&self) -> impl Iterator<Item = &Parameter> {
        let skip = usize::from(
            self.is_method() && self.parameters.first().is_some_and(Parameter::is_receiver),
        );
        self.parameters.iter().skip(skip)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    pub line: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub span: Span,
    pub name_span: Span,
    pub bases: Vec<String>,
    /// Parameters of `__init__`, receiver excluded.
    pub parameters: Vec<Parameter>,
    pub decorators: Vec<String>,
    pub is_nested: bool,
    pub enclosing_depth: u32,
    pub nesting_depth: u32,
    pub docstring: Option<String>,
    pub methods: Vec<String>,
    /// Names bound directly in the class body, first binding of each.
    pub attributes: Vec<Binding>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Function(FunctionEntity),
    Class(ClassEntity),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Function(f) => &f.name,
            Entity::Class(c) => &c.name,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Entity::Function(f) => f.line,
            Entity::Class(c) => c.line,
        }
    }

    pub fn start_line(&self) -> usize {
        match self {
            Entity::Function(f) => f.start_line,
            Entity::Class(c) => c.start_line,
        }
    }

    pub fn docstring(&self) -> Option<&str> {
        match self {
            Entity::Function(f) => f.docstring.as_deref(),
            Entity::Class(c) => c.docstring.as_deref(),
        }
    }

    pub fn is_nested(&self) -> bool {
        match self {
            Entity::Function(f) => f.is_nested,
            Entity::Class(c) => c.is_nested,
        }
    }

    /// Module-level functions, methods and classes carry documentation;
    /// helpers nested inside function bodies do not.
    pub fn is_documentable(&self) -> bool {
        !self.is_nested()
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Entity::Function(f) if f.is_method() => "Method",
            Entity::Function(_) => "Function",
            Entity::Class(_) => "Class",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub module: String,
    pub names: Vec<String>,
    pub line: usize,
}

/// Gap between two operands of a binary operator, comparison or assignment
/// written on a single line. `span` covers the operator and any whitespace
/// around it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSite {
    pub operator: String,
    pub span: Span,
    pub line: usize,
}

/// A comma immediately followed by a non-space character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommaSite {
    /// Byte offset just past the comma.
    pub offset: usize,
    pub line: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentRole {
    Plain,
    /// The `attr` in `obj.attr`.
    Attribute,
    /// The `name` in `call(name=value)`.
    Keyword,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
    pub role: IdentRole,
}

/// Operator and operand occurrence counts for Halstead metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalsteadCounts {
    pub operators: BTreeMap<String, usize>,
    pub operands: BTreeMap<String, usize>,
}

impl HalsteadCounts {
    pub fn add_operator(&mut self, token: &str) {
        *self.operators.entry(token.to_string()).or_default() += 1;
    }

    pub fn add_operand(&mut self, token: &str) {
        *self.operands.entry(token.to_string()).or_default() += 1;
    }

    pub fn distinct_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn distinct_operands(&self) -> usize {
        self.operands.len()
    }

    pub fn total_operators(&self) -> usize {
        self.operators.values().sum()
    }

    pub fn total_operands(&self) -> usize {
        self.operands.values().sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(source: &str) -> Self {
        if source.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Normalized structure of one parsed Python source file.
///
/// Built once per analysis by [`crate::analyzers::python::build`] and never
/// mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralSummary {
    /// Functions and classes in source order.
    pub entities: Vec<Entity>,
    pub imports: Vec<Import>,
    /// Decision points outside any function body.
    pub module_decision_points: u32,
    pub halstead: HalsteadCounts,
    pub operator_sites: Vec<OperatorSite>,
    pub comma_sites: Vec<CommaSite>,
    pub string_spans: Vec<Span>,
    pub identifiers: Vec<Identifier>,
    /// Names bound outside any function or class, first binding of each.
    pub module_bindings: Vec<Binding>,
    pub line_ending: LineEnding,
}

impl StructuralSummary {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionEntity> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Function(f) => Some(f),
            Entity::Class(_) => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntity> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Class(c) => Some(c),
            Entity::Function(_) => None,
        })
    }

    pub fn documentable(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_documentable())
    }

    pub fn in_string(&self, offset: usize) -> bool {
        self.string_spans.iter().any(|s| s.contains(offset))
    }

    /// Whether `name` already appears as a plain identifier inside `scope`.
    pub fn binds_name_within(&self, name: &str, scope: Span) -> bool {
        self.identifiers
            .iter()
            .any(|id| id.name == name && id.role != IdentRole::Keyword && scope.encloses(&id.span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap_rules() {
        let a = Span::new(2, 5);
        assert!(a.overlaps(&Span::new(4, 8)));
        assert!(!a.overlaps(&Span::new(5, 8)));
        assert!(!a.overlaps(&Span::new(0, 2)));
        assert!(a.overlaps(&Span::new(3, 3)));
        assert!(!a.overlaps(&Span::new(2, 2)));
        assert!(!a.overlaps(&Span::new(5, 5)));
        assert!(Span::new(7, 7).overlaps(&Span::new(7, 7)));
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(std::path::Path::new("pkg/mod.py")),
            Language::Python
        );
        assert_eq!(
            Language::from_path(std::path::Path::new("src/lib.rs")),
            Language::Rust
        );
        assert_eq!(
            Language::from_path(std::path::Path::new("README")),
            Language::Unknown
        );
    }

    #[test]
    fn test_line_ending_detection() {
        assert_eq!(LineEnding::detect("a\nb\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
    }
}
