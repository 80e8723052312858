//! Documentation coverage and completeness.

use super::generator::{generate, EntityInfo};
use super::style::{parse, DocStyle};
use crate::analyzers::python;
use crate::core::{Entity, Result, StructuralSummary};
use crate::rules::Severity;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MissingItem {
    /// `Function`, `Method` or `Class`
    pub kind: String,
    pub name: String,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocCoverage {
    pub documented: usize,
    pub total: usize,
    pub missing: usize,
    /// 100 when nothing is documentable
    pub percentage: f64,
    pub missing_items: Vec<MissingItem>,
}

/// A docstring produced for an undocumented declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedDoc {
    pub kind: String,
    pub name: String,
    pub line: usize,
    pub docstring: String,
}

pub fn has_docstring(entity: &Entity) -> bool {
    entity.docstring().is_some_and(|doc| !doc.trim().is_empty())
}

pub fn coverage_of(summary: &StructuralSummary) -> DocCoverage {
    let mut documented = 0;
    let mut total = 0;
    let mut missing_items = Vec::new();

    for entity in summary.documentable() {
        total += 1;
        if has_docstring(entity) {
            documented += 1;
        } else {
            missing_items.push(MissingItem {
                kind: entity.kind_label().to_string(),
                name: entity.name().to_string(),
                line: entity.line(),
            });
        }
    }

    let percentage = if total == 0 {
        100.0
    } else {
        documented as f64 / total as f64 * 100.0
    };

    DocCoverage {
        documented,
        total,
        missing: total - documented,
        percentage,
        missing_items,
    }
}

/// Coverage of Python source text. Fails only when the text does not parse.
pub fn coverage(text: &str) -> Result<DocCoverage> {
    let summary = python::build(text)?;
    Ok(coverage_of(&summary))
}

fn strip_stars(name: &str) -> &str {
    name.trim_start_matches('*')
}

/// Gaps between an entity's docstring and its signature.
///
/// Structured docstrings (any recognized convention) must list exactly the
/// signature's parameters and describe a returned value. Plain prose
/// docstrings only get an informational nudge when the signature has
/// something to describe.
pub fn completeness(entity: &Entity, doc: &str) -> Vec<(Severity, String)> {
    let parsed = parse(doc);
    let name = entity.name();
    let mut issues = Vec::new();

    let (params, returns_value, raises, is_initializer): (Vec<&str>, bool, &[String], bool) =
        match entity {
            Entity::Function(f) => (
                f.signature_parameters().map(|p| p.name.as_str()).collect(),
                f.returns_value,
                f.raises.as_slice(),
                f.is_method() && f.name == "__init__",
            ),
            Entity::Class(c) => (
                c.parameters.iter().map(|p| p.name.as_str()).collect(),
                false,
                &[][..],
                false,
            ),
        };

    // Classes and initializers document parameters in one place or the
    // other; only check them when the docstring has a parameter section.
    let params_required = matches!(entity, Entity::Function(_)) && !is_initializer;

    if parsed.style.is_none() {
        if params_required && (!params.is_empty() || returns_value) {
            issues.push((
                Severity::Info,
                format!("Docstring of '{}' does not describe its parameters or return value", name),
            ));
        }
    } else {
        if parsed.has_params_section || (params_required && !params.is_empty()) {
            for param in &params {
                if !parsed.params.iter().any(|p| p == strip_stars(param)) {
                    issues.push((
                        Severity::Warning,
                        format!("Parameter '{}' of '{}' is not documented", param, name),
                    ));
                }
            }
            for documented in &parsed.params {
                if !params.iter().any(|p| strip_stars(p) == documented) {
                    issues.push((
                        Severity::Warning,
                        format!(
                            "Docstring of '{}' documents unknown parameter '{}'",
                            name, documented
                        ),
                    ));
                }
            }
        }

        if returns_value && !parsed.has_returns {
            issues.push((
                Severity::Warning,
                format!("Docstring of '{}' does not describe its return value", name),
            ));
        }
    }

    for exception in raises {
        if !parsed.documents_raise(exception) {
            issues.push((
                Severity::Info,
                format!("Exception '{}' raised by '{}' is not documented", exception, name),
            ));
        }
    }

    issues
}

/// Docstrings for every undocumented declaration, in source order.
pub fn generate_missing(text: &str, style: DocStyle) -> Result<Vec<GeneratedDoc>> {
    let summary = python::build(text)?;
    Ok(summary
        .documentable()
        .filter(|entity| !has_docstring(entity))
        .map(|entity| GeneratedDoc {
            kind: entity.kind_label().to_string(),
            name: entity.name().to_string(),
            line: entity.line(),
            docstring: generate(&EntityInfo::from_entity(entity), style),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn entity(source: &str, name: &str) -> Entity {
        python::build(source)
            .unwrap()
            .entities
            .into_iter()
            .find(|e| e.name() == name)
            .unwrap()
    }

    #[test]
    fn test_coverage_counts_functions_methods_and_classes() {
        let source = indoc! {r#"
            def documented_function():
                '''This function has a docstring'''
                pass

            def undocumented_function():
                def helper():
                    pass
                pass

            class DocumentedClass:
                '''This class has a docstring'''

                def method(self):
                    pass
        "#};
        let cov = coverage(source).unwrap();
        assert_eq!(cov.total, 4);
        assert_eq!(cov.documented, 2);
        assert_eq!(cov.missing, 2);
        assert!((cov.percentage - 50.0).abs() < 1e-9);
        let names: Vec<&str> = cov.missing_items.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["undocumented_function", "method"]);
        assert_eq!(cov.missing_items[1].kind, "Method");
    }

    #[test]
    fn test_coverage_of_empty_module_is_full() {
        let cov = coverage("x = 1\n").unwrap();
        assert_eq!(cov.total, 0);
        assert_eq!(cov.percentage, 100.0);
    }

    #[test]
    fn test_coverage_rejects_invalid_source() {
        assert!(coverage("def (:\n").is_err());
    }

    #[test]
    fn test_complete_docstring_has_no_issues() {
        let source = indoc! {r#"
            def add(a, b):
                """Add numbers.

                Args:
                    a: First.
                    b: Second.

                Returns:
                    The sum.
                """
                return a + b
        "#};
        let add = entity(source, "add");
        assert!(completeness(&add, add.docstring().unwrap()).is_empty());
    }

    #[test]
    fn test_parameter_mismatch_is_warning() {
        let source = indoc! {r#"
            def add(a, b):
                """Add numbers.

                Args:
                    a: First.
                    c: Unknown.
                """
                return a + b
        "#};
        let add = entity(source, "add");
        let issues = completeness(&add, add.docstring().unwrap());
        let warnings: Vec<&String> = issues
            .iter()
            .filter(|(sev, _)| *sev == Severity::Warning)
            .map(|(_, msg)| msg)
            .collect();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("'b'"));
        assert!(warnings[1].contains("'c'"));
        assert!(warnings[2].contains("return value"));
    }

    #[test]
    fn test_undocumented_raise_is_info() {
        let source = indoc! {r#"
            def check(value):
                """Check a value.

                :param value: The value.
                """
                if not value:
                    raise ValueError("empty")
        "#};
        let check = entity(source, "check");
        let issues = completeness(&check, check.docstring().unwrap());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].0, Severity::Info);
    }

    #[test]
    fn test_plain_docstring_gets_single_info() {
        let source = "def area(w, h):\n    \"\"\"Compute the area.\"\"\"\n    return w * h\n";
        let area = entity(source, "area");
        let issues = completeness(&area, area.docstring().unwrap());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].0, Severity::Info);
    }

    #[test]
    fn test_generate_missing_skips_documented() {
        let source = indoc! {r#"
            def documented():
                """Already here."""

            def compute_total(items, tax=0.2):
                return sum(items) * (1 + tax)
        "#};
        let docs = generate_missing(source, DocStyle::Google).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "compute_total");
        assert!(docs[0].docstring.contains("tax (float): Description of tax."));
    }
}
