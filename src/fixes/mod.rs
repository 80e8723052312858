//! Auto-fix engine.
//!
//! Fixes are resolved into concrete byte edits against the text they are
//! given, accepted in priority order while they do not overlap anything
//! already accepted, and applied back to front onto a copy of the text. The
//! input is never mutated and no I/O happens here.

use crate::analyzers::python;
use crate::core::{IdentRole, Span, StructuralSummary};
use crate::rules::{registration_index, Finding};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

/// A mechanical rewrite attached to a finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AutoFix {
    /// Replace `span` with `replacement`. `expected` is the text the span
    /// held when the finding was produced; a mismatch marks the fix stale.
    Replace {
        span: Span,
        expected: String,
        replacement: String,
    },
    /// Rename every occurrence of `from` inside `scope`. Attribute accesses
    /// (`obj.from`) are included only when `include_attributes` is set;
    /// keyword argument names never are.
    Rename {
        from: String,
        to: String,
        scope: Span,
        include_attributes: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppliedFix {
    pub rule: String,
    pub line: Option<usize>,
    pub span: Span,
    pub before: String,
    pub after: String,
    /// Byte edits the fix expanded into
    pub edits: usize,
}

/// A fix that was dropped instead of applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FixConflict {
    pub rule: String,
    pub line: Option<usize>,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FixOutcome {
    pub text: String,
    pub applied: Vec<AppliedFix>,
    pub conflicts: Vec<FixConflict>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Edit {
    span: Span,
    replacement: String,
}

fn valid_span(text: &str, span: Span) -> bool {
    span.start <= span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
}

/// Re-parses the text at most once, and only if a rename needs it.
struct Resolver<'a> {
    text: &'a str,
    summary: Option<Option<StructuralSummary>>,
}

impl<'a> Resolver<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            summary: None,
        }
    }

    fn summary(&mut self) -> Option<&StructuralSummary> {
        let text = self.text;
        self.summary
            .get_or_insert_with(|| python::build(text).ok())
            .as_ref()
    }

    fn resolve(&mut self, fix: &AutoFix) -> Result<Vec<Edit>, String> {
        match fix {
            AutoFix::Replace {
                span,
                expected,
                replacement,
            } => {
                if !valid_span(self.text, *span) || &self.text[span.start..span.end] != expected {
                    return Err("source changed since the finding was produced".to_string());
                }
                Ok(vec![Edit {
                    span: *span,
                    replacement: replacement.clone(),
                }])
            }
            AutoFix::Rename {
                from,
                to,
                scope,
                include_attributes,
            } => {
                if !valid_span(self.text, *scope) {
                    return Err("rename scope lies outside the source".to_string());
                }
                let summary = self
                    .summary()
                    .ok_or_else(|| "source no longer parses".to_string())?;
                if summary.binds_name_within(to, *scope) {
                    return Err(format!("'{}' is already used in scope", to));
                }

                let edits: Vec<Edit> = summary
                    .identifiers
                    .iter()
                    .filter(|id| id.name == *from && scope.encloses(&id.span))
                    .filter(|id| match id.role {
                        IdentRole::Plain => true,
                        IdentRole::Attribute => *include_attributes,
                        IdentRole::Keyword => false,
                    })
                    .map(|id| Edit {
                        span: id.span,
                        replacement: to.clone(),
                    })
                    .collect();

                if edits.is_empty() {
                    return Err(format!("'{}' no longer occurs in scope", from));
                }
                Ok(edits)
            }
        }
    }
}

fn describe(fix: &AutoFix, edits: &[Edit]) -> (Span, String, String) {
    match fix {
        AutoFix::Replace {
            span,
            expected,
            replacement,
        } => (*span, expected.clone(), replacement.clone()),
        AutoFix::Rename {
            from, to, scope, ..
        } => {
            let span = edits.first().map(|e| e.span).unwrap_or(*scope);
            (span, from.clone(), to.clone())
        }
    }
}

/// Apply every fix carried by `findings` to `text`.
///
/// Fixes are prioritized by severity, then rule registration order, then
/// line. A fix whose edits overlap an already accepted edit, or whose locus
/// no longer matches the text, is reported in `conflicts` and never applied.
pub fn apply(text: &str, findings: &[Finding]) -> FixOutcome {
    let _span = info_span!("apply_fixes").entered();

    let mut candidates: Vec<(&Finding, &AutoFix)> = findings
        .iter()
        .filter_map(|f| f.fix.as_ref().map(|fix| (f, fix)))
        .collect();
    candidates.sort_by_key(|(f, _)| {
        (
            f.severity,
            registration_index(&f.rule),
            f.line.unwrap_or(0),
        )
    });

    let mut resolver = Resolver::new(text);
    let mut accepted: Vec<Edit> = Vec::new();
    let mut renamed: Vec<(&str, Span)> = Vec::new();
    let mut applied = Vec::new();
    let mut conflicts = Vec::new();

    for (finding, fix) in candidates {
        let conflict = |reason: String| FixConflict {
            rule: finding.rule.clone(),
            line: finding.line,
            reason,
        };

        let edits = match resolver.resolve(fix) {
            Ok(edits) => edits,
            Err(reason) => {
                conflicts.push(conflict(reason));
                continue;
            }
        };

        if let AutoFix::Rename { to, scope, .. } = fix {
            let clashes = renamed.iter().any(|(target, other)| {
                *target == to.as_str() && (scope.encloses(other) || other.encloses(scope))
            });
            if clashes {
                conflicts.push(conflict(format!(
                    "'{}' is already the target of another rename",
                    to
                )));
                continue;
            }
        }

        let overlaps = edits
            .iter()
            .any(|e| accepted.iter().any(|a| a.span.overlaps(&e.span)));
        if overlaps {
            conflicts.push(conflict("overlaps a higher-priority fix".to_string()));
            continue;
        }

        if let AutoFix::Rename { to, scope, .. } = fix {
            renamed.push((to.as_str(), *scope));
        }
        let (span, before, after) = describe(fix, &edits);
        applied.push(AppliedFix {
            rule: finding.rule.clone(),
            line: finding.line,
            span,
            before,
            after,
            edits: edits.len(),
        });
        accepted.extend(edits);
    }

    accepted.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then(b.span.end.cmp(&a.span.end))
    });

    let mut output = text.to_string();
    for edit in &accepted {
        output.replace_range(edit.span.start..edit.span.end, &edit.replacement);
    }

    debug!(
        applied = applied.len(),
        conflicts = conflicts.len(),
        edits = accepted.len(),
        "Applied fixes"
    );

    FixOutcome {
        text: output,
        applied,
        conflicts,
    }
}
