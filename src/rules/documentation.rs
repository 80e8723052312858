use super::{Category, Finding, RuleContext, Severity};
use crate::docstring::{completeness, has_docstring};

pub const MISSING_RULE: &str = "missing-docstring";
pub const COMPLETENESS_RULE: &str = "docstring-completeness";

pub fn check_missing(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .documentable()
        .filter(|entity| !has_docstring(entity))
        .map(|entity| {
            Finding::new(
                MISSING_RULE,
                Severity::Warning,
                Category::Documentation,
                format!("{} '{}' is missing a docstring", entity.kind_label(), entity.name()),
            )
            .at_line(entity.line())
            .with_suggestion(format!(
                "Add a {} style docstring (`pyqual docs --generate` drafts one)",
                ctx.config.docstring.style
            ))
        })
        .collect()
}

pub fn check_completeness(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .documentable()
        .filter(|entity| has_docstring(entity))
        .filter_map(|entity| entity.docstring().map(|doc| (entity, doc)))
        .flat_map(|(entity, doc)| {
            completeness(entity, doc)
                .into_iter()
                .map(move |(severity, message)| {
                    Finding::new(COMPLETENESS_RULE, severity, Category::Documentation, message)
                        .at_line(entity.line())
                })
        })
        .collect()
}
