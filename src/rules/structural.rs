//! Structural smells: oversized signatures and bodies, bare `except:`
//! handlers and mutable default arguments.

use super::{Category, Finding, RuleContext, Severity};
use crate::core::Parameter;

pub const TOO_MANY_PARAMETERS_RULE: &str = "too-many-parameters";
pub const LONG_FUNCTION_RULE: &str = "long-function";
pub const BARE_EXCEPT_RULE: &str = "bare-except";
pub const MUTABLE_DEFAULT_RULE: &str = "mutable-default";

pub fn check_parameter_count(ctx: &RuleContext) -> Vec<Finding> {
    let threshold = ctx.config.thresholds.max_parameters;

    ctx.summary
        .functions()
        .filter_map(|f| {
            let count = f.signature_parameters().count();
            (count > threshold).then(|| {
                Finding::new(
                    TOO_MANY_PARAMETERS_RULE,
                    Severity::Warning,
                    Category::Structural,
                    format!(
                        "Function '{}' has {} parameters (threshold: {})",
                        f.name, count, threshold
                    ),
                )
                .at_line(f.line)
                .with_suggestion("Group related parameters into a dataclass or dictionary")
            })
        })
        .collect()
}

pub fn check_function_length(ctx: &RuleContext) -> Vec<Finding> {
    let threshold = ctx.config.thresholds.max_function_length;

    ctx.summary
        .functions()
        .filter_map(|f| {
            let length = f.length();
            (length > threshold).then(|| {
                Finding::new(
                    LONG_FUNCTION_RULE,
                    Severity::Warning,
                    Category::Structural,
                    format!(
                        "Function '{}' has {} lines (threshold: {})",
                        f.name, length, threshold
                    ),
                )
                .at_line(f.line)
                .with_suggestion("Split the function into smaller steps")
            })
        })
        .collect()
}

pub fn check_bare_except(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .functions()
        .flat_map(|f| {
            f.bare_excepts.iter().map(move |&line| {
                Finding::new(
                    BARE_EXCEPT_RULE,
                    Severity::Warning,
                    Category::Structural,
                    format!("Bare 'except:' in '{}' catches every exception", f.name),
                )
                .at_line(line)
                .with_suggestion("Catch a specific exception type, or at least 'Exception'")
            })
        })
        .collect()
}

fn is_mutable_default(param: &Parameter) -> bool {
    param.default.as_deref().is_some_and(|value| {
        let value = value.trim();
        value.starts_with('[')
            || value.starts_with('{')
            || matches!(value, "list()" | "dict()" | "set()" | "bytearray()")
    })
}

pub fn check_mutable_defaults(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .functions()
        .flat_map(|f| {
            f.parameters
                .iter()
                .filter(|p| is_mutable_default(p))
                .map(move |p| {
                    Finding::new(
                        MUTABLE_DEFAULT_RULE,
                        Severity::Warning,
                        Category::Structural,
                        format!(
                            "Parameter '{}' of '{}' has a mutable default value",
                            p.name, f.name
                        ),
                    )
                    .at_line(f.line)
                    .with_suggestion(format!(
                        "Default '{}' to None and create the value inside the function",
                        p.name
                    ))
                })
        })
        .collect()
}
