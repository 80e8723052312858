//! Naming conventions: snake_case functions and variables, PascalCase
//! classes.

use super::{Category, Finding, RuleContext, Severity};
use crate::core::{FunctionEntity, Span};
use crate::fixes::AutoFix;

pub const FUNCTION_RULE: &str = "naming-function";
pub const CLASS_RULE: &str = "naming-class";
pub const VARIABLE_RULE: &str = "naming-variable";

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Split an identifier into words on underscores and camel humps.
///
/// Acronyms stay together (`HTTPServer` gives `HTTP`, `Server`) and digits
/// stick to the word they follow.
pub fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();

    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let chars: Vec<char> = segment.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            let boundary = i > 0 && c.is_uppercase() && {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower)
            };
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

/// Leading and trailing underscores carry meaning in Python and are kept.
fn affixes(name: &str) -> (&str, &str) {
    let core = name.trim_matches('_');
    if core.is_empty() {
        return ("", "");
    }
    let lead = &name[..name.len() - name.trim_start_matches('_').len()];
    let trail = &name[name.trim_end_matches('_').len()..];
    (lead, trail)
}

pub fn to_snake_case(name: &str) -> String {
    let (lead, trail) = affixes(name);
    let body = split_words(name)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    format!("{}{}{}", lead, body, trail)
}

pub fn to_pascal_case(name: &str) -> String {
    let (lead, trail) = affixes(name);
    let body: String = split_words(name)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect();
    format!("{}{}{}", lead, body, trail)
}

fn has_lowercase(name: &str) -> bool {
    name.chars().any(char::is_lowercase)
}

pub fn is_snake_case(name: &str) -> bool {
    !name.chars().any(char::is_uppercase)
}

pub fn is_pascal_case(name: &str) -> bool {
    let body = name.trim_start_matches('_');
    body.chars().next().is_some_and(|c| !c.is_lowercase()) && !body.contains('_')
}

/// Mixed-case names outside the convention. All-caps names are constants
/// and pass.
fn breaks_snake_case(name: &str) -> bool {
    has_lowercase(name) && !is_snake_case(name)
}

pub fn is_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// A rename is only offered when the new name cannot collide with anything
/// already visible in `scope`.
fn rename_fix(
    ctx: &RuleContext,
    from: &str,
    to: &str,
    scope: Span,
    include_attributes: bool,
) -> Option<AutoFix> {
    ctx.offer(|| {
        let collides = from == to || is_keyword(to) || ctx.summary.binds_name_within(to, scope);
        (!collides).then(|| AutoFix::Rename {
            from: from.to_string(),
            to: to.to_string(),
            scope,
            include_attributes,
        })
    })
}

fn whole_file(ctx: &RuleContext) -> Span {
    Span::new(0, ctx.text.len())
}

pub fn check_functions(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .functions()
        .filter(|f| !f.is_dunder() && breaks_snake_case(&f.name))
        .map(|f| {
            let suggested = to_snake_case(&f.name);
            Finding::new(
                FUNCTION_RULE,
                Severity::Warning,
                Category::Naming,
                format!("{} '{}' should use snake_case", kind_of(f), f.name),
            )
            .at_line(f.line)
            .with_suggestion(format!("Rename to '{}'", suggested))
            .with_fix(rename_fix(ctx, &f.name, &suggested, whole_file(ctx), true))
        })
        .collect()
}

fn kind_of(f: &FunctionEntity) -> &'static str {
    if f.is_method() {
        "Method"
    } else {
        "Function"
    }
}

pub fn check_classes(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .classes()
        .filter(|c| has_lowercase(&c.name) && !is_pascal_case(&c.name))
        .map(|c| {
            let suggested = to_pascal_case(&c.name);
            Finding::new(
                CLASS_RULE,
                Severity::Warning,
                Category::Naming,
                format!("Class '{}' should use PascalCase", c.name),
            )
            .at_line(c.line)
            .with_suggestion(format!("Rename to '{}'", suggested))
            .with_fix(rename_fix(ctx, &c.name, &suggested, whole_file(ctx), true))
        })
        .collect()
}

/// Module variables get a whole-file rename and locals a rename scoped to
/// their function. Parameters and class attributes are reachable from
/// outside the file through keywords and attribute access, so they only
/// get a suggestion.
pub fn check_variables(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();

    for binding in &ctx.summary.module_bindings {
        if !breaks_snake_case(&binding.name) {
            continue;
        }
        let suggested = to_snake_case(&binding.name);
        findings.push(
            Finding::new(
                VARIABLE_RULE,
                Severity::Warning,
                Category::Naming,
                format!("Module variable '{}' should use snake_case", binding.name),
            )
            .at_line(binding.line)
            .with_suggestion(format!("Rename to '{}'", suggested))
            .with_fix(rename_fix(ctx, &binding.name, &suggested, whole_file(ctx), false)),
        );
    }

    for class in ctx.summary.classes() {
        for attribute in class.attributes.iter().filter(|a| breaks_snake_case(&a.name)) {
            findings.push(
                Finding::new(
                    VARIABLE_RULE,
                    Severity::Warning,
                    Category::Naming,
                    format!(
                        "Class attribute '{}' of '{}' should use snake_case",
                        attribute.name, class.name
                    ),
                )
                .at_line(attribute.line)
                .with_suggestion(format!("Rename to '{}'", to_snake_case(&attribute.name))),
            );
        }
    }

    for f in ctx.summary.functions() {
        for param in f.signature_parameters() {
            if breaks_snake_case(&param.name) {
                findings.push(
                    Finding::new(
                        VARIABLE_RULE,
                        Severity::Warning,
                        Category::Naming,
                        format!("Parameter '{}' of '{}' should use snake_case", param.name, f.name),
                    )
                    .at_line(f.line)
                    .with_suggestion(format!("Rename to '{}'", to_snake_case(&param.name))),
                );
            }
        }

        for local in &f.locals {
            if !breaks_snake_case(&local.name) {
                continue;
            }
            let suggested = to_snake_case(&local.name);
            findings.push(
                Finding::new(
                    VARIABLE_RULE,
                    Severity::Warning,
                    Category::Naming,
                    format!("Variable '{}' in '{}' should use snake_case", local.name, f.name),
                )
                .at_line(local.line)
                .with_suggestion(format!("Rename to '{}'", suggested))
                .with_fix(rename_fix(ctx, &local.name, &suggested, f.span, false)),
            );
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::python::build;
    use crate::config::PyqualConfig;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("CalculateTotal"), vec!["Calculate", "Total"]);
        assert_eq!(split_words("getHTTPResponse"), vec!["get", "HTTP", "Response"]);
        assert_eq!(split_words("__private_name"), vec!["private", "name"]);
        assert_eq!(split_words("item2Name"), vec!["item2", "Name"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_snake_case("CalculateTotal"), "calculate_total");
        assert_eq!(to_snake_case("_privateHelper"), "_private_helper");
        assert_eq!(to_snake_case("parseJSON"), "parse_json");
        assert_eq!(to_pascal_case("data_processor"), "DataProcessor");
        assert_eq!(to_pascal_case("_internal_thing"), "_InternalThing");
        assert_eq!(to_pascal_case("HTTPServer"), "HttpServer");
    }

    #[test]
    fn test_convention_predicates() {
        assert!(is_snake_case("calculate_total"));
        assert!(!is_snake_case("calculateTotal"));
        assert!(is_pascal_case("DataProcessor"));
        assert!(is_pascal_case("_Private"));
        assert!(!is_pascal_case("data_processor"));
        assert!(!is_pascal_case("Data_Processor"));
    }

    fn run(text: &str, rule: fn(&RuleContext) -> Vec<Finding>) -> Vec<Finding> {
        let summary = build(text).unwrap();
        let config = PyqualConfig::default();
        let ctx = RuleContext {
            text,
            summary: &summary,
            config: &config,
            autofix: true,
        };
        rule(&ctx)
    }

    #[test]
    fn test_function_rename_fix() {
        let findings = run("def CalculateTotal(items):\n    return sum(items)\n", check_functions);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].suggestion.as_deref(), Some("Rename to 'calculate_total'"));
        match &findings[0].fix {
            Some(AutoFix::Rename { from, to, .. }) => {
                assert_eq!(from, "CalculateTotal");
                assert_eq!(to, "calculate_total");
            }
            other => panic!("expected rename fix, got {other:?}"),
        }
    }

    #[test]
    fn test_dunders_and_constants_exempt() {
        let text = "class A:\n    def __init__(self):\n        pass\n\ndef RUN_ALL():\n    pass\n";
        assert!(run(text, check_functions).is_empty());
    }

    #[test]
    fn test_rename_withheld_on_collision() {
        let text = "def myFunc():\n    return 1\n\ndef my_func():\n    return 2\n";
        let findings = run(text, check_functions);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].fix.is_none());
        assert!(findings[0].suggestion.is_some());
    }

    #[test]
    fn test_class_naming() {
        let findings = run("class data_processor:\n    pass\n", check_classes);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].suggestion.as_deref(), Some("Rename to 'DataProcessor'"));
    }

    #[test]
    fn test_variables_and_parameters() {
        let text = "def f(self, inputValue):\n    totalValue = inputValue\n    return totalValue\n";
        let findings = run(text, check_variables);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("Parameter 'inputValue'"));
        assert!(findings[0].fix.is_none());
        assert!(findings[1].message.contains("Variable 'totalValue'"));
        match &findings[1].fix {
            Some(AutoFix::Rename {
                include_attributes, ..
            }) => assert!(!include_attributes),
            other => panic!("expected rename fix, got {other:?}"),
        }
    }

    #[test]
    fn test_module_and_class_variables() {
        let text = indoc! {r#"
            totalCount = 0
            MAX_ITEMS = 10


            class Config:
                """C."""

                maxItems = 3
                DEFAULT_NAME = "x"
        "#};
        let findings = run(text, check_variables);
        assert_eq!(findings.len(), 2);

        assert!(findings[0].message.contains("Module variable 'totalCount'"));
        assert_eq!(findings[0].line, Some(1));
        match &findings[0].fix {
            Some(AutoFix::Rename {
                to,
                scope,
                include_attributes,
                ..
            }) => {
                assert_eq!(to, "total_count");
                assert_eq!(*scope, Span::new(0, text.len()));
                assert!(!include_attributes);
            }
            other => panic!("expected rename fix, got {other:?}"),
        }

        assert!(findings[1].message.contains("Class attribute 'maxItems' of 'Config'"));
        assert_eq!(findings[1].line, Some(8));
        assert_eq!(findings[1].suggestion.as_deref(), Some("Rename to 'max_items'"));
        assert!(findings[1].fix.is_none());
    }

    #[test]
    fn test_module_variable_rename_withheld_on_collision() {
        let text = "itemCount = 1
item_count = 2
";
        let findings = run(text, check_variables);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].fix.is_none());
    }

    #[test]
    fn test_global_rebinding_reported_once() {
        let text = indoc! {"
            hitCount = 0


            def bump():
                global hitCount
                hitCount += 1
        "};
        let findings = run(text, check_variables);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("Module variable"));
    }
}
