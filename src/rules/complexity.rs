use super::{Category, Finding, RuleContext, Severity};

pub const RULE: &str = "high-complexity";

/// One binary WARNING per function exceeding either the cyclomatic or the
/// nesting threshold. Severity does not grow with the excess.
pub fn check(ctx: &RuleContext) -> Vec<Finding> {
    let thresholds = &ctx.config.thresholds;

    ctx.summary
        .functions()
        .filter_map(|f| {
            let mut reasons = Vec::new();
            if f.cyclomatic > thresholds.max_cyclomatic {
                reasons.push(format!(
                    "cyclomatic complexity {} (threshold: {})",
                    f.cyclomatic, thresholds.max_cyclomatic
                ));
            }
            if f.nesting_depth > thresholds.max_nesting {
                reasons.push(format!(
                    "nesting depth {} (threshold: {})",
                    f.nesting_depth, thresholds.max_nesting
                ));
            }
            if reasons.is_empty() {
                return None;
            }

            Some(
                Finding::new(
                    RULE,
                    Severity::Warning,
                    Category::Complexity,
                    format!("Function '{}' has {}", f.name, reasons.join(" and ")),
                )
                .at_line(f.line)
                .with_suggestion("Extract nested branches into smaller helper functions"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::python::build;
    use crate::config::PyqualConfig;
    use indoc::indoc;

    fn run(text: &str) -> Vec<Finding> {
        let summary = build(text).unwrap();
        let config = PyqualConfig::default();
        check(&RuleContext {
            text,
            summary: &summary,
            config: &config,
            autofix: true,
        })
    }

    #[test]
    fn test_deep_nesting_flagged_once() {
        let text = indoc! {"
            def nested(a, b, c, d, e):
                if a:
                    if b:
                        if c:
                            if d:
                                if e:
                                    return 1
                return 0
        "};
        let findings = run(text);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("nesting depth 5"));
        assert!(!findings[0].message.contains("cyclomatic"));
    }

    #[test]
    fn test_many_branches_flagged() {
        let mut text = String::from("def branchy(x):\n");
        for i in 0..11 {
            text.push_str(&format!("    if x == {i}:\n        return {i}\n"));
        }
        text.push_str("    return -1\n");
        let findings = run(&text);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("cyclomatic complexity 12"));
    }

    #[test]
    fn test_simple_function_not_flagged() {
        assert!(run("def ok(x):\n    if x:\n        return 1\n    return 2\n").is_empty());
    }
}
