//! Rule catalogue and review generator.
//!
//! Each rule is an independent, stateless function over the structural
//! summary and the source text. Rules never see each other's output; the
//! review simply concatenates what every registered rule returns and sorts it.

pub mod complexity;
pub mod documentation;
pub mod formatting;
pub mod naming;
pub mod structural;

use crate::config::PyqualConfig;
use crate::core::{Error, StructuralSummary};
use crate::fixes::AutoFix;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info_span};

/// Ordered by descending urgency: `Critical < Warning < Info`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Naming,
    Documentation,
    Formatting,
    Complexity,
    Structural,
    Syntax,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Naming => "naming",
            Category::Documentation => "documentation",
            Category::Formatting => "formatting",
            Category::Complexity => "complexity",
            Category::Structural => "structural",
            Category::Syntax => "syntax",
        };
        write!(f, "{}", label)
    }
}

/// One diagnostic emitted by a rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Id of the rule that produced it, e.g. `naming-function`
    pub rule: String,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<AutoFix>,
}

impl Finding {
    pub fn new(
        rule: &str,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.to_string(),
            severity,
            category,
            message: message.into(),
            suggestion: None,
            line: None,
            fix: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_fix(mut self, fix: Option<AutoFix>) -> Self {
        self.fix = fix;
        self
    }
}

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub text: &'a str,
    pub summary: &'a StructuralSummary,
    pub config: &'a PyqualConfig,
    /// When false, rules must not attach fixes
    pub autofix: bool,
}

impl RuleContext<'_> {
    /// `fix` when auto-fixing is enabled, `None` otherwise.
    pub fn offer(&self, fix: impl FnOnce() -> Option<AutoFix>) -> Option<AutoFix> {
        if self.autofix {
            fix()
        } else {
            None
        }
    }
}

pub type Evaluate = fn(&RuleContext) -> Vec<Finding>;

pub struct Rule {
    pub id: &'static str,
    pub category: Category,
    pub evaluate: Evaluate,
}

pub const SYNTAX_RULE: &str = "syntax-error";

/// Registration order doubles as fix priority among findings of the same
/// severity.
pub static RULES: &[Rule] = &[
    Rule {
        id: naming::FUNCTION_RULE,
        category: Category::Naming,
        evaluate: naming::check_functions,
    },
    Rule {
        id: naming::CLASS_RULE,
        category: Category::Naming,
        evaluate: naming::check_classes,
    },
    Rule {
        id: naming::VARIABLE_RULE,
        category: Category::Naming,
        evaluate: naming::check_variables,
    },
    Rule {
        id: documentation::MISSING_RULE,
        category: Category::Documentation,
        evaluate: documentation::check_missing,
    },
    Rule {
        id: documentation::COMPLETENESS_RULE,
        category: Category::Documentation,
        evaluate: documentation::check_completeness,
    },
    Rule {
        id: complexity::RULE,
        category: Category::Complexity,
        evaluate: complexity::check,
    },
    Rule {
        id: structural::TOO_MANY_PARAMETERS_RULE,
        category: Category::Structural,
        evaluate: structural::check_parameter_count,
    },
    Rule {
        id: structural::LONG_FUNCTION_RULE,
        category: Category::Structural,
        evaluate: structural::check_function_length,
    },
    Rule {
        id: structural::BARE_EXCEPT_RULE,
        category: Category::Structural,
        evaluate: structural::check_bare_except,
    },
    Rule {
        id: structural::MUTABLE_DEFAULT_RULE,
        category: Category::Structural,
        evaluate: structural::check_mutable_defaults,
    },
    Rule {
        id: formatting::BLANK_LINES_RULE,
        category: Category::Formatting,
        evaluate: formatting::check_blank_lines,
    },
    Rule {
        id: formatting::OPERATOR_SPACING_RULE,
        category: Category::Formatting,
        evaluate: formatting::check_operator_spacing,
    },
    Rule {
        id: formatting::COMMA_SPACING_RULE,
        category: Category::Formatting,
        evaluate: formatting::check_comma_spacing,
    },
    Rule {
        id: formatting::TRAILING_WHITESPACE_RULE,
        category: Category::Formatting,
        evaluate: formatting::check_trailing_whitespace,
    },
];

/// Position of a rule in the registry; unknown ids sort last.
pub fn registration_index(rule_id: &str) -> usize {
    RULES
        .iter()
        .position(|rule| rule.id == rule_id)
        .unwrap_or(RULES.len())
}

/// Stable sort by severity, then category, then source line.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by_key(|f| (f.severity, f.category, f.line.unwrap_or(0)));
}

pub fn review(text: &str, summary: &StructuralSummary, enable_autofix: bool) -> Vec<Finding> {
    review_with_config(text, summary, &PyqualConfig::default(), enable_autofix)
}

pub fn review_with_config(
    text: &str,
    summary: &StructuralSummary,
    config: &PyqualConfig,
    enable_autofix: bool,
) -> Vec<Finding> {
    let _span = info_span!("review").entered();
    let ctx = RuleContext {
        text,
        summary,
        config,
        autofix: enable_autofix,
    };

    let mut findings: Vec<Finding> = RULES
        .iter()
        .flat_map(|rule| {
            let found = (rule.evaluate)(&ctx);
            debug!(rule = rule.id, count = found.len(), "Rule evaluated");
            found
        })
        .collect();

    if !enable_autofix {
        findings.iter_mut().for_each(|f| f.fix = None);
    }

    sort_findings(&mut findings);
    findings
}

/// The single finding reported for input the builder rejected.
pub fn syntax_finding(error: &Error) -> Finding {
    match error {
        Error::Syntax(syntax) => Finding::new(
            SYNTAX_RULE,
            Severity::Critical,
            Category::Syntax,
            format!("Syntax error: {}", syntax.message),
        )
        .at_line(syntax.line)
        .with_suggestion(format!(
            "Fix the syntax at line {}, column {} before other checks can run",
            syntax.line, syntax.column
        )),
        other => Finding::new(
            SYNTAX_RULE,
            Severity::Critical,
            Category::Syntax,
            format!("Source could not be parsed: {}", other),
        ),
    }
}
