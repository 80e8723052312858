//! Layout rules. Every finding here is mechanically correctable and always
//! carries a fix when auto-fixing is enabled.

use super::{Category, Finding, RuleContext, Severity};
use crate::core::{Entity, Span};
use crate::fixes::AutoFix;

pub const OPERATOR_SPACING_RULE: &str = "operator-spacing";
pub const COMMA_SPACING_RULE: &str = "comma-spacing";
pub const TRAILING_WHITESPACE_RULE: &str = "trailing-whitespace";
pub const BLANK_LINES_RULE: &str = "blank-lines";

const TOP_LEVEL_BLANK_LINES: usize = 2;
const METHOD_BLANK_LINES: usize = 1;

/// Byte layout of one physical line.
#[derive(Clone, Copy, Debug)]
struct LineInfo {
    start: usize,
    /// End of the content, before any `\r\n` or `\n`
    content_end: usize,
}

fn line_table(text: &str) -> Vec<LineInfo> {
    let mut lines = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let (content_end, next) = match text[start..].find('\n') {
            Some(rel) => {
                let newline = start + rel;
                let content_end = if text[..newline].ends_with('\r') {
                    newline - 1
                } else {
                    newline
                };
                (content_end.max(start), newline + 1)
            }
            None => (text.len(), text.len()),
        };
        lines.push(LineInfo { start, content_end });
        start = next;
    }

    lines
}

fn replace(span: Span, text: &str, replacement: impl Into<String>) -> AutoFix {
    AutoFix::Replace {
        span,
        expected: text[span.start..span.end].to_string(),
        replacement: replacement.into(),
    }
}

pub fn check_operator_spacing(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .operator_sites
        .iter()
        .filter(|site| {
            let gap = &ctx.text[site.span.start..site.span.end];
            !gap.starts_with(char::is_whitespace) || !gap.ends_with(char::is_whitespace)
        })
        .map(|site| {
            let spaced = format!(" {} ", site.operator);
            Finding::new(
                OPERATOR_SPACING_RULE,
                Severity::Info,
                Category::Formatting,
                format!("Missing whitespace around operator '{}'", site.operator),
            )
            .at_line(site.line)
            .with_suggestion(format!("Write '{}' with surrounding spaces", site.operator))
            .with_fix(ctx.offer(|| Some(replace(site.span, ctx.text, spaced))))
        })
        .collect()
}

pub fn check_comma_spacing(ctx: &RuleContext) -> Vec<Finding> {
    ctx.summary
        .comma_sites
        .iter()
        .map(|site| {
            let comma = Span::new(site.offset - 1, site.offset);
            Finding::new(
                COMMA_SPACING_RULE,
                Severity::Info,
                Category::Formatting,
                "Missing whitespace after ','",
            )
            .at_line(site.line)
            .with_fix(ctx.offer(|| Some(replace(comma, ctx.text, ", "))))
        })
        .collect()
}

pub fn check_trailing_whitespace(ctx: &RuleContext) -> Vec<Finding> {
    line_table(ctx.text)
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let content = &ctx.text[line.start..line.content_end];
            let kept = content.trim_end_matches([' ', '\t']).len();
            let span = Span::new(line.start + kept, line.content_end);
            if span.is_empty() || ctx.summary.in_string(span.start) {
                return None;
            }
            Some(
                Finding::new(
                    TRAILING_WHITESPACE_RULE,
                    Severity::Info,
                    Category::Formatting,
                    "Trailing whitespace",
                )
                .at_line(idx + 1)
                .with_fix(ctx.offer(|| Some(replace(span, ctx.text, "")))),
            )
        })
        .collect()
}

/// Blank lines expected above a declaration, or `None` when the rule does
/// not apply to it. Only excess is flagged between methods.
fn expected_blank_lines(entity: &Entity) -> Option<(usize, bool)> {
    match entity {
        Entity::Function(f) if f.is_method() && !f.is_nested => Some((METHOD_BLANK_LINES, false)),
        Entity::Function(f) if !f.is_nested && f.enclosing_depth == 0 => {
            Some((TOP_LEVEL_BLANK_LINES, true))
        }
        Entity::Class(c) if !c.is_nested && c.enclosing_depth == 0 => {
            Some((TOP_LEVEL_BLANK_LINES, true))
        }
        _ => None,
    }
}

pub fn check_blank_lines(ctx: &RuleContext) -> Vec<Finding> {
    let lines = line_table(ctx.text);
    let newline = ctx.summary.line_ending.as_str();
    let mut findings = Vec::new();

    for entity in &ctx.summary.entities {
        let Some((expected, exact)) = expected_blank_lines(entity) else {
            continue;
        };
        let Some(decl) = lines.get(entity.start_line().saturating_sub(1)) else {
            continue;
        };
        let line_text = |l: &LineInfo| &ctx.text[l.start..l.content_end];
        // Top-level declarations sit in column 0; methods share the class indent.
        if exact && line_text(decl).starts_with(char::is_whitespace) {
            continue;
        }

        // Comments directly above belong to the declaration.
        let mut above = entity.start_line() - 1;
        while above > 0 && line_text(&lines[above - 1]).trim_start().starts_with('#') {
            above -= 1;
        }
        let run_end = above;
        while above > 0 && line_text(&lines[above - 1]).trim().is_empty() {
            above -= 1;
        }
        let run_start = above;
        let found = run_end - run_start;

        // Nothing but blanks and comments above: first statement of the file
        // or of the class body.
        if run_start == 0 {
            continue;
        }
        let previous = line_text(&lines[run_start - 1]).trim_end();
        if !exact && previous.ends_with(':') {
            continue;
        }

        let violates = if exact {
            found != expected
        } else {
            found > expected
        };
        if !violates {
            continue;
        }

        let span_start = lines[run_start].start;
        let span_end = lines.get(run_end).map(|l| l.start).unwrap_or(ctx.text.len());
        let span = Span::new(span_start, span_end);
        let plural = if expected == 1 { "" } else { "s" };

        findings.push(
            Finding::new(
                BLANK_LINES_RULE,
                Severity::Info,
                Category::Formatting,
                format!(
                    "Expected {} blank line{} before '{}', found {}",
                    expected,
                    plural,
                    entity.name(),
                    found
                ),
            )
            .at_line(entity.start_line())
            .with_fix(ctx.offer(|| Some(replace(span, ctx.text, newline.repeat(expected))))),
        );
    }

    findings
}
