//! Docstring conventions: detection and section parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStyle {
    #[default]
    Google,
    Numpy,
    Rest,
}

impl fmt::Display for DocStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocStyle::Google => "google",
            DocStyle::Numpy => "numpy",
            DocStyle::Rest => "rest",
        };
        write!(f, "{}", name)
    }
}

static NUMPY_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(Parameters|Other Parameters|Returns|Yields|Raises|Attributes|Examples|Notes|See Also)[ \t]*\r?\n[ \t]*-{3,}[ \t]*$")
        .expect("valid numpy section regex")
});

static REST_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*:(param|parameter|arg|type|returns?|rtype|raises?|except)\b[^:\n]*:")
        .expect("valid reST field regex")
});

static GOOGLE_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(Args|Arguments|Parameters|Keyword Args|Returns|Return|Yields|Raises|Attributes|Examples?|Notes?)[ \t]*:[ \t]*$")
        .expect("valid google section regex")
});

/// Convention an existing docstring follows, or `None` for plain prose
/// without any recognizable section.
pub fn detect_style(doc: &str) -> Option<DocStyle> {
    if NUMPY_SECTION.is_match(doc) {
        Some(DocStyle::Numpy)
    } else if REST_FIELD.is_match(doc) {
        Some(DocStyle::Rest)
    } else if GOOGLE_SECTION.is_match(doc) {
        Some(DocStyle::Google)
    } else {
        None
    }
}

/// What a docstring documents, independent of its convention.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDocstring {
    pub style: Option<DocStyle>,
    pub summary: String,
    /// Documented parameter names, `*`/`**` markers removed
    pub params: Vec<String>,
    pub has_params_section: bool,
    pub has_returns: bool,
    pub has_raises_section: bool,
    pub raises: Vec<String>,
}

impl ParsedDocstring {
    pub fn documents_raise(&self, exception: &str) -> bool {
        let short = exception.rsplit('.').next().unwrap_or(exception);
        self.raises
            .iter()
            .any(|r| r == exception || r.rsplit('.').next() == Some(short))
    }
}

pub fn parse(doc: &str) -> ParsedDocstring {
    let style = detect_style(doc);
    let mut parsed = match style {
        Some(DocStyle::Rest) => parse_rest(doc),
        Some(style) => parse_sections(doc, style),
        None => ParsedDocstring::default(),
    };
    parsed.style = style;
    parsed.summary = doc
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string();
    parsed
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Params,
    Returns,
    Raises,
    Other,
}

fn section_kind(title: &str) -> Option<Section> {
    let kind = match title {
        "Args" | "Arguments" | "Parameters" | "Params" | "Keyword Args" | "Keyword Arguments"
        | "Other Parameters" => Section::Params,
        "Returns" | "Return" | "Yields" | "Yield" => Section::Returns,
        "Raises" | "Raise" | "Exceptions" => Section::Raises,
        "Attributes" | "Example" | "Examples" | "Note" | "Notes" | "See Also" | "Warning"
        | "Warnings" | "References" | "Todo" => Section::Other,
        _ => return None,
    };
    Some(kind)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_underline(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

/// Section header at `idx`, with its title kind and indentation.
fn header_at(lines: &[&str], idx: usize, style: DocStyle) -> Option<(Section, usize)> {
    let line = lines[idx];
    let trimmed = line.trim();
    let kind = match style {
        DocStyle::Numpy => {
            let underlined = lines.get(idx + 1).is_some_and(|next| is_underline(next));
            if !underlined {
                return None;
            }
            section_kind(trimmed)?
        }
        _ => section_kind(trimmed.strip_suffix(':')?.trim_end())?,
    };
    Some((kind, indent_of(line)))
}

fn entry_name(entry: &str, style: DocStyle) -> String {
    let head = match style {
        DocStyle::Numpy => entry.split(':').next().unwrap_or(entry),
        _ => entry
            .split(':')
            .next()
            .unwrap_or(entry)
            .split('(')
            .next()
            .unwrap_or(entry),
    };
    head.trim().trim_start_matches('*').to_string()
}

fn parse_sections(doc: &str, style: DocStyle) -> ParsedDocstring {
    let lines: Vec<&str> = doc.lines().collect();
    let mut parsed = ParsedDocstring::default();
    let mut current: Option<(Section, usize)> = None;
    let mut entry_indent: Option<usize> = None;
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        if let Some(header) = header_at(&lines, idx, style) {
            match header.0 {
                Section::Params => parsed.has_params_section = true,
                Section::Raises => parsed.has_raises_section = true,
                Section::Returns | Section::Other => {}
            }
            current = Some(header);
            entry_indent = None;
            idx += if style == DocStyle::Numpy { 2 } else { 1 };
            continue;
        }
        idx += 1;

        let Some((section, header_indent)) = current else {
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }

        let indent = indent_of(line);
        let is_entry = match style {
            DocStyle::Numpy => indent == header_indent,
            _ => {
                if indent <= header_indent {
                    current = None;
                    continue;
                }
                *entry_indent.get_or_insert(indent) == indent
            }
        };
        if !is_entry {
            continue;
        }

        let entry = line.trim();
        match section {
            Section::Params => {
                let names = entry_name(entry, style);
                parsed.params.extend(
                    names
                        .split(',')
                        .map(|n| n.trim().trim_start_matches('*').to_string())
                        .filter(|n| !n.is_empty()),
                );
            }
            Section::Returns => parsed.has_returns = true,
            Section::Raises => {
                let name = entry_name(entry, style);
                if !name.is_empty() {
                    parsed.raises.push(name);
                }
            }
            Section::Other => {}
        }
    }

    parsed
}

static REST_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:(param|parameter|arg|argument|key|keyword|returns?|raises?|except|exception)\b([^:]*):")
        .expect("valid reST entry regex")
});

fn parse_rest(doc: &str) -> ParsedDocstring {
    let mut parsed = ParsedDocstring::default();

    for line in doc.lines().map(str::trim) {
        let Some(caps) = REST_ENTRY.captures(line) else {
            continue;
        };
        let field = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let argument = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        // `:param int count:` names the parameter last
        let last_word = argument.split_whitespace().last().unwrap_or_default();

        match field {
            "param" | "parameter" | "arg" | "argument" | "key" | "keyword" => {
                parsed.has_params_section = true;
                if !last_word.is_empty() {
                    parsed.params.push(last_word.trim_start_matches('*').to_string());
                }
            }
            "return" | "returns" => parsed.has_returns = true,
            _ => {
                parsed.has_raises_section = true;
                if !last_word.is_empty() {
                    parsed.raises.push(last_word.to_string());
                }
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const GOOGLE: &str = indoc! {"
        Calculate the sum of two numbers.

        Args:
            a (int): First number
            b (int): Second number
                spanning two lines.
            *rest: Extra values

        Returns:
            int: Sum of a and b

        Raises:
            ValueError: If inputs are not numbers
    "};

    const NUMPY: &str = indoc! {"
        Calculate the sum of two numbers.

        Parameters
        ----------
        a : int
            First number
        b, c : int
            Second and third number

        Returns
        -------
        int
            Sum of a and b

        Raises
        ------
        ValueError
            If inputs are not numbers
    "};

    const REST: &str = indoc! {"
        Calculate the sum of two numbers.

        :param a: First number
        :param int b: Second number
        :returns: Sum of a and b
        :raises ValueError: If inputs are not numbers
    "};

    #[test]
    fn test_detect_style() {
        assert_eq!(detect_style(GOOGLE), Some(DocStyle::Google));
        assert_eq!(detect_style(NUMPY), Some(DocStyle::Numpy));
        assert_eq!(detect_style(REST), Some(DocStyle::Rest));
        assert_eq!(detect_style("Just a summary."), None);
    }

    #[test]
    fn test_parse_google() {
        let parsed = parse(GOOGLE);
        assert_eq!(parsed.summary, "Calculate the sum of two numbers.");
        assert_eq!(parsed.params, vec!["a", "b", "rest"]);
        assert!(parsed.has_returns);
        assert_eq!(parsed.raises, vec!["ValueError"]);
    }

    #[test]
    fn test_parse_numpy() {
        let parsed = parse(NUMPY);
        assert_eq!(parsed.params, vec!["a", "b", "c"]);
        assert!(parsed.has_returns);
        assert_eq!(parsed.raises, vec!["ValueError"]);
    }

    #[test]
    fn test_parse_rest() {
        let parsed = parse(REST);
        assert_eq!(parsed.params, vec!["a", "b"]);
        assert!(parsed.has_returns);
        assert!(parsed.documents_raise("ValueError"));
    }

    #[test]
    fn test_plain_docstring_has_no_sections() {
        let parsed = parse("Do a thing.\n\nMore prose here.");
        assert_eq!(parsed.style, None);
        assert!(!parsed.has_params_section);
        assert!(parsed.params.is_empty());
        assert_eq!(parsed.summary, "Do a thing.");
    }

    #[test]
    fn test_documents_raise_matches_qualified_names() {
        let parsed = ParsedDocstring {
            raises: vec!["errors.ConfigError".to_string()],
            ..ParsedDocstring::default()
        };
        assert!(parsed.documents_raise("ConfigError"));
        assert!(!parsed.documents_raise("KeyError"));
    }
}
