//! Line counting.
//!
//! Every physical line is exactly one of code, comment or blank, so
//! `physical_lines == code_lines + comment_lines + blank_lines` always holds.
//!
//! Python `#` lines count as comments, and so does every line of a
//! triple-quoted string that opens a statement (docstrings and free-standing
//! block strings). Other languages use `//` and `/* */`, with nestable block
//! comments for Rust.
//!
//! Comment markers inside ordinary string literals are not detected.

use crate::core::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct LocCount {
    /// Raw line count
    pub physical_lines: usize,
    /// Lines containing executable code
    pub code_lines: usize,
    /// Lines that are primarily comments
    pub comment_lines: usize,
    /// Lines containing only whitespace
    pub blank_lines: usize,
}

impl LocCount {
    /// Share of non-blank lines that are comments, in `[0, 1]`.
    pub fn comment_ratio(&self) -> f64 {
        let meaningful = self.code_lines + self.comment_lines;
        if meaningful == 0 {
            0.0
        } else {
            self.comment_lines as f64 / meaningful as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocCounter;

impl LocCounter {
    pub fn count(&self, content: &str, language: Language) -> LocCount {
        let mut count = LocCount::default();
        let mut state = CommentState::default();

        for line in content.lines() {
            count.physical_lines += 1;
            match classify_line(line.trim(), &mut state, language) {
                LineType::Blank => count.blank_lines += 1,
                LineType::Comment => count.comment_lines += 1,
                LineType::Code => count.code_lines += 1,
            }
        }

        count
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineType {
    Blank,
    Comment,
    Code,
}

#[derive(Clone, Debug, Default)]
struct CommentState {
    /// Inside a `/* */` comment, with its nesting depth
    block_depth: usize,
    /// Inside a statement-level triple-quoted string, with its delimiter
    docstring: Option<&'static str>,
}

fn classify_line(trimmed: &str, state: &mut CommentState, language: Language) -> LineType {
    if let Some(delimiter) = state.docstring {
        if trimmed.contains(delimiter) {
            state.docstring = None;
        }
        return if trimmed.is_empty() {
            LineType::Blank
        } else {
            LineType::Comment
        };
    }

    if trimmed.is_empty() {
        return LineType::Blank;
    }

    match language {
        Language::Python => classify_python_line(trimmed, state),
        _ => classify_c_like_line(trimmed, state, language),
    }
}

fn classify_python_line(trimmed: &str, state: &mut CommentState) -> LineType {
    if trimmed.starts_with('#') {
        return LineType::Comment;
    }

    let unprefixed = trimmed.trim_start_matches(|c: char| "rRuU".contains(c));
    for delimiter in ["\"\"\"", "'''"] {
        if let Some(rest) = unprefixed.strip_prefix(delimiter) {
            if !rest.contains(delimiter) {
                state.docstring = Some(delimiter);
            }
            return LineType::Comment;
        }
    }

    LineType::Code
}

fn classify_c_like_line(trimmed: &str, state: &mut CommentState, language: Language) -> LineType {
    if state.block_depth > 0 {
        state.block_depth = scan_block_comment(trimmed, state.block_depth, language);
        return LineType::Comment;
    }

    if let Some(start) = trimmed.find("/*") {
        let has_code_before = {
            let before = trimmed[..start].trim();
            !before.is_empty() && !before.starts_with("//")
        };
        state.block_depth = scan_block_comment(&trimmed[start + 2..], 1, language);

        if has_code_before {
            return LineType::Code;
        }
        if state.block_depth == 0 {
            let after = trimmed.rfind("*/").map(|end| trimmed[end + 2..].trim());
            if after.is_some_and(|rest| !rest.is_empty()) {
                return LineType::Code;
            }
        }
        return LineType::Comment;
    }

    if trimmed.starts_with("//") {
        LineType::Comment
    } else {
        LineType::Code
    }
}

/// Walk `text` and return the block comment depth at its end.
fn scan_block_comment(text: &str, mut depth: usize, language: Language) -> usize {
    let bytes = text.as_bytes();
    let mut idx = 0;

    while idx + 1 < bytes.len() && depth > 0 {
        match (bytes[idx], bytes[idx + 1]) {
            (b'/', b'*') => {
                if language == Language::Rust {
                    depth += 1;
                }
                idx += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                idx += 2;
            }
            _ => idx += 1,
        }
    }

    depth
}
