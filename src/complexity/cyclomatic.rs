/// Decision points a single node adds to the enclosing function.
///
/// Each `if`/`elif`, loop, `except` handler, boolean operator, comprehension
/// filter, conditional expression and `case` arm opens one more
/// independent path.
pub fn decision_points(kind: &str) -> u32 {
    match kind {
        "if_statement" | "elif_clause" => 1,
        "for_statement" | "while_statement" => 1,
        "except_clause" | "except_group_clause" => 1,
        "boolean_operator" => 1,
        "if_clause" => 1,
        "conditional_expression" => 1,
        "case_clause" => 1,
        _ => 0,
    }
}

/// Cyclomatic complexity of a function body with `points` decision points.
pub fn function_cyclomatic(points: u32) -> u32 {
    points + 1
}

/// File-level cyclomatic complexity.
///
/// Sum over all functions. A file without functions is scored as a single
/// implicit routine when it branches at module level, and 0 otherwise.
pub fn file_cyclomatic(functions: &[u32], module_points: u32) -> u32 {
    if functions.is_empty() {
        if module_points > 0 {
            function_cyclomatic(module_points)
        } else {
            0
        }
    } else {
        functions.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branching_kinds_add_one() {
        for kind in [
            "if_statement",
            "elif_clause",
            "for_statement",
            "while_statement",
            "except_clause",
            "boolean_operator",
            "if_clause",
            "conditional_expression",
            "case_clause",
        ] {
            assert_eq!(decision_points(kind), 1, "{kind}");
        }
    }

    #[test]
    fn test_non_branching_kinds() {
        for kind in ["else_clause", "try_statement", "with_statement", "call"] {
            assert_eq!(decision_points(kind), 0, "{kind}");
        }
    }

    #[test]
    fn test_file_cyclomatic_sums_functions() {
        assert_eq!(file_cyclomatic(&[1, 3, 2], 4), 6);
    }

    #[test]
    fn test_file_cyclomatic_without_functions() {
        assert_eq!(file_cyclomatic(&[], 0), 0);
        assert_eq!(file_cyclomatic(&[], 2), 3);
    }
}
