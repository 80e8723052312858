//! Complexity classification for Python syntax nodes.
//!
//! The syntax model builder walks the tree once and asks these modules how
//! much each node contributes; no module here traverses a tree itself.

pub mod cognitive;
pub mod cyclomatic;
pub mod halstead;

pub use halstead::HalsteadMetrics;

/// Constructs that open a deeper branch level: conditionals, loops,
/// exception handling, context managers and pattern matching.
pub fn is_nesting_construct(kind: &str) -> bool {
    matches!(
        kind,
        "if_statement"
            | "for_statement"
            | "while_statement"
            | "try_statement"
            | "with_statement"
            | "match_statement"
    )
}

pub fn max_complexity(complexities: &[u32]) -> u32 {
    complexities.iter().copied().max().unwrap_or(0)
}

pub fn average_complexity(complexities: &[u32]) -> f64 {
    if complexities.is_empty() {
        return 0.0;
    }
    let sum: u32 = complexities.iter().sum();
    sum as f64 / complexities.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_constructs() {
        assert!(is_nesting_construct("if_statement"));
        assert!(is_nesting_construct("try_statement"));
        assert!(!is_nesting_construct("elif_clause"));
        assert!(!is_nesting_construct("boolean_operator"));
    }

    #[test]
    fn test_average_and_max() {
        assert_eq!(average_complexity(&[]), 0.0);
        assert_eq!(average_complexity(&[2, 4]), 3.0);
        assert_eq!(max_complexity(&[]), 0);
        assert_eq!(max_complexity(&[3, 9, 1]), 9);
    }
}
