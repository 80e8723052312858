//! Halstead size and difficulty metrics.

use crate::core::HalsteadCounts;
use serde::{Deserialize, Serialize};

/// Named leaf kinds counted as operands. String literals are counted as a
/// single operand by the builder and never reach this classification.
const OPERAND_KINDS: &[&str] = &["identifier", "integer", "float", "true", "false", "none", "ellipsis"];

/// Closing delimiters pair with an already counted opening token.
const CLOSING_DELIMITERS: &[&str] = &[")", "]", "}"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenClass {
    Operator,
    Operand,
}

/// Classify a leaf token of the syntax tree.
pub fn classify_leaf(kind: &str, is_named: bool) -> Option<TokenClass> {
    if is_named {
        OPERAND_KINDS.contains(&kind).then_some(TokenClass::Operand)
    } else if CLOSING_DELIMITERS.contains(&kind) {
        None
    } else {
        Some(TokenClass::Operator)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HalsteadMetrics {
    /// n1
    pub distinct_operators: usize,
    /// n2
    pub distinct_operands: usize,
    /// N1
    pub total_operators: usize,
    /// N2
    pub total_operands: usize,
    pub volume: f64,
    pub difficulty: f64,
    pub effort: f64,
    pub estimated_bugs: f64,
}

impl HalsteadMetrics {
    pub fn vocabulary(&self) -> usize {
        self.distinct_operators + self.distinct_operands
    }

    pub fn length(&self) -> usize {
        self.total_operators + self.total_operands
    }
}

/// Derive Halstead metrics from token counts. Empty vocabularies and
/// missing operands degrade to zero rather than NaN.
pub fn calculate(counts: &HalsteadCounts) -> HalsteadMetrics {
    let distinct_operators = counts.distinct_operators();
    let distinct_operands = counts.distinct_operands();
    let total_operators = counts.total_operators();
    let total_operands = counts.total_operands();

    let vocabulary = distinct_operators + distinct_operands;
    let length = total_operators + total_operands;

    let volume = if vocabulary > 0 {
        length as f64 * (vocabulary as f64).log2()
    } else {
        0.0
    };

    let difficulty = if distinct_operands > 0 {
        (distinct_operators as f64 / 2.0) * (total_operands as f64 / distinct_operands as f64)
    } else {
        0.0
    };

    HalsteadMetrics {
        distinct_operators,
        distinct_operands,
        total_operators,
        total_operands,
        volume,
        difficulty,
        effort: volume * difficulty,
        estimated_bugs: volume / 3000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(operators: &[&str], operands: &[&str]) -> HalsteadCounts {
        let mut counts = HalsteadCounts::default();
        operators.iter().for_each(|op| counts.add_operator(op));
        operands.iter().for_each(|op| counts.add_operand(op));
        counts
    }

    #[test]
    fn test_empty_counts_are_zero() {
        let metrics = calculate(&HalsteadCounts::default());
        assert_eq!(metrics.volume, 0.0);
        assert_eq!(metrics.difficulty, 0.0);
        assert_eq!(metrics.estimated_bugs, 0.0);
    }

    #[test]
    fn test_simple_expression() {
        // x = a + a
        let metrics = calculate(&counts(&["=", "+"], &["x", "a", "a"]));
        assert_eq!(metrics.vocabulary(), 4);
        assert_eq!(metrics.length(), 5);
        assert!((metrics.volume - 10.0).abs() < 1e-9);
        // (2 / 2) * (3 / 2)
        assert!((metrics.difficulty - 1.5).abs() < 1e-9);
        assert!((metrics.estimated_bugs - 10.0 / 3000.0).abs() < 1e-12);
    }

    #[test]
    fn test_operators_without_operands() {
        let metrics = calculate(&counts(&["pass"], &[]));
        assert_eq!(metrics.difficulty, 0.0);
        assert_eq!(metrics.volume, 0.0);
    }

    #[test]
    fn test_leaf_classification() {
        assert_eq!(classify_leaf("identifier", true), Some(TokenClass::Operand));
        assert_eq!(classify_leaf("integer", true), Some(TokenClass::Operand));
        assert_eq!(classify_leaf("+", false), Some(TokenClass::Operator));
        assert_eq!(classify_leaf("def", false), Some(TokenClass::Operator));
        assert_eq!(classify_leaf(")", false), None);
        assert_eq!(classify_leaf("comment", true), None);
    }
}
