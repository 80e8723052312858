//! Cognitive complexity increments for Python constructs.
//!
//! Structural constructs (`if`, loops, `except`, `match`, conditional
//! expressions) cost `1 + nesting`. Continuations of a flow that is already
//! being read (`elif`, `else`, comprehension filters, a run of the same
//! boolean operator) cost a flat 1 regardless of depth, so each extra
//! nesting level always costs more than repeating a construct flat.

/// How a node kind participates in cognitive complexity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeClassification {
    /// Breaks linear flow and nests its children.
    Structural,
    /// Continues a flow already accounted for.
    Flat,
    /// A boolean operator; only the first operator of a run is charged.
    LogicalOp,
    /// Adds no cost but nests its children (lambdas).
    NestingOnly,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeMetrics {
    pub increment: u32,
    pub increases_nesting: bool,
}

pub fn classify(kind: &str) -> NodeClassification {
    match kind {
        "if_statement" | "for_statement" | "while_statement" | "except_clause"
        | "except_group_clause" | "match_statement" | "conditional_expression" => {
            NodeClassification::Structural
        }
        "elif_clause" | "else_clause" | "if_clause" => NodeClassification::Flat,
        "boolean_operator" => NodeClassification::LogicalOp,
        "lambda" => NodeClassification::NestingOnly,
        _ => NodeClassification::Other,
    }
}

/// Cost of a node at `nesting` levels deep.
///
/// `continues_sequence` is true for a boolean operator whose parent is the
/// same boolean operator (`a and b and c` is charged once).
pub fn node_metrics(kind: &str, nesting: u32, continues_sequence: bool) -> NodeMetrics {
    match classify(kind) {
        NodeClassification::Structural => NodeMetrics {
            increment: 1 + nesting,
            increases_nesting: true,
        },
        NodeClassification::Flat => NodeMetrics {
            increment: 1,
            increases_nesting: false,
        },
        NodeClassification::LogicalOp => NodeMetrics {
            increment: u32::from(!continues_sequence),
            increases_nesting: false,
        },
        NodeClassification::NestingOnly => NodeMetrics {
            increment: 0,
            increases_nesting: true,
        },
        NodeClassification::Other => NodeMetrics {
            increment: 0,
            increases_nesting: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_cost_grows_with_nesting() {
        assert_eq!(node_metrics("if_statement", 0, false).increment, 1);
        assert_eq!(node_metrics("if_statement", 3, false).increment, 4);
        assert!(node_metrics("for_statement", 0, false).increases_nesting);
    }

    #[test]
    fn test_flat_constructs_ignore_nesting() {
        assert_eq!(node_metrics("elif_clause", 5, false).increment, 1);
        assert_eq!(node_metrics("else_clause", 2, false).increment, 1);
        assert!(!node_metrics("else_clause", 2, false).increases_nesting);
    }

    #[test]
    fn test_boolean_runs_charged_once() {
        assert_eq!(node_metrics("boolean_operator", 4, false).increment, 1);
        assert_eq!(node_metrics("boolean_operator", 4, true).increment, 0);
    }

    #[test]
    fn test_nested_level_outweighs_flat_repetition() {
        // Two sibling ifs versus one if nested in another
        let flat = 2 * node_metrics("if_statement", 0, false).increment;
        let nested = node_metrics("if_statement", 0, false).increment
            + node_metrics("if_statement", 1, false).increment;
        assert!(nested > flat);
    }

    #[test]
    fn test_lambda_only_nests() {
        let metrics = node_metrics("lambda", 1, false);
        assert_eq!(metrics.increment, 0);
        assert!(metrics.increases_nesting);
    }
}
