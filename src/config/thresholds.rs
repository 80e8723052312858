use serde::{Deserialize, Serialize};

/// Limits the complexity and structural rules compare against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Cyclomatic complexity above which a function is flagged
    #[serde(default = "default_max_cyclomatic")]
    pub max_cyclomatic: u32,

    /// Deepest allowed branch nesting inside a function body
    #[serde(default = "default_max_nesting")]
    pub max_nesting: u32,

    /// Parameters a caller supplies, `self`/`cls` excluded
    #[serde(default = "default_max_parameters")]
    pub max_parameters: usize,

    #[serde(default = "default_max_function_length")]
    pub max_function_length: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_cyclomatic: default_max_cyclomatic(),
            max_nesting: default_max_nesting(),
            max_parameters: default_max_parameters(),
            max_function_length: default_max_function_length(),
        }
    }
}

pub fn default_max_cyclomatic() -> u32 {
    10
}
pub fn default_max_nesting() -> u32 {
    3
}
pub fn default_max_parameters() -> usize {
    5
}
pub fn default_max_function_length() -> usize {
    50
}
