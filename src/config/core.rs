use serde::{Deserialize, Serialize};

use super::scoring::{DebtCosts, ScoringWeights};
use super::thresholds::Thresholds;
use crate::docstring::DocStyle;

/// Root configuration structure for pyqual, read from `.pyqual.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PyqualConfig {
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Quality score component weights
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Remediation minutes per finding severity
    #[serde(default)]
    pub debt: DebtCosts,

    #[serde(default)]
    pub docstring: DocstringConfig,
}

/// Documentation generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DocstringConfig {
    /// Convention used when a file has no existing docstrings to follow
    #[serde(default)]
    pub style: DocStyle,
}
