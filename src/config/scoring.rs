//! Scoring configuration for the composite quality score and debt estimate

use serde::{Deserialize, Serialize};

/// Weights of the four quality score components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight for docstring coverage (0.0-1.0)
    #[serde(default = "default_documentation_weight")]
    pub documentation: f64,

    /// Weight for inverse average cyclomatic complexity (0.0-1.0)
    #[serde(default = "default_complexity_weight")]
    pub complexity: f64,

    /// Weight for the maintainability index (0.0-1.0)
    #[serde(default = "default_maintainability_weight")]
    pub maintainability: f64,

    /// Weight for inverse code smell density (0.0-1.0)
    #[serde(default = "default_smells_weight")]
    pub smells: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            documentation: default_documentation_weight(),
            complexity: default_complexity_weight(),
            maintainability: default_maintainability_weight(),
            smells: default_smells_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn is_valid_weight(weight: f64) -> bool {
        (0.0..=1.0).contains(&weight)
    }

    pub fn validate_weight(weight: f64, name: &str) -> Result<(), String> {
        if Self::is_valid_weight(weight) {
            Ok(())
        } else {
            Err(format!("{} weight must be between 0.0 and 1.0", name))
        }
    }

    fn sum(&self) -> f64 {
        self.documentation + self.complexity + self.maintainability + self.smells
    }

    /// Every weight must be in range and at least one must be positive.
    /// Sums other than 1.0 are accepted and fixed up by [`Self::normalize`].
    pub fn validate(&self) -> Result<(), String> {
        [
            Self::validate_weight(self.documentation, "Documentation"),
            Self::validate_weight(self.complexity, "Complexity"),
            Self::validate_weight(self.maintainability, "Maintainability"),
            Self::validate_weight(self.smells, "Smells"),
        ]
        .into_iter()
        .collect::<Result<Vec<()>, String>>()?;

        if self.sum() <= 0.0 {
            return Err("at least one scoring weight must be positive".to_string());
        }
        Ok(())
    }

    /// Normalize weights to ensure they sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 && (sum - 1.0).abs() > 0.001 {
            self.documentation /= sum;
            self.complexity /= sum;
            self.maintainability /= sum;
            self.smells /= sum;
        }
    }
}

pub fn default_documentation_weight() -> f64 {
    0.25
}
pub fn default_complexity_weight() -> f64 {
    0.25
}
pub fn default_maintainability_weight() -> f64 {
    0.30
}
pub fn default_smells_weight() -> f64 {
    0.20
}

/// Minutes of remediation charged per finding, by severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtCosts {
    #[serde(default = "default_critical_cost")]
    pub critical: u32,
    #[serde(default = "default_warning_cost")]
    pub warning: u32,
    #[serde(default = "default_info_cost")]
    pub info: u32,
}

impl Default for DebtCosts {
    fn default() -> Self {
        Self {
            critical: default_critical_cost(),
            warning: default_warning_cost(),
            info: default_info_cost(),
        }
    }
}

impl DebtCosts {
    /// More urgent severities must never cost less than milder ones.
    pub fn validate(&self) -> Result<(), String> {
        if self.critical >= self.warning && self.warning >= self.info {
            Ok(())
        } else {
            Err(format!(
                "debt costs must not decrease with severity (critical {}, warning {}, info {})",
                self.critical, self.warning, self.info
            ))
        }
    }
}

pub fn default_critical_cost() -> u32 {
    30
}
pub fn default_warning_cost() -> u32 {
    10
}
pub fn default_info_cost() -> u32 {
    2
}
