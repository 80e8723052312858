//! Metrics engine: size, complexity, Halstead, maintainability,
//! documentation coverage, composite quality score and technical debt.
//!
//! Every value is a pure function of the source text (and the fixed
//! configuration table), so recomputing from the same input is bit-identical.
//! Degenerate inputs produce sentinel values instead of failing.

pub mod loc_counter;

pub use loc_counter::{LocCount, LocCounter};

use crate::complexity::{average_complexity, cyclomatic, halstead, max_complexity};
use crate::config::{DebtCosts, PyqualConfig, ScoringWeights};
use crate::core::{Language, StructuralSummary};
use crate::docstring::coverage_of;
use crate::rules::{self, Category, Finding, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade derived from the quality score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// A ≥ 90, B ≥ 80, C ≥ 70, D ≥ 60, F otherwise. No rounding: 89.9 is a B.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Physical lines
    pub lines_of_code: usize,
    /// Lines that are neither blank nor comments
    pub source_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// comment / (code + comment), in `[0, 1]`
    pub comment_ratio: f64,
    pub num_functions: usize,
    pub num_classes: usize,
    /// Sum over functions
    pub cyclomatic_complexity: u32,
    pub cognitive_complexity: u32,
    /// Highest cyclomatic complexity of any single function
    pub max_cyclomatic: u32,
    pub halstead_volume: f64,
    pub halstead_difficulty: f64,
    pub halstead_bugs: f64,
    pub maintainability_index: f64,
    pub docstring_coverage: f64,
    pub code_smells: usize,
    pub technical_debt_minutes: u32,
    pub quality_score: f64,
    pub grade: Grade,
}

impl Metrics {
    /// Metrics carrying only line counts; everything derived is zero.
    fn from_lines(lines: LocCount) -> Self {
        Self {
            lines_of_code: lines.physical_lines,
            source_lines: lines.code_lines,
            comment_lines: lines.comment_lines,
            blank_lines: lines.blank_lines,
            comment_ratio: lines.comment_ratio(),
            num_functions: 0,
            num_classes: 0,
            cyclomatic_complexity: 0,
            cognitive_complexity: 0,
            max_cyclomatic: 0,
            halstead_volume: 0.0,
            halstead_difficulty: 0.0,
            halstead_bugs: 0.0,
            maintainability_index: 0.0,
            docstring_coverage: 0.0,
            code_smells: 0,
            technical_debt_minutes: 0,
            quality_score: 0.0,
            grade: Grade::F,
        }
    }
}

/// Natural log with values below 1 treated as 0, so empty files and
/// single-line programs stay finite.
fn ln_floor(value: f64) -> f64 {
    if value < 1.0 {
        0.0
    } else {
        value.ln()
    }
}

/// Maintainability index on a 0-100 scale.
///
/// Decreases with Halstead volume, cyclomatic complexity and source lines;
/// increases with the comment ratio (on `[0, 1]` the sine term is monotonic).
pub fn maintainability_index(volume: f64, cyclomatic: u32, source_lines: usize, comment_ratio: f64) -> f64 {
    let raw = 171.0 - 5.2 * ln_floor(volume) - 0.23 * cyclomatic as f64
        - 16.2 * ln_floor(source_lines as f64)
        + 50.0 * (2.4 * comment_ratio.clamp(0.0, 1.0)).sqrt().sin();
    (raw * 100.0 / 171.0).clamp(0.0, 100.0)
}

/// 100 at an average cyclomatic complexity of 1, falling linearly to 0 at 20.
pub fn complexity_score(average_cyclomatic: f64) -> f64 {
    (100.0 - (average_cyclomatic - 1.0) * 100.0 / 19.0).clamp(0.0, 100.0)
}

/// Loses 20 points per code smell per hundred source lines.
pub fn smell_score(code_smells: usize, source_lines: usize) -> f64 {
    if code_smells == 0 {
        return 100.0;
    }
    let density = code_smells as f64 * 100.0 / source_lines.max(1) as f64;
    (100.0 - density * 20.0).clamp(0.0, 100.0)
}

pub fn quality_score(
    docstring_coverage: f64,
    complexity: f64,
    maintainability: f64,
    smells: f64,
    weights: &ScoringWeights,
) -> f64 {
    let blended = weights.documentation * docstring_coverage
        + weights.complexity * complexity
        + weights.maintainability * maintainability
        + weights.smells * smells;
    blended.clamp(0.0, 100.0)
}

pub fn severity_cost(severity: Severity, costs: &DebtCosts) -> u32 {
    match severity {
        Severity::Critical => costs.critical,
        Severity::Warning => costs.warning,
        Severity::Info => costs.info,
    }
}

pub fn technical_debt(findings: &[Finding], costs: &DebtCosts) -> u32 {
    findings
        .iter()
        .map(|f| severity_cost(f.severity, costs))
        .sum()
}

/// Complexity and structural findings.
pub fn count_smells(findings: &[Finding]) -> usize {
    findings
        .iter()
        .filter(|f| matches!(f.category, Category::Complexity | Category::Structural))
        .count()
}

/// Score a parsed file, running the default review for smells and debt.
pub fn score(text: &str, summary: &StructuralSummary) -> Metrics {
    let config = PyqualConfig::default();
    let findings = rules::review_with_config(text, summary, &config, false);
    score_with_findings(text, summary, &findings, &config)
}

pub fn score_with_findings(
    text: &str,
    summary: &StructuralSummary,
    findings: &[Finding],
    config: &PyqualConfig,
) -> Metrics {
    let lines = LocCounter.count(text, Language::Python);
    let per_function: Vec<u32> = summary.functions().map(|f| f.cyclomatic).collect();
    let cyclomatic_complexity =
        cyclomatic::file_cyclomatic(&per_function, summary.module_decision_points);
    let cognitive_complexity = summary.functions().map(|f| f.cognitive).sum();
    let halstead = halstead::calculate(&summary.halstead);
    let coverage = coverage_of(summary);

    let maintainability = maintainability_index(
        halstead.volume,
        cyclomatic_complexity,
        lines.code_lines,
        lines.comment_ratio(),
    );
    let average = if per_function.is_empty() {
        1.0
    } else {
        average_complexity(&per_function)
    };
    let code_smells = count_smells(findings);
    let quality = quality_score(
        coverage.percentage,
        complexity_score(average),
        maintainability,
        smell_score(code_smells, lines.code_lines),
        &config.scoring,
    );

    Metrics {
        num_functions: per_function.len(),
        num_classes: summary.classes().count(),
        cyclomatic_complexity,
        cognitive_complexity,
        max_cyclomatic: max_complexity(&per_function),
        halstead_volume: halstead.volume,
        halstead_difficulty: halstead.difficulty,
        halstead_bugs: halstead.estimated_bugs,
        maintainability_index: maintainability,
        docstring_coverage: coverage.percentage,
        code_smells,
        technical_debt_minutes: technical_debt(findings, &config.debt),
        quality_score: quality,
        grade: Grade::from_score(quality),
        ..Metrics::from_lines(lines)
    }
}

/// Metrics for Python text the builder rejected: line counts and the debt
/// of the syntax finding, graded F.
pub fn unparseable(text: &str, findings: &[Finding], config: &PyqualConfig) -> Metrics {
    Metrics {
        technical_debt_minutes: technical_debt(findings, &config.debt),
        ..Metrics::from_lines(LocCounter.count(text, Language::Python))
    }
}

/// Metrics for files in languages without a structural builder. Only the
/// line-based components feed the score; the rest count as neutral.
pub fn loc_only(text: &str, language: Language, config: &PyqualConfig) -> Metrics {
    let lines = LocCounter.count(text, language);
    let maintainability = maintainability_index(0.0, 0, lines.code_lines, lines.comment_ratio());
    let quality = quality_score(100.0, 100.0, maintainability, 100.0, &config.scoring);

    Metrics {
        maintainability_index: maintainability,
        docstring_coverage: 100.0,
        quality_score: quality,
        grade: Grade::from_score(quality),
        ..Metrics::from_lines(lines)
    }
}
