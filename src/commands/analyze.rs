use crate::analyzers::{analyze_file_contents, Analysis};
use crate::cli::OutputFormat;
use crate::config::PyqualConfig;
use crate::metrics::Grade;
use crate::rules::{Finding, Severity};
use crate::{core::Language, io};
use anyhow::{Context, Result};
use colored::*;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub struct AnalyzeConfig {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub ignore: Vec<String>,
    pub min_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub analysis: Analysis,
}

/// Analyze every file concurrently. Files are independent, so each worker
/// runs the whole pipeline with no shared state.
pub fn analyze_files(files: &[PathBuf], config: &PyqualConfig) -> Result<Vec<FileReport>> {
    files
        .par_iter()
        .map(|path| {
            let content = io::read_file(path)?;
            Ok(FileReport {
                path: path.clone(),
                analysis: analyze_file_contents(path, &content, config),
            })
        })
        .collect()
}

/// Returns `false` when `min_score` is set and some file scored below it.
pub fn handle_analyze(config: AnalyzeConfig, pyqual: &PyqualConfig) -> Result<bool> {
    let files = io::FileWalker::new(config.paths.clone())
        .with_languages(vec![Language::Python])
        .with_ignore_patterns(&config.ignore)
        .walk()
        .context("Failed to collect files to analyze")?;
    info!(files = files.len(), "Analyzing files");

    let reports = analyze_files(&files, pyqual)?;

    let rendered = match config.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&reports).context("Failed to serialize analysis")?
        }
        OutputFormat::Terminal => {
            if config.output.is_some() {
                colored::control::set_override(false);
            }
            render_terminal(&reports)
        }
    };

    match &config.output {
        Some(path) => io::write_file(path, &rendered)?,
        None => println!("{}", rendered),
    }

    Ok(passes_min_score(&reports, config.min_score))
}

pub fn passes_min_score(reports: &[FileReport], min_score: Option<f64>) -> bool {
    min_score.map_or(true, |min| {
        reports
            .iter()
            .all(|r| r.analysis.metrics.quality_score >= min)
    })
}

fn colored_grade(grade: Grade) -> ColoredString {
    let label = grade.to_string();
    match grade {
        Grade::A => label.bright_green().bold(),
        Grade::B => label.green().bold(),
        Grade::C => label.yellow().bold(),
        Grade::D => label.bright_red().bold(),
        Grade::F => label.red().bold(),
    }
}

fn colored_severity(severity: Severity) -> ColoredString {
    let label = format!("{:<8}", severity.to_string());
    match severity {
        Severity::Critical => label.bright_red().bold(),
        Severity::Warning => label.yellow(),
        Severity::Info => label.bright_blue(),
    }
}

fn render_finding(finding: &Finding) -> String {
    let line = finding
        .line
        .map(|l| format!("{:>5}", l))
        .unwrap_or_else(|| "    -".to_string());
    let mut out = format!(
        "  {}  {} {} {}\n",
        line.dimmed(),
        colored_severity(finding.severity),
        format!("[{}]", finding.rule).bright_black(),
        finding.message
    );
    if let Some(suggestion) = &finding.suggestion {
        out.push_str(&format!("         {} {}\n", "->".dimmed(), suggestion.dimmed()));
    }
    out
}

pub fn render_terminal(reports: &[FileReport]) -> String {
    let mut out = String::new();

    for report in reports {
        let m = &report.analysis.metrics;
        out.push_str(&format!(
            "{}  grade {}  score {:.1}\n",
            report.path.display().to_string().bright_white().bold(),
            colored_grade(m.grade),
            m.quality_score
        ));
        out.push_str(&format!(
            "  lines {} (code {}, comments {}, blank {})  functions {}  classes {}\n",
            m.lines_of_code, m.source_lines, m.comment_lines, m.blank_lines, m.num_functions,
            m.num_classes
        ));
        out.push_str(&format!(
            "  cyclomatic {} (max {})  cognitive {}  MI {:.1}  docs {:.1}%  debt {} min\n",
            m.cyclomatic_complexity,
            m.max_cyclomatic,
            m.cognitive_complexity,
            m.maintainability_index,
            m.docstring_coverage,
            m.technical_debt_minutes
        ));
        for finding in &report.analysis.findings {
            out.push_str(&render_finding(finding));
        }
        out.push('\n');
    }

    let findings: usize = reports.iter().map(|r| r.analysis.findings.len()).sum();
    let fixable: usize = reports.iter().map(|r| r.analysis.fixable()).sum();
    out.push_str(
        &format!(
            "{} files, {} findings ({} auto-fixable)",
            reports.len(),
            findings,
            fixable
        )
        .bright_cyan()
        .to_string(),
    );
    out
}
