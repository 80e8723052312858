use crate::analyzers::python;
use crate::cli::OutputFormat;
use crate::config::PyqualConfig;
use crate::docstring::{self, DocCoverage, DocStyle, GeneratedDoc};
use crate::io;
use anyhow::{Context, Result};
use colored::*;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

pub struct DocsConfig {
    pub paths: Vec<PathBuf>,
    pub generate: bool,
    pub style: Option<DocStyle>,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct DocsReport {
    pub path: PathBuf,
    pub coverage: Option<DocCoverage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generated: Vec<GeneratedDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The convention most existing docstrings in `text` follow, if any.
pub fn dominant_style(text: &str) -> Option<DocStyle> {
    let summary = python::build(text).ok()?;
    let mut counts = [(DocStyle::Google, 0), (DocStyle::Numpy, 0), (DocStyle::Rest, 0)];

    for style in summary
        .documentable()
        .filter_map(|e| e.docstring())
        .filter_map(docstring::detect_style)
    {
        if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == style) {
            entry.1 += 1;
        }
    }

    counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(style, _)| *style)
}

pub fn document_file(path: PathBuf, text: &str, config: &DocsConfig, fallback: DocStyle) -> DocsReport {
    let coverage = match docstring::coverage(text) {
        Ok(coverage) => coverage,
        Err(e) => {
            return DocsReport {
                path,
                coverage: None,
                generated: vec![],
                error: Some(e.to_string()),
            }
        }
    };

    let generated = if config.generate {
        let style = config
            .style
            .or_else(|| dominant_style(text))
            .unwrap_or(fallback);
        docstring::generate_missing(text, style).unwrap_or_default()
    } else {
        vec![]
    };

    DocsReport {
        path,
        coverage: Some(coverage),
        generated,
        error: None,
    }
}

pub fn handle_docs(config: DocsConfig, pyqual: &PyqualConfig) -> Result<()> {
    let files = io::find_python_files(&config.paths, &[])?;
    let fallback = pyqual.docstring.style;

    let reports = files
        .par_iter()
        .map(|path| {
            let text = io::read_file(path)?;
            Ok(document_file(path.clone(), &text, &config, fallback))
        })
        .collect::<Result<Vec<_>>>()?;

    match config.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialize coverage")?
        ),
        OutputFormat::Terminal => print!("{}", render_terminal(&reports)),
    }
    Ok(())
}

fn render_terminal(reports: &[DocsReport]) -> String {
    let mut out = String::new();

    for report in reports {
        let path = report.path.display().to_string();
        let Some(coverage) = &report.coverage else {
            out.push_str(&format!(
                "{}  {}\n",
                path.bright_white().bold(),
                report.error.as_deref().unwrap_or("not analyzed").red()
            ));
            continue;
        };

        let pct = format!("{:.1}%", coverage.percentage);
        let pct = if coverage.percentage >= 80.0 {
            pct.green()
        } else if coverage.percentage >= 50.0 {
            pct.yellow()
        } else {
            pct.red()
        };
        out.push_str(&format!(
            "{}  {} ({}/{} documented)\n",
            path.bright_white().bold(),
            pct,
            coverage.documented,
            coverage.total
        ));
        for item in &coverage.missing_items {
            out.push_str(&format!("  {:>5}  {} '{}'\n", item.line, item.kind, item.name));
        }
        for doc in &report.generated {
            out.push_str(&format!(
                "\n  {} {} '{}' (line {}):\n",
                "draft for".bright_cyan(),
                doc.kind,
                doc.name,
                doc.line
            ));
            for line in doc.docstring.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
    }

    out
}
