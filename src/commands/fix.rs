use crate::config::PyqualConfig;
use crate::fixes::{self, AppliedFix, FixConflict};
use crate::{analyze_with_config, io};
use anyhow::Result;
use colored::*;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Fixes dropped as conflicts in one pass are retried against the rewritten
/// text in the next.
const MAX_FIX_PASSES: usize = 3;

pub struct FixConfig {
    pub paths: Vec<PathBuf>,
    pub dry_run: bool,
    pub ignore: Vec<String>,
}

#[derive(Debug)]
pub struct FileFix {
    pub path: PathBuf,
    pub original: String,
    pub fixed: String,
    pub applied: Vec<AppliedFix>,
    /// Conflicts left over after the last pass
    pub conflicts: Vec<FixConflict>,
}

impl FileFix {
    pub fn changed(&self) -> bool {
        self.original != self.fixed
    }
}

/// Analyze and fix `text` repeatedly until nothing more applies.
pub fn fix_text(text: &str, config: &PyqualConfig) -> (String, Vec<AppliedFix>, Vec<FixConflict>) {
    let mut current = text.to_string();
    let mut applied = Vec::new();
    let mut conflicts = Vec::new();

    for pass in 0..MAX_FIX_PASSES {
        let analysis = analyze_with_config(&current, config);
        let outcome = fixes::apply(&current, &analysis.findings);
        debug!(pass, applied = outcome.applied.len(), "Fix pass finished");

        conflicts = outcome.conflicts;
        if outcome.applied.is_empty() {
            break;
        }
        applied.extend(outcome.applied);
        current = outcome.text;
    }

    (current, applied, conflicts)
}

pub fn fix_files(files: &[PathBuf], config: &PyqualConfig) -> Result<Vec<FileFix>> {
    files
        .par_iter()
        .map(|path| {
            let original = io::read_file(path)?;
            let (fixed, applied, conflicts) = fix_text(&original, config);
            Ok(FileFix {
                path: path.clone(),
                original,
                fixed,
                applied,
                conflicts,
            })
        })
        .collect()
}

pub fn handle_fix(config: FixConfig, pyqual: &PyqualConfig) -> Result<()> {
    let files = io::find_python_files(&config.paths, &config.ignore)?;
    info!(files = files.len(), dry_run = config.dry_run, "Fixing files");

    let results = fix_files(&files, pyqual)?;

    for result in results.iter().filter(|r| r.changed()) {
        if !config.dry_run {
            io::write_file(&result.path, &result.fixed)?;
        }
        let verb = if config.dry_run { "would fix" } else { "fixed" };
        println!(
            "{} {} ({} fixes)",
            verb.green(),
            result.path.display(),
            result.applied.len()
        );
        for fix in &result.applied {
            let line = fix.line.map(|l| l.to_string()).unwrap_or_default();
            println!(
                "  {:>5}  {}  {:?} -> {:?}",
                line.dimmed(),
                format!("[{}]", fix.rule).bright_black(),
                fix.before,
                fix.after
            );
        }
        for conflict in &result.conflicts {
            println!(
                "  {}  [{}] {}",
                "skipped".yellow(),
                conflict.rule,
                conflict.reason
            );
        }
    }

    let changed = results.iter().filter(|r| r.changed()).count();
    println!(
        "{}",
        format!("{} of {} files changed", changed, results.len()).bright_cyan()
    );
    Ok(())
}
