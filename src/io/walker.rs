use crate::core::Language;
use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Collects source files below a set of roots. Explicit file roots are
/// always kept; directories are walked honoring `.gitignore`.
pub struct FileWalker {
    roots: Vec<PathBuf>,
    languages: Vec<Language>,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            languages: vec![Language::Python],
            ignore_patterns: vec![],
        }
    }

    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    /// Invalid patterns are skipped with a warning.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    log::warn!("Ignoring invalid glob pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();
        self
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in &self.roots {
            if root.is_file() {
                files.push(root.clone());
                continue;
            }

            let walker = WalkBuilder::new(root).hidden(true).git_ignore(true).build();
            for entry in walker {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && self.should_process(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        if !self.languages.contains(&Language::from_path(path)) {
            return false;
        }

        let path_str = path.to_string_lossy();
        !self.ignore_patterns.iter().any(|p| p.matches(&path_str))
    }
}

pub fn find_python_files(roots: &[PathBuf], ignore_patterns: &[String]) -> Result<Vec<PathBuf>> {
    FileWalker::new(roots.to_vec())
        .with_ignore_patterns(ignore_patterns)
        .walk()
}
