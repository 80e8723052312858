use crate::config::PyqualConfig;
use crate::core::{Language, StructuralSummary};
use crate::metrics::{self, Metrics};
use crate::rules::Finding;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info_span};

pub mod python;

pub use python::PythonAnalyzer;

/// Everything produced for one source text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub language: Language,
    pub metrics: Metrics,
    pub findings: Vec<Finding>,
    /// Absent when the text did not parse or the language has no builder
    #[serde(skip)]
    pub summary: Option<StructuralSummary>,
}

impl Analysis {
    pub fn has_syntax_error(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.rule == crate::rules::SYNTAX_RULE)
    }

    pub fn fixable(&self) -> usize {
        self.findings.iter().filter(|f| f.fix.is_some()).count()
    }
}

pub trait Analyzer: Send + Sync {
    fn analyze(&self, content: &str, config: &PyqualConfig, autofix: bool) -> Analysis;
    fn language(&self) -> Language;
}

pub fn get_analyzer(language: Language) -> Box<dyn Analyzer> {
    type AnalyzerFactory = fn() -> Box<dyn Analyzer>;

    static ANALYZER_MAP: &[(Language, AnalyzerFactory)] =
        &[(Language::Python, || Box::new(PythonAnalyzer::new()))];

    ANALYZER_MAP
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, factory)| factory())
        .unwrap_or_else(|| Box::new(LineCountAnalyzer { language }))
}

/// Analyze `content` with the analyzer selected by the path's extension.
pub fn analyze_file_contents(path: &Path, content: &str, config: &PyqualConfig) -> Analysis {
    let _span = info_span!("analyze_file", path = %path.display()).entered();
    let analyzer = get_analyzer(Language::from_path(path));
    let analysis = analyzer.analyze(content, config, true);
    debug!(
        language = %analysis.language,
        findings = analysis.findings.len(),
        quality = analysis.metrics.quality_score,
        "File analyzed"
    );
    analysis
}

/// Line counts only, for languages without a structural builder.
struct LineCountAnalyzer {
    language: Language,
}

impl Analyzer for LineCountAnalyzer {
    fn analyze(&self, content: &str, config: &PyqualConfig, _autofix: bool) -> Analysis {
        Analysis {
            language: self.language,
            metrics: metrics::loc_only(content, self.language, config),
            findings: vec![],
            summary: None,
        }
    }

    fn language(&self) -> Language {
        self.language
    }
}
