//! End-to-end behavior of the analysis pipeline on small Python programs.

use indoc::indoc;
use pretty_assertions::assert_eq;
use pyqual::docstring::{detect_style, generate_missing, parse};
use pyqual::metrics::Grade;
use pyqual::{analyze, coverage, fix, Category, DocStyle, Severity};

#[test]
fn test_calculate_total_findings_and_fix() {
    let text = "def CalculateTotal(items):\n total=0\n for item in items:\n  total+=item\n return total";
    let analysis = analyze(text);

    let naming = analysis
        .findings
        .iter()
        .find(|f| f.rule == "naming-function")
        .expect("naming finding");
    assert_eq!(naming.severity, Severity::Warning);
    assert_eq!(naming.line, Some(1));
    assert!(naming.suggestion.as_deref().unwrap_or("").contains("calculate_total"));
    assert!(naming.fix.is_some());

    let spacing: Vec<_> = analysis
        .findings
        .iter()
        .filter(|f| f.rule == "operator-spacing")
        .collect();
    assert_eq!(spacing.len(), 2);
    assert!(spacing.iter().all(|f| f.severity == Severity::Info));
    assert!(spacing.iter().all(|f| f.fix.is_some()));
    assert_eq!(
        spacing.iter().map(|f| f.line).collect::<Vec<_>>(),
        vec![Some(2), Some(4)]
    );

    let outcome = fix(text, &analysis.findings);
    assert!(outcome.conflicts.is_empty());
    assert_eq!(
        outcome.text,
        "def calculate_total(items):\n total = 0\n for item in items:\n  total += item\n return total"
    );

    let again = analyze(&outcome.text);
    assert!(!again
        .findings
        .iter()
        .any(|f| f.rule == "naming-function" || f.rule == "operator-spacing"));
}

#[test]
fn test_documented_empty_function_has_no_warnings() {
    let text = indoc! {r#"
        def greet(name):
            """Greet someone.

            Args:
                name: Who to greet.
            """
    "#};
    let analysis = analyze(text);
    let warnings: Vec<_> = analysis
        .findings
        .iter()
        .filter(|f| f.severity <= Severity::Warning)
        .collect();
    assert!(warnings.is_empty(), "unexpected: {warnings:?}");
    assert_eq!(coverage(text).unwrap().percentage, 100.0);
    assert_eq!(analysis.metrics.docstring_coverage, 100.0);
}

#[test]
fn test_five_nested_ifs() {
    let text = indoc! {"
        def deep(a, b, c, d, e):
            if a:
                if b:
                    if c:
                        if d:
                            if e:
                                return 1
            return 0
    "};
    let analysis = analyze(text);
    assert!(analysis.metrics.cyclomatic_complexity >= 6);

    let complexity: Vec<_> = analysis
        .findings
        .iter()
        .filter(|f| f.category == Category::Complexity && f.severity == Severity::Warning)
        .collect();
    assert_eq!(complexity.len(), 1);
    assert!(complexity[0].message.contains("deep"));
}

#[test]
fn test_syntax_error_yields_single_critical_finding() {
    let analysis = analyze("class Broken(\n    def method(self):\n        pass\n");
    assert_eq!(analysis.findings.len(), 1);
    assert_eq!(analysis.findings[0].severity, Severity::Critical);
    assert_eq!(analysis.findings[0].category, Category::Syntax);
    assert_eq!(analysis.metrics.grade, Grade::F);
    assert!(analysis.summary.is_none());
}

#[test]
fn test_grade_boundaries() {
    assert_eq!(Grade::from_score(90.0), Grade::A);
    assert_eq!(Grade::from_score(89.9), Grade::B);
}

#[test]
fn test_findings_ordered_by_severity() {
    let text = indoc! {"
        def Process(data, cache=[]):
            try:
                total=0
            except:
                pass
            return total
    "};
    let severities: Vec<Severity> = analyze(text).findings.iter().map(|f| f.severity).collect();
    let mut sorted = severities.clone();
    sorted.sort();
    assert_eq!(severities, sorted);
}

#[test]
fn test_generated_docstrings_round_trip() {
    let source = indoc! {"
        def scale(value, factor=2.0):
            if factor < 0:
                raise ValueError('negative')
            return value * factor
    "};

    for style in [DocStyle::Google, DocStyle::Numpy, DocStyle::Rest] {
        let generated = generate_missing(source, style).unwrap();
        assert_eq!(generated.len(), 1);
        let doc = &generated[0].docstring;

        assert_eq!(detect_style(doc), Some(style));
        let parsed = parse(doc);
        assert_eq!(parsed.params, vec!["value".to_string(), "factor".to_string()]);
        assert!(parsed.has_returns);
        assert!(parsed.documents_raise("ValueError"));

        let body: String = doc
            .lines()
            .map(|l| if l.is_empty() { "\n".to_string() } else { format!("    {l}\n") })
            .collect();
        let documented = source.replacen(
            "):\n",
            &format!("):\n    \"\"\"{}    \"\"\"\n", body.trim_start()),
            1,
        );

        let analysis = analyze(&documented);
        let doc_findings: Vec<_> = analysis
            .findings
            .iter()
            .filter(|f| f.category == Category::Documentation)
            .collect();
        assert!(doc_findings.is_empty(), "{style}: {doc_findings:?}");
        assert_eq!(analysis.metrics.docstring_coverage, 100.0);
    }
}

#[test]
fn test_fix_preserves_crlf_line_endings() {
    let text = "def f(a,b):\r\n    x=a\r\n    return x+b\r\n";
    let outcome = fix(text, &analyze(text).findings);
    assert_eq!(outcome.text, "def f(a, b):\r\n    x = a\r\n    return x + b\r\n");
}

#[test]
fn test_grammar_tolerated_errors_short_circuit() {
    let sources = [
        "def f():\n  x = 1\n    y = 2\n",
        "class A:\npass\n",
        "print 'hello'\n",
        "exec 'x = 1'\n",
        "a, b += 1\n",
        "def f(x=1, y):\n    pass\n",
    ];
    for source in sources {
        let analysis = analyze(source);
        assert!(analysis.has_syntax_error(), "{source:?}");
        assert_eq!(analysis.findings.len(), 1, "{source:?}");
        assert_eq!(analysis.findings[0].severity, Severity::Critical);
        assert_eq!(analysis.findings[0].rule, "syntax-error");
        assert_eq!(analysis.metrics.grade, Grade::F);

        let outcome = fix(source, &analysis.findings);
        assert_eq!(outcome.text, source);
        assert!(outcome.applied.is_empty());
    }
}

#[test]
fn test_module_and_class_variable_naming() {
    let text = indoc! {r#"
        """Settings."""

        totalCount = 0


        class Config:
            """C."""

            maxItems = 3


        def bump():
            """Bump the counter."""
            global totalCount
            totalCount += Config.maxItems
    "#};
    let analysis = analyze(text);
    let naming: Vec<&str> = analysis
        .findings
        .iter()
        .filter(|f| f.rule == "naming-variable")
        .map(|f| f.message.as_str())
        .collect();
    assert_eq!(naming.len(), 2, "{naming:?}");

    let outcome = fix(text, &analysis.findings);
    assert!(outcome.text.contains("total_count = 0"));
    assert!(outcome.text.contains("global total_count"));
    assert!(outcome.text.contains("total_count += Config.maxItems"));
    assert!(outcome.text.contains("    maxItems = 3"));
}

#[test]
fn test_annotated_default_spacing_fixed() {
    let text = "def scale(value, factor: float=2.0):\n    return value\n";
    let analysis = analyze(text);
    assert!(analysis
        .findings
        .iter()
        .any(|f| f.rule == "operator-spacing" && f.line == Some(1)));

    let outcome = fix(text, &analysis.findings);
    assert_eq!(
        outcome.text,
        "def scale(value, factor: float = 2.0):\n    return value\n"
    );
}
