// Markdown quality report

use crate::analysis::{AuditOutcome, IssueKind, QualityIssue, Severity};
use chrono::Utc;

/// Render the audit outcome as a Markdown report.
///
/// Issues are grouped by severity: critical findings first, then
/// warnings with their suggestions, then informational notes in a
/// collapsible block.
pub fn render(outcome: &AuditOutcome, changed_files: &[String]) -> String {
    let mut out = String::new();

    out.push_str("# Code Quality Report\n\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("Files reviewed: {}\n", changed_files.len()));

    let critical: Vec<&QualityIssue> = by_severity(outcome, Severity::Critical);
    let errors: Vec<&QualityIssue> = by_severity(outcome, Severity::Error);
    let warnings: Vec<&QualityIssue> = by_severity(outcome, Severity::Warning);
    let info: Vec<&QualityIssue> = by_severity(outcome, Severity::Info);

    if !critical.is_empty() {
        out.push_str("\n## Critical\n\n");
        for issue in &critical {
            out.push_str(&format_issue(issue));
        }
    }

    if !errors.is_empty() {
        out.push_str("\n## Errors\n\n");
        for issue in &errors {
            out.push_str(&format_issue(issue));
        }
    }

    if !warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for issue in &warnings {
            out.push_str(&format_issue(issue));
            if let Some(suggestion) = &issue.suggestion {
                out.push_str(&format!("  - Suggestion: {}\n", suggestion));
            }
        }
    }

    if !info.is_empty() {
        out.push_str("\n## Info\n\n");
        out.push_str(&format!(
            "<details><summary>{} informational finding(s)</summary>\n\n",
            info.len()
        ));
        for issue in &info {
            out.push_str(&format_issue(issue));
        }
        out.push_str("\n</details>\n");
    }

    if !outcome.summaries.is_empty() {
        out.push_str("\n## Metrics\n\n");
        out.push_str("| File | LOC | Complexity | Functions | Classes |\n");
        out.push_str("|------|-----|------------|-----------|--------|\n");
        for (file, summary) in &outcome.summaries {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                file, summary.loc, summary.complexity, summary.functions, summary.classes
            ));
        }
    }

    out.push_str("\n## Recommendations\n\n");
    for line in recommendations(outcome) {
        out.push_str(&format!("- {}\n", line));
    }

    out
}

fn by_severity(outcome: &AuditOutcome, severity: Severity) -> Vec<&QualityIssue> {
    outcome
        .issues
        .iter()
        .filter(|i| i.severity == severity)
        .collect()
}

fn format_issue(issue: &QualityIssue) -> String {
    let location = match (&issue.file, issue.line) {
        (Some(file), Some(line)) => format!("**{}:{}** ", file, line),
        (Some(file), None) => format!("**{}** ", file),
        _ => String::new(),
    };
    format!("- {}{}\n", location, issue.message)
}

fn recommendations(outcome: &AuditOutcome) -> Vec<String> {
    let has = |kind: IssueKind| outcome.issues.iter().any(|i| i.kind == kind);
    let mut recs = Vec::new();

    if has(IssueKind::SyntaxError) {
        recs.push("Fix syntax errors before merging; broken files block analysis".to_string());
    }
    if has(IssueKind::CircularDependency) {
        recs.push("Untangle circular dependencies to keep modules independently testable".to_string());
    }
    if has(IssueKind::HighComplexity) {
        recs.push("Refactor the flagged functions into smaller units".to_string());
    }
    if has(IssueKind::GodClass) {
        recs.push("Split oversized classes along their responsibilities".to_string());
    }
    if has(IssueKind::HighImpact) {
        recs.push("Changes here ripple widely; run the full test suite".to_string());
    }
    if has(IssueKind::UnusedImport) || has(IssueKind::WildcardImport) {
        recs.push("Tidy the import lists in the flagged files".to_string());
    }

    if recs.is_empty() {
        recs.push("No significant issues found".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FileSummary;

    fn issue(kind: IssueKind, severity: Severity, message: &str) -> QualityIssue {
        QualityIssue {
            file: Some("a.py".to_string()),
            kind,
            severity,
            message: message.to_string(),
            line: Some(3),
            threshold: None,
            suggestion: Some("do less".to_string()),
            details: None,
        }
    }

    #[test]
    fn test_clean_report() {
        let outcome = AuditOutcome::default();
        let report = render(&outcome, &["a.py".to_string()]);
        assert!(report.starts_with("# Code Quality Report"));
        assert!(report.contains("Files reviewed: 1"));
        assert!(report.contains("No significant issues found"));
        assert!(!report.contains("## Critical"));
    }

    #[test]
    fn test_severity_sections() {
        let mut outcome = AuditOutcome::default();
        outcome.issues.push(issue(
            IssueKind::SyntaxError,
            Severity::Critical,
            "Syntax error at line 3: invalid syntax",
        ));
        outcome.issues.push(issue(
            IssueKind::HighComplexity,
            Severity::Warning,
            "Function 'f' has cyclomatic complexity 14",
        ));
        outcome
            .issues
            .push(issue(IssueKind::UnusedImport, Severity::Info, "Unused import: os"));

        let report = render(&outcome, &["a.py".to_string()]);
        let critical = report.find("## Critical").unwrap();
        let warnings = report.find("## Warnings").unwrap();
        let info = report.find("## Info").unwrap();
        assert!(critical < warnings && warnings < info);
        assert!(report.contains("- Suggestion: do less"));
        assert!(report.contains("<details>"));
    }

    #[test]
    fn test_metrics_table() {
        let mut outcome = AuditOutcome::default();
        outcome.summaries.insert(
            "a.py".to_string(),
            FileSummary {
                loc: 40,
                complexity: 7,
                functions: 3,
                classes: 1,
            },
        );
        let report = render(&outcome, &["a.py".to_string()]);
        assert!(report.contains("| a.py | 40 | 7 | 3 | 1 |"));
    }

    #[test]
    fn test_recommendations_follow_kinds() {
        let mut outcome = AuditOutcome::default();
        outcome.issues.push(issue(
            IssueKind::GodClass,
            Severity::Warning,
            "Class 'Big' has 16 methods",
        ));
        let report = render(&outcome, &[]);
        assert!(report.contains("Split oversized classes"));
        assert!(!report.contains("No significant issues found"));
    }
}
