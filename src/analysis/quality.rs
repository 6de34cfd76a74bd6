// Quality rules over analyzed files

use crate::analysis::RepoAnalyzer;
use crate::config::QualityConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::debug;

/// What a quality issue is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    SyntaxError,
    HighImpact,
    HighComplexity,
    DeepNesting,
    GodClass,
    UnusedImport,
    WildcardImport,
    CircularDependency,
    AnalysisError,
}

/// Ordered severity: critical sorts first in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

/// One finding against a file, or repo-wide when `file` is None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub file: Option<String>,
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub line: Option<usize>,
    pub threshold: Option<usize>,
    pub suggestion: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl QualityIssue {
    fn new(kind: IssueKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            file: None,
            kind,
            severity,
            message: message.into(),
            line: None,
            threshold: None,
            suggestion: None,
            details: None,
        }
    }
}

/// Per-file metric summary for the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub loc: usize,
    pub complexity: usize,
    pub functions: usize,
    pub classes: usize,
}

/// Everything one audit run produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub issues: Vec<QualityIssue>,
    pub summaries: BTreeMap<String, FileSummary>,
}

impl AuditOutcome {
    pub fn has_critical(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }
}

/// Runs every quality rule against a set of changed files.
///
/// Rules are isolated per file: a failure analyzing one file becomes an
/// `AnalysisError` issue and the remaining files are still audited.
pub struct QualityAuditor {
    thresholds: QualityConfig,
}

const UNUSED_IMPORTS_PER_FILE: usize = 3;

impl QualityAuditor {
    pub fn new(thresholds: QualityConfig) -> Self {
        Self { thresholds }
    }

    pub fn audit(&self, analyzer: &mut RepoAnalyzer, changed_files: &[String]) -> AuditOutcome {
        let mut outcome = AuditOutcome::default();

        for file in changed_files {
            match self.audit_file(analyzer, file) {
                Ok((issues, summary)) => {
                    outcome.issues.extend(issues);
                    if let Some(summary) = summary {
                        outcome.summaries.insert(file.clone(), summary);
                    }
                }
                Err(e) => {
                    debug!("audit of {} failed: {}", file, e);
                    let mut issue = QualityIssue::new(
                        IssueKind::AnalysisError,
                        Severity::Error,
                        format!("Could not analyze file: {}", e),
                    );
                    issue.file = Some(file.clone());
                    outcome.issues.push(issue);
                }
            }
        }

        self.check_cycles(analyzer, changed_files, &mut outcome);
        outcome
    }

    fn audit_file(
        &self,
        analyzer: &mut RepoAnalyzer,
        file: &str,
    ) -> crate::error::Result<(Vec<QualityIssue>, Option<FileSummary>)> {
        let analysis = analyzer.analyze_file(file)?;
        let mut issues = Vec::new();

        // A file that failed to parse or read gets its error issues and
        // nothing else
        if analysis.has_errors() {
            for error in &analysis.errors {
                let (kind, severity) = if error.starts_with("Analysis error") {
                    (IssueKind::AnalysisError, Severity::Error)
                } else {
                    (IssueKind::SyntaxError, Severity::Critical)
                };
                let mut issue = QualityIssue::new(kind, severity, error.clone());
                issue.file = Some(file.to_string());
                issues.push(issue);
            }
            return Ok((issues, None));
        }

        let impact = analyzer.impact_of(file)?;
        if impact.total_impact > self.thresholds.high_impact {
            let mut issue = QualityIssue::new(
                IssueKind::HighImpact,
                Severity::Warning,
                format!(
                    "Changing this file affects {} other files",
                    impact.total_impact
                ),
            );
            issue.file = Some(file.to_string());
            issue.threshold = Some(self.thresholds.high_impact);
            issue.suggestion =
                Some("Review dependent files after changing this one".to_string());
            issue.details = Some(json!({
                "direct_dependents": impact
                    .direct_dependents
                    .iter()
                    .take(5)
                    .collect::<Vec<_>>(),
                "total_impact": impact.total_impact,
            }));
            issues.push(issue);
        }

        for func in &analysis.functions {
            if func.complexity > self.thresholds.complexity {
                let mut issue = QualityIssue::new(
                    IssueKind::HighComplexity,
                    Severity::Warning,
                    format!(
                        "Function '{}' has cyclomatic complexity {}",
                        func.name, func.complexity
                    ),
                );
                issue.file = Some(file.to_string());
                issue.line = Some(func.line);
                issue.threshold = Some(self.thresholds.complexity);
                issue.suggestion =
                    Some("Consider breaking this function into smaller functions".to_string());
                issues.push(issue);
            }
        }

        if analysis.metrics.max_nesting_depth > self.thresholds.nesting {
            let mut issue = QualityIssue::new(
                IssueKind::DeepNesting,
                Severity::Warning,
                format!(
                    "Maximum nesting depth is {}",
                    analysis.metrics.max_nesting_depth
                ),
            );
            issue.file = Some(file.to_string());
            issue.threshold = Some(self.thresholds.nesting);
            issue.suggestion = Some(
                "Consider extracting nested logic into helper functions or using early returns"
                    .to_string(),
            );
            issues.push(issue);
        }

        for class in &analysis.classes {
            if class.methods.len() > self.thresholds.methods_in_class {
                let mut issue = QualityIssue::new(
                    IssueKind::GodClass,
                    Severity::Warning,
                    format!(
                        "Class '{}' has {} methods",
                        class.name,
                        class.methods.len()
                    ),
                );
                issue.file = Some(file.to_string());
                issue.line = Some(class.line);
                issue.threshold = Some(self.thresholds.methods_in_class);
                issue.suggestion =
                    Some("Consider splitting this class into smaller, focused classes".to_string());
                issues.push(issue);
            }
        }

        for unused in analyzer
            .find_unused_imports(file)?
            .iter()
            .take(UNUSED_IMPORTS_PER_FILE)
        {
            let mut issue = QualityIssue::new(
                IssueKind::UnusedImport,
                Severity::Info,
                format!("Unused import: {}", unused.label()),
            );
            issue.file = Some(file.to_string());
            issue.line = Some(unused.line);
            issue.suggestion = Some("Remove the unused import".to_string());
            issues.push(issue);
        }

        for import in analysis.imports.iter().filter(|i| i.is_wildcard()) {
            let mut issue = QualityIssue::new(
                IssueKind::WildcardImport,
                Severity::Info,
                format!("Wildcard import: {}", import.raw),
            );
            issue.file = Some(file.to_string());
            issue.line = Some(import.line);
            issue.suggestion = Some("Import only the names you need".to_string());
            issues.push(issue);
        }

        let summary = FileSummary {
            loc: analysis.metrics.code_lines,
            complexity: analysis.metrics.cyclomatic_complexity,
            functions: analysis.metrics.function_count,
            classes: analysis.metrics.class_count,
        };

        Ok((issues, Some(summary)))
    }

    /// Repo-wide cycle check, reported once per cycle touching a changed file
    fn check_cycles(
        &self,
        analyzer: &mut RepoAnalyzer,
        changed_files: &[String],
        outcome: &mut AuditOutcome,
    ) {
        let cycles = match analyzer.find_circular_dependencies() {
            Ok(cycles) => cycles,
            Err(e) => {
                debug!("cycle detection failed: {}", e);
                outcome.issues.push(QualityIssue::new(
                    IssueKind::AnalysisError,
                    Severity::Error,
                    format!("Could not check circular dependencies: {}", e),
                ));
                return;
            }
        };

        for cycle in cycles {
            if !cycle.iter().any(|node| changed_files.contains(node)) {
                continue;
            }
            let mut issue = QualityIssue::new(
                IssueKind::CircularDependency,
                Severity::Warning,
                format!("Circular dependency: {}", cycle.join(" -> ")),
            );
            issue.suggestion =
                Some("Break the cycle by moving shared code into a separate module".to_string());
            issue.details = Some(json!({ "cycle": cycle }));
            outcome.issues.push(issue);
        }
    }
}
