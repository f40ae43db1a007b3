//! Plain-text rendering of structured operation results.

use std::fmt::Write as _;

use crate::types::{AnalysisReport, ChangePlan, ReviewIssue, ReviewReport};

pub fn format_review(report: &ReviewReport) -> String {
    let mut out = format!("Score: {}/100\n", report.score);
    out.push_str("\nIssues:\n");
    if report.issues.is_empty() {
        out.push_str("  none\n");
    }
    for issue in &report.issues {
        let _ = writeln!(out, "  {}", format_issue(issue));
    }
    push_list(&mut out, "Suggestions", &report.suggestions);
    out
}

fn format_issue(issue: &ReviewIssue) -> String {
    let location = match (&issue.file, issue.line) {
        (Some(file), Some(line)) => format!(" {file}:{line}"),
        (Some(file), None) => format!(" {file}"),
        _ => String::new(),
    };
    format!("[{}]{location} {}", issue.severity, issue.message)
}

pub fn format_change_plan(plan: &ChangePlan) -> String {
    let mut out = format!("{}\n", plan.description);
    push_list(&mut out, "Changes", &plan.changes);
    out
}

pub fn format_analysis(report: &AnalysisReport) -> String {
    let mut out = format!("{}\n\nMetrics:\n", report.summary);
    for (name, value) in &report.metrics {
        let _ = writeln!(out, "  {name}: {}", format_metric(*value));
    }
    push_list(&mut out, "Findings", &report.findings);
    out
}

/// Whole numbers print without a fraction.
fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "\n{title}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use std::collections::BTreeMap;

    #[test]
    fn review_lists_score_issues_and_suggestions() {
        let text = format_review(&ReviewReport {
            issues: vec![
                ReviewIssue {
                    severity: Severity::Warning,
                    file: Some("src/a.rs".into()),
                    line: Some(3),
                    message: "unused".into(),
                },
                ReviewIssue {
                    severity: Severity::Info,
                    file: None,
                    line: None,
                    message: "general".into(),
                },
            ],
            suggestions: vec!["split module".into()],
            score: 70,
        });
        assert!(text.starts_with("Score: 70/100\n"));
        assert!(text.contains("  [warning] src/a.rs:3 unused\n"));
        assert!(text.contains("  [info] general\n"));
        assert!(text.contains("Suggestions:\n  - split module\n"));
    }

    #[test]
    fn analysis_prints_whole_metrics_without_fraction() {
        let mut metrics = BTreeMap::new();
        metrics.insert("lines".to_string(), 12.0);
        metrics.insert("ratio".to_string(), 0.125);
        let text = format_analysis(&AnalysisReport {
            summary: "ok".into(),
            metrics,
            findings: vec![],
        });
        assert!(text.contains("  lines: 12\n"));
        assert!(text.contains("  ratio: 0.12") || text.contains("  ratio: 0.13"));
        assert!(text.ends_with("Findings:\n"));
    }

    #[test]
    fn change_plan_lists_changes() {
        let text = format_change_plan(&ChangePlan {
            description: "Refactored x".into(),
            changes: vec!["a".into(), "b".into()],
        });
        assert_eq!(text, "Refactored x\n\nChanges:\n  - a\n  - b\n");
    }
}
