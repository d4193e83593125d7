use std::collections::BTreeMap;

use num_format::{Locale, ToFormattedString};

use crate::entities::{Severity, ValidationReport};

const WRAP_WIDTH: usize = 78;

/// Renders the validation outcome as the user-visible, itemized issue list:
/// severity counts, then each issue with its affected identifier. This is
/// the only surface a rejected export explains itself through, so it always
/// names a reason.
pub(crate) struct IssueReportPrinter;

impl IssueReportPrinter {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn print(&self, report: &ValidationReport, record_count: usize) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Validation summary for {} records\n",
            (record_count as u64).to_formatted_string(&Locale::en)
        ));
        for severity in [
            Severity::Critical,
            Severity::Error,
            Severity::Warning,
            Severity::Info,
        ] {
            out.push_str(&format!(
                "  {:?}: {}\n",
                severity,
                report.count(severity)
            ));
        }

        if report.export_ready {
            out.push_str("\nEXPORT READY\n");
        } else {
            out.push_str("\nEXPORT BLOCKED\n");
            if report.has_blocking_issues() {
                out.push_str("  Critical/Error issues must be resolved; no override path exists.\n");
            }
            if !report.pending_review.is_empty() {
                out.push_str(&format!(
                    "  {} low-confidence records awaiting approval: {}\n",
                    report.pending_review.len(),
                    report.pending_review.join(", ")
                ));
            }
        }

        let mut by_severity: BTreeMap<Severity, Vec<String>> = BTreeMap::new();
        for issue in &report.issues {
            let line = match &issue.unique_id {
                Some(id) => format!("[{id}] {}", issue.message),
                None => format!("[batch] {}", issue.message),
            };
            by_severity.entry(issue.severity).or_default().push(line);
        }
        // Most severe first.
        for (severity, lines) in by_severity.iter().rev() {
            out.push_str(&format!("\n{severity:?} ({}):\n", lines.len()));
            for line in lines {
                for wrapped in textwrap::wrap(line, WRAP_WIDTH) {
                    out.push_str("  ");
                    out.push_str(&wrapped);
                    out.push('\n');
                }
            }
        }

        out
    }
}
