// SPDX-License-Identifier: PMPL-1.0-or-later
//! Issue representation shared by rules, the aggregator and report sinks.
//!
//! The serialized shape of [`Issue`] is consumed field-by-field by downstream
//! renderers (PDF, pull-request bodies), so every optional field is always
//! emitted, as `null` when absent.

use serde::{Deserialize, Serialize};

/// Severity levels for issues. Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks access for some users
    Critical,
    /// Should be addressed
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// All severities, most severe first
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    /// Ordinal weight: critical > warning > info
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 2,
            Severity::Warning => 1,
            Severity::Info => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// One detected accessibility defect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Severity level
    pub severity: Severity,
    /// Short grouping label (e.g. "images", "forms")
    pub category: String,
    /// Short defect name
    pub title: String,
    /// Why the rule matters
    pub description: String,
    /// Locator of the offending element
    pub selector: Option<String>,
    /// Source line (1-indexed)
    pub line_number: Option<usize>,
    /// Remediation instructions
    pub recommended_fix: String,
    /// Markup showing the violation
    pub code_snippet: Option<String>,
    /// Markup showing a corrected version
    pub fixed_code: Option<String>,
    /// WCAG citation
    pub wcag_criteria: Option<String>,
    /// Source file, set in multi-file scans
    pub file_path: Option<String>,
}

impl Issue {
    /// Create a new issue
    pub fn new(severity: Severity, category: &str, title: &str, description: &str) -> Self {
        Self {
            severity,
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            selector: None,
            line_number: None,
            recommended_fix: String::new(),
            code_snippet: None,
            fixed_code: None,
            wcag_criteria: None,
            file_path: None,
        }
    }

    /// Set the remediation text
    pub fn with_fix(mut self, fix: &str) -> Self {
        self.recommended_fix = fix.to_string();
        self
    }

    /// Set the element locator
    pub fn with_selector(mut self, selector: String) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Set line number, if known
    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line_number = line;
        self
    }

    /// Set the offending markup
    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.code_snippet = Some(snippet);
        self
    }

    /// Set the corrected markup
    pub fn with_fixed_code(mut self, fixed: String) -> Self {
        self.fixed_code = Some(fixed);
        self
    }

    /// Set the WCAG citation
    pub fn with_wcag(mut self, criteria: &str) -> Self {
        self.wcag_criteria = Some(criteria.to_string());
        self
    }

    /// Set the source file
    pub fn with_file(mut self, path: &str) -> Self {
        self.file_path = Some(path.to_string());
        self
    }

    /// Get location string for display
    pub fn location_string(&self) -> String {
        match (&self.file_path, self.line_number, &self.selector) {
            (Some(f), Some(l), _) => format!("{}:{}", f, l),
            (Some(f), None, Some(s)) => format!("{} {}", f, s),
            (Some(f), None, None) => f.clone(),
            (None, Some(l), _) => format!("line {}", l),
            (None, None, Some(s)) => s.clone(),
            (None, None, None) => "<document>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_orders_critical_first() {
        assert!(Severity::Critical.rank() > Severity::Warning.rank());
        assert!(Severity::Warning.rank() > Severity::Info.rank());
        assert!(Severity::Critical < Severity::Info);
    }

    #[test]
    fn test_issue_serializes_fixed_shape() {
        let issue = Issue::new(Severity::Critical, "images", "Image missing alt attribute", "desc")
            .with_fix("Add alt");
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["severity"], "critical");
        assert_eq!(value["recommendedFix"], "Add alt");
        assert!(value["lineNumber"].is_null());
        assert!(value["fixedCode"].is_null());
        assert!(value.as_object().unwrap().contains_key("filePath"));
        assert_eq!(value.as_object().unwrap().len(), 11);
    }

    #[test]
    fn test_location_string() {
        let issue = Issue::new(Severity::Info, "tables", "t", "d")
            .with_file("index.html")
            .with_line(Some(4));
        assert_eq!(issue.location_string(), "index.html:4");
        let bare = Issue::new(Severity::Info, "tables", "t", "d");
        assert_eq!(bare.location_string(), "<document>");
    }
}
