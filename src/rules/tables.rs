// SPDX-License-Identifier: PMPL-1.0-or-later
//! Table structure - WCAG 1.3.1 Info and Relationships (Level A)

use super::{wcag, Rule};
use crate::document::Document;
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// `<table>` with no `<th>` anywhere inside
pub struct TableHeaderRule;

impl Rule for TableHeaderRule {
    fn id(&self) -> &'static str {
        "table-header"
    }

    fn description(&self) -> &'static str {
        "Checks that data tables use <th> header cells"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = doc
            .select("table")
            .filter(|table| table.select("th").next().is_none())
            .map(|table| {
                Issue::new(
                    Severity::Warning,
                    "tables",
                    "Table missing header cells",
                    "Data tables should use <th> elements for headers to establish relationships between data.",
                )
                .with_fix("Use <th> elements for table headers with scope attribute")
                .with_selector(table.selector())
                .with_line(table.line())
                .with_snippet(table.source_start_tag())
                .with_wcag(wcag::INFO_AND_RELATIONSHIPS)
            })
            .collect();
        Ok(issues)
    }
}

/// `<table>` with no `<caption>`
pub struct TableCaptionRule;

impl Rule for TableCaptionRule {
    fn id(&self) -> &'static str {
        "table-caption"
    }

    fn description(&self) -> &'static str {
        "Checks that tables have a caption"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = doc
            .select("table")
            .filter(|table| table.select("caption").next().is_none())
            .map(|table| {
                Issue::new(
                    Severity::Info,
                    "tables",
                    "Table missing caption",
                    "A <caption> gives the table an accessible name and tells screen reader users what the data is about before they enter it.",
                )
                .with_fix("Add a <caption> as the first child of the table")
                .with_selector(table.selector())
                .with_line(table.line())
                .with_snippet(table.source_start_tag())
                .with_wcag(wcag::INFO_AND_RELATIONSHIPS)
            })
            .collect();
        Ok(issues)
    }
}
