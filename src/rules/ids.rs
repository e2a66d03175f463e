// SPDX-License-Identifier: PMPL-1.0-or-later
//! Unique ids - WCAG 4.1.1 Parsing (Level A)

use super::{wcag, Rule};
use crate::document::Document;
use crate::error::RuleError;
use crate::issue::{Issue, Severity};
use std::collections::HashSet;

/// Every repeat of an `id` value after its first occurrence
pub struct DuplicateIdRule;

impl Rule for DuplicateIdRule {
    fn id(&self) -> &'static str {
        "duplicate-id"
    }

    fn description(&self) -> &'static str {
        "Checks that id values are unique"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let mut seen = HashSet::new();
        let mut issues = Vec::new();
        for el in doc.select_with_attr("id") {
            let Some(id) = el.non_blank_attr("id") else {
                continue;
            };
            if seen.insert(id) {
                continue;
            }
            issues.push(
                Issue::new(
                    Severity::Critical,
                    "structure",
                    "Duplicate id attribute",
                    &format!(
                        "The id \"{}\" is used more than once. Labels, ARIA references and assistive technology resolve ids to a single element.",
                        id
                    ),
                )
                .with_fix("Give each element a unique id and update references to it")
                .with_selector(el.selector())
                .with_line(el.line())
                .with_snippet(el.source_start_tag())
                .with_wcag(wcag::PARSING),
            );
        }
        Ok(issues)
    }
}
