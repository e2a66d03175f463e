// SPDX-License-Identifier: PMPL-1.0-or-later
//! Button names - WCAG 4.1.2 Name, Role, Value (Level A)

use super::{has_content_name, wcag, Rule};
use crate::document::Document;
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// Placeholder button text inserted by the fix
pub const BUTTON_PLACEHOLDER: &str = "Descriptive Action";

/// `<button>` with no text and no ARIA/title name
pub struct ButtonNameRule;

impl Rule for ButtonNameRule {
    fn id(&self) -> &'static str {
        "button-name"
    }

    fn description(&self) -> &'static str {
        "Checks that buttons have an accessible name"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = doc
            .select("button")
            .filter(|button| !has_content_name(button))
            .map(|button| {
                Issue::new(
                    Severity::Critical,
                    "forms",
                    "Button without text content",
                    "Buttons must contain text or an aria-label for screen readers to announce.",
                )
                .with_fix("Add descriptive text inside the button or use aria-label attribute")
                .with_selector(button.selector())
                .with_line(button.line())
                .with_snippet(button.source_outer_html())
                .with_fixed_code(button.with_text(BUTTON_PLACEHOLDER))
                .with_wcag(wcag::NAME_ROLE_VALUE)
            })
            .collect();
        Ok(issues)
    }
}
