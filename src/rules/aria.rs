// SPDX-License-Identifier: PMPL-1.0-or-later
//! ARIA usage - WCAG 4.1.2 Name, Role, Value (Level A)
//!
//! - No explicit `role` that repeats the element's implicit role
//! - `aria-required="true"` fields have an accessible name

use super::{has_form_name, label_targets, wcag, Rule};
use crate::document::Document;
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// Elements whose implicit role makes an explicit one redundant
pub const IMPLICIT_ROLES: &[(&str, &str)] = &[
    ("button", "button"),
    ("nav", "navigation"),
    ("main", "main"),
    ("aside", "complementary"),
    ("footer", "contentinfo"),
    ("header", "banner"),
];

/// Explicit role equal to the implicit one
pub struct RedundantRoleRule;

impl Rule for RedundantRoleRule {
    fn id(&self) -> &'static str {
        "redundant-role"
    }

    fn description(&self) -> &'static str {
        "Checks for ARIA roles that duplicate an element's implicit role"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let mut issues = Vec::new();
        for el in doc.select_with_attr("role") {
            let Some(&(_, implicit)) = IMPLICIT_ROLES.iter().find(|(tag, _)| *tag == el.name()) else {
                continue;
            };
            let role = el.attr("role").unwrap_or("").trim().to_lowercase();
            if role != implicit {
                continue;
            }
            issues.push(
                Issue::new(
                    Severity::Info,
                    "aria",
                    "Redundant ARIA role",
                    &format!(
                        "<{}> already has the implicit role \"{}\". Repeating it adds noise without changing what assistive technology announces.",
                        el.name(),
                        implicit
                    ),
                )
                .with_fix(&format!("Remove the role=\"{}\" attribute", implicit))
                .with_selector(el.selector())
                .with_line(el.line())
                .with_snippet(el.source_start_tag())
                .with_wcag(wcag::NAME_ROLE_VALUE),
            );
        }
        Ok(issues)
    }
}

/// Required field with no accessible-name mechanism
pub struct AriaRequiredNameRule;

impl Rule for AriaRequiredNameRule {
    fn id(&self) -> &'static str {
        "aria-required-name"
    }

    fn description(&self) -> &'static str {
        "Checks that aria-required fields have an accessible name"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let labels = label_targets(doc);
        let issues = doc
            .select_with_attr("aria-required")
            .filter(|el| el.attr("aria-required").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")))
            .filter(|el| !has_form_name(el, &labels))
            .map(|el| {
                Issue::new(
                    Severity::Warning,
                    "aria",
                    "Required field without accessible name",
                    "The field is marked aria-required but has no label, so users hear that something is required without knowing what.",
                )
                .with_fix("Associate a <label>, aria-label or aria-labelledby with the required field")
                .with_selector(el.selector())
                .with_line(el.line())
                .with_snippet(el.source_start_tag())
                .with_wcag(wcag::NAME_ROLE_VALUE)
            })
            .collect();
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::check;

    #[test]
    fn test_redundant_roles() {
        let html = r#"
            <header role="banner"></header>
            <nav role="Navigation"></nav>
            <main role="main"></main>
            <aside role="note"></aside>
            <div role="button">x</div>
        "#;
        let issues = check(&RedundantRoleRule, html);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.severity == Severity::Info && i.category == "aria"));
    }

    #[test]
    fn test_required_without_name() {
        let html = r#"
            <input id="a" aria-required="true">
            <label for="b">B</label><input id="b" aria-required="true">
            <div role="textbox" aria-required="true" aria-labelledby="lbl"></div>
            <select aria-required="false"></select>
        "#;
        let issues = check(&AriaRequiredNameRule, html);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].selector.as_deref(), Some("#a"));
    }
}
