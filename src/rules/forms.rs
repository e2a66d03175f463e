// SPDX-License-Identifier: PMPL-1.0-or-later
//! Form labels - WCAG 1.3.1 Info and Relationships, 3.3.2 Labels or Instructions (Level A)
//!
//! A text-like `<input>` or a `<textarea>` needs one of: an `id` matched by a
//! `<label for>`, `aria-label`, `aria-labelledby`, `title`, or a wrapping
//! `<label>`. Controls without an `id` and controls whose `id` no label
//! points at are reported by separate rules.

use super::{has_alternative_name, label_targets, wcag, Rule};
use crate::document::{Document, Element};
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// Input types that take typed text and therefore need a label
const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "password", "tel", "number", "search"];

/// Placeholder label text inserted by fixes
pub const LABEL_PLACEHOLDER: &str = "Field Label";

/// `<input>` of a text-like type, or `<textarea>`
pub(crate) fn is_text_control(el: &Element<'_>) -> bool {
    match el.name() {
        "textarea" => true,
        "input" => {
            let kind = el.attr("type").map(str::trim).unwrap_or("");
            kind.is_empty() || TEXT_INPUT_TYPES.contains(&kind.to_lowercase().as_str())
        }
        _ => false,
    }
}

fn text_controls(doc: &Document) -> impl Iterator<Item = Element<'_>> + '_ {
    doc.elements().filter(is_text_control)
}

/// An id for `el` that no element in `doc` already uses
fn fresh_id(doc: &Document, el: &Element<'_>, ordinal: usize) -> String {
    let from_name: String = el
        .attr("name")
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let base = if from_name.is_empty() {
        format!("{}-{}", el.name(), ordinal)
    } else {
        from_name
    };
    let mut candidate = base.clone();
    let mut suffix = 2;
    while doc.element_by_id(&candidate).is_some() {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    candidate
}

fn label_for(id: &str) -> String {
    format!("<label for=\"{}\">{}</label>", id, LABEL_PLACEHOLDER)
}

/// Text control with no `id` and no other naming mechanism
pub struct ControlNameRule;

impl Rule for ControlNameRule {
    fn id(&self) -> &'static str {
        "form-control-name"
    }

    fn description(&self) -> &'static str {
        "Checks that text inputs and textareas have an accessible name"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let mut issues = Vec::new();
        for (idx, control) in text_controls(doc).enumerate() {
            if control.non_blank_attr("id").is_some() || has_alternative_name(&control) {
                continue;
            }
            let id = fresh_id(doc, &control, idx + 1);
            let fixed = format!(
                "{}\n{}",
                label_for(&id),
                control.outer_html_with(&[("id", &id)])
            );
            issues.push(
                Issue::new(
                    Severity::Critical,
                    "forms",
                    "Input field without associated label",
                    "Form inputs must have an id attribute and an associated label element for accessibility.",
                )
                .with_fix("Add an id attribute and a matching <label for>, or use aria-label")
                .with_selector(control.selector())
                .with_line(control.line())
                .with_snippet(control.source_outer_html())
                .with_fixed_code(fixed)
                .with_wcag(wcag::LABELS),
            );
        }
        Ok(issues)
    }
}

/// Text control whose `id` no `<label for>` references
pub struct UnmatchedLabelRule;

impl Rule for UnmatchedLabelRule {
    fn id(&self) -> &'static str {
        "label-for-id"
    }

    fn description(&self) -> &'static str {
        "Checks that form controls with an id have a matching <label for>"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let labels = label_targets(doc);
        let mut issues = Vec::new();
        for control in text_controls(doc) {
            let Some(id) = control.non_blank_attr("id") else {
                continue;
            };
            if labels.contains(id) || has_alternative_name(&control) {
                continue;
            }
            issues.push(
                Issue::new(
                    Severity::Critical,
                    "forms",
                    "Form control has no matching label",
                    &format!(
                        "The <{}> has id=\"{}\" but no <label for=\"{}\"> references it, so screen readers announce it without a name.",
                        control.name(),
                        id,
                        id
                    ),
                )
                .with_fix(&format!("Add <label for=\"{}\"> describing the field", id))
                .with_selector(control.selector())
                .with_line(control.line())
                .with_snippet(control.source_outer_html())
                .with_fixed_code(format!("{}\n{}", label_for(id), control.source_outer_html()))
                .with_wcag(wcag::LABELS),
            );
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::check;

    #[test]
    fn test_labelled_controls() {
        let html = r#"
            <form>
                <label for="name">Name</label><input type="text" id="name">
                <input type="search" aria-label="Search">
                <input type="tel" title="Phone">
                <label>Notes <textarea></textarea></label>
                <input type="checkbox">
                <input type="submit" value="Send">
            </form>
        "#;
        assert!(check(&ControlNameRule, html).is_empty());
        assert!(check(&UnmatchedLabelRule, html).is_empty());
    }

    #[test]
    fn test_unlabelled_email() {
        let issues = check(&ControlNameRule, r#"<form><input type="email"></form>"#);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].category, "forms");
        assert_eq!(
            issues[0].fixed_code.as_deref(),
            Some("<label for=\"input-1\">Field Label</label>\n<input id=\"input-1\" type=\"email\">")
        );
        assert!(check(&UnmatchedLabelRule, r#"<input type="email">"#).is_empty());
    }

    #[test]
    fn test_id_from_name_avoids_collisions() {
        let html = r#"<div id="q"></div><input name="q"><textarea></textarea>"#;
        let issues = check(&ControlNameRule, html);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].fixed_code.as_deref().unwrap().contains("id=\"q-2\""));
        assert!(issues[1]
            .fixed_code
            .as_deref()
            .unwrap()
            .ends_with("<textarea id=\"textarea-2\"></textarea>"));
    }

    #[test]
    fn test_unmatched_id() {
        let html = r#"<label for="other">Other</label><input type="password" id="pw">"#;
        let issues = check(&UnmatchedLabelRule, html);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].selector.as_deref(), Some("#pw"));
        assert!(issues[0].fixed_code.as_deref().unwrap().starts_with("<label for=\"pw\">"));
        assert!(check(&ControlNameRule, html).is_empty());
    }

    #[test]
    fn test_fix_is_not_reflagged() {
        let issues = check(&ControlNameRule, "<input>");
        let fixed = issues[0].fixed_code.clone().unwrap();
        assert!(check(&ControlNameRule, &fixed).is_empty());
        assert!(check(&UnmatchedLabelRule, &fixed).is_empty());
    }
}
