// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility rules.
//!
//! Each rule is narrow and independent: it reads a [`Document`] and returns
//! the issues it finds, nothing else. Rules never share state, so any subset
//! can run in any order; the aggregator imposes the final order.

pub mod aria;
pub mod controls;
pub mod forms;
pub mod frames;
pub mod headings;
pub mod ids;
pub mod images;
pub mod language;
pub mod links;
pub mod tables;

use crate::document::{Document, Element};
use crate::error::RuleError;
use crate::issue::Issue;
use std::collections::HashSet;

/// WCAG citations attached to issues
pub(crate) mod wcag {
    pub const NON_TEXT_CONTENT: &str = "WCAG 2.1 Level A - 1.1.1 Non-text Content";
    pub const INFO_AND_RELATIONSHIPS: &str = "WCAG 2.1 Level A - 1.3.1 Info and Relationships";
    pub const LABELS: &str =
        "WCAG 2.1 Level A - 1.3.1 Info and Relationships, 3.3.2 Labels or Instructions";
    pub const LINK_PURPOSE: &str = "WCAG 2.1 Level A - 2.4.4 Link Purpose (In Context)";
    pub const LANGUAGE_OF_PAGE: &str = "WCAG 2.1 Level A - 3.1.1 Language of Page";
    pub const PARSING: &str = "WCAG 2.1 Level A - 4.1.1 Parsing";
    pub const NAME_ROLE_VALUE: &str = "WCAG 2.1 Level A - 4.1.2 Name, Role, Value";
}

/// Trait implemented by all rules
pub trait Rule: Send + Sync {
    /// Stable identifier, used to disable the rule in configuration
    fn id(&self) -> &'static str;

    /// Short description of what this rule checks
    fn description(&self) -> &'static str;

    /// Check a document and return the issues found
    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError>;
}

/// The canonical rule set, in detection order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(language::HtmlLangRule),
        Box::new(images::ImageAltRule),
        Box::new(images::EmptyAltRule),
        Box::new(forms::ControlNameRule),
        Box::new(forms::UnmatchedLabelRule),
        Box::new(controls::ButtonNameRule),
        Box::new(links::LinkNameRule),
        Box::new(links::GenericLinkTextRule),
        Box::new(headings::MissingH1Rule),
        Box::new(headings::HeadingOrderRule),
        Box::new(frames::FrameTitleRule),
        Box::new(tables::TableHeaderRule),
        Box::new(tables::TableCaptionRule),
        Box::new(ids::DuplicateIdRule),
        Box::new(aria::RedundantRoleRule),
        Box::new(aria::AriaRequiredNameRule),
    ]
}

/// Values of every `<label for>` in the document
pub(crate) fn label_targets(doc: &Document) -> HashSet<&str> {
    doc.select("label")
        .filter_map(|label| label.non_blank_attr("for"))
        .collect()
}

/// Naming mechanisms other than `<label for>`: ARIA, title, or a wrapping label
pub(crate) fn has_alternative_name(el: &Element<'_>) -> bool {
    el.non_blank_attr("aria-label").is_some()
        || el.non_blank_attr("aria-labelledby").is_some()
        || el.non_blank_attr("title").is_some()
        || el.ancestors().any(|a| a.name() == "label")
}

/// Whether a form-like element has any accessible-name mechanism
pub(crate) fn has_form_name(el: &Element<'_>, labels: &HashSet<&str>) -> bool {
    let labelled = el
        .non_blank_attr("id")
        .is_some_and(|id| labels.contains(id));
    labelled || has_alternative_name(el)
}

/// Whether content-named elements (links, buttons) expose a name
pub(crate) fn has_content_name(el: &Element<'_>) -> bool {
    !el.text().trim().is_empty()
        || el.non_blank_attr("aria-label").is_some()
        || el.non_blank_attr("aria-labelledby").is_some()
        || el.non_blank_attr("title").is_some()
        || el.select("img").any(|img| img.non_blank_attr("alt").is_some())
}
