// SPDX-License-Identifier: PMPL-1.0-or-later
//! Link purpose - WCAG 2.4.4 Link Purpose (In Context) (Level A)
//!
//! Only `<a href>` is a link; named anchors (`<a id>`) are targets.

use super::{has_content_name, wcag, Rule};
use crate::document::{Document, Element};
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// Link text that says nothing about the destination. Exact match on the
/// whitespace-collapsed, lowercased text.
pub const GENERIC_LINK_TEXT: &[&str] = &["click here", "read more", "here", "more", "link"];

/// Placeholder link text inserted by the fix
pub const LINK_PLACEHOLDER: &str = "Descriptive Link Text";

fn links(doc: &Document) -> impl Iterator<Item = Element<'_>> + '_ {
    doc.select("a").filter(|a| a.has_attr("href"))
}

/// Link text with every whitespace run (`&nbsp;` included) collapsed to one space
fn link_text(a: &Element<'_>) -> String {
    a.text().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `<a href>` with no accessible name
pub struct LinkNameRule;

impl Rule for LinkNameRule {
    fn id(&self) -> &'static str {
        "link-name"
    }

    fn description(&self) -> &'static str {
        "Checks that links have an accessible name"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = links(doc)
            .filter(|a| !has_content_name(a))
            .map(|a| {
                Issue::new(
                    Severity::Critical,
                    "navigation",
                    "Link without text content",
                    "Links must contain text or an aria-label so users know where the link goes.",
                )
                .with_fix("Add descriptive link text or use aria-label attribute")
                .with_selector(a.selector())
                .with_line(a.line())
                .with_snippet(a.source_outer_html())
                .with_fixed_code(a.with_text(LINK_PLACEHOLDER))
                .with_wcag(wcag::LINK_PURPOSE)
            })
            .collect();
        Ok(issues)
    }
}

/// `<a href>` whose text is a generic phrase
pub struct GenericLinkTextRule;

impl Rule for GenericLinkTextRule {
    fn id(&self) -> &'static str {
        "link-text"
    }

    fn description(&self) -> &'static str {
        "Checks for non-descriptive link text such as \"click here\""
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = links(doc)
            .filter(|a| GENERIC_LINK_TEXT.contains(&link_text(a).to_lowercase().as_str()))
            .map(|a| {
                Issue::new(
                    Severity::Warning,
                    "navigation",
                    "Non-descriptive link text",
                    &format!(
                        "Avoid generic link text like \"{}\". Link text should describe the destination.",
                        link_text(&a)
                    ),
                )
                .with_fix("Use descriptive link text that makes sense out of context")
                .with_selector(a.selector())
                .with_line(a.line())
                .with_snippet(a.source_outer_html())
                .with_wcag(wcag::LINK_PURPOSE)
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
    fn test_named_links() {
        let html = r#"
            <a href="/docs">Read the installation guide</a>
            <a href="/home" aria-label="Home"><svg></svg></a>
            <a href="/logo"><img src="l.png" alt="Company home"></a>
            <a id="top"></a>
        "#;
        assert!(check(&LinkNameRule, html).is_empty());
        assert!(check(&GenericLinkTextRule, html).is_empty());
    }

    #[test]
    fn test_empty_link() {
        let issues = check(&LinkNameRule, r#"<p><a href="/x"> </a></p>"#);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "navigation");
        assert_eq!(
            issues[0].fixed_code.as_deref(),
            Some(r#"<a href="/x">Descriptive Link Text</a>"#)
        );
    }

    #[test]
    fn test_generic_text_is_not_a_missing_name() {
        let html = r#"<a href="/x">click here</a>"#;
        let generic = check(&GenericLinkTextRule, html);
        assert_eq!(generic.len(), 1);
        assert_eq!(generic[0].severity, Severity::Warning);
        assert!(check(&LinkNameRule, html).is_empty());
    }

    #[test]
    fn test_generic_match_is_exact_and_case_insensitive() {
        let html = r#"
            <a href="/a">  Read More </a>
            <a href="/b">HERE</a>
            <a href="/c">more details</a>
            <a href="/d">click here for pricing</a>
        "#;
        assert_eq!(check(&GenericLinkTextRule, html).len(), 2);
    }

    #[test]
    fn test_generic_text_across_nbsp_and_line_breaks() {
        let html = "<a href=\"/a\">click&nbsp;here</a>\n<a href=\"/b\">read\n   more</a>\n<a href=\"/c\">read&#160;the&nbsp;docs</a>";
        let issues = check(&GenericLinkTextRule, html);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].description.contains("\"click here\""));
        assert_eq!(issues[1].selector.as_deref(), Some("a:nth-of-type(2)"));
    }
}
