// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image alternative text - WCAG 1.1.1 Non-text Content (Level A)
//!
//! - Every `<img>` must have an `alt` attribute
//! - `alt=""` marks an image decorative, which should be stated explicitly
//!   with a `role` or `aria-hidden`

use super::{wcag, Rule};
use crate::document::{Document, Element};
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// Placeholder alt text inserted by the fix
pub const ALT_PLACEHOLDER: &str = "Description of image";

/// `<img>` without any `alt` attribute
pub struct ImageAltRule;

impl Rule for ImageAltRule {
    fn id(&self) -> &'static str {
        "image-alt"
    }

    fn description(&self) -> &'static str {
        "Checks that every <img> has an alt attribute"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = doc
            .select("img")
            .filter(|img| !img.has_attr("alt"))
            .map(|img| {
                Issue::new(
                    Severity::Critical,
                    "images",
                    "Image missing alt attribute",
                    "All images must have an alt attribute for screen readers. Decorative images should use alt=\"\".",
                )
                .with_fix("Add alt attribute with descriptive text or alt=\"\" for decorative images")
                .with_selector(img.selector())
                .with_line(img.line())
                .with_snippet(img.source_outer_html())
                .with_fixed_code(img.outer_html_with(&[("alt", ALT_PLACEHOLDER)]))
                .with_wcag(wcag::NON_TEXT_CONTENT)
            })
            .collect();
        Ok(issues)
    }
}

/// `alt=""` without a decorative marker
pub struct EmptyAltRule;

fn is_marked_decorative(img: &Element<'_>) -> bool {
    img.has_attr("role") || img.attr("aria-hidden").is_some_and(|v| v.trim() == "true")
}

impl Rule for EmptyAltRule {
    fn id(&self) -> &'static str {
        "image-empty-alt"
    }

    fn description(&self) -> &'static str {
        "Checks that images with empty alt text are explicitly marked decorative"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = doc
            .select("img")
            .filter(|img| img.attr("alt").is_some_and(|alt| alt.trim().is_empty()))
            .filter(|img| !is_marked_decorative(img))
            .map(|img| {
                Issue::new(
                    Severity::Warning,
                    "images",
                    "Image has empty alt attribute",
                    "Empty alt attributes should only be used for decorative images. If this image conveys information, add descriptive alt text.",
                )
                .with_fix("Replace empty alt with descriptive text if image is meaningful, or add role=\"presentation\" if it is decorative")
                .with_selector(img.selector())
                .with_line(img.line())
                .with_snippet(img.source_outer_html())
                .with_wcag(wcag::NON_TEXT_CONTENT)
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
    fn test_accessible_images() {
        let html = r#"
            <html lang="en">
            <body>
                <img src="logo.png" alt="Company logo">
                <img src="divider.png" alt="" role="presentation">
                <img src="spacer.png" alt="" aria-hidden="true">
            </body>
            </html>
        "#;
        assert!(check(&ImageAltRule, html).is_empty());
        assert!(check(&EmptyAltRule, html).is_empty());
    }

    #[test]
    fn test_missing_alt() {
        let html = "<html lang=\"en\"><body>\n<img src=\"x.png\"></body></html>";
        let issues = check(&ImageAltRule, html);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].category, "images");
        assert_eq!(issues[0].line_number, Some(2));
        assert_eq!(issues[0].code_snippet.as_deref(), Some(r#"<img src="x.png">"#));
        assert_eq!(
            issues[0].fixed_code.as_deref(),
            Some(r#"<img alt="Description of image" src="x.png">"#)
        );
    }

    #[test]
    fn test_empty_alt_without_marker() {
        let html = r#"<body><img src="chart.png" alt=""><img src="a.png"></body>"#;
        let issues = check(&EmptyAltRule, html);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].fixed_code.is_none());
        assert_eq!(issues[0].selector.as_deref(), Some("img:nth-of-type(1)"));
    }

    #[test]
    fn test_fix_is_not_reflagged() {
        let issues = check(&ImageAltRule, r#"<img src="x.png">"#);
        let fixed = issues[0].fixed_code.clone().unwrap();
        assert!(check(&ImageAltRule, &fixed).is_empty());
        assert!(check(&EmptyAltRule, &fixed).is_empty());
    }
}
