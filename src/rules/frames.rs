// SPDX-License-Identifier: PMPL-1.0-or-later
//! Frame titles - WCAG 4.1.2 Name, Role, Value (Level A)

use super::{wcag, Rule};
use crate::document::Document;
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// Placeholder title inserted by the fix
pub const FRAME_TITLE_PLACEHOLDER: &str = "Description of iframe content";

/// `<iframe>` with neither `title` nor `aria-label`
pub struct FrameTitleRule;

impl Rule for FrameTitleRule {
    fn id(&self) -> &'static str {
        "frame-title"
    }

    fn description(&self) -> &'static str {
        "Checks that iframes have a title"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let issues = doc
            .select("iframe")
            .filter(|f| f.non_blank_attr("title").is_none() && f.non_blank_attr("aria-label").is_none())
            .map(|frame| {
                Issue::new(
                    Severity::Critical,
                    "structure",
                    "Iframe missing title attribute",
                    "Iframes must have a title attribute that describes their content for screen reader users.",
                )
                .with_fix("Add title attribute with descriptive text")
                .with_selector(frame.selector())
                .with_line(frame.line())
                .with_snippet(frame.source_outer_html())
                .with_fixed_code(frame.outer_html_with(&[("title", FRAME_TITLE_PLACEHOLDER)]))
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
    fn test_titled_frames() {
        let html = r#"<iframe src="/map" title="Office map"></iframe><iframe src="/v" aria-label="Video"></iframe>"#;
        assert!(check(&FrameTitleRule, html).is_empty());
    }

    #[test]
    fn test_untitled_frame() {
        let issues = check(&FrameTitleRule, r#"<iframe src="https://example.com/embed"></iframe>"#);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].fixed_code.as_deref(),
            Some(r#"<iframe title="Description of iframe content" src="https://example.com/embed"></iframe>"#)
        );
        assert!(check(&FrameTitleRule, issues[0].fixed_code.as_deref().unwrap()).is_empty());
    }
}
