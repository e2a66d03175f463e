// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page language - WCAG 3.1.1 Language of Page (Level A)

use super::{wcag, Rule};
use crate::document::Document;
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// `<html>` must carry a non-empty `lang`
pub struct HtmlLangRule;

impl Rule for HtmlLangRule {
    fn id(&self) -> &'static str {
        "html-lang"
    }

    fn description(&self) -> &'static str {
        "Checks that the <html> element declares the page language"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        // An <html> the parser had to invent is not the author's to fix
        let issues = doc
            .select("html")
            .filter(|html| !html.is_implied() && html.non_blank_attr("lang").is_none())
            .map(|html| {
                Issue::new(
                    Severity::Critical,
                    "structure",
                    "Missing lang attribute on html element",
                    "The html element must have a lang attribute to help screen readers pronounce content correctly.",
                )
                .with_fix("Add lang=\"en\" or appropriate language code to html element")
                .with_selector(html.selector())
                .with_line(html.line())
                .with_snippet(html.source_start_tag())
                .with_fixed_code(html.start_tag_with(&[("lang", "en")]))
                .with_wcag(wcag::LANGUAGE_OF_PAGE)
            })
            .collect();
        Ok(issues)
    }
}
