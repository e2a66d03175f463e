// SPDX-License-Identifier: PMPL-1.0-or-later
//! Heading structure - WCAG 1.3.1 Info and Relationships (Level A)

use super::{wcag, Rule};
use crate::document::{Document, Element};
use crate::error::RuleError;
use crate::issue::{Issue, Severity};

/// `h1`..`h6` elements with their level, in document order
fn headings(doc: &Document) -> Vec<(u8, Element<'_>)> {
    doc.elements()
        .filter_map(|el| {
            let level = el.name().strip_prefix('h')?.parse::<u8>().ok()?;
            (1..=6).contains(&level).then_some((level, el))
        })
        .collect()
}

/// Headings exist but none is an `<h1>`
pub struct MissingH1Rule;

impl Rule for MissingH1Rule {
    fn id(&self) -> &'static str {
        "page-has-h1"
    }

    fn description(&self) -> &'static str {
        "Checks that a page with headings has an <h1>"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let found = headings(doc);
        let Some((_, first)) = found.first() else {
            return Ok(Vec::new());
        };
        if found.iter().any(|(level, _)| *level == 1) {
            return Ok(Vec::new());
        }
        Ok(vec![Issue::new(
            Severity::Warning,
            "structure",
            "Page missing h1 heading",
            "Pages should have a proper heading hierarchy starting with h1 so screen reader users can find the main topic.",
        )
        .with_fix("Add an <h1> describing the page before the other headings")
        .with_selector(first.selector())
        .with_line(first.line())
        .with_wcag(wcag::INFO_AND_RELATIONSHIPS)])
    }
}

/// A heading more than one level deeper than its predecessor. Reported once.
pub struct HeadingOrderRule;

impl Rule for HeadingOrderRule {
    fn id(&self) -> &'static str {
        "heading-order"
    }

    fn description(&self) -> &'static str {
        "Checks that heading levels are not skipped"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let found = headings(doc);
        let skip = found
            .windows(2)
            .find(|pair| pair[1].0 > pair[0].0 + 1)
            .map(|pair| (pair[0].0, pair[1].0, pair[1].1));

        let Some((prev, curr, heading)) = skip else {
            return Ok(Vec::new());
        };
        Ok(vec![Issue::new(
            Severity::Warning,
            "structure",
            "Skipped heading level",
            &format!(
                "Heading level skips from h{} to h{}. Headings should follow sequential order so the outline stays navigable.",
                prev, curr
            ),
        )
        .with_fix(&format!(
            "Use <h{}> here or restructure headings to follow sequential order (h1, h2, h3...)",
            prev + 1
        ))
        .with_selector(heading.selector())
        .with_line(heading.line())
        .with_snippet(heading.source_outer_html())
        .with_wcag(wcag::INFO_AND_RELATIONSHIPS)])
    }
}
