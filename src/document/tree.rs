// SPDX-License-Identifier: PMPL-1.0-or-later
//! Full DOM backend built on `scraper` (html5ever).
//!
//! html5ever recovers from malformed markup the way browsers do: implied
//! `<html>`/`<head>`/`<body>`, auto-closed paragraphs, lowercase names. It
//! keeps no source positions, so lines and source spans come from a source
//! map: the k-th element named `t` in document order is paired with the k-th
//! `<t` start tag the text backend finds in the raw text, but only when both
//! counts agree. Elements of a tag that never appears in the source are
//! marked implied.

use super::text::TextParser;
use super::{
    preflight, Backend, Document, DocumentBuilder, ElementData, MarkupParser, SourceSpan, ROOT,
};
use crate::error::ParseError;
use scraper::{Html, Node};
use std::collections::HashMap;
use tracing::debug;

/// HTML5 tree parser
#[derive(Debug, Clone, Copy)]
pub struct TreeParser {
    max_errors: usize,
}

impl TreeParser {
    /// Parser that rejects input needing more than `max_errors` recoveries
    pub fn new(max_errors: usize) -> Self {
        Self { max_errors }
    }
}

impl MarkupParser for TreeParser {
    fn backend(&self) -> Backend {
        Backend::Tree
    }

    fn parse(&self, html: &str) -> Result<Document, ParseError> {
        preflight(html)?;

        let parsed = Html::parse_document(html);
        if parsed.errors.len() > self.max_errors {
            return Err(ParseError::TooManyErrors {
                count: parsed.errors.len(),
                limit: self.max_errors,
            });
        }
        debug!("Tree parse recovered from {} errors", parsed.errors.len());

        let mut builder = DocumentBuilder::new(Backend::Tree, html);
        let mut stack = vec![(parsed.tree.root(), ROOT)];

        while let Some((node, parent)) = stack.pop() {
            let parent = match node.value() {
                Node::Element(el) => builder.element(
                    parent,
                    ElementData {
                        name: el.name().to_lowercase(),
                        attrs: el
                            .attrs()
                            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                            .collect(),
                        line: None,
                        implied: false,
                        span: None,
                    },
                ),
                Node::Text(text) => {
                    builder.text(parent, text.to_string());
                    continue;
                }
                Node::Document | Node::Fragment => parent,
                // Comments, doctypes and processing instructions
                _ => continue,
            };
            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, parent));
            }
        }

        apply_source_map(&mut builder, html);
        Ok(builder.finish())
    }
}

struct SourceTag {
    line: Option<usize>,
    span: Option<SourceSpan>,
    attr_order: Vec<String>,
}

/// Attach lines, spans and source attribute order, and mark implied elements
fn apply_source_map(builder: &mut DocumentBuilder, html: &str) {
    let mut source: HashMap<String, Vec<SourceTag>> = HashMap::new();
    // No start tag at all leaves every element implied
    if let Ok(literal) = TextParser.parse(html) {
        for el in literal.elements() {
            source.entry(el.name().to_string()).or_default().push(SourceTag {
                line: el.line(),
                span: el.span(),
                attr_order: el.attrs().iter().map(|(k, _)| k.clone()).collect(),
            });
        }
    }

    let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
    for (id, name) in builder.element_names() {
        by_name.entry(name).or_default().push(id);
    }

    for (name, ids) in by_name {
        let tags = source.get(&name).map_or(&[][..], Vec::as_slice);
        if tags.is_empty() {
            for id in ids {
                if let Some(data) = builder.element_data_mut(id) {
                    data.implied = true;
                }
            }
            continue;
        }
        if tags.len() != ids.len() {
            debug!(
                "Source map skipped <{}>: {} in tree, {} in source",
                name,
                ids.len(),
                tags.len()
            );
            continue;
        }
        for (id, tag) in ids.into_iter().zip(tags) {
            if let Some(data) = builder.element_data_mut(id) {
                data.line = tag.line;
                data.span = tag.span;
                data.attrs.sort_by_key(|(k, _)| {
                    tag.attr_order
                        .iter()
                        .position(|a| a == k)
                        .unwrap_or(usize::MAX)
                });
            }
        }
    }

    // Attributes html5ever stores unordered; sort unmapped ones for determinism
    for (id, _) in builder.element_names() {
        if let Some(data) = builder.element_data_mut(id) {
            if data.line.is_none() {
                data.attrs.sort();
            }
        }
    }
}
