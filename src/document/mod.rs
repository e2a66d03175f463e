// SPDX-License-Identifier: PMPL-1.0-or-later
//! Parsed HTML documents.
//!
//! A [`Document`] is an immutable arena of nodes stored in document order
//! (pre-order), so "every element in document order" is a linear walk and an
//! element's subtree is a contiguous index range. Two backends build it:
//!
//! - [`tree::TreeParser`]: full HTML5 parse through `scraper`, with a source
//!   map for line and span attribution.
//! - [`text::TextParser`]: lenient regex tokenizer over the raw text. Lower
//!   fidelity (no implied elements, only the common implied end tags) but
//!   exact line numbers and spans.
//!
//! Issue snippets are the literal source of an element
//! ([`Element::source_outer_html`]), so a fix can be applied by replacing the
//! snippet in the original text.
//!
//! Rules only see the [`Document`] query API and never know which backend
//! produced it.

pub mod text;
pub mod tree;

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Elements that never have content or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is raw text, not markup
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Which backend built a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Tree,
    Text,
}

/// Backend selection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserStrategy {
    /// Tree parse, falling back to text when the tree parser gives up
    #[default]
    Auto,
    Tree,
    Text,
}

impl std::str::FromStr for ParserStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ParserStrategy::Auto),
            "tree" => Ok(ParserStrategy::Tree),
            "text" => Ok(ParserStrategy::Text),
            other => Err(format!("Unknown parser strategy: {}", other)),
        }
    }
}

/// Turns HTML text into a [`Document`]
pub trait MarkupParser {
    /// Backend this parser produces
    fn backend(&self) -> Backend;

    /// Parse an HTML string
    fn parse(&self, html: &str) -> Result<Document, ParseError>;
}

/// Parse `html` with the given strategy.
///
/// `max_errors` bounds how many recoveries the tree parser may make before it
/// rejects the input.
pub fn parse_document(
    html: &str,
    strategy: ParserStrategy,
    max_errors: usize,
) -> Result<Document, ParseError> {
    match strategy {
        ParserStrategy::Tree => tree::TreeParser::new(max_errors).parse(html),
        ParserStrategy::Text => text::TextParser.parse(html),
        ParserStrategy::Auto => match tree::TreeParser::new(max_errors).parse(html) {
            Ok(doc) => Ok(doc),
            Err(err @ ParseError::TooManyErrors { .. }) => {
                warn!("Tree parser rejected document ({}), falling back to text scan", err);
                text::TextParser.parse(html)
            }
            Err(err) => Err(err),
        },
    }
}

/// Reject input that is not markup under any interpretation
pub(crate) fn preflight(html: &str) -> Result<(), ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if html.contains('\0') {
        return Err(ParseError::Binary);
    }
    if !html.contains('<') {
        return Err(ParseError::NoMarkup);
    }
    Ok(())
}

/// Byte ranges of an element in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceSpan {
    /// Offset of the `<` opening the start tag
    pub start: usize,
    /// Offset just past the start tag's `>`
    pub tag_end: usize,
    /// Offset just past the element, end tag included when there is one
    pub end: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub line: Option<usize>,
    pub implied: bool,
    pub span: Option<SourceSpan>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Last index of this node's subtree
    end: usize,
}

/// Index of the synthetic root node
pub(crate) const ROOT: usize = 0;

/// Appends nodes in document order
pub(crate) struct DocumentBuilder {
    nodes: Vec<Node>,
    backend: Backend,
    source: String,
}

impl DocumentBuilder {
    pub fn new(backend: Backend, source: &str) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
                end: ROOT,
            }],
            backend,
            source: source.to_string(),
        }
    }

    fn push(&mut self, parent: usize, data: NodeData) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
            end: id,
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn element(&mut self, parent: usize, data: ElementData) -> usize {
        self.push(parent, NodeData::Element(data))
    }

    pub fn text(&mut self, parent: usize, text: String) {
        if text.is_empty() {
            return;
        }
        // Adjacent text merges, as the DOM does
        if let Some(&last) = self.nodes[parent].children.last() {
            if last == self.nodes.len() - 1 {
                if let NodeData::Text(existing) = &mut self.nodes[last].data {
                    existing.push_str(&text);
                    return;
                }
            }
        }
        self.push(parent, NodeData::Text(text));
    }

    pub fn element_data_mut(&mut self, id: usize) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id)?.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Element ids with their tag name, in document order
    pub fn element_names(&self) -> Vec<(usize, String)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, node)| match &node.data {
                NodeData::Element(data) => Some((id, data.name.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn finish(mut self) -> Document {
        for id in (0..self.nodes.len()).rev() {
            if let Some(&last_child) = self.nodes[id].children.last() {
                self.nodes[id].end = self.nodes[last_child].end;
            }
        }
        Document {
            nodes: self.nodes,
            backend: self.backend,
            source: self.source,
        }
    }
}

/// An immutable parsed HTML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    backend: Backend,
    source: String,
}

impl Document {
    /// Backend that produced this document
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        (0..self.nodes.len()).filter_map(move |id| self.element(id))
    }

    /// Elements with the given tag name, in document order
    pub fn select<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.elements().filter(move |el| el.name() == tag)
    }

    /// Elements carrying the attribute `name`
    pub fn select_with_attr<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.elements().filter(move |el| el.has_attr(name))
    }

    /// Elements whose attribute `name` equals `value` exactly
    pub fn select_attr_value<'a, 'q>(
        &'a self,
        name: &'q str,
        value: &'q str,
    ) -> impl Iterator<Item = Element<'a>> + 'q
    where
        'a: 'q,
    {
        self.elements().filter(move |el| el.attr(name) == Some(value))
    }

    /// First element with `id="<id>"`
    pub fn element_by_id(&self, id: &str) -> Option<Element<'_>> {
        self.elements().find(|el| el.attr("id") == Some(id))
    }

    /// The text this document was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether any element has the given tag name
    pub fn has_element(&self, tag: &str) -> bool {
        self.select(tag).next().is_some()
    }

    fn element(&self, id: usize) -> Option<Element<'_>> {
        match self.nodes.get(id)?.data {
            NodeData::Element(_) => Some(Element { doc: self, id }),
            _ => None,
        }
    }
}

/// A borrowed element of a [`Document`]
#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    id: usize,
}

impl<'a> Element<'a> {
    fn data(&self) -> &'a ElementData {
        match &self.doc.nodes[self.id].data {
            NodeData::Element(data) => data,
            _ => unreachable!("Element handles only point at element nodes"),
        }
    }

    /// Lowercase tag name
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    /// Attributes in source order
    pub fn attrs(&self) -> &'a [(String, String)] {
        &self.data().attrs
    }

    /// Attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Attribute value, if present and not blank
    pub fn non_blank_attr(&self, name: &str) -> Option<&'a str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// 1-based source line of the start tag, when known
    pub fn line(&self) -> Option<usize> {
        self.data().line
    }

    /// True when the parser synthesized this element (no start tag in source)
    pub fn is_implied(&self) -> bool {
        self.data().implied
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.doc.nodes[self.id].parent.and_then(|p| self.doc.element(p))
    }

    /// Ancestor elements, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        std::iter::successors(self.parent(), |el| el.parent())
    }

    /// Descendant elements in document order
    pub fn descendants(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let doc = self.doc;
        let end = doc.nodes[self.id].end;
        (self.id + 1..=end).filter_map(move |id| doc.element(id))
    }

    /// Descendant elements with the given tag name
    pub fn select(&self, tag: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.descendants().filter(move |el| el.name() == tag)
    }

    /// Concatenated descendant text
    pub fn text(&self) -> String {
        let end = self.doc.nodes[self.id].end;
        self.doc.nodes[self.id + 1..=end]
            .iter()
            .filter_map(|node| match &node.data {
                NodeData::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// 1-based position among parent's children with the same tag
    pub fn nth_of_type(&self) -> usize {
        let Some(parent) = self.doc.nodes[self.id].parent else {
            return 1;
        };
        let name = self.name();
        self.doc.nodes[parent]
            .children
            .iter()
            .take_while(|&&child| child != self.id)
            .filter(|&&child| {
                matches!(&self.doc.nodes[child].data, NodeData::Element(d) if d.name == name)
            })
            .count()
            + 1
    }

    /// Deterministic locator: `#id` when an id exists, else `tag:nth-of-type(n)`
    pub fn selector(&self) -> String {
        match self.attr("id").filter(|id| !id.trim().is_empty()) {
            Some(id) => format!("#{}", css_escape(id)),
            None => format!("{}:nth-of-type({})", self.name(), self.nth_of_type()),
        }
    }

    pub(crate) fn span(&self) -> Option<SourceSpan> {
        self.data().span
    }

    fn literal(&self, from: impl Fn(SourceSpan) -> (usize, usize)) -> Option<&'a str> {
        let (start, end) = from(self.span()?);
        self.doc.source.get(start..end)
    }

    /// The start tag as serialized markup
    pub fn start_tag(&self) -> String {
        render_start_tag(self.name(), self.attrs().iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// The start tag exactly as written in the source, serialized when the
    /// source position is unknown
    pub fn source_start_tag(&self) -> String {
        self.literal(|s| (s.start, s.tag_end))
            .map_or_else(|| self.start_tag(), str::to_string)
    }

    /// The element exactly as written in the source, subtree included
    pub fn source_outer_html(&self) -> String {
        self.literal(|s| (s.start, s.end))
            .map_or_else(|| self.outer_html(), str::to_string)
    }

    /// The source start tag with `overrides` inserted after the tag name.
    ///
    /// When an override names an attribute the element already has, the tag
    /// is serialized instead, overrides first.
    pub fn start_tag_with(&self, overrides: &[(&str, &str)]) -> String {
        let replaces = overrides.iter().any(|(name, _)| self.has_attr(name));
        let split = self.name().len() + 1;
        match self.literal(|s| (s.start, s.tag_end)) {
            Some(tag) if !replaces && tag.is_char_boundary(split) => {
                let (head, rest) = tag.split_at(split);
                let mut out = head.to_string();
                for (k, v) in overrides {
                    push_attr(&mut out, k, v);
                }
                out.push_str(rest);
                out
            }
            _ => {
                let kept = self
                    .attrs()
                    .iter()
                    .filter(|(k, _)| !overrides.iter().any(|(name, _)| name == k))
                    .map(|(k, v)| (k.as_str(), v.as_str()));
                render_start_tag(self.name(), overrides.iter().copied().chain(kept))
            }
        }
    }

    /// The element and its subtree as serialized markup
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_node(self.doc, self.id, &mut out);
        out
    }

    /// Markup of the children only
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for &child in &self.doc.nodes[self.id].children {
            write_node(self.doc, child, &mut out);
        }
        out
    }

    /// Outer markup with `overrides` applied to the start tag. The rest of the
    /// element is kept as written.
    pub fn outer_html_with(&self, overrides: &[(&str, &str)]) -> String {
        let start = self.start_tag_with(overrides);
        if let Some(rest) = self.literal(|s| (s.tag_end, s.end)) {
            return format!("{}{}", start, rest);
        }
        if VOID_ELEMENTS.contains(&self.name()) {
            return start;
        }
        format!("{}{}</{}>", start, self.inner_html(), self.name())
    }

    /// Same element with the content replaced by `text`
    pub fn with_text(&self, text: &str) -> String {
        format!("{}{}</{}>", self.source_start_tag(), escape_text(text), self.name())
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start_tag())
    }
}

fn render_start_tag<'v>(name: &str, attrs: impl Iterator<Item = (&'v str, &'v str)>) -> String {
    let mut out = format!("<{}", name);
    for (k, v) in attrs {
        push_attr(&mut out, k, v);
    }
    out.push('>');
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

/// Escape an id for use in a CSS selector, as `CSS.escape` does
fn css_escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let leading_dash = ident.starts_with('-');
    for (i, c) in ident.chars().enumerate() {
        match c {
            '\0' => out.push('\u{fffd}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", c as u32)),
            '0'..='9' if i == 0 || (i == 1 && leading_dash) => {
                out.push_str(&format!("\\{:x} ", c as u32))
            }
            '-' if ident.len() == 1 => out.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

fn write_node(doc: &Document, id: usize, out: &mut String) {
    let node = &doc.nodes[id];
    match &node.data {
        NodeData::Root => {
            for &child in &node.children {
                write_node(doc, child, out);
            }
        }
        NodeData::Text(t) => {
            let raw = node
                .parent
                .and_then(|p| doc.element(p))
                .is_some_and(|p| RAW_TEXT_ELEMENTS.contains(&p.name()));
            if raw {
                out.push_str(t);
            } else {
                out.push_str(&escape_text(t));
            }
        }
        NodeData::Element(data) => {
            out.push_str(&render_start_tag(
                &data.name,
                data.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ));
            if VOID_ELEMENTS.contains(&data.name.as_str()) {
                return;
            }
            for &child in &node.children {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&data.name);
            out.push('>');
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
