// SPDX-License-Identifier: PMPL-1.0-or-later
//! Degraded text backend: regex tokenizer over the raw HTML.
//!
//! Tags are matched with a pattern, text between them becomes text nodes, and
//! a stack of open elements gives the nesting. Start tags that imply an end
//! tag (`<li>` after `<li>`, a block after `<p>`, table rows and cells) close
//! the open element first. Unmatched end tags are ignored and elements left
//! open at EOF are closed implicitly. Nothing is synthesized, so every element
//! has an exact source line and source span.
//!
//! The same tokenizer provides the source map for the tree backend.

use super::{
    preflight, Backend, Document, DocumentBuilder, ElementData, MarkupParser, SourceSpan,
    RAW_TEXT_ELEMENTS, ROOT, VOID_ELEMENTS,
};
use crate::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

/// Comments, doctypes, processing instructions, end tags and start tags
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?(?:-->|\z)|<!\[CDATA\[.*?(?:\]\]>|\z)|<![^>]*>|<\?[^>]*>|</([A-Za-z][A-Za-z0-9:_-]*)[^>]*>|<([A-Za-z][A-Za-z0-9:_-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("valid markup pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#)
        .expect("valid attribute pattern")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity pattern")
});

/// Start tags that close open elements: (tag, closes, search stops at)
const IMPLIED_ENDS: &[(&str, &[&str], &[&str])] = &[
    ("li", &["li", "p"], &["ul", "ol", "menu", "table", "td", "th", "button"]),
    ("dt", &["dt", "dd", "p"], &["dl", "table", "td", "th", "button"]),
    ("dd", &["dt", "dd", "p"], &["dl", "table", "td", "th", "button"]),
    ("tr", &["tr", "td", "th"], &["table", "thead", "tbody", "tfoot"]),
    ("td", &["td", "th"], &["tr", "table"]),
    ("th", &["td", "th"], &["tr", "table"]),
    ("thead", &["thead", "tbody", "tfoot", "tr", "td", "th"], &["table"]),
    ("tbody", &["thead", "tbody", "tfoot", "tr", "td", "th"], &["table"]),
    ("tfoot", &["thead", "tbody", "tfoot", "tr", "td", "th"], &["table"]),
    ("option", &["option"], &["select", "datalist", "optgroup"]),
    ("optgroup", &["optgroup", "option"], &["select"]),
];

/// Block start tags that end an open paragraph
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

const PARAGRAPH: &[&str] = &["p"];

const PARAGRAPH_SCOPE: &[&str] = &["button", "table", "td", "th", "caption", "object", "template"];

/// A lexical unit of the source. Offsets are byte positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
        start: usize,
        end: usize,
    },
    EndTag {
        name: String,
        start: usize,
        end: usize,
    },
    Text(String),
}

/// Split `html` into tokens. Raw-text element content is a single text token.
pub(crate) fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(caps) = MARKUP.captures_at(html, pos) {
        let Some(whole) = caps.get(0) else { break };
        if whole.start() > pos {
            tokens.push(Token::Text(decode_entities(&html[pos..whole.start()])));
        }
        pos = whole.end();

        if let Some(name) = caps.get(1) {
            tokens.push(Token::EndTag {
                name: name.as_str().to_lowercase(),
                start: whole.start(),
                end: whole.end(),
            });
        } else if let Some(name) = caps.get(2) {
            let name = name.as_str().to_lowercase();
            let raw_attrs = caps.get(3).map_or("", |m| m.as_str());
            let self_closing = raw_attrs.trim_end().ends_with('/');
            tokens.push(Token::StartTag {
                name: name.clone(),
                attrs: parse_attributes(raw_attrs),
                self_closing,
                start: whole.start(),
                end: whole.end(),
            });

            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing {
                let close = find_close_tag(html, pos, &name);
                if close > pos {
                    tokens.push(Token::Text(html[pos..close].to_string()));
                }
                pos = close;
            }
        }
        // Comments, doctypes and processing instructions produce no token
    }

    if pos < html.len() {
        tokens.push(Token::Text(decode_entities(&html[pos..])));
    }
    tokens
}

/// Byte offset of `</name` (any case) at or after `from`, or the end of input
fn find_close_tag(html: &str, from: usize, name: &str) -> usize {
    let bytes = html.as_bytes();
    html[from..]
        .match_indices("</")
        .map(|(i, _)| from + i)
        .find(|&at| {
            bytes
                .get(at + 2..at + 2 + name.len())
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()))
        })
        .unwrap_or(html.len())
}

/// Parse the attribute portion of a start tag. First occurrence wins.
pub(crate) fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = Vec::new();
    for caps in ATTRIBUTE.captures_iter(raw) {
        let Some(name) = caps.get(1) else { continue };
        let name = name.as_str().to_lowercase();
        if attrs.iter().any(|(k, _)| *k == name) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or(String::new(), |m| decode_entities(m.as_str()));
        attrs.push((name, value));
    }
    attrs
}

/// Decode the common named entities and numeric references
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Start offset of every line, for offset → line lookups
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line containing byte `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// Open elements as (arena id, tag name), innermost last
#[derive(Default)]
struct OpenElements(Vec<(usize, String)>);

impl OpenElements {
    fn current(&self) -> usize {
        self.0.last().map_or(ROOT, |(id, _)| *id)
    }

    fn push(&mut self, id: usize, name: String) {
        self.0.push((id, name));
    }

    /// Close `self.0[from..]`, ending each element at byte `at`
    fn close_from(&mut self, builder: &mut DocumentBuilder, from: usize, at: usize) {
        for (id, _) in self.0.drain(from..) {
            if let Some(span) = builder.element_data_mut(id).and_then(|d| d.span.as_mut()) {
                span.end = at;
            }
        }
    }

    /// Handle `</name>` spanning `start..end`. Elements opened inside the
    /// match end where the end tag starts.
    fn close_named(&mut self, builder: &mut DocumentBuilder, name: &str, start: usize, end: usize) {
        if let Some(pos) = self.0.iter().rposition(|(_, open)| open == name) {
            self.close_from(builder, pos + 1, start);
            self.close_from(builder, pos, end);
        }
    }

    /// Close whatever a `<name>` start tag at byte `at` ends implicitly
    fn close_implied_by(&mut self, builder: &mut DocumentBuilder, name: &str, at: usize) {
        let Some((closes, stops)) = implied_ends(name) else {
            return;
        };
        let mut outermost = None;
        for (pos, (_, open)) in self.0.iter().enumerate().rev() {
            if stops.contains(&open.as_str()) {
                break;
            }
            if closes.contains(&open.as_str()) {
                outermost = Some(pos);
            }
        }
        if let Some(pos) = outermost {
            self.close_from(builder, pos, at);
        }
    }
}

fn implied_ends(name: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
    if let Some((_, closes, stops)) = IMPLIED_ENDS.iter().find(|(tag, _, _)| *tag == name) {
        return Some((*closes, *stops));
    }
    CLOSES_PARAGRAPH
        .contains(&name)
        .then_some((PARAGRAPH, PARAGRAPH_SCOPE))
}

/// Lenient regex-based parser
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl MarkupParser for TextParser {
    fn backend(&self) -> Backend {
        Backend::Text
    }

    fn parse(&self, html: &str) -> Result<Document, ParseError> {
        preflight(html)?;

        let lines = LineIndex::new(html);
        let mut builder = DocumentBuilder::new(Backend::Text, html);
        let mut open = OpenElements::default();
        let mut saw_tag = false;

        for token in tokenize(html) {
            match token {
                Token::Text(text) => builder.text(open.current(), text),
                Token::StartTag {
                    name,
                    attrs,
                    self_closing,
                    start,
                    end,
                } => {
                    saw_tag = true;
                    open.close_implied_by(&mut builder, &name, start);
                    let id = builder.element(
                        open.current(),
                        ElementData {
                            name: name.clone(),
                            attrs,
                            line: Some(lines.line_of(start)),
                            implied: false,
                            span: Some(SourceSpan {
                                start,
                                tag_end: end,
                                end,
                            }),
                        },
                    );
                    if !VOID_ELEMENTS.contains(&name.as_str()) && !self_closing {
                        open.push(id, name);
                    }
                }
                Token::EndTag { name, start, end } => {
                    saw_tag = true;
                    open.close_named(&mut builder, &name, start, end);
                }
            }
        }
        open.close_from(&mut builder, 0, html.len());

        if !saw_tag {
            return Err(ParseError::NoMarkup);
        }
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_skips_comments_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!-- <img> --><p>x</p>");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "p"));
    }

    #[test]
    fn test_raw_text_is_not_tokenized() {
        let tokens = tokenize("<script>if (a < b) { x = '<img>'; }</script><img src=a>");
        let imgs = tokens
            .iter()
            .filter(|t| matches!(t, Token::StartTag { name, .. } if name == "img"))
            .count();
        assert_eq!(imgs, 1);
    }

    #[test]
    fn test_attribute_forms() {
        let attrs = parse_attributes(r#" SRC="a.png" alt='it&#39;s' hidden data-x=1 src="dup""#);
        assert_eq!(
            attrs,
            vec![
                ("src".to_string(), "a.png".to_string()),
                ("alt".to_string(), "it's".to_string()),
                ("hidden".to_string(), String::new()),
                ("data-x".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let doc = TextParser.parse(r#"<a title="a > b" href="/x">go</a>"#).unwrap();
        let a = doc.select("a").next().unwrap();
        assert_eq!(a.attr("title"), Some("a > b"));
        assert_eq!(a.text(), "go");
    }

    #[test]
    fn test_unclosed_and_stray_tags_are_tolerated() {
        let doc = TextParser
            .parse("<div><p>one<p>two</span></div><table><tr><td>x")
            .unwrap();
        assert_eq!(doc.select("p").count(), 2);
        let td = doc.select("td").next().unwrap();
        assert_eq!(td.text(), "x");
        assert!(td.ancestors().any(|a| a.name() == "table"));
    }

    #[test]
    fn test_uppercase_raw_text_close() {
        let html = "<SCRIPT>var s = '<img>';</SCRIPT><img src=a><style>p{}</STYLE >";
        assert_eq!(find_close_tag(html, 8, "script"), 24);
        assert_eq!(find_close_tag(html, 0, "textarea"), html.len());
        let doc = TextParser.parse(html).unwrap();
        assert_eq!(doc.select("img").count(), 1);
        assert_eq!(doc.select("script").next().unwrap().text(), "var s = '<img>';");
    }

    #[test]
    fn test_implied_end_tags() {
        let doc = TextParser
            .parse("<ul><li>one<li>two<li id=last>three</ul><p>a<p>b<div>c</div>")
            .unwrap();
        let items: Vec<String> = doc.select("li").map(|li| li.selector()).collect();
        assert_eq!(items, vec!["li:nth-of-type(1)", "li:nth-of-type(2)", "#last"]);
        assert!(doc.select("li").all(|li| li.parent().unwrap().name() == "ul"));
        let paragraphs: Vec<String> = doc.select("p").map(|p| p.text()).collect();
        assert_eq!(paragraphs, vec!["a", "b"]);
        assert_eq!(doc.select("div").next().unwrap().parent().map(|p| p.name()), None);
    }

    #[test]
    fn test_implied_table_ends() {
        let doc = TextParser
            .parse("<table><tr><td>1<td>2<tr><th>3<td>4</table>")
            .unwrap();
        let rows: Vec<_> = doc.select("tr").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].nth_of_type(), 2);
        assert_eq!(rows[0].select("td").count(), 2);
        assert_eq!(rows[1].select("td").next().unwrap().nth_of_type(), 1);
        assert_eq!(rows[0].source_outer_html(), "<tr><td>1<td>2");
    }

    #[test]
    fn test_nested_lists_stay_nested() {
        let doc = TextParser
            .parse("<ul><li>a<ul><li>b</ul><li>c</ul>")
            .unwrap();
        let items: Vec<_> = doc.select("li").collect();
        assert_eq!(items[1].ancestors().filter(|a| a.name() == "li").count(), 1);
        assert_eq!(items[2].nth_of_type(), 2);
    }

    #[test]
    fn test_line_index() {
        let idx = LineIndex::new("a\nbb\n\nc");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 2);
        assert_eq!(idx.line_of(5), 3);
        assert_eq!(idx.line_of(6), 4);
    }

    #[test]
    fn test_text_only_input_is_rejected() {
        assert_eq!(TextParser.parse("a < b").unwrap_err(), ParseError::NoMarkup);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;&#x41;&gt; &bogus;"), "a & b <A> &bogus;");
    }
}
