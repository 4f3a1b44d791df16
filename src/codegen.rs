//! HTML generation.
//!
//! Walks the AST in document order and renders each variant into an owned
//! buffer. Reference resolution happens here, against the table populated
//! during parse; a miss is not an error but a visible fallback.

use crate::ast::{is_whitespace_text, Document, EmphasisKind, NodeId, NodeKind, TagAttribute};

const EOL: char = '\n';

/// Tree-walking HTML generator.
#[derive(Debug, Default)]
pub struct HtmlGenerator {
    buffer: String,
}

impl HtmlGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the document and returns the generated HTML.
    pub fn generate(mut self, document: &Document) -> String {
        self.render(document, document.root());
        self.buffer
    }

    fn render(&mut self, document: &Document, id: NodeId) {
        match &document.node(id).kind {
            NodeKind::Document => self.render_children_separated(document, id),
            NodeKind::Header { level } => {
                self.buffer.push_str("<h");
                self.buffer.push((b'0' + level) as char);
                self.buffer.push('>');
                self.render_children(document, id);
                self.buffer.push_str("</h");
                self.buffer.push((b'0' + level) as char);
                self.buffer.push('>');
                self.buffer.push(EOL);
            }
            NodeKind::Paragraph => self.render_paragraph(document, id),
            NodeKind::Line => self.render_children(document, id),
            NodeKind::Ruler => self.buffer.push_str("<hr/>\n"),
            NodeKind::Quote => {
                self.buffer.push_str("<blockquote>");
                self.buffer.push(EOL);
                self.render_children(document, id);
                self.buffer.push_str("</blockquote>");
                self.buffer.push(EOL);
            }
            NodeKind::List { ordered, .. } => {
                let tag = if *ordered { "ol" } else { "ul" };
                self.buffer.push('<');
                self.buffer.push_str(tag);
                self.buffer.push('>');
                self.buffer.push(EOL);
                self.render_children(document, id);
                self.buffer.push_str("</");
                self.buffer.push_str(tag);
                self.buffer.push('>');
                self.buffer.push(EOL);
            }
            NodeKind::Item { .. } => {
                self.buffer.push_str("<li>");
                self.render_children(document, id);
                self.buffer.push_str("</li>");
                self.buffer.push(EOL);
            }
            NodeKind::Code => {
                self.buffer.push_str("<pre><code>");
                self.render_children_separated(document, id);
                self.buffer.push_str("</code></pre>");
                self.buffer.push(EOL);
            }
            NodeKind::CodeText { value } => self.escape_into(value),
            NodeKind::Text { value } => self.escape_into(value),
            NodeKind::CharRef { value } => self.buffer.push_str(value),
            NodeKind::CodeSpan { text } => {
                self.buffer.push_str("<code>");
                self.escape_into(text);
                self.buffer.push_str("</code>");
            }
            NodeKind::Emphasis { kind, text } => {
                let (open, close) = match kind {
                    EmphasisKind::Italic => ("<em>", "</em>"),
                    EmphasisKind::Bold => ("<strong>", "</strong>"),
                    EmphasisKind::ItalicAndBold => ("<strong><em>", "</em></strong>"),
                };
                self.buffer.push_str(open);
                self.buffer.push_str(text);
                self.buffer.push_str(close);
            }
            NodeKind::LineBreak => self.buffer.push_str("<br/>"),
            NodeKind::Link { .. } => self.render_link(document, id),
            NodeKind::Image {
                text,
                ref_id,
                resource,
            } => {
                let lookup = ref_id.as_deref().unwrap_or(text.as_str());
                let resolved = resource
                    .as_ref()
                    .or_else(|| document.resource_for(lookup));
                match resolved {
                    None => {
                        self.buffer.push_str("<img src=\"\" alt=\"");
                        self.escape_into(text);
                        self.buffer.push_str("\"/>");
                    }
                    Some(resource) => {
                        self.buffer.push_str("<img src=\"");
                        self.escape_into(&resource.location);
                        self.buffer.push_str("\" alt=\"");
                        self.escape_into(text);
                        if let Some(name) = &resource.name {
                            self.buffer.push_str("\" title=\"");
                            self.escape_into(name);
                        }
                        self.buffer.push_str("\"/>");
                    }
                }
            }
            NodeKind::InlineUrl { url } => {
                self.buffer.push_str("<a href=\"");
                self.escape_into(url);
                self.buffer.push_str("\">");
                self.escape_into(url);
                self.buffer.push_str("</a>");
            }
            NodeKind::OpeningTag {
                name, attributes, ..
            } => {
                self.buffer.push('<');
                self.buffer.push_str(name);
                self.render_attributes(attributes);
                self.buffer.push('>');
            }
            NodeKind::ClosingTag { name } => {
                self.buffer.push_str("</");
                self.buffer.push_str(name);
                self.buffer.push('>');
            }
            NodeKind::EmptyTag { name, attributes } => {
                self.buffer.push('<');
                self.buffer.push_str(name);
                self.render_attributes(attributes);
                self.buffer.push_str("/>");
            }
            NodeKind::Comment { text } => {
                self.buffer.push_str("<!--");
                self.buffer.push_str(text);
                self.buffer.push_str("-->");
            }
            // Definitions never appear in the output.
            NodeKind::ResourceDefinition { .. } => {}
        }
    }

    fn render_children(&mut self, document: &Document, id: NodeId) {
        for &child in document.children(id) {
            self.render(document, child);
        }
    }

    fn render_children_separated(&mut self, document: &Document, id: NodeId) {
        let children = document.children(id);
        for (index, &child) in children.iter().enumerate() {
            self.render(document, child);
            if index + 1 < children.len() {
                self.buffer.push(EOL);
            }
        }
    }

    /// Paragraphs make three block-context decisions: a lone `<hr>` tag
    /// renders as a ruler, a balanced opening tag suppresses the `<p>`
    /// wrapper entirely, and a tight list item keeps its content bare.
    fn render_paragraph(&mut self, document: &Document, id: NodeId) {
        if contains_hr(document, id) {
            self.buffer.push_str("<hr/>\n");
            return;
        }
        if is_markup(document, id) {
            self.render_children_separated(document, id);
            return;
        }
        if let Some(parent) = document.node(id).parent {
            if let NodeKind::Item { loose: false, .. } = document.node(parent).kind {
                self.render_children_separated(document, id);
                return;
            }
        }
        self.buffer.push_str("<p>");
        self.render_children_separated(document, id);
        self.buffer.push_str("</p>");
        self.buffer.push(EOL);
    }

    fn render_link(&mut self, document: &Document, id: NodeId) {
        let (referenced, reference_name, resource, whitespace_at_middle) =
            match &document.node(id).kind {
                NodeKind::Link {
                    referenced,
                    reference_name,
                    resource,
                    whitespace_at_middle,
                } => (
                    *referenced,
                    reference_name.clone(),
                    resource.clone(),
                    *whitespace_at_middle,
                ),
                _ => return,
            };

        let resolved = if referenced {
            match reference_name.as_deref() {
                None | Some("") => {
                    let text = document.flat_text(id);
                    document.resource_for(&text).cloned()
                }
                Some(name) => document.resource_for(name).cloned(),
            }
        } else {
            resource
        };

        match resolved {
            None => {
                if referenced {
                    // Unmatched reference: keep the original bracket syntax.
                    self.buffer.push('[');
                    self.render_children(document, id);
                    self.buffer.push(']');
                    if let Some(name) = &reference_name {
                        if whitespace_at_middle {
                            self.buffer.push(' ');
                        }
                        self.buffer.push('[');
                        self.buffer.push_str(name);
                        self.buffer.push(']');
                    }
                } else {
                    self.buffer.push_str("<a href=\"\">");
                    self.render_children(document, id);
                    self.buffer.push_str("</a>");
                }
            }
            Some(resource) => {
                self.buffer.push_str("<a");
                self.buffer.push_str(" href=\"");
                self.escape_into(&resource.location);
                if let Some(name) = &resource.name {
                    self.buffer.push_str("\" title=\"");
                    self.escape_into(name);
                }
                self.buffer.push_str("\">");
                self.render_children(document, id);
                self.buffer.push_str("</a>");
            }
        }
    }

    fn render_attributes(&mut self, attributes: &[TagAttribute]) {
        for attribute in attributes {
            self.buffer.push(' ');
            self.buffer.push_str(&attribute.name);
            if let Some(value) = &attribute.value {
                self.buffer.push_str("=\"");
                self.buffer.push_str(value);
                self.buffer.push('"');
            }
        }
    }

    fn escape_into(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '&' => self.buffer.push_str("&amp;"),
                '<' => self.buffer.push_str("&lt;"),
                '>' => self.buffer.push_str("&gt;"),
                '"' => self.buffer.push_str("&quot;"),
                _ => self.buffer.push(c),
            }
        }
    }
}

/// The first grandchild of the paragraph is an `hr` tag and nothing else
/// of significance shares the paragraph: single line, and any siblings
/// after the tag are whitespace-only text.
fn contains_hr(document: &Document, paragraph: NodeId) -> bool {
    let lines = document.children(paragraph);
    let first_line = match lines.first() {
        Some(&line) => line,
        None => return false,
    };
    let grandchildren = document.children(first_line);
    let grandson = match grandchildren.first() {
        Some(&node) => node,
        None => return false,
    };
    let named_hr = match &document.node(grandson).kind {
        NodeKind::OpeningTag { name, .. } | NodeKind::EmptyTag { name, .. } => {
            name.eq_ignore_ascii_case("hr")
        }
        _ => false,
    };
    if !named_hr {
        return false;
    }
    if lines.len() > 1 {
        return false;
    }
    grandchildren[1..]
        .iter()
        .all(|&sibling| is_whitespace_text(&document.node(sibling).kind))
}

/// The paragraph opens with a balanced tag: its content is a markup block
/// and passes through without a `<p>` wrapper.
fn is_markup(document: &Document, paragraph: NodeId) -> bool {
    let first_line = match document.children(paragraph).first() {
        Some(&line) => line,
        None => return false,
    };
    let grandson = match document.children(first_line).first() {
        Some(&node) => node,
        None => return false,
    };
    matches!(
        document.node(grandson).kind,
        NodeKind::OpeningTag { balanced: true, .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn html(input: &str) -> String {
        HtmlGenerator::new().generate(&parse(input).expect("parse"))
    }

    #[test]
    fn header_emission() {
        assert_eq!(html("# Hello"), "<h1>Hello</h1>\n");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(html("a < b & c"), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn char_refs_pass_through() {
        assert_eq!(html("&amp; &#169; &#x1F;"), "<p>&amp; &#169; &#x1F;</p>\n");
    }

    #[test]
    fn code_span_escapes_content() {
        assert_eq!(html("`a<b`"), "<p><code>a&lt;b</code></p>\n");
    }

    #[test]
    fn emphasis_forms() {
        assert_eq!(html("*i*"), "<p><em>i</em></p>\n");
        assert_eq!(html("__b__"), "<p><strong>b</strong></p>\n");
        assert_eq!(
            html("***bi***"),
            "<p><strong><em>bi</em></strong></p>\n"
        );
    }

    #[test]
    fn unclosed_emphasis_is_literal() {
        assert_eq!(html("a * b"), "<p>a * b</p>\n");
        assert_eq!(html("**a"), "<p>**a</p>\n");
    }

    #[test]
    fn inline_link() {
        assert_eq!(
            html("[x](http://e \"t\")"),
            "<p><a href=\"http://e\" title=\"t\">x</a></p>\n"
        );
    }

    #[test]
    fn inline_link_without_title() {
        assert_eq!(html("[x](/u)"), "<p><a href=\"/u\">x</a></p>\n");
    }

    #[test]
    fn referenced_link_resolves() {
        assert_eq!(
            html("[foo][1]\n\n[1]: http://x \"t\""),
            "<p><a href=\"http://x\" title=\"t\">foo</a></p>\n\n"
        );
    }

    #[test]
    fn implicit_reference_uses_link_text() {
        assert_eq!(
            html("[foo][]\n\n[foo]: /bar"),
            "<p><a href=\"/bar\">foo</a></p>\n\n"
        );
        assert_eq!(
            html("[foo]\n\n[foo]: /bar"),
            "<p><a href=\"/bar\">foo</a></p>\n\n"
        );
    }

    #[test]
    fn unmatched_reference_keeps_brackets() {
        assert_eq!(html("[foo][nope]"), "<p>[foo][nope]</p>\n");
        assert_eq!(html("[foo] [nope]"), "<p>[foo] [nope]</p>\n");
    }

    #[test]
    fn reference_ids_match_case_sensitively() {
        assert_eq!(html("[a][ID]\n\n[id]: /u"), "<p>[a][ID]</p>\n\n");
    }

    #[test]
    fn inline_image() {
        assert_eq!(
            html("![alt](/img \"t\")"),
            "<p><img src=\"/img\" alt=\"alt\" title=\"t\"/></p>\n"
        );
    }

    #[test]
    fn unresolved_image_keeps_alt() {
        assert_eq!(html("![alt][x]"), "<p><img src=\"\" alt=\"alt\"/></p>\n");
    }

    #[test]
    fn inline_url_autolink() {
        assert_eq!(
            html("<http://a?q=1&r=2>"),
            "<p><a href=\"http://a?q=1&amp;r=2\">http://a?q=1&amp;r=2</a></p>\n"
        );
    }

    #[test]
    fn quote_emission() {
        assert_eq!(
            html("> a\n> b"),
            "<blockquote>\n<p>a\nb</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn tight_list_emission() {
        assert_eq!(html("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn loose_list_emission() {
        assert_eq!(
            html("- a\n\n- b"),
            "<ul>\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn ordered_list_emission() {
        assert_eq!(html("1. a\n2. b"), "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n");
    }

    #[test]
    fn code_block_emission() {
        assert_eq!(
            html("    code\n    more"),
            "<pre><code>code\nmore</code></pre>\n"
        );
    }

    #[test]
    fn code_text_is_escaped() {
        assert_eq!(html("    <b>"), "<pre><code>&lt;b&gt;</code></pre>\n");
    }

    #[test]
    fn ruler_emission() {
        assert_eq!(html("---"), "<hr/>\n");
    }

    #[test]
    fn hr_tag_paragraph_renders_as_ruler() {
        assert_eq!(html("<hr/>"), "<hr/>\n");
        assert_eq!(html("<hr>"), "<hr/>\n");
        assert_eq!(html("<HR/> "), "<hr/>\n");
    }

    #[test]
    fn hr_tag_with_trailing_content_stays_in_paragraph() {
        let output = html("<hr/> x");
        assert!(output.starts_with("<p>"), "got {output:?}");
    }

    #[test]
    fn balanced_markup_block_skips_paragraph_wrapper() {
        assert_eq!(
            html("<div class=\"x\">\nhi\n</div>"),
            "<div class=\"x\">\nhi\n</div>"
        );
    }

    #[test]
    fn unbalanced_tag_keeps_paragraph() {
        assert_eq!(html("<span>hi"), "<p><span>hi</p>\n");
    }

    #[test]
    fn line_break_emission() {
        assert_eq!(html("a  \nb"), "<p>a<br/>\nb</p>\n");
    }

    #[test]
    fn comment_emission() {
        assert_eq!(html("<!-- c -->"), "<!-- c -->");
    }

    #[test]
    fn setext_header_emission() {
        assert_eq!(html("Hello\n====="), "<h1>Hello</h1>\n");
    }

    #[test]
    fn escaped_characters_render_literally() {
        assert_eq!(html("\\*not em\\*"), "<p>*not em*</p>\n");
    }
}
