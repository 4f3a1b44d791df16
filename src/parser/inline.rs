//! Inline productions: the contents of a line.
//!
//! Dispatch priority on a line is char refs, code spans, links, images,
//! inline URLs, emphasis, line breaks, HTML tags, then literal text. Every
//! construct that fails to close falls back to literal text without
//! rewinding more than its introducing token.

use crate::ast::{EmphasisKind, NodeId, NodeKind, Resource, TagAttribute};
use crate::error::Result;
use crate::lexer::TokenKind;

use super::Parser;

impl<'input> Parser<'input> {
    /// Parses inline content into `parent` until end of line (or, inside a
    /// header, until only a trailing `#` run remains).
    pub(crate) fn parse_line_inlines(&mut self, parent: NodeId) -> Result<()> {
        while self.text_lookahead() {
            match self.window.kind(0) {
                TokenKind::CharEntityRef | TokenKind::NumericCharRef => {
                    let token = self.window.bump();
                    self.arena.push(
                        NodeKind::CharRef {
                            value: token.image.to_string(),
                        },
                        Some(parent),
                    );
                }
                TokenKind::Backtick => self.parse_code_span_or_text(parent),
                TokenKind::Lbracket => self.parse_link_or_text(parent)?,
                TokenKind::Bang if self.window.kind(1) == TokenKind::Lbracket => {
                    self.parse_image_or_text(parent)?
                }
                TokenKind::Lt => self.parse_angle_construct(parent)?,
                TokenKind::CommentOpen => self.parse_inline_comment(parent),
                TokenKind::Star | TokenKind::Underscore => self.parse_emphasis_or_text(parent),
                TokenKind::EscapedChar => {
                    let token = self.window.bump();
                    self.push_text(parent, &token.image[1..]);
                }
                TokenKind::Space | TokenKind::Tab => self.parse_whitespace_or_break(parent),
                _ => {
                    let token = self.window.bump();
                    self.push_text(parent, token.image);
                }
            }
        }
        Ok(())
    }

    /// Appends literal text, coalescing with a preceding text sibling.
    pub(crate) fn push_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.arena.children(parent).last() {
            if let NodeKind::Text { value } = &mut self.arena.node_mut(last).kind {
                value.push_str(text);
                return;
            }
        }
        self.arena.push(
            NodeKind::Text {
                value: text.to_string(),
            },
            Some(parent),
        );
    }

    /// Two or more trailing spaces before the line ending become a line
    /// break; any other whitespace is literal text.
    fn parse_whitespace_or_break(&mut self, parent: NodeId) {
        let mut run = 0;
        let mut all_spaces = true;
        while self.window.peek(run).is_blank() {
            if self.window.kind(run) != TokenKind::Space {
                all_spaces = false;
            }
            run += 1;
        }
        if all_spaces && run >= 2 && self.window.kind(run) == TokenKind::Eol {
            self.window.bump_many(run);
            self.arena.push(NodeKind::LineBreak, Some(parent));
            return;
        }
        let token = self.window.bump();
        self.push_text(parent, token.image);
    }

    /// Backtick-delimited code span. A single-backtick opener runs to the
    /// next single backtick; a double-backtick opener admits single
    /// backticks inside. No closer on the line means literal backticks.
    fn parse_code_span_or_text(&mut self, parent: NodeId) {
        let mut run = 0;
        while self.window.kind(run) == TokenKind::Backtick {
            run += 1;
        }
        let close = if run <= 2 { self.code_span_close(run) } else { None };
        let close = match close {
            Some(close) => close,
            None => {
                for _ in 0..run {
                    let token = self.window.bump();
                    self.push_text(parent, token.image);
                }
                return;
            }
        };
        self.window.bump_many(run);
        let mut text = String::new();
        for _ in run..close {
            let token = self.window.bump();
            text.push_str(token.image);
        }
        self.window.bump_many(run);
        // One layer of space padding comes off; deeper padding survives.
        if text.len() >= 2 && text.starts_with(' ') && text.ends_with(' ') {
            text.pop();
            text.remove(0);
        }
        self.arena.push(NodeKind::CodeSpan { text }, Some(parent));
    }

    /// Window index of the closing backtick run, if any, before end of line.
    fn code_span_close(&mut self, run: usize) -> Option<usize> {
        let mut at = run;
        loop {
            match self.window.kind(at) {
                TokenKind::Eol | TokenKind::Eof => return None,
                TokenKind::Backtick => {
                    let mut len = 0;
                    while self.window.kind(at + len) == TokenKind::Backtick {
                        len += 1;
                    }
                    if len == run {
                        return Some(at);
                    }
                    at += len;
                }
                _ => at += 1,
            }
        }
    }

    /// Emphasis delimited by matching runs of `*` or `_` (one, two, or
    /// three). The other delimiter character inside is literal text.
    fn parse_emphasis_or_text(&mut self, parent: NodeId) {
        let delimiter = self.window.kind(0);
        let mut run = 0;
        while self.window.kind(run) == delimiter {
            run += 1;
        }
        let openable = run <= 3
            && !matches!(
                self.window.kind(run),
                TokenKind::Space | TokenKind::Tab | TokenKind::Eol | TokenKind::Eof
            );
        let close = if openable {
            self.emphasis_close(delimiter, run)
        } else {
            None
        };
        let close = match close {
            Some(close) => close,
            None => {
                for _ in 0..run {
                    let token = self.window.bump();
                    self.push_text(parent, token.image);
                }
                return;
            }
        };
        self.window.bump_many(run);
        let mut text = String::new();
        for _ in run..close {
            let token = self.window.bump();
            text.push_str(token.image);
        }
        self.window.bump_many(run);
        let kind = match run {
            1 => EmphasisKind::Italic,
            2 => EmphasisKind::Bold,
            _ => EmphasisKind::ItalicAndBold,
        };
        self.arena.push(NodeKind::Emphasis { kind, text }, Some(parent));
    }

    /// Window index of a closing delimiter run matching character and
    /// count, before end of line.
    fn emphasis_close(&mut self, delimiter: TokenKind, run: usize) -> Option<usize> {
        let mut at = run;
        loop {
            let kind = self.window.kind(at);
            if matches!(kind, TokenKind::Eol | TokenKind::Eof) {
                return None;
            }
            if kind == delimiter {
                let mut len = 0;
                while self.window.kind(at + len) == delimiter {
                    len += 1;
                }
                if len == run {
                    return Some(at);
                }
                at += len;
            } else {
                at += 1;
            }
        }
    }

    /// `[text](url "title")`, `[text][id]`, `[text][]`, or bare `[text]`.
    /// Without a matching `]` on the line, the bracket is literal.
    fn parse_link_or_text(&mut self, parent: NodeId) -> Result<()> {
        if self.bracket_close(1).is_none() {
            self.window.bump();
            self.push_text(parent, "[");
            return Ok(());
        }
        self.window.bump(); // [
        self.state.bracket_depth = 0;
        let link = self.arena.push(
            NodeKind::Link {
                referenced: true,
                reference_name: None,
                resource: None,
                whitespace_at_middle: false,
            },
            Some(parent),
        );
        self.parse_link_text(link)?;
        self.window.bump(); // ]

        if self.window.kind(0) == TokenKind::Lparen && self.paren_close(1).is_some() {
            self.window.bump(); // (
            self.skip_inline_blanks();
            let location = self.parse_inline_url_target();
            self.skip_inline_blanks();
            let title = self.parse_title(true);
            self.skip_inline_blanks();
            if self.window.kind(0) == TokenKind::Rparen {
                self.window.bump();
            }
            self.arena.node_mut(link).kind = NodeKind::Link {
                referenced: false,
                reference_name: None,
                resource: Some(Resource {
                    location,
                    name: title,
                }),
                whitespace_at_middle: false,
            };
            return Ok(());
        }

        let spaced = self.window.kind(0) == TokenKind::Space
            && self.window.kind(1) == TokenKind::Lbracket;
        let offset = if spaced { 1 } else { 0 };
        if self.window.kind(offset) == TokenKind::Lbracket && self.bracket_close(offset + 1).is_some()
        {
            self.window.bump_many(offset + 1);
            let mut id = String::new();
            while self.window.kind(0) != TokenKind::Rbracket {
                let token = self.window.bump();
                id.push_str(token.image);
            }
            self.window.bump(); // ]
            self.arena.node_mut(link).kind = NodeKind::Link {
                referenced: true,
                reference_name: Some(id),
                resource: None,
                whitespace_at_middle: spaced,
            };
        }
        Ok(())
    }

    /// Inline content of a link's text, up to the matching `]`. Nested
    /// brackets stay literal but are balanced.
    fn parse_link_text(&mut self, link: NodeId) -> Result<()> {
        loop {
            match self.window.kind(0) {
                TokenKind::Rbracket if self.state.bracket_depth == 0 => return Ok(()),
                TokenKind::Rbracket => {
                    self.state.bracket_depth -= 1;
                    self.window.bump();
                    self.push_text(link, "]");
                }
                TokenKind::Lbracket => {
                    self.state.bracket_depth += 1;
                    self.window.bump();
                    self.push_text(link, "[");
                }
                TokenKind::Eol | TokenKind::Eof => return Ok(()),
                TokenKind::CharEntityRef | TokenKind::NumericCharRef => {
                    let token = self.window.bump();
                    self.arena.push(
                        NodeKind::CharRef {
                            value: token.image.to_string(),
                        },
                        Some(link),
                    );
                }
                TokenKind::Backtick => self.parse_code_span_or_text(link),
                TokenKind::Bang if self.window.kind(1) == TokenKind::Lbracket => {
                    self.parse_image_or_text(link)?
                }
                TokenKind::Lt => self.parse_angle_construct(link)?,
                TokenKind::CommentOpen => self.parse_inline_comment(link),
                TokenKind::Star | TokenKind::Underscore => self.parse_emphasis_or_text(link),
                TokenKind::EscapedChar => {
                    let token = self.window.bump();
                    self.push_text(link, &token.image[1..]);
                }
                _ => {
                    let token = self.window.bump();
                    self.push_text(link, token.image);
                }
            }
        }
    }

    /// `![alt](url "title")`, `![alt][id]`, or bare `![alt]`. A `!` that
    /// opens no image stays literal.
    fn parse_image_or_text(&mut self, parent: NodeId) -> Result<()> {
        if self.bracket_close(2).is_none() {
            self.window.bump();
            self.push_text(parent, "!");
            return Ok(());
        }
        self.window.bump_many(2); // ![
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
            match self.window.kind(0) {
                TokenKind::Rbracket if depth == 0 => break,
                TokenKind::Rbracket => {
                    depth -= 1;
                    self.window.bump();
                    text.push(']');
                }
                TokenKind::Lbracket => {
                    depth += 1;
                    self.window.bump();
                    text.push('[');
                }
                TokenKind::Eol | TokenKind::Eof => break,
                _ => {
                    let token = self.window.bump();
                    text.push_str(token.image);
                }
            }
        }
        self.window.bump(); // ]

        if self.window.kind(0) == TokenKind::Lparen && self.paren_close(1).is_some() {
            self.window.bump();
            self.skip_inline_blanks();
            let location = self.parse_inline_url_target();
            self.skip_inline_blanks();
            let title = self.parse_title(true);
            self.skip_inline_blanks();
            if self.window.kind(0) == TokenKind::Rparen {
                self.window.bump();
            }
            self.arena.push(
                NodeKind::Image {
                    text,
                    ref_id: None,
                    resource: Some(Resource {
                        location,
                        name: title,
                    }),
                },
                Some(parent),
            );
            return Ok(());
        }

        let spaced = self.window.kind(0) == TokenKind::Space
            && self.window.kind(1) == TokenKind::Lbracket;
        let offset = if spaced { 1 } else { 0 };
        let mut ref_id = None;
        if self.window.kind(offset) == TokenKind::Lbracket && self.bracket_close(offset + 1).is_some()
        {
            self.window.bump_many(offset + 1);
            let mut id = String::new();
            while self.window.kind(0) != TokenKind::Rbracket {
                let token = self.window.bump();
                id.push_str(token.image);
            }
            self.window.bump();
            ref_id = Some(id);
        }
        self.arena.push(
            NodeKind::Image {
                text,
                ref_id,
                resource: None,
            },
            Some(parent),
        );
        Ok(())
    }

    /// Window index of the `]` matching an opening bracket, scanning from
    /// `from`, balanced for nested brackets, confined to the line.
    fn bracket_close(&mut self, from: usize) -> Option<usize> {
        let mut at = from;
        let mut depth = 0usize;
        loop {
            match self.window.kind(at) {
                TokenKind::Lbracket => depth += 1,
                TokenKind::Rbracket => {
                    if depth == 0 {
                        return Some(at);
                    }
                    depth -= 1;
                }
                TokenKind::Eol | TokenKind::Eof => return None,
                _ => {}
            }
            at += 1;
        }
    }

    /// Window index of the `)` closing an inline resource, balanced for
    /// parentheses inside the URL.
    fn paren_close(&mut self, from: usize) -> Option<usize> {
        let mut at = from;
        let mut depth = 0usize;
        loop {
            match self.window.kind(at) {
                TokenKind::Lparen => depth += 1,
                TokenKind::Rparen => {
                    if depth == 0 {
                        return Some(at);
                    }
                    depth -= 1;
                }
                TokenKind::Eol | TokenKind::Eof => return None,
                _ => {}
            }
            at += 1;
        }
    }

    fn skip_inline_blanks(&mut self) {
        while self.window.peek(0).is_blank() {
            self.window.bump();
        }
    }

    /// A URL inside an inline resource: either `<...>`-wrapped, or a run
    /// up to whitespace or the closing paren, with nested parens allowed.
    fn parse_inline_url_target(&mut self) -> String {
        self.state.paren_depth = 0;
        let mut location = String::new();
        if self.window.kind(0) == TokenKind::Lt {
            self.window.bump();
            loop {
                match self.window.kind(0) {
                    TokenKind::Gt => {
                        self.window.bump();
                        break;
                    }
                    TokenKind::Eol | TokenKind::Eof => break,
                    _ => {
                        let token = self.window.bump();
                        location.push_str(token.image);
                    }
                }
            }
            return location;
        }
        loop {
            match self.window.kind(0) {
                TokenKind::Space
                | TokenKind::Tab
                | TokenKind::Eol
                | TokenKind::Eof => break,
                TokenKind::Lparen => {
                    self.state.paren_depth += 1;
                    let token = self.window.bump();
                    location.push_str(token.image);
                }
                TokenKind::Rparen => {
                    if self.state.paren_depth == 0 {
                        break;
                    }
                    self.state.paren_depth -= 1;
                    let token = self.window.bump();
                    location.push_str(token.image);
                }
                _ => {
                    let token = self.window.bump();
                    location.push_str(token.image);
                }
            }
        }
        location
    }

    /// A single- or double-quoted title. A quote character inside stays
    /// literal while another closing quote follows before the boundary.
    pub(crate) fn parse_title(&mut self, stop_at_paren: bool) -> Option<String> {
        let quote = match self.window.kind(0) {
            k @ (TokenKind::DoubleQuote | TokenKind::SingleQuote) => k,
            _ => return None,
        };
        self.window.bump();
        let mut title = String::new();
        loop {
            let kind = self.window.kind(0);
            if kind == quote {
                if self.quote_inside_title_lookahead(quote, stop_at_paren) {
                    let token = self.window.bump();
                    title.push_str(token.image);
                } else {
                    self.window.bump();
                    break;
                }
            } else if matches!(kind, TokenKind::Eol | TokenKind::Eof) {
                break;
            } else if kind == TokenKind::Rparen && stop_at_paren {
                break;
            } else {
                let token = self.window.bump();
                title.push_str(token.image);
            }
        }
        Some(title)
    }

    /// Dispatch for `<`: an inline URL autolink, a closing tag, an opening
    /// or empty tag, or just a literal angle bracket.
    fn parse_angle_construct(&mut self, parent: NodeId) -> Result<()> {
        if let Some(gt) = self.inline_url_close() {
            self.window.bump(); // <
            let mut url = String::new();
            for _ in 1..gt {
                let token = self.window.bump();
                url.push_str(token.image);
            }
            self.window.bump(); // >
            self.arena.push(NodeKind::InlineUrl { url }, Some(parent));
            return Ok(());
        }
        if self.window.kind(1) == TokenKind::Slash {
            if let Some(end) = self.closing_tag_end() {
                self.window.bump_many(2); // </
                let mut name = String::new();
                for _ in 2..end {
                    let token = self.window.bump();
                    name.push_str(token.image);
                }
                self.window.bump(); // >
                self.arena.push(NodeKind::ClosingTag { name }, Some(parent));
                return Ok(());
            }
        }
        if self.window.kind(1) == TokenKind::CharSequence && self.opening_tag_plausible() {
            self.window.bump(); // <
            let mut name = String::new();
            while matches!(
                self.window.kind(0),
                TokenKind::CharSequence | TokenKind::Digits | TokenKind::Minus | TokenKind::Underscore
            ) {
                let token = self.window.bump();
                name.push_str(token.image);
            }
            let (attributes, empty) = self.parse_tag_attributes();
            if empty {
                self.arena
                    .push(NodeKind::EmptyTag { name, attributes }, Some(parent));
            } else {
                let balanced = self.scan_balanced(&name);
                self.arena.push(
                    NodeKind::OpeningTag {
                        name,
                        attributes,
                        balanced,
                    },
                    Some(parent),
                );
            }
            return Ok(());
        }
        self.window.bump();
        self.push_text(parent, "<");
        Ok(())
    }

    /// Window index of the `>` closing a `<scheme://...>` autolink.
    fn inline_url_close(&mut self) -> Option<usize> {
        if self.window.kind(1) != TokenKind::CharSequence
            || self.window.kind(2) != TokenKind::Colon
            || self.window.kind(3) != TokenKind::Slash
            || self.window.kind(4) != TokenKind::Slash
        {
            return None;
        }
        let mut at = 5;
        loop {
            match self.window.kind(at) {
                TokenKind::Gt => return Some(at),
                TokenKind::Space
                | TokenKind::Tab
                | TokenKind::Eol
                | TokenKind::Eof => return None,
                _ => at += 1,
            }
        }
    }

    /// Window index of the `>` of a `</name>` closing tag.
    fn closing_tag_end(&mut self) -> Option<usize> {
        let mut at = 2;
        let mut any = false;
        while matches!(
            self.window.kind(at),
            TokenKind::CharSequence | TokenKind::Digits | TokenKind::Minus | TokenKind::Underscore
        ) {
            any = true;
            at += 1;
        }
        if any && self.window.kind(at) == TokenKind::Gt {
            Some(at)
        } else {
            None
        }
    }

    /// A well-formed opening or empty tag sits at the cursor: name tokens,
    /// then an attribute area of names, `=`, quoted or bare values, closed
    /// by `>` or `/>` before end of line.
    fn opening_tag_plausible(&mut self) -> bool {
        let mut at = 2;
        while matches!(
            self.window.kind(at),
            TokenKind::CharSequence | TokenKind::Digits | TokenKind::Minus | TokenKind::Underscore
        ) {
            at += 1;
        }
        loop {
            match self.window.kind(at) {
                TokenKind::Gt => return true,
                TokenKind::Slash if self.window.kind(at + 1) == TokenKind::Gt => return true,
                TokenKind::DoubleQuote | TokenKind::SingleQuote => {
                    let quote = self.window.kind(at);
                    at += 1;
                    loop {
                        let kind = self.window.kind(at);
                        if kind == quote {
                            at += 1;
                            break;
                        }
                        if matches!(kind, TokenKind::Eol | TokenKind::Eof) {
                            return false;
                        }
                        at += 1;
                    }
                }
                TokenKind::Space
                | TokenKind::Tab
                | TokenKind::CharSequence
                | TokenKind::Digits
                | TokenKind::Minus
                | TokenKind::Underscore
                | TokenKind::Colon
                | TokenKind::Dot
                | TokenKind::Slash
                | TokenKind::Eq => at += 1,
                _ => return false,
            }
        }
    }

    /// Consumes the attribute area through the closing `>`. Returns the
    /// attributes and whether the tag was self-closing.
    fn parse_tag_attributes(&mut self) -> (Vec<TagAttribute>, bool) {
        let mut attributes = Vec::new();
        loop {
            while self.window.peek(0).is_blank() {
                self.window.bump();
            }
            match self.window.kind(0) {
                TokenKind::Gt => {
                    self.window.bump();
                    return (attributes, false);
                }
                TokenKind::Slash if self.window.kind(1) == TokenKind::Gt => {
                    self.window.bump_many(2);
                    return (attributes, true);
                }
                TokenKind::Eol | TokenKind::Eof => return (attributes, false),
                _ => {
                    let mut name = String::new();
                    while matches!(
                        self.window.kind(0),
                        TokenKind::CharSequence
                            | TokenKind::Digits
                            | TokenKind::Minus
                            | TokenKind::Underscore
                            | TokenKind::Colon
                    ) {
                        let token = self.window.bump();
                        name.push_str(token.image);
                    }
                    if name.is_empty() {
                        self.window.bump();
                        continue;
                    }
                    let mut value = None;
                    if self.window.kind(0) == TokenKind::Eq {
                        self.window.bump();
                        value = Some(self.parse_attribute_value());
                    }
                    attributes.push(TagAttribute { name, value });
                }
            }
        }
    }

    fn parse_attribute_value(&mut self) -> String {
        let mut value = String::new();
        match self.window.kind(0) {
            quote @ (TokenKind::DoubleQuote | TokenKind::SingleQuote) => {
                self.window.bump();
                loop {
                    let kind = self.window.kind(0);
                    if kind == quote {
                        self.window.bump();
                        break;
                    }
                    if matches!(kind, TokenKind::Eol | TokenKind::Eof) {
                        break;
                    }
                    let token = self.window.bump();
                    value.push_str(token.image);
                }
            }
            _ => loop {
                match self.window.kind(0) {
                    TokenKind::Space
                    | TokenKind::Tab
                    | TokenKind::Gt
                    | TokenKind::Eol
                    | TokenKind::Eof => break,
                    TokenKind::Slash if self.window.kind(1) == TokenKind::Gt => break,
                    _ => {
                        let token = self.window.bump();
                        value.push_str(token.image);
                    }
                }
            },
        }
        value
    }

    /// After an opening tag, a matching `</name>` appears before the
    /// paragraph's extent runs out (blank line or end of input).
    fn scan_balanced(&mut self, name: &str) -> bool {
        let mut at = 0;
        loop {
            match self.window.kind(at) {
                TokenKind::Eof => return false,
                TokenKind::Eol => {
                    let mut next = at + 1;
                    while self.window.peek(next).is_blank() {
                        next += 1;
                    }
                    if matches!(self.window.kind(next), TokenKind::Eol | TokenKind::Eof) {
                        return false;
                    }
                    at += 1;
                }
                TokenKind::Lt if self.window.kind(at + 1) == TokenKind::Slash => {
                    let mut index = at + 2;
                    let mut tag_name = String::new();
                    while matches!(
                        self.window.kind(index),
                        TokenKind::CharSequence
                            | TokenKind::Digits
                            | TokenKind::Minus
                            | TokenKind::Underscore
                    ) {
                        tag_name.push_str(self.window.image(index));
                        index += 1;
                    }
                    if self.window.kind(index) == TokenKind::Gt
                        && tag_name.eq_ignore_ascii_case(name)
                    {
                        return true;
                    }
                    at += 1;
                }
                _ => at += 1,
            }
        }
    }

    /// A comment in running text is kept verbatim.
    fn parse_inline_comment(&mut self, parent: NodeId) {
        self.window.bump(); // <!--
        let mut text = String::new();
        loop {
            match self.window.kind(0) {
                TokenKind::CommentClose => {
                    self.window.bump();
                    break;
                }
                TokenKind::Eof => break,
                _ => {
                    let token = self.window.bump();
                    text.push_str(token.image);
                }
            }
        }
        self.arena.push(NodeKind::Comment { text }, Some(parent));
    }
}
