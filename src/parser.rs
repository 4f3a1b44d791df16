//! Grammar driver.
//!
//! A recursive-descent parser over the token window. Block productions
//! choose alternatives through the lookahead predicates; the state stacks
//! carry the currently-open quote, list, and item contexts that make the
//! grammar context-sensitive.

use crate::ast::{Arena, Document, NodeId, NodeKind, ReferenceTable, Resource};
use crate::error::{MarkdownError, Result};
use crate::lexer::{Lexer, TokenKind};

mod inline;
mod lookahead;
mod state;
mod window;

use lookahead::SubBlock;
use state::{OpenItem, OpenList, ParserState};
use window::TokenWindow;

/// Configuration for parser behavior.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting depth of quotes and lists before parsing stops
    /// with an error.
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 64,
        }
    }
}

/// Recursive-descent parser producing a [`Document`].
pub struct Parser<'input> {
    pub(crate) window: TokenWindow<'input>,
    pub(crate) arena: Arena,
    pub(crate) references: ReferenceTable,
    pub(crate) state: ParserState,
    config: ParserConfig,
}

impl<'input> Parser<'input> {
    pub fn new(input: &'input str, config: ParserConfig) -> Self {
        Self {
            window: TokenWindow::new(Lexer::new(input)),
            arena: Arena::new(),
            references: ReferenceTable::new(),
            state: ParserState::default(),
            config,
        }
    }

    pub fn with_defaults(input: &'input str) -> Self {
        Self::new(input, ParserConfig::default())
    }

    /// Parses the whole input into a document.
    pub fn parse(mut self) -> Result<Document> {
        let root = self.arena.push(NodeKind::Document, None);
        self.skip_blank_lines();
        while !self.at_eof() {
            if self.resource_definition_lookahead() {
                self.parse_resource_definition(root)?;
            } else {
                self.parse_block_element(root)?;
            }
            self.skip_blank_lines();
        }
        Ok(Document::new(self.arena, root, self.references))
    }

    fn at_eof(&mut self) -> bool {
        self.window.kind(0) == TokenKind::Eof
    }

    fn enter_nesting(&mut self) -> Result<()> {
        self.state.nesting_depth += 1;
        if self.state.nesting_depth > self.config.max_nesting_depth {
            return Err(MarkdownError::parse(
                self.window.peek(0).position(),
                format!("nesting no deeper than {}", self.config.max_nesting_depth),
            ));
        }
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.state.nesting_depth = self.state.nesting_depth.saturating_sub(1);
    }

    /// Consumes end-of-line separators and whitespace-only lines at the
    /// document level.
    fn skip_blank_lines(&mut self) {
        loop {
            let mut at = 0;
            while self.window.peek(at).is_blank() {
                at += 1;
            }
            match self.window.kind(at) {
                TokenKind::Eol => self.window.bump_many(at + 1),
                TokenKind::Eof => {
                    self.window.bump_many(at);
                    return;
                }
                _ => return,
            }
        }
    }

    /// Consumes the quote markers that reintroduce the current depth at
    /// the start of a continuation line.
    fn consume_quote_prefix(&mut self) {
        for _ in 0..self.state.quote_level {
            let mut at = 0;
            while self.window.kind(at) == TokenKind::Space {
                at += 1;
            }
            if self.window.kind(at) == TokenKind::Gt {
                self.window.bump_many(at + 1);
                if self.window.kind(0) == TokenKind::Space {
                    self.window.bump();
                }
            } else {
                break;
            }
        }
    }

    fn consume_leading_blanks(&mut self) {
        while self.window.peek(0).is_blank() {
            self.window.bump();
        }
    }

    /// `[id]: url "title"` — registers the resource and emits no output.
    fn parse_resource_definition(&mut self, parent: NodeId) -> Result<()> {
        self.consume_leading_blanks();
        self.window.bump(); // [
        let mut id = String::new();
        while self.window.kind(0) != TokenKind::Rbracket {
            let token = self.window.bump();
            id.push_str(token.image);
        }
        self.window.bump(); // ]
        self.expect(TokenKind::Colon, "':'")?;
        self.consume_leading_blanks();

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
        } else {
            loop {
                match self.window.kind(0) {
                    TokenKind::Space
                    | TokenKind::Tab
                    | TokenKind::Eol
                    | TokenKind::Eof => break,
                    _ => {
                        let token = self.window.bump();
                        location.push_str(token.image);
                    }
                }
            }
        }
        self.consume_leading_blanks();

        let name = match self.window.kind(0) {
            TokenKind::DoubleQuote | TokenKind::SingleQuote => self.parse_title(false),
            TokenKind::Lparen => {
                self.window.bump();
                let mut title = String::new();
                loop {
                    match self.window.kind(0) {
                        TokenKind::Rparen => {
                            self.window.bump();
                            break;
                        }
                        TokenKind::Eol | TokenKind::Eof => break,
                        _ => {
                            let token = self.window.bump();
                            title.push_str(token.image);
                        }
                    }
                }
                Some(title)
            }
            _ => None,
        };
        self.consume_leading_blanks();
        if !matches!(self.window.kind(0), TokenKind::Eol | TokenKind::Eof) {
            return Err(MarkdownError::parse(
                self.window.peek(0).position(),
                "end of line after resource definition",
            ));
        }

        let definition = self.arena.push(
            NodeKind::ResourceDefinition {
                id: id.clone(),
                resource: Resource { location, name },
            },
            Some(parent),
        );
        self.references.insert(id, definition);
        Ok(())
    }

    /// Context-dependent block choice, tried in order: indented code,
    /// quote, ruler, ATX header, setext header, comment, list, paragraph.
    fn parse_block_element(&mut self, parent: NodeId) -> Result<()> {
        let base_column = self.window.peek(0).begin_column;
        let mut at = 0;
        while self.window.peek(at).is_blank() {
            at += 1;
        }
        let content = self.window.peek(at);
        let content_column = content.begin_column;
        let content_kind = content.kind;
        if content_column.saturating_sub(base_column) >= 4
            && !matches!(content_kind, TokenKind::Eol | TokenKind::Eof)
        {
            return self.parse_code(parent, base_column + 4);
        }

        if content_kind == TokenKind::Gt {
            self.consume_leading_blanks();
            return self.parse_quote(parent);
        }
        if self.ruler_lookahead_from(at) {
            self.consume_leading_blanks();
            return self.parse_ruler(parent);
        }
        if content_kind == TokenKind::Sharp {
            self.consume_leading_blanks();
            return self.parse_atx_header(parent);
        }
        if let Some(level) = self.setext_lookahead(at) {
            self.consume_leading_blanks();
            return self.parse_setext_header(parent, level);
        }
        if content_kind == TokenKind::CommentOpen {
            self.consume_leading_blanks();
            return self.parse_comment(parent);
        }
        if self.item_marker_at(at) {
            self.consume_leading_blanks();
            return self.parse_list(parent);
        }
        self.consume_leading_blanks();
        self.parse_paragraph(parent)
    }

    /// ATX form: 1-6 `#` markers, content, optional trailing `#` run.
    fn parse_atx_header(&mut self, parent: NodeId) -> Result<()> {
        let mut level = 0u8;
        while self.window.kind(0) == TokenKind::Sharp && level < 6 {
            self.window.bump();
            level += 1;
        }
        self.consume_leading_blanks();
        let header = self.arena.push(NodeKind::Header { level }, Some(parent));
        self.state.in_header = true;
        self.parse_line_inlines(header)?;
        self.state.in_header = false;
        // Trailing marker run, if any.
        while matches!(self.window.kind(0), TokenKind::Sharp | TokenKind::Space) {
            self.window.bump();
        }
        Ok(())
    }

    /// Setext form: a content line underlined with `=` (level 1) or `-`
    /// (level 2).
    fn parse_setext_header(&mut self, parent: NodeId, level: u8) -> Result<()> {
        let header = self.arena.push(NodeKind::Header { level }, Some(parent));
        self.state.in_header = true;
        self.parse_line_inlines(header)?;
        self.state.in_header = false;
        while matches!(self.window.kind(0), TokenKind::Sharp | TokenKind::Space) {
            self.window.bump();
        }
        self.expect(TokenKind::Eol, "end of line")?;
        self.consume_quote_prefix();
        while !matches!(self.window.kind(0), TokenKind::Eol | TokenKind::Eof) {
            self.window.bump();
        }
        Ok(())
    }

    fn parse_ruler(&mut self, parent: NodeId) -> Result<()> {
        while !matches!(self.window.kind(0), TokenKind::Eol | TokenKind::Eof) {
            self.window.bump();
        }
        self.arena.push(NodeKind::Ruler, Some(parent));
        Ok(())
    }

    /// `<!-- ... -->`, possibly spanning lines.
    fn parse_comment(&mut self, parent: NodeId) -> Result<()> {
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
        Ok(())
    }

    /// `>`-introduced quote; recurses into block elements one level deeper.
    fn parse_quote(&mut self, parent: NodeId) -> Result<()> {
        self.enter_nesting()?;
        self.expect(TokenKind::Gt, "'>'")?;
        if self.window.kind(0) == TokenKind::Space {
            self.window.bump();
        }
        self.state.quote_level += 1;
        let quote = self.arena.push(NodeKind::Quote, Some(parent));
        'blocks: loop {
            if self.at_eof() {
                break;
            }
            self.parse_block_element(quote)?;
            // Skip blank quoted lines; stop when the quote ends.
            loop {
                if !self.quoted_element_lookahead() {
                    break 'blocks;
                }
                self.window.bump(); // EOL
                self.consume_quote_prefix();
                let mut at = 0;
                while self.window.peek(at).is_blank() {
                    at += 1;
                }
                match self.window.kind(at) {
                    TokenKind::Eol => self.window.bump_many(at),
                    TokenKind::Eof => {
                        self.window.bump_many(at);
                        break 'blocks;
                    }
                    _ => break,
                }
            }
        }
        self.state.quote_level -= 1;
        self.exit_nesting();
        Ok(())
    }

    /// One or more lines of inline content.
    fn parse_paragraph(&mut self, parent: NodeId) -> Result<()> {
        let paragraph = self.arena.push(NodeKind::Paragraph, Some(parent));
        loop {
            let line = self.arena.push(NodeKind::Line, Some(paragraph));
            self.parse_line_inlines(line)?;
            if !self.line_lookahead() {
                break;
            }
            self.window.bump(); // EOL
            self.consume_quote_prefix();
            self.consume_leading_blanks();
        }
        Ok(())
    }

    /// Consecutive code lines with the margin stripped and tabs
    /// materialized as spaces. `margin_column` is the absolute column at
    /// which code content begins.
    fn parse_code(&mut self, parent: NodeId, margin_column: usize) -> Result<()> {
        let code = self.arena.push(NodeKind::Code, Some(parent));
        loop {
            self.parse_code_line(code, margin_column);
            if !self.code_line_lookahead(margin_column) {
                break;
            }
            self.window.bump(); // EOL
            self.consume_quote_prefix();
            // Interior blank lines are preserved as empty code text.
            loop {
                let mut at = 0;
                while self.window.peek(at).is_blank() {
                    at += 1;
                }
                if self.window.kind(at) == TokenKind::Eol {
                    self.window.bump_many(at + 1);
                    self.arena.push(
                        NodeKind::CodeText {
                            value: String::new(),
                        },
                        Some(code),
                    );
                    self.consume_quote_prefix();
                } else {
                    break;
                }
            }
        }
        Ok(())
    }

    fn parse_code_line(&mut self, code: NodeId, margin_column: usize) {
        while self.window.peek(0).is_blank() && self.window.peek(0).end_column < margin_column {
            self.window.bump();
        }
        let mut value = String::new();
        while !matches!(self.window.kind(0), TokenKind::Eol | TokenKind::Eof) {
            let token = self.window.bump();
            if token.kind == TokenKind::Tab {
                for _ in 0..token.width() {
                    value.push(' ');
                }
            } else {
                value.push_str(token.image);
            }
        }
        self.arena.push(NodeKind::CodeText { value }, Some(code));
    }

    /// A list; the first marker's column becomes the list indentation and
    /// sibling items must align to it.
    fn parse_list(&mut self, parent: NodeId) -> Result<()> {
        self.enter_nesting()?;
        let marker = self.window.peek(0);
        let indentation = marker.begin_column;
        let ordered = marker.kind == TokenKind::Digits;
        let list = self.arena.push(
            NodeKind::List {
                ordered,
                indentation,
            },
            Some(parent),
        );
        self.state.lists.push(OpenList {
            indentation,
            ordered,
        });
        let mut loose = false;
        loop {
            self.parse_item(list, ordered, indentation)?;
            if !self.item_lookahead() {
                break;
            }
            if self.advance_through_blanks() > 0 {
                loose = true;
            }
            self.consume_leading_blanks();
        }
        self.state.lists.pop();
        if loose {
            for &item in self.arena.children(list).to_vec().iter() {
                if let NodeKind::Item { loose, .. } = &mut self.arena.node_mut(item).kind {
                    *loose = true;
                }
            }
        }
        self.exit_nesting();
        Ok(())
    }

    fn parse_item(&mut self, list: NodeId, ordered: bool, indentation: usize) -> Result<()> {
        let item = self.arena.push(
            NodeKind::Item {
                indentation,
                ordered,
                loose: false,
            },
            Some(list),
        );
        self.state.items.push(OpenItem { indentation });
        // Marker.
        if ordered {
            self.expect(TokenKind::Digits, "digits")?;
            self.expect(TokenKind::Dot, "'.'")?;
        } else {
            self.window.bump();
        }
        self.consume_leading_blanks();
        self.parse_paragraph(item)?;
        // Further blocks attached to this item.
        loop {
            if !self.item_continues() || self.item_lookahead() {
                break;
            }
            if self.advance_through_blanks() > 0 {
                if let NodeKind::Item { loose, .. } = &mut self.arena.node_mut(item).kind {
                    *loose = true;
                }
            }
            match self.block_lookahead() {
                SubBlock::List => {
                    self.consume_leading_blanks();
                    self.parse_list(item)?;
                }
                SubBlock::Code => {
                    self.parse_code(item, indentation + 8)?;
                }
                SubBlock::Paragraph => {
                    self.consume_leading_blanks();
                    self.parse_paragraph(item)?;
                }
            }
        }
        self.state.items.pop();
        Ok(())
    }

    /// From an end of line, consumes line endings, quote prefixes, and
    /// whole blank lines; stops at the start of the next content line.
    /// Returns the number of blank lines crossed.
    fn advance_through_blanks(&mut self) -> usize {
        let mut blanks = 0;
        while self.window.kind(0) == TokenKind::Eol {
            self.window.bump();
            self.consume_quote_prefix();
            let mut at = 0;
            while self.window.peek(at).is_blank() {
                at += 1;
            }
            if self.window.kind(at) == TokenKind::Eol {
                self.window.bump_many(at);
                blanks += 1;
            } else {
                break;
            }
        }
        blanks
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.window.kind(0) == kind {
            self.window.bump();
            Ok(())
        } else {
            Err(MarkdownError::parse(self.window.peek(0).position(), what))
        }
    }
}

/// Parses Markdown text with the default configuration.
pub fn parse(input: &str) -> Result<Document> {
    Parser::with_defaults(input).parse()
}
