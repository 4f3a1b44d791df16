//! Disambiguation predicates.
//!
//! Markdown's context sensitivity lives here: each predicate peeks ahead
//! through the token window without consuming anything, then the grammar
//! driver picks a production. Probes index relative to the current
//! position; `peek` repeats `Eof` so scans never run off the stream.

use crate::lexer::TokenKind;

use super::Parser;

/// What the next non-whitespace content of a line looks like, after any
/// quote markers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Prefix {
    /// Number of `>` markers crossed.
    pub gt_count: usize,
    /// Window index of the first content token.
    pub at: usize,
    /// Absolute begin column of that token.
    pub column: usize,
    pub kind: TokenKind,
    /// Line holds no content (only whitespace and quote markers).
    pub blank: bool,
}

/// Sub-block choice inside a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubBlock {
    List,
    Code,
    Paragraph,
}

impl<'input> Parser<'input> {
    /// Scans whitespace and `>` markers starting at window index `at`.
    /// Each `>` may take one following space as part of its marker.
    pub(crate) fn scan_prefix(&mut self, mut at: usize) -> Prefix {
        let mut gt_count = 0;
        loop {
            match self.window.kind(at) {
                TokenKind::Space | TokenKind::Tab => at += 1,
                TokenKind::Gt => {
                    gt_count += 1;
                    at += 1;
                    if self.window.kind(at) == TokenKind::Space {
                        at += 1;
                    }
                }
                _ => break,
            }
        }
        let token = self.window.peek(at);
        let column = token.begin_column;
        let kind = token.kind;
        Prefix {
            gt_count,
            at,
            column,
            kind,
            blank: matches!(kind, TokenKind::Eol | TokenKind::Eof),
        }
    }

    /// A bullet or ordered marker begins at window index `at`.
    pub(crate) fn marker_at(&mut self, at: usize) -> bool {
        match self.window.kind(at) {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star => {
                matches!(self.window.kind(at + 1), TokenKind::Space | TokenKind::Tab)
            }
            TokenKind::Digits => {
                self.window.kind(at + 1) == TokenKind::Dot
                    && matches!(self.window.kind(at + 2), TokenKind::Space | TokenKind::Tab)
            }
            _ => false,
        }
    }

    /// A marker that really opens an item: rulers like `- - -` lex as a
    /// marker too and must lose.
    pub(crate) fn item_marker_at(&mut self, at: usize) -> bool {
        self.marker_at(at) && !self.ruler_lookahead_from(at)
    }

    /// From `at`, the rest of the line is a single repeated ruler character
    /// (`*`, `-`, `_`), at most two spaces between markers, three or more
    /// markers, terminated by end of line or input.
    pub(crate) fn ruler_lookahead_from(&mut self, at: usize) -> bool {
        let marker = match self.window.kind(at) {
            k @ (TokenKind::Star | TokenKind::Minus | TokenKind::Underscore) => k,
            _ => return false,
        };
        let mut count = 0;
        let mut spaces = 0;
        let mut index = at;
        loop {
            let kind = self.window.kind(index);
            if kind == marker {
                count += 1;
                spaces = 0;
            } else if kind == TokenKind::Space {
                spaces += 1;
                if spaces > 2 {
                    return false;
                }
            } else if matches!(kind, TokenKind::Eol | TokenKind::Eof) {
                return count >= 3;
            } else {
                return false;
            }
            index += 1;
        }
    }

    /// The next line still belongs to the open quote: its depth is at
    /// least the current one.
    pub(crate) fn quoted_element_lookahead(&mut self) -> bool {
        if self.window.kind(0) != TokenKind::Eol {
            return false;
        }
        let prefix = self.scan_prefix(1);
        prefix.gt_count >= self.state.quote_level
    }

    /// The next line continues the current paragraph: not blank, at
    /// matching quote depth, and not a new item while a list is open.
    pub(crate) fn line_lookahead(&mut self) -> bool {
        if self.window.kind(0) != TokenKind::Eol {
            return false;
        }
        let prefix = self.scan_prefix(1);
        if prefix.blank || prefix.gt_count != self.state.quote_level {
            return false;
        }
        if !self.state.lists.is_empty() && self.item_marker_at(prefix.at) {
            return false;
        }
        true
    }

    /// The current item keeps going: upcoming content sits deeper than the
    /// item's marker at the same quote depth, or a blank line is followed
    /// by a sibling marker at the item's own column.
    pub(crate) fn item_continues(&mut self) -> bool {
        if self.window.kind(0) != TokenKind::Eol {
            return false;
        }
        let indentation = match self.state.current_item() {
            Some(item) => item.indentation,
            None => return false,
        };
        let mut at = 1;
        let mut blank_seen = false;
        loop {
            let prefix = self.scan_prefix(at);
            if prefix.blank {
                if prefix.kind == TokenKind::Eof {
                    return false;
                }
                blank_seen = true;
                at = prefix.at + 1;
                continue;
            }
            if prefix.gt_count != self.state.quote_level {
                return false;
            }
            if prefix.column > indentation {
                return true;
            }
            let ordered = self
                .state
                .current_list()
                .map(|list| list.ordered)
                .unwrap_or(false);
            return blank_seen
                && prefix.column == indentation
                && self.item_marker_at(prefix.at)
                && (self.window.kind(prefix.at) == TokenKind::Digits) == ordered;
        }
    }

    /// Another item of the current list follows: after blank lines and
    /// quote markers, a marker of the same flavor sits at the list's
    /// indentation column.
    pub(crate) fn item_lookahead(&mut self) -> bool {
        if self.window.kind(0) != TokenKind::Eol {
            return false;
        }
        let (indentation, ordered) = match self.state.current_list() {
            Some(list) => (list.indentation, list.ordered),
            None => return false,
        };
        let mut at = 1;
        loop {
            let prefix = self.scan_prefix(at);
            if prefix.blank {
                if prefix.kind == TokenKind::Eof {
                    return false;
                }
                at = prefix.at + 1;
                continue;
            }
            return prefix.gt_count == self.state.quote_level
                && prefix.column == indentation
                && self.item_marker_at(prefix.at)
                && (self.window.kind(prefix.at) == TokenKind::Digits) == ordered;
        }
    }

    /// Which sub-block begins on the upcoming line of the current item.
    pub(crate) fn block_lookahead(&mut self) -> SubBlock {
        let indentation = self
            .state
            .current_item()
            .map(|item| item.indentation)
            .unwrap_or(1);
        let mut at = 0;
        loop {
            let prefix = self.scan_prefix(at);
            if prefix.blank && prefix.kind == TokenKind::Eol {
                at = prefix.at + 1;
                continue;
            }
            if self.item_marker_at(prefix.at) {
                return SubBlock::List;
            }
            if prefix.column >= indentation + 8 {
                return SubBlock::Code;
            }
            return SubBlock::Paragraph;
        }
    }

    /// The next line is still inside the code block: blank (with further
    /// code below) or indented past the code margin at matching depth.
    pub(crate) fn code_line_lookahead(&mut self, margin_column: usize) -> bool {
        if self.window.kind(0) != TokenKind::Eol {
            return false;
        }
        let mut at = 1;
        loop {
            let prefix = self.scan_prefix(at);
            if prefix.blank {
                if prefix.kind == TokenKind::Eof {
                    return false;
                }
                at = prefix.at + 1;
                continue;
            }
            return prefix.gt_count == self.state.quote_level && prefix.column >= margin_column;
        }
    }

    /// More inline content follows on this line. Inside a header the
    /// trailing run of `#` markers (and spaces) does not count.
    pub(crate) fn text_lookahead(&mut self) -> bool {
        match self.window.kind(0) {
            TokenKind::Eol | TokenKind::Eof => false,
            TokenKind::Sharp | TokenKind::Space if self.state.in_header => {
                let mut at = 0;
                let mut sharp_seen = false;
                loop {
                    match self.window.kind(at) {
                        TokenKind::Sharp => {
                            sharp_seen = true;
                            at += 1;
                        }
                        TokenKind::Space => at += 1,
                        TokenKind::Eol | TokenKind::Eof => return !sharp_seen,
                        _ => return true,
                    }
                }
            }
            _ => true,
        }
    }

    /// Inside a quoted title, the quote character at window index 0 is
    /// literal when another closing quote still follows before the
    /// boundary (`)` for inline links, end of line otherwise).
    pub(crate) fn quote_inside_title_lookahead(
        &mut self,
        quote: TokenKind,
        stop_at_paren: bool,
    ) -> bool {
        let mut at = 1;
        loop {
            let kind = self.window.kind(at);
            if kind == quote {
                return true;
            }
            match kind {
                TokenKind::Eol | TokenKind::Eof => return false,
                TokenKind::Rparen if stop_at_paren => return false,
                _ => at += 1,
            }
        }
    }

    /// `[id]:` begins at the current line, allowing up to three columns of
    /// leading indentation.
    pub(crate) fn resource_definition_lookahead(&mut self) -> bool {
        let mut at = 0;
        let mut indent = 0;
        while self.window.kind(at) == TokenKind::Space {
            indent += 1;
            at += 1;
        }
        if indent > 3 || self.window.kind(at) != TokenKind::Lbracket {
            return false;
        }
        at += 1;
        loop {
            match self.window.kind(at) {
                TokenKind::Rbracket => break,
                TokenKind::Eol | TokenKind::Eof => return false,
                _ => at += 1,
            }
        }
        self.window.kind(at + 1) == TokenKind::Colon
    }

    /// The line beginning at window index `at` is followed by a setext
    /// underline at matching quote depth. Returns the header level.
    pub(crate) fn setext_lookahead(&mut self, at: usize) -> Option<u8> {
        if self.item_marker_at(at) {
            return None;
        }
        // Scan the candidate line; it must hold some content.
        let mut index = at;
        let mut any_content = false;
        loop {
            match self.window.kind(index) {
                TokenKind::Eol => break,
                TokenKind::Eof => return None,
                TokenKind::Space | TokenKind::Tab => index += 1,
                _ => {
                    any_content = true;
                    index += 1;
                }
            }
        }
        if !any_content {
            return None;
        }
        let prefix = self.scan_prefix(index + 1);
        if prefix.blank || prefix.gt_count != self.state.quote_level {
            return None;
        }
        let marker = match prefix.kind {
            TokenKind::Eq => TokenKind::Eq,
            TokenKind::Minus => TokenKind::Minus,
            _ => return None,
        };
        let mut index = prefix.at;
        let mut count = 0;
        let mut run_ended = false;
        loop {
            let kind = self.window.kind(index);
            if kind == marker {
                // Interior spaces disqualify the underline (that shape is
                // a ruler, not an underline).
                if run_ended {
                    return None;
                }
                count += 1;
                index += 1;
            } else if kind == TokenKind::Space {
                run_ended = true;
                index += 1;
            } else if matches!(kind, TokenKind::Eol | TokenKind::Eof) {
                break;
            } else {
                return None;
            }
        }
        if count == 0 {
            return None;
        }
        Some(if marker == TokenKind::Eq { 1 } else { 2 })
    }
}
