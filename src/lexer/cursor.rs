use unicode_segmentation::UnicodeSegmentation;

use super::position::Position;
use super::rules::{
    parse_char_entity_ref, parse_char_sequence, parse_comment_close, parse_comment_open,
    parse_digits, parse_eol, parse_escaped_char, parse_numeric_char_ref, punctuation_kind,
};
use super::token::{Token, TokenKind};

/// Tab stops sit every four columns.
pub(crate) const TAB_SIZE: usize = 4;

/// Number of columns a tab starting at `begin_column` spans. The same
/// figure is used when a tab inside code text is materialized as spaces.
pub fn tab_expansion(begin_column: usize) -> usize {
    (TAB_SIZE - (begin_column % TAB_SIZE)) + 1
}

/// Stateful token source. Drives the pure recognizers in `rules` over the
/// input, always taking the longest match, and annotates each token with
/// its line and begin/end columns. Columns advance one per grapheme except
/// for tabs, which jump to the next tab stop.
#[derive(Clone)]
pub struct Lexer<'input> {
    input: &'input str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the position the next token will begin at.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Produces the next token. Total: every character is classified, so
    /// after the input is exhausted this returns `Eof` forever.
    pub fn next_token(&mut self) -> Token<'input> {
        let rest = &self.input[self.offset..];
        if rest.is_empty() {
            return Token {
                kind: TokenKind::Eof,
                image: "",
                line: self.line,
                begin_column: self.column,
                end_column: self.column,
            };
        }

        let (kind, image) = classify(rest);
        let line = self.line;
        let begin_column = self.column;
        let end_column = match kind {
            TokenKind::Tab => begin_column + tab_expansion(begin_column) - 1,
            // CRLF is a single grapheme cluster, so EOL always spans one.
            _ => begin_column + image.graphemes(true).count() - 1,
        };

        self.offset += image.len();
        if kind == TokenKind::Eol {
            self.line += 1;
            self.column = 1;
        } else {
            self.column = end_column + 1;
        }

        Token {
            kind,
            image,
            line,
            begin_column,
            end_column,
        }
    }
}

/// Longest match wins; order breaks ties (comment sigils before `<`/`-`,
/// entity refs before `&`, escaped chars before `\`).
fn classify(rest: &str) -> (TokenKind, &str) {
    if let Ok((_, image)) = parse_eol(rest) {
        return (TokenKind::Eol, image);
    }
    match rest.as_bytes()[0] {
        b' ' => return (TokenKind::Space, &rest[..1]),
        b'\t' => return (TokenKind::Tab, &rest[..1]),
        _ => {}
    }

    if let Ok((_, image)) = parse_comment_open(rest) {
        return (TokenKind::CommentOpen, image);
    }
    if let Ok((_, image)) = parse_comment_close(rest) {
        return (TokenKind::CommentClose, image);
    }
    if let Ok((_, image)) = parse_char_entity_ref(rest) {
        return (TokenKind::CharEntityRef, image);
    }
    if let Ok((_, image)) = parse_numeric_char_ref(rest) {
        return (TokenKind::NumericCharRef, image);
    }
    if let Ok((_, image)) = parse_escaped_char(rest) {
        return (TokenKind::EscapedChar, image);
    }
    if let Ok((_, image)) = parse_digits(rest) {
        return (TokenKind::Digits, image);
    }
    if let Ok((_, image)) = parse_char_sequence(rest) {
        return (TokenKind::CharSequence, image);
    }

    let Some(first) = rest.chars().next() else {
        return (TokenKind::Eof, "");
    };
    match punctuation_kind(first) {
        Some(kind) => (kind, &rest[..first.len_utf8()]),
        None => (TokenKind::CharSequence, &rest[..first.len_utf8()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.is_eof();
            out.push(token.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn classifies_basic_line() {
        assert_eq!(
            kinds("# Hi"),
            vec![
                TokenKind::Sharp,
                TokenKind::Space,
                TokenKind::CharSequence,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn longest_match_prefers_sigils() {
        assert_eq!(
            kinds("<!--x-->"),
            vec![
                TokenKind::CommentOpen,
                TokenKind::CharSequence,
                TokenKind::CommentClose,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn ampersand_falls_back_without_semicolon() {
        assert_eq!(
            kinds("&amp"),
            vec![TokenKind::Ampersand, TokenKind::CharSequence, TokenKind::Eof]
        );
        assert_eq!(kinds("&amp;"), vec![TokenKind::CharEntityRef, TokenKind::Eof]);
        assert_eq!(kinds("&#169;"), vec![TokenKind::NumericCharRef, TokenKind::Eof]);
    }

    #[test]
    fn escaped_char_beats_backslash() {
        assert_eq!(kinds("\\*"), vec![TokenKind::EscapedChar, TokenKind::Eof]);
        assert_eq!(
            kinds("\\q"),
            vec![TokenKind::Backslash, TokenKind::CharSequence, TokenKind::Eof]
        );
    }

    #[test]
    fn tracks_lines_and_columns() {
        let mut lexer = Lexer::new("ab\ncd");
        let ab = lexer.next_token();
        assert_eq!((ab.line, ab.begin_column, ab.end_column), (1, 1, 2));
        let eol = lexer.next_token();
        assert_eq!(eol.kind, TokenKind::Eol);
        assert_eq!(eol.line, 1);
        let cd = lexer.next_token();
        assert_eq!((cd.line, cd.begin_column, cd.end_column), (2, 1, 2));
    }

    #[test]
    fn tab_lands_on_tab_stop() {
        let mut lexer = Lexer::new("\tx");
        let tab = lexer.next_token();
        assert_eq!((tab.begin_column, tab.end_column), (1, 4));
        let x = lexer.next_token();
        assert_eq!(x.begin_column, 5);
    }

    #[test]
    fn tab_after_content() {
        let mut lexer = Lexer::new("ab\tx");
        lexer.next_token(); // ab
        let tab = lexer.next_token();
        assert_eq!(tab.begin_column, 3);
        assert_eq!(tab.end_column, 4);
        let x = lexer.next_token();
        assert_eq!(x.begin_column, 5);
    }

    #[test]
    fn digits_are_their_own_kind() {
        assert_eq!(
            kinds("12. x"),
            vec![
                TokenKind::Digits,
                TokenKind::Dot,
                TokenKind::Space,
                TokenKind::CharSequence,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::new("");
        assert!(lexer.next_token().is_eof());
        assert!(lexer.next_token().is_eof());
    }

    #[test]
    fn crlf_is_one_eol() {
        assert_eq!(
            kinds("a\r\nb"),
            vec![
                TokenKind::CharSequence,
                TokenKind::Eol,
                TokenKind::CharSequence,
                TokenKind::Eof
            ]
        );
    }
}
