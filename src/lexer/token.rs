use crate::lexer::Position;

/// Classification of a lexeme. The set is closed: every character of the
/// input falls into exactly one kind, with `CharSequence` as the catch-all
/// for runs outside punctuation and digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Whitespace
    Space,
    Tab,
    Eol,
    // Literals
    CharSequence,
    Digits,
    CharEntityRef,
    NumericCharRef,
    EscapedChar,
    // Punctuation, one token per character
    Ampersand,
    Backslash,
    Backtick,
    Bang,
    Colon,
    Dot,
    DoubleQuote,
    Eq,
    Gt,
    Lbracket,
    Lparen,
    Lt,
    Minus,
    Plus,
    Rbracket,
    Rparen,
    Sharp,
    SingleQuote,
    Slash,
    Star,
    Underscore,
    // Multi-char sigils
    CommentOpen,
    CommentClose,
    Eof,
}

/// A classified lexeme with its literal image and source coordinates.
/// Columns are 1-based; a tab's end column lands on the next tab stop
/// (stops every 4 columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'input> {
    pub kind: TokenKind,
    pub image: &'input str,
    pub line: usize,
    pub begin_column: usize,
    pub end_column: usize,
}

impl<'input> Token<'input> {
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.begin_column,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_eol(&self) -> bool {
        self.kind == TokenKind::Eol
    }

    /// Space or tab.
    pub fn is_blank(&self) -> bool {
        matches!(self.kind, TokenKind::Space | TokenKind::Tab)
    }

    /// Number of columns this token spans.
    pub fn width(&self) -> usize {
        self.end_column - self.begin_column + 1
    }
}
