use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1, take_while_m_n};
use nom::character::complete::{alpha1, char, one_of};
use nom::combinator::recognize;
use nom::sequence::{pair, tuple};
use nom::IResult;

use super::token::TokenKind;

/// Characters that lex as their own single-character punctuation token.
/// Everything else outside digits and whitespace folds into `CharSequence`.
pub(super) fn punctuation_kind(c: char) -> Option<TokenKind> {
    let kind = match c {
        '&' => TokenKind::Ampersand,
        '\\' => TokenKind::Backslash,
        '`' => TokenKind::Backtick,
        '!' => TokenKind::Bang,
        ':' => TokenKind::Colon,
        '.' => TokenKind::Dot,
        '"' => TokenKind::DoubleQuote,
        '=' => TokenKind::Eq,
        '>' => TokenKind::Gt,
        '[' => TokenKind::Lbracket,
        '(' => TokenKind::Lparen,
        '<' => TokenKind::Lt,
        '-' => TokenKind::Minus,
        '+' => TokenKind::Plus,
        ']' => TokenKind::Rbracket,
        ')' => TokenKind::Rparen,
        '#' => TokenKind::Sharp,
        '\'' => TokenKind::SingleQuote,
        '/' => TokenKind::Slash,
        '*' => TokenKind::Star,
        '_' => TokenKind::Underscore,
        _ => return None,
    };
    Some(kind)
}

fn is_plain(c: char) -> bool {
    punctuation_kind(c).is_none()
        && !c.is_ascii_digit()
        && !matches!(c, ' ' | '\t' | '\r' | '\n')
}

pub(super) fn parse_eol(input: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\n"), tag("\r")))(input)
}

pub(super) fn parse_comment_open(input: &str) -> IResult<&str, &str> {
    tag("<!--")(input)
}

pub(super) fn parse_comment_close(input: &str) -> IResult<&str, &str> {
    tag("-->")(input)
}

/// `&name;` where name is one or more ASCII letters.
pub(super) fn parse_char_entity_ref(input: &str) -> IResult<&str, &str> {
    recognize(tuple((char('&'), alpha1, char(';'))))(input)
}

/// `&#dddd;` (1-4 decimal digits) or `&#xhhhh;` (1-4 hex digits).
pub(super) fn parse_numeric_char_ref(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        tag("&#"),
        alt((
            recognize(pair(
                char('x'),
                take_while_m_n(1, 4, |c: char| c.is_ascii_hexdigit()),
            )),
            take_while_m_n(1, 4, |c: char| c.is_ascii_digit()),
        )),
        char(';'),
    )))(input)
}

/// Backslash followed by a character Markdown lets you escape.
pub(super) fn parse_escaped_char(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('\\'), one_of("{}[]()\\`_>#.!+-*")))(input)
}

pub(super) fn parse_digits(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit())(input)
}

/// Maximal run of characters outside punctuation, digits, and whitespace.
pub(super) fn parse_char_sequence(input: &str) -> IResult<&str, &str> {
    take_while1(is_plain)(input)
}
