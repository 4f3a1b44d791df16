//! Markdown to HTML translation.
//!
//! The pipeline has three stages, each with direct access if the one-call
//! façade is not enough:
//!
//! 1. **Lexing:** the input is classified into tokens with line/column
//!    tracking (`lexer`).
//! 2. **Parsing:** a recursive-descent parser with unbounded lookahead
//!    builds the document tree and the reference table (`parser`).
//! 3. **Generation:** a tree walk renders the document as XHTML-style
//!    HTML (`codegen`).
//!
//! The dialect is the classic 2004 Markdown syntax: setext and ATX
//! headers, blockquotes at arbitrary depth, tight and loose lists,
//! indented code, reference-style links, inline HTML passthrough.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use std::io;

pub use ast::{Document, EmphasisKind, NodeId, NodeKind, Resource, TagAttribute};
pub use codegen::HtmlGenerator;
pub use error::{MarkdownError, Result};
pub use lexer::{Lexer, Position, Token, TokenKind};
pub use parser::{parse, Parser, ParserConfig};

/// Reads the character source to completion, translates it, and writes
/// the HTML to the sink.
///
/// # Examples
///
/// ```
/// let mut output = Vec::new();
/// paperdown::transform(&mut "# Hello".as_bytes(), &mut output).unwrap();
/// assert_eq!(String::from_utf8(output).unwrap(), "<h1>Hello</h1>\n");
/// ```
pub fn transform<R: io::Read, W: io::Write>(source: &mut R, sink: &mut W) -> Result<()> {
    let mut input = String::new();
    source.read_to_string(&mut input)?;
    let html = to_html(&input)?;
    sink.write_all(html.as_bytes())?;
    Ok(())
}

/// Translates a Markdown string into HTML.
///
/// # Examples
///
/// ```
/// let html = paperdown::to_html("*hi*").unwrap();
/// assert_eq!(html, "<p><em>hi</em></p>\n");
/// ```
pub fn to_html(input: &str) -> Result<String> {
    let document = parser::parse(input)?;
    Ok(HtmlGenerator::new().generate(&document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trips_through_io() {
        let mut output = Vec::new();
        transform(&mut "> quoted".as_bytes(), &mut output).expect("transform");
        assert_eq!(
            String::from_utf8(output).expect("utf8"),
            "<blockquote>\n<p>quoted</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn transform_surfaces_sink_errors() {
        struct FailingSink;
        impl io::Write for FailingSink {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let result = transform(&mut "x".as_bytes(), &mut FailingSink);
        assert!(matches!(result, Err(MarkdownError::Io { .. })));
    }

    #[test]
    fn to_html_is_total_on_odd_input() {
        for input in ["", "\n\n\n", "][", "***", "`", "<", "\\", "&#;", "- ", "> "] {
            let result = to_html(input);
            assert!(result.is_ok(), "failed on {input:?}: {result:?}");
        }
    }

    #[test]
    fn empty_input_produces_empty_output() {
        assert_eq!(to_html("").expect("to_html"), "");
    }

    #[test]
    fn crlf_input_is_accepted() {
        assert_eq!(
            to_html("# A\r\n\r\nB").expect("to_html"),
            "<h1>A</h1>\n\n<p>B</p>\n"
        );
    }

    #[test]
    fn separate_invocations_share_nothing() {
        let first = to_html("[a]\n\n[a]: /one").expect("to_html");
        assert!(first.contains("/one"));
        let second = to_html("[a]").expect("to_html");
        assert!(second.contains("[a]"));
        assert!(!second.contains("/one"));
    }
}
