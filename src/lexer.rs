//! Token source.
//!
//! The module is split into focused submodules to keep the pipeline clear:
//! - `position`: purely tracks source coordinates.
//! - `rules`: nom-powered recognizers for the multi-character tokens.
//! - `cursor`: stateful lexer that drives the rules and tracks tab stops.
//! - `token`: the token kinds and their source spans.

pub mod token;

mod cursor;
mod position;
mod rules;

pub use cursor::{tab_expansion, Lexer};
pub use position::Position;
pub use token::{Token, TokenKind};
