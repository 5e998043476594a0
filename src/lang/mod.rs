/*!
# Rust Language Module

This Rust module provides lexical analysis and parsing of the BASIC language.

Parsing is not free of side effects. `DEF` and `FOR` register functions and
loop frames through the [`Scope`](scope::Scope) handed to the parser, so the
machine must be ready to receive them before a line is parsed.

*/

#[macro_use]
mod error;
mod ident;
mod lex;
mod line;
mod parse;
mod scope;

pub mod ast;
pub mod token;

pub use error::Category;
pub use error::Error;
pub use error::ErrorCode;
pub use ident::Ident;
pub use lex::lex;
pub use line::Line;
pub use parse::parse;
pub use scope::Scope;

pub type LineNumber = Option<u16>;
pub type Column = std::ops::Range<usize>;

pub trait MaxValue<T> {
    fn max_value() -> T;
}

impl MaxValue<u16> for LineNumber {
    fn max_value() -> u16 {
        63999
    }
}

#[cfg(test)]
mod tests;
