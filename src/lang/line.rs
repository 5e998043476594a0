use super::ast::Leaf;
use super::{lex, parse, Error, LineNumber, Scope};

/// One source line after lexing and parsing.
#[derive(Debug, PartialEq)]
pub struct Line {
    number: LineNumber,
    statements: Vec<Leaf>,
}

impl Line {
    pub fn parse<S: Scope + ?Sized>(s: &str, scope: &mut S) -> Result<Line, Error> {
        let (number, tokens) = lex(s, scope)?;
        let statements = parse(number, &tokens, scope)?;
        Ok(Line { number, statements })
    }

    pub fn number(&self) -> LineNumber {
        self.number
    }

    pub fn statements(&self) -> &[Leaf] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<Leaf> {
        self.statements
    }
}
