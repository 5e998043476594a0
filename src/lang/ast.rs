use super::token::{Operator, Word};
use super::{Ident, LineNumber};
use std::rc::Rc;

/// A statement address. Direct mode lines have no line number.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Position {
    pub line: LineNumber,
    pub statement: usize,
}

impl Position {
    pub fn new(line: LineNumber, statement: usize) -> Position {
        Position { line, statement }
    }

    pub fn next(self) -> Position {
        Position {
            line: self.line,
            statement: self.statement + 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArgumentKind {
    FunctionArgument,
    ArraySubscript,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Leaf {
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    /// Print list control, a tab for `,` and a newline at the end.
    Char(char),
    Identifier(Ident, Option<Box<Leaf>>),
    Unary(Operator, Box<Leaf>),
    Binary(Operator, Box<Leaf>, Box<Leaf>),
    Assignment(Box<Leaf>, Box<Leaf>),
    Grouping(Box<Leaf>),
    Branch(Box<Leaf>, Vec<Leaf>, Vec<Leaf>),
    Command(Word, Option<Box<Leaf>>),
    Function(Rc<str>, Box<Leaf>),
    Arguments(ArgumentKind, Vec<Leaf>),
}

impl Leaf {
    pub fn command(word: Word, right: Option<Leaf>) -> Leaf {
        Leaf::Command(word, right.map(Box::new))
    }

    pub fn binary(op: Operator, lhs: Leaf, rhs: Leaf) -> Leaf {
        Leaf::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn assignment(lhs: Leaf, rhs: Leaf) -> Leaf {
        Leaf::Assignment(Box::new(lhs), Box::new(rhs))
    }

    /// The chain is only an argument list when the node kind and the tag agree.
    pub fn arguments(&self, kind: ArgumentKind) -> Option<&[Leaf]> {
        match self {
            Leaf::Arguments(k, list) if *k == kind => Some(list),
            _ => None,
        }
    }

    pub fn subscripts(&self) -> Option<&[Leaf]> {
        match self {
            Leaf::Identifier(_, Some(right)) => right.arguments(ArgumentKind::ArraySubscript),
            _ => None,
        }
    }

    pub fn ident(&self) -> Option<&Ident> {
        match self {
            Leaf::Identifier(ident, _) => Some(ident),
            _ => None,
        }
    }

    pub fn is_command(&self, word: Word) -> bool {
        matches!(self, Leaf::Command(w, _) if *w == word)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum FunctionBody {
    Expression(Leaf),
    /// Bodiless `DEF`, runs from the line after this one until `RETURN`.
    Line(u16),
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDef {
    pub name: Rc<str>,
    pub parameters: Vec<Ident>,
    pub body: FunctionBody,
}

impl FunctionDef {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// What a `FOR` leaves on the frame it pushes.
#[derive(Debug, PartialEq, Clone)]
pub struct LoopHeader {
    pub variable: Ident,
    pub to: Leaf,
    pub step: Leaf,
    pub body: Position,
}
