use super::ast::{FunctionDef, LoopHeader};
use super::Error;
use std::ops::RangeInclusive;

/// The part of the machine the lexer and parser may touch.
pub trait Scope {
    fn is_function(&self, name: &str) -> bool;
    fn arity(&self, name: &str) -> Option<RangeInclusive<usize>>;
    fn define_function(&mut self, def: FunctionDef);
    fn push_loop(&mut self, header: LoopHeader) -> Result<(), Error>;
}
