use super::ast::{FunctionDef, LoopHeader};
use super::{Error, Scope};
use std::ops::RangeInclusive;


/// Records what the parser registers instead of running anything.
#[derive(Default)]
pub struct TestScope {
    pub functions: Vec<FunctionDef>,
    pub loops: Vec<LoopHeader>,
}

impl Scope for TestScope {
    fn is_function(&self, name: &str) -> bool {
        self.arity(name).is_some()
    }

    fn arity(&self, name: &str) -> Option<RangeInclusive<usize>> {
        match name {
            "COS" | "LEN" => Some(1..=1),
            "MID" => Some(2..=3),
            _ => self
                .functions
                .iter()
                .find(|f| &*f.name == name)
                .map(|f| f.arity()..=f.arity()),
        }
    }

    fn define_function(&mut self, def: FunctionDef) {
        self.functions.push(def);
    }

    fn push_loop(&mut self, header: LoopHeader) -> Result<(), Error> {
        self.loops.push(header);
        Ok(())
    }
}
