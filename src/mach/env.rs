use super::{Stack, Val, Var};
use crate::error;
use crate::lang::ast::{FunctionDef, Leaf, LoopHeader, Position};
use crate::lang::token::Word;
use crate::lang::{Error, Ident};
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

pub const MAX_FRAMES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Running,
    /// Statements are parsed but not run until this command comes along.
    AwaitingCommand(Word),
}

impl FrameState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, FrameState::AwaitingCommand(_))
    }
}

#[derive(Debug)]
pub struct Loop {
    pub header: LoopHeader,
    pub to: Val,
    pub step: Val,
    pub started: bool,
}

impl Loop {
    pub fn new(header: LoopHeader) -> Loop {
        Loop {
            header,
            to: Val::Integer(0),
            step: Val::Integer(1),
            started: false,
        }
    }
}

#[derive(Debug)]
pub enum FrameKind {
    Root,
    Loop(Loop),
    Gosub(Position),
    Call,
}

/// A `READ` waiting for `DATA`.
#[derive(Debug)]
pub struct ReadState {
    pub targets: Vec<Leaf>,
    pub filled: usize,
    pub resume: Position,
}

#[derive(Debug)]
pub struct Environment {
    variables: HashMap<Rc<str>, Var>,
    functions: HashMap<Rc<str>, Rc<FunctionDef>>,
    labels: HashMap<Rc<str>, u16>,
    parent: Option<usize>,
    pub kind: FrameKind,
    pub state: FrameState,
    pub read: Option<ReadState>,
}

impl Environment {
    fn new(kind: FrameKind, parent: Option<usize>, state: FrameState) -> Environment {
        Environment {
            variables: HashMap::new(),
            functions: HashMap::new(),
            labels: HashMap::new(),
            parent,
            kind,
            state,
            read: None,
        }
    }

    pub fn loop_state(&self) -> Option<&Loop> {
        match &self.kind {
            FrameKind::Loop(l) => Some(l),
            _ => None,
        }
    }

    pub fn loop_state_mut(&mut self) -> Option<&mut Loop> {
        match &mut self.kind {
            FrameKind::Loop(l) => Some(l),
            _ => None,
        }
    }
}

/// ## Frame arena
///
/// Frames live in a stack and refer to their parent by index. The last
/// frame is the active one and the first is the root, which is never popped.

#[derive(Debug)]
pub struct Frames {
    stack: Stack<Environment>,
}

impl Default for Frames {
    fn default() -> Frames {
        let root = Environment::new(FrameKind::Root, None, FrameState::Running);
        Frames {
            stack: Stack::with_bottom(MAX_FRAMES, "TOO MANY NESTED FRAMES", root),
        }
    }
}

impl Frames {
    pub fn reset(&mut self) {
        *self = Frames::default();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn current_index(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn current(&self) -> &Environment {
        match self.stack.last() {
            Some(env) => env,
            None => unreachable!("the root frame is never popped"),
        }
    }

    pub fn current_mut(&mut self) -> &mut Environment {
        match self.stack.last_mut() {
            Some(env) => env,
            None => unreachable!("the root frame is never popped"),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Environment> {
        self.stack.get(index)
    }

    pub fn push(&mut self, kind: FrameKind, state: FrameState) -> Result<()> {
        let parent = Some(self.current_index());
        self.stack.push(Environment::new(kind, parent, state))
    }

    pub fn pop(&mut self) -> Result<Environment> {
        if self.stack.len() <= 1 {
            return Err(error!(InternalError; "ROOT FRAME CANNOT BE POPPED"));
        }
        self.stack.pop()
    }

    /// Drops every frame above `len`, never the root.
    pub fn truncate(&mut self, len: usize) {
        self.stack.truncate(len.max(1));
    }

    /// Indices from the active frame up to the root.
    pub fn chain(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.current_index()), move |i| {
            self.stack.get(*i).and_then(|env| env.parent)
        })
    }

    /// Where a new variable goes: the active frame, unless that is a loop
    /// frame parsing pushed for a FOR that has not run yet.
    fn creating_index(&self) -> usize {
        self.chain()
            .find(|i| {
                self.stack
                    .get(*i)
                    .and_then(|env| env.loop_state())
                    .map_or(true, |l| l.started)
            })
            .unwrap_or(0)
    }

    pub fn variable(&self, ident: &Ident) -> Option<&Var> {
        self.chain()
            .filter_map(|i| self.stack.get(i))
            .find_map(|env| env.variables.get(ident.name()))
    }

    /// Finds a variable up the chain, or creates it in the active frame.
    pub fn variable_mut(&mut self, ident: &Ident) -> Result<&mut Var> {
        let found = self.chain().find(|i| {
            self.stack
                .get(*i)
                .map_or(false, |env| env.variables.contains_key(ident.name()))
        });
        let index = match found {
            Some(index) => index,
            None => {
                let var = Var::new(ident)?;
                let index = self.creating_index();
                if let Some(env) = self.stack.get_mut(index) {
                    env.variables.insert(ident.name().clone(), var);
                }
                index
            }
        };
        self.stack
            .get_mut(index)
            .and_then(|env| env.variables.get_mut(ident.name()))
            .ok_or_else(|| error!(InternalError; "VARIABLE VANISHED"))
    }

    /// Declares a variable in the active frame, shadowing any outer one.
    pub fn bind(&mut self, var: Var) {
        self.current_mut().variables.insert(var.name().clone(), var);
    }

    pub fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.chain()
            .filter_map(|i| self.stack.get(i))
            .find_map(|env| env.functions.get(name).cloned())
    }

    pub fn define_function(&mut self, def: FunctionDef) {
        self.current_mut()
            .functions
            .insert(def.name.clone(), Rc::new(def));
    }

    pub fn label(&self, name: &str) -> Option<u16> {
        self.stack.get(0).and_then(|root| root.labels.get(name).copied())
    }

    pub fn set_label(&mut self, name: Rc<str>, line: u16) {
        if let Some(root) = self.stack.get_mut(0) {
            root.labels.insert(name, line);
        }
    }

    /// Where a `READ` still waiting for `DATA` would have resumed.
    pub fn pending_read(&self) -> Option<Position> {
        self.chain()
            .filter_map(|i| self.stack.get(i))
            .find_map(|env| env.read.as_ref().map(|r| r.resume))
    }
}
