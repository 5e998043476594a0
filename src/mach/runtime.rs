use super::memory;
use super::{
    Buffer, Console, FrameKind, FrameState, Frames, Function, Listing, Loop, Operation,
    ProgramStore, ReadState, Val, Var,
};
use crate::error;
use crate::lang::ast::{ArgumentKind, FunctionBody, FunctionDef, Leaf, LoopHeader, Position};
use crate::lang::token::Word;
use crate::lang::{lex, Error, ErrorCode, Ident, Line, LineNumber, MaxValue, Scope};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering as Compare;
use std::convert::TryFrom;
use std::io::BufRead;
use std::ops::RangeInclusive;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

const DEFAULT_AUTO_STEP: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Repl,
    RunStream,
    Run,
    Quit,
}

#[derive(Debug, Clone, Copy)]
struct Auto {
    next: u16,
    step: u16,
}

/// ## Tree-walking machine
///
/// The run loop fetches one stored line at a time, lexes and parses it
/// against the live frames, then evaluates its statements in order. A line
/// is only parsed again when control moves to a different line.

pub struct Runtime<C: Console = Buffer> {
    listing: Listing,
    console: C,
    frames: Frames,
    mode: Mode,
    pc: Position,
    jump: Option<Position>,
    loaded: Option<LineNumber>,
    statements: Rc<[Leaf]>,
    direct: Rc<[Leaf]>,
    clone_identifiers: bool,
    auto: Option<Auto>,
    interrupted: Arc<AtomicBool>,
    return_value: Option<Val>,
    rng: StdRng,
    last_rnd: f64,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(Buffer::default())
    }
}

impl<C: Console> Runtime<C> {
    pub fn new(console: C) -> Runtime<C> {
        Runtime {
            listing: Listing::default(),
            console,
            frames: Frames::default(),
            mode: Mode::Repl,
            pc: Position::new(None, 0),
            jump: None,
            loaded: None,
            statements: Vec::<Leaf>::new().into(),
            direct: Vec::<Leaf>::new().into(),
            clone_identifiers: true,
            auto: None,
            interrupted: Arc::new(AtomicBool::new(false)),
            return_value: None,
            rng: StdRng::from_entropy(),
            last_rnd: 0.0,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Setting the flag stops a run before its next statement.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    /// Line number the next entered line will get while AUTO is on.
    pub fn auto_line(&self) -> Option<u16> {
        self.auto.map(|a| a.next)
    }

    pub fn set_auto(&mut self, step: Option<u16>) {
        self.auto = step.filter(|s| *s > 0).and_then(|step| {
            let next = match self.listing.last_line() {
                Some(last) => last.checked_add(step)?,
                None => step,
            };
            Auto::new(next, step)
        });
    }

    /// Accepts one line typed at the prompt. Numbered lines are stored,
    /// anything else runs immediately. Returns false when the line was
    /// rejected.
    pub fn enter(&mut self, text: &str) -> bool {
        if self.mode == Mode::Quit {
            return false;
        }
        let text = match self.auto {
            Some(_) if text.trim().is_empty() => {
                self.auto = None;
                return true;
            }
            Some(auto) if !starts_with_digit(text) => format!("{} {}", auto.next, text),
            _ => text.to_string(),
        };
        let number = match lex(&text, &*self) {
            Ok((number, _)) => number,
            Err(error) => {
                self.console.error(&error);
                return false;
            }
        };
        match number {
            Some(number) => match self.store_line(number, &text) {
                Ok(_) => {
                    self.auto = self.auto.and_then(|a| a.after(number));
                    true
                }
                Err(error) => {
                    self.console.error(&error);
                    false
                }
            },
            None if text.trim().is_empty() => true,
            None => {
                self.execute_direct(&text);
                true
            }
        }
    }

    /// Stores a whole program without running any of it.
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.mode = Mode::RunStream;
        self.listing.clear();
        let result = self.load_lines(reader);
        self.mode = Mode::Repl;
        result
    }

    fn load_lines<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| error!(InternalError; &e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let in_file = |e: Error| e.message(&format!("IN LINE {} OF THE FILE", index + 1));
            match lex(&line, &*self).map_err(in_file)? {
                (Some(number), _) => self.store_line(number, &line)?,
                (None, _) => return Err(in_file(error!(DirectStatementInFile))),
            }
        }
        Ok(())
    }

    /// Runs the stored program from its first line.
    pub fn run(&mut self) {
        self.mode = Mode::Run;
        self.interrupted.store(false, Ordering::SeqCst);
        self.reset();
        let result = match self.listing.first_line() {
            Some(first) => self.execute(Position::new(Some(first), 0), None),
            None => Ok(()),
        };
        self.finish(result);
    }

    fn store_line(&mut self, number: u16, text: &str) -> Result<()> {
        let body = text
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_digit());
        if body.trim().is_empty() {
            self.listing.remove(number);
            return Ok(());
        }
        self.listing.set_line(number, text)
    }

    fn execute_direct(&mut self, text: &str) {
        self.mode = Mode::Run;
        self.interrupted.store(false, Ordering::SeqCst);
        let depth = self.frames.len();
        let result = match Line::parse(text, self) {
            Ok(line) => {
                self.direct = line.into_statements().into();
                self.statements = Rc::clone(&self.direct);
                self.loaded = Some(None);
                self.execute(Position::new(None, 0), None)
            }
            Err(error) => {
                self.frames.truncate(depth);
                Err(error)
            }
        };
        self.finish(result);
    }

    fn reset(&mut self) {
        self.frames.reset();
        self.loaded = None;
        self.jump = None;
        self.return_value = None;
    }

    fn finish(&mut self, result: Result<()>) {
        let result = result.and_then(|_| match self.frames.pending_read() {
            Some(resume) => Err(error!(OutOfData, resume.line)),
            None => Ok(()),
        });
        if let Err(error) = result {
            self.report(&error);
        }
        self.frames.truncate(1);
        let root = self.frames.current_mut();
        root.state = FrameState::Running;
        root.read = None;
        self.loaded = None;
        self.direct = Vec::<Leaf>::new().into();
        self.jump = None;
        if self.mode != Mode::Quit {
            self.mode = Mode::Repl;
        }
    }

    fn report(&mut self, error: &Error) {
        if error.code() == ErrorCode::Break {
            match error.line_number() {
                Some(line) => self.console.println(&format!("BREAK IN {}", line)),
                None => self.console.println("BREAK"),
            }
        } else {
            self.console.error(error);
        }
    }

    /// The run loop. With `depth`, returns as soon as the frame a user
    /// function call pushed at that depth is gone.
    fn execute(&mut self, start: Position, depth: Option<usize>) -> Result<()> {
        self.pc = start;
        loop {
            if self.mode != Mode::Run {
                return Ok(());
            }
            if let Some(depth) = depth {
                if self.frames.len() < depth {
                    return Ok(());
                }
            }
            if self.interrupted.swap(false, Ordering::SeqCst) {
                return Err(error!(Break, self.pc.line));
            }
            self.load_line(self.pc.line)?;
            let statements = Rc::clone(&self.statements);
            let statement = match statements.get(self.pc.statement) {
                Some(statement) => statement,
                None => match self.pc.line.and_then(|n| self.listing.next_nonempty_line(n)) {
                    Some(next) => {
                        self.pc = Position::new(Some(next), 0);
                        continue;
                    }
                    None => return Ok(()),
                },
            };
            self.jump = None;
            self.step(statement)
                .map_err(|e| e.in_line_number(self.pc.line))?;
            self.pc = match self.jump.take() {
                Some(jump) => jump,
                None => self.pc.next(),
            };
        }
    }

    fn load_line(&mut self, line: LineNumber) -> Result<()> {
        if self.loaded == Some(line) {
            return Ok(());
        }
        let number = match line {
            Some(number) => number,
            None => {
                self.statements = Rc::clone(&self.direct);
                self.loaded = Some(None);
                return Ok(());
            }
        };
        let text = match self.listing.get_line(number) {
            Some(text) => text.to_string(),
            None => return Err(error!(UndefinedLine, line)),
        };
        let depth = self.frames.len();
        match Line::parse(&text, self) {
            Ok(parsed) => {
                self.statements = parsed.into_statements().into();
                self.loaded = Some(line);
                Ok(())
            }
            Err(error) => {
                self.frames.truncate(depth);
                self.loaded = None;
                Err(error.in_line_number(line))
            }
        }
    }

    /// One statement, unless the active frame is waiting for another.
    fn step(&mut self, statement: &Leaf) -> Result<()> {
        if let FrameState::AwaitingCommand(word) = self.frames.current().state {
            if let (Word::Next, Leaf::Command(Word::For, right)) = (word, statement) {
                let header = self.loop_header(Self::arguments(right.as_deref())?)?;
                return self.push_loop(header);
            }
            if !statement.is_command(word) {
                return Ok(());
            }
            if word == Word::Return {
                self.frames.current_mut().state = FrameState::Running;
                return Ok(());
            }
        }
        self.evaluate(statement).map(|_| ())
    }

    fn evaluate(&mut self, leaf: &Leaf) -> Result<Val> {
        match leaf {
            Leaf::Integer(n) => Ok(Val::Integer(*n)),
            Leaf::Float(f) => Ok(Val::Float(*f)),
            Leaf::String(s) => Ok(Val::String(s.to_string())),
            Leaf::Char(ch) => Ok(Val::String(ch.to_string())),
            Leaf::Identifier(ident, _) => self.identifier(ident, leaf.subscripts()),
            Leaf::Unary(op, right) => {
                let val = self.evaluate(right)?;
                Operation::unary(*op, val)
            }
            Leaf::Binary(op, left, right) => {
                let lhs = self.evaluate(left)?;
                let rhs = self.evaluate(right)?;
                Operation::binary(*op, lhs, rhs)
            }
            Leaf::Assignment(target, value) => {
                let value = self.evaluate(value)?;
                self.store(target, value.clone())?;
                Ok(value)
            }
            Leaf::Grouping(inner) => self.evaluate(inner),
            Leaf::Branch(condition, then_arm, else_arm) => {
                let condition = self.evaluate(condition)?.is_true()?;
                let arm = if condition { then_arm } else { else_arm };
                for statement in arm {
                    self.step(statement)?;
                    if self.jump.is_some() || self.mode != Mode::Run {
                        break;
                    }
                }
                Ok(Val::from_bool(condition))
            }
            Leaf::Command(word, right) => {
                self.command(*word, right.as_deref())?;
                Ok(Val::from_bool(true))
            }
            Leaf::Function(name, args) => match args.arguments(ArgumentKind::FunctionArgument) {
                Some(args) => self.call(name, args),
                None => Err(error!(InternalError; "MALFORMED FUNCTION CALL")),
            },
            Leaf::Arguments(..) => Err(error!(InternalError; "ARGUMENT LIST OUTSIDE A CALL")),
        }
    }

    /// A copy of the value, or the address of the live cell while
    /// `clone_identifiers` is off.
    fn identifier(&mut self, ident: &Ident, subscripts: Option<&[Leaf]>) -> Result<Val> {
        if ident.is_plain() {
            return Err(error!(UndefinedIdentifier; ident.name()));
        }
        let subscripts = self.subscripts(subscripts)?;
        let clone = self.clone_identifiers;
        let var = self.frames.variable_mut(ident)?;
        if clone {
            Ok(var.get(&subscripts)?.clone())
        } else {
            Ok(Val::Integer(memory::cell_address(var.get_mut(&subscripts)?)))
        }
    }

    fn subscripts(&mut self, leaves: Option<&[Leaf]>) -> Result<Vec<i64>> {
        let saved = std::mem::replace(&mut self.clone_identifiers, true);
        let result: Result<Vec<i64>> = leaves
            .unwrap_or(&[])
            .iter()
            .map(|leaf| self.evaluate(leaf).and_then(i64::try_from))
            .collect();
        self.clone_identifiers = saved;
        result
    }

    fn store(&mut self, target: &Leaf, value: Val) -> Result<()> {
        let ident = match target {
            Leaf::Identifier(ident, _) => ident,
            _ => return Err(error!(SyntaxError; "CANNOT ASSIGN TO AN EXPRESSION")),
        };
        if ident.is_plain() {
            return Err(error!(UndefinedIdentifier; ident.name()));
        }
        let subscripts = self.subscripts(target.subscripts())?;
        self.frames.variable_mut(ident)?.assign(&subscripts, value)
    }

    fn arguments(right: Option<&Leaf>) -> Result<&[Leaf]> {
        right
            .and_then(|r| r.arguments(ArgumentKind::FunctionArgument))
            .ok_or_else(|| error!(InternalError; "MALFORMED ARGUMENT LIST"))
    }

    fn command(&mut self, word: Word, right: Option<&Leaf>) -> Result<()> {
        use Word::*;
        match word {
            Auto => self.r#auto(right),
            Data => self.r#data(right),
            Def => self.r#def(right),
            Dim => self.r#dim(right),
            End => {
                self.mode = Mode::Repl;
                Ok(())
            }
            Exit => self.r#exit(),
            For => self.r#for(right),
            Gosub => self.r#gosub(right),
            Goto => self.r#goto(right),
            Input => self.r#input(right),
            Label => self.r#label(right),
            Let => match right {
                Some(assignment) => self.evaluate(assignment).map(|_| ()),
                None => Err(error!(InternalError; "LET WITHOUT ASSIGNMENT")),
            },
            Next => self.r#next(right),
            Poke => self.r#poke(right),
            Print => self.r#print(right),
            Quit => {
                self.mode = Mode::Quit;
                Ok(())
            }
            Read => self.r#read(right),
            Return => self.r#return(right),
            Run => self.run_from(right),
            Stop => Err(error!(Break)),
            Else | If | Rem | Step | Then | To => {
                Err(error!(InternalError; &format!("{} IS NOT A COMMAND", word)))
            }
        }
    }

    fn r#auto(&mut self, right: Option<&Leaf>) -> Result<()> {
        let step = match right {
            Some(leaf) => {
                let step = i64::try_from(self.evaluate(leaf)?)?;
                u16::try_from(step)
                    .ok()
                    .filter(|s| *s > 0 && *s <= LineNumber::max_value())
                    .ok_or_else(|| error!(IllegalQuantity; "AUTO STEP OUT OF RANGE"))?
            }
            None => DEFAULT_AUTO_STEP,
        };
        self.set_auto(Some(step));
        Ok(())
    }

    fn r#data(&mut self, right: Option<&Leaf>) -> Result<()> {
        let literals = Self::arguments(right)?;
        let mut read = match self.frames.current_mut().read.take() {
            Some(read) => read,
            None => return Ok(()),
        };
        for literal in literals {
            let target = match read.targets.get(read.filled) {
                Some(target) => target.clone(),
                None => break,
            };
            self.evaluate(&Leaf::assignment(target, literal.clone()))?;
            read.filled += 1;
        }
        if read.filled < read.targets.len() {
            self.frames.current_mut().read = Some(read);
        } else {
            self.frames.current_mut().state = FrameState::Running;
            self.jump = Some(read.resume);
        }
        Ok(())
    }

    /// Functions are registered while parsing. A definition without a body
    /// skips the lines that follow until its `RETURN`.
    fn r#def(&mut self, right: Option<&Leaf>) -> Result<()> {
        let name = match right {
            Some(Leaf::Function(name, _)) => name,
            _ => return Err(error!(InternalError; "MALFORMED DEF")),
        };
        let bodiless = self
            .frames
            .function(name)
            .map_or(false, |def| matches!(def.body, FunctionBody::Line(_)));
        if bodiless {
            self.frames.current_mut().state = FrameState::AwaitingCommand(Word::Return);
        }
        Ok(())
    }

    fn r#dim(&mut self, right: Option<&Leaf>) -> Result<()> {
        for array in Self::arguments(right)? {
            let ident = match array.ident() {
                Some(ident) if !ident.is_plain() => ident,
                _ => return Err(error!(SyntaxError; "DIM NEEDS A TYPED VARIABLE")),
            };
            let dimensions = self.subscripts(array.subscripts())?;
            self.frames.variable_mut(ident)?.dimension(dimensions)?;
        }
        Ok(())
    }

    fn r#exit(&mut self) -> Result<()> {
        let frame = self.frames.current_mut();
        if frame.loop_state().is_none() {
            return Err(error!(ExitWithoutFor));
        }
        frame.state = FrameState::AwaitingCommand(Word::Next);
        Ok(())
    }

    fn loop_header(&self, args: &[Leaf]) -> Result<LoopHeader> {
        let malformed = || error!(InternalError; "MALFORMED FOR");
        match args {
            [Leaf::Assignment(target, _), to, step] => Ok(LoopHeader {
                variable: target.ident().cloned().ok_or_else(malformed)?,
                to: to.clone(),
                step: step.clone(),
                body: self.pc.next(),
            }),
            _ => Err(malformed()),
        }
    }

    fn r#for(&mut self, right: Option<&Leaf>) -> Result<()> {
        let args = Self::arguments(right)?;
        let header = self.loop_header(args)?;
        let (target, init, to, step) = match args {
            [Leaf::Assignment(target, init), to, step] => (target, init, to, step),
            _ => return Err(error!(InternalError; "MALFORMED FOR")),
        };
        let variable = header.variable.clone();
        self.enter_loop(header)?;
        if let Some(state) = self.frames.current_mut().loop_state_mut() {
            state.started = true;
        }
        let value = self.evaluate(init)?;
        self.store(target, value)?;
        let to = self.evaluate(to)?.numeric()?;
        let step = self.evaluate(step)?.numeric()?;
        let value = self.loop_value(&variable)?;
        let runs = Self::loop_continues(value, &to, &step)?;
        let frame = self.frames.current_mut();
        if let Some(state) = frame.loop_state_mut() {
            state.to = to;
            state.step = step;
        }
        frame.state = if runs {
            FrameState::Running
        } else {
            FrameState::AwaitingCommand(Word::Next)
        };
        Ok(())
    }

    /// Makes the loop's frame the active one. Parsing may have pushed it
    /// already, possibly with frames for later loops on the same line above.
    fn enter_loop(&mut self, header: LoopHeader) -> Result<()> {
        let found = self
            .frames
            .chain()
            .take_while(|i| {
                self.frames
                    .get(*i)
                    .map_or(false, |env| env.loop_state().is_some())
            })
            .find(|i| {
                self.frames
                    .get(*i)
                    .and_then(|env| env.loop_state())
                    .map_or(false, |l| Self::same_loop(&l.header, &header))
            });
        match found {
            Some(index) => {
                self.frames.truncate(index + 1);
                let frame = self.frames.current_mut();
                frame.kind = FrameKind::Loop(Loop::new(header));
                frame.state = FrameState::Running;
                Ok(())
            }
            None => self
                .frames
                .push(FrameKind::Loop(Loop::new(header)), FrameState::Running),
        }
    }

    fn same_loop(a: &LoopHeader, b: &LoopHeader) -> bool {
        a.variable == b.variable && a.body == b.body
    }

    fn loop_value(&self, variable: &Ident) -> Result<Val> {
        match self.frames.variable(variable) {
            Some(var) => Ok(var.get(&[])?.clone()),
            None => Err(error!(UndefinedIdentifier; variable.name())),
        }
    }

    fn loop_continues(value: Val, to: &Val, step: &Val) -> Result<bool> {
        let order = Operation::compare(value, to.clone())?;
        Ok(if step.is_negative()? {
            order != Compare::Less
        } else {
            order != Compare::Greater
        })
    }

    fn r#next(&mut self, right: Option<&Leaf>) -> Result<()> {
        let named = right.and_then(Leaf::ident);
        loop {
            let frame = self.frames.current();
            let state = match frame.loop_state() {
                Some(state) => state,
                None => return Err(error!(NextWithoutFor)),
            };
            if named.map_or(false, |v| *v != state.header.variable) {
                self.frames.pop()?;
                continue;
            }
            if frame.state.is_awaiting() || !state.started {
                self.frames.pop()?;
                return Ok(());
            }
            let variable = state.header.variable.clone();
            let body = state.header.body;
            let to = state.to.clone();
            let step = state.step.clone();
            let candidate = Operation::sum(self.loop_value(&variable)?, step.clone())?;
            if Self::loop_continues(candidate.clone(), &to, &step)? {
                self.frames.variable_mut(&variable)?.assign(&[], candidate)?;
                self.jump = Some(body);
            } else {
                self.frames.pop()?;
            }
            return Ok(());
        }
    }

    /// Resolves a `GOTO`/`GOSUB`/`RUN` target to a stored line.
    fn target(&mut self, right: Option<&Leaf>) -> Result<u16> {
        let number = match right {
            Some(Leaf::Identifier(Ident::Plain(name), None)) => match self.frames.label(name) {
                Some(number) => number,
                None => return Err(error!(UndefinedLine; &format!("NO LABEL {}", name))),
            },
            Some(leaf) => {
                let n = i64::try_from(self.evaluate(leaf)?)?;
                u16::try_from(n).map_err(|_| error!(UndefinedLine; &n.to_string()))?
            }
            None => return Err(error!(InternalError; "MISSING TARGET")),
        };
        match self.listing.get_line(number) {
            Some(_) => Ok(number),
            None => Err(error!(UndefinedLine; &number.to_string())),
        }
    }

    fn r#gosub(&mut self, right: Option<&Leaf>) -> Result<()> {
        let number = self.target(right)?;
        let resume = self.pc.next();
        self.frames
            .push(FrameKind::Gosub(resume), FrameState::Running)?;
        self.jump = Some(Position::new(Some(number), 0));
        Ok(())
    }

    fn r#goto(&mut self, right: Option<&Leaf>) -> Result<()> {
        let number = self.target(right)?;
        self.jump = Some(Position::new(Some(number), 0));
        Ok(())
    }

    fn r#input(&mut self, right: Option<&Leaf>) -> Result<()> {
        let (prompt, targets) = match Self::arguments(right)?.split_first() {
            Some(split) => split,
            None => return Err(error!(InternalError; "MALFORMED INPUT")),
        };
        let prompt = format!("{}? ", self.evaluate(prompt)?);
        let line = match self.console.read_line(&prompt) {
            Some(line) => line,
            None => return Err(error!(Break)),
        };
        let mut fields = line.split(',');
        for target in targets {
            let field = fields.next().unwrap_or("").trim();
            let value = match target.ident() {
                Some(Ident::String(_)) => Val::String(field.to_string()),
                _ => Self::input_number(field)?,
            };
            self.store(target, value)?;
        }
        Ok(())
    }

    fn input_number(field: &str) -> Result<Val> {
        if field.is_empty() {
            return Ok(Val::Integer(0));
        }
        if let Ok(n) = field.parse::<i64>() {
            return Ok(Val::Integer(n));
        }
        field
            .parse::<f64>()
            .map(Val::Float)
            .map_err(|_| error!(TypeMismatch; &format!("{} IS NOT A NUMBER", field)))
    }

    fn r#label(&mut self, right: Option<&Leaf>) -> Result<()> {
        let line = match self.pc.line {
            Some(line) => line,
            None => return Err(error!(IllegalDirect; "LABEL NEEDS A LINE NUMBER")),
        };
        match right {
            Some(Leaf::Identifier(ident, None)) => {
                self.frames.set_label(ident.name().clone(), line);
                Ok(())
            }
            _ => Err(error!(InternalError; "MALFORMED LABEL")),
        }
    }

    fn r#poke(&mut self, right: Option<&Leaf>) -> Result<()> {
        let (address, value) = match Self::arguments(right)? {
            [address, value] => (address, value),
            _ => return Err(error!(InternalError; "MALFORMED POKE")),
        };
        let address = i64::try_from(self.evaluate(address)?)?;
        let value = i64::try_from(self.evaluate(value)?)?;
        let byte = u8::try_from(value)
            .map_err(|_| error!(IllegalQuantity; &format!("{} IS NOT A BYTE", value)))?;
        // Addresses come from POINTER or POINTERVAR; nothing else is checked.
        unsafe { memory::poke(address, byte) }
    }

    fn r#print(&mut self, right: Option<&Leaf>) -> Result<()> {
        for item in Self::arguments(right)? {
            let val = self.evaluate(item)?;
            self.console.write(&val.to_string());
        }
        Ok(())
    }

    fn r#read(&mut self, right: Option<&Leaf>) -> Result<()> {
        let targets = Self::arguments(right)?.to_vec();
        let resume = self.pc.next();
        let frame = self.frames.current_mut();
        frame.read = Some(ReadState {
            targets,
            filled: 0,
            resume,
        });
        frame.state = FrameState::AwaitingCommand(Word::Data);
        Ok(())
    }

    fn r#return(&mut self, right: Option<&Leaf>) -> Result<()> {
        let value = match right {
            Some(leaf) => Some(self.evaluate(leaf)?),
            None => None,
        };
        loop {
            match &self.frames.current().kind {
                FrameKind::Loop(_) => {
                    self.frames.pop()?;
                }
                FrameKind::Gosub(resume) => {
                    self.jump = Some(*resume);
                    self.frames.pop()?;
                    return Ok(());
                }
                FrameKind::Call => {
                    self.return_value = value;
                    self.frames.pop()?;
                    return Ok(());
                }
                FrameKind::Root => return Err(error!(ReturnWithoutGosub)),
            }
        }
    }

    fn run_from(&mut self, right: Option<&Leaf>) -> Result<()> {
        let start = match right {
            Some(_) => Some(self.target(right)?),
            None => self.listing.first_line(),
        };
        self.reset();
        match start {
            Some(number) => self.jump = Some(Position::new(Some(number), 0)),
            None => self.mode = Mode::Repl,
        }
        Ok(())
    }

    fn call(&mut self, name: &Rc<str>, args: &[Leaf]) -> Result<Val> {
        if let Some(def) = self.frames.function(name) {
            return self.call_user(def, args);
        }
        match &**name {
            "LEN" => self.len(args),
            "PEEK" => {
                let address = i64::try_from(self.expect_argument(args, 0)?)?;
                // Reading arbitrary addresses is what PEEK is for.
                let byte = unsafe { memory::peek(address)? };
                Ok(Val::Integer(i64::from(byte)))
            }
            "POINTER" => self.pointer(args),
            "POINTERVAR" => match args.first().and_then(Leaf::ident) {
                Some(ident) if !ident.is_plain() => {
                    let var = self.frames.variable_mut(ident)?;
                    Ok(Val::Integer(memory::address_of_var(var)))
                }
                _ => Err(error!(TypeMismatch; "POINTERVAR EXPECTS A VARIABLE")),
            },
            "RND" => {
                let x = self.expect_argument(args, 0)?;
                self.rnd(x)
            }
            _ => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<Val>>>()?;
                Function::apply(name, values)
            }
        }
    }

    fn expect_argument(&mut self, args: &[Leaf], index: usize) -> Result<Val> {
        match args.get(index) {
            Some(arg) => self.evaluate(arg),
            None => Err(error!(ArgumentCount)),
        }
    }

    /// Strings give their length, arrays their element count.
    fn len(&mut self, args: &[Leaf]) -> Result<Val> {
        if let Some(Leaf::Identifier(ident, None)) = args.first() {
            if !ident.is_plain() {
                let var = self.frames.variable_mut(ident)?;
                if !matches!(ident, Ident::String(_)) || var.len() != 1 {
                    return Ok(Val::Integer(var.len() as i64));
                }
            }
        }
        let val = self.expect_argument(args, 0)?;
        Function::len(val)
    }

    fn pointer(&mut self, args: &[Leaf]) -> Result<Val> {
        match args.first() {
            Some(leaf @ Leaf::Identifier(ident, _)) if !ident.is_plain() => {
                let saved = std::mem::replace(&mut self.clone_identifiers, false);
                let result = self.evaluate(leaf);
                self.clone_identifiers = saved;
                result
            }
            _ => Err(error!(TypeMismatch; "POINTER EXPECTS A VARIABLE")),
        }
    }

    /// Negative reseeds, zero repeats the last value, positive draws anew.
    fn rnd(&mut self, x: Val) -> Result<Val> {
        let x = f64::try_from(x)?;
        if x < 0.0 {
            self.rng = StdRng::seed_from_u64(x.to_bits());
            self.last_rnd = self.rng.gen();
        } else if x > 0.0 {
            self.last_rnd = self.rng.gen();
        }
        Ok(Val::Float(self.last_rnd))
    }

    fn call_user(&mut self, def: Rc<FunctionDef>, args: &[Leaf]) -> Result<Val> {
        if args.len() != def.arity() {
            return Err(error!(ArgumentCount; &def.name));
        }
        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<Val>>>()?;
        self.frames.push(FrameKind::Call, FrameState::Running)?;
        let depth = self.frames.len();
        let result = self.bind(&def, values).and_then(|_| match &def.body {
            FunctionBody::Expression(expr) => self.evaluate(expr),
            FunctionBody::Line(line) => self.call_line(*line, depth),
        });
        self.frames.truncate(depth - 1);
        result
    }

    fn bind(&mut self, def: &FunctionDef, values: Vec<Val>) -> Result<()> {
        for (parameter, value) in def.parameters.iter().zip(values) {
            let mut var = Var::new(parameter)?;
            var.assign(&[], value)?;
            self.frames.bind(var);
        }
        Ok(())
    }

    /// Runs a bodiless function from the line after its `DEF` until the
    /// `RETURN` that pops its frame.
    fn call_line(&mut self, line: u16, depth: usize) -> Result<Val> {
        let start = match self.listing.next_nonempty_line(line) {
            Some(start) => start,
            None => return Err(error!(UndefinedLine; "FUNCTION HAS NO BODY")),
        };
        let pc = self.pc;
        let jump = self.jump.take();
        let loaded = self.loaded.take();
        let statements = Rc::clone(&self.statements);
        self.return_value = None;
        let result = self.execute(Position::new(Some(start), 0), Some(depth));
        self.pc = pc;
        self.jump = jump;
        self.loaded = loaded;
        self.statements = statements;
        result?;
        if self.frames.len() >= depth && self.mode == Mode::Run {
            return Err(error!(UndefinedFunction; "FUNCTION ENDED WITHOUT RETURN"));
        }
        Ok(self.return_value.take().unwrap_or(Val::Integer(0)))
    }
}

impl<C: Console> Scope for Runtime<C> {
    fn is_function(&self, name: &str) -> bool {
        Function::arity(name).is_some() || self.frames.function(name).is_some()
    }

    fn arity(&self, name: &str) -> Option<RangeInclusive<usize>> {
        match self.frames.function(name) {
            Some(def) => Some(def.arity()..=def.arity()),
            None => Function::arity(name),
        }
    }

    fn define_function(&mut self, def: FunctionDef) {
        self.frames.define_function(def);
    }

    /// Opens the frame for a loop body. Parsing the line of a loop that is
    /// already active leaves it alone. Inside a skipped body the new frame
    /// skips to its own `NEXT`.
    fn push_loop(&mut self, header: LoopHeader) -> Result<()> {
        let current = self.frames.current();
        if current
            .loop_state()
            .map_or(false, |l| Self::same_loop(&l.header, &header))
        {
            return Ok(());
        }
        let state = if current.state.is_awaiting() {
            FrameState::AwaitingCommand(Word::Next)
        } else {
            FrameState::Running
        };
        self.frames.push(FrameKind::Loop(Loop::new(header)), state)
    }
}

impl Auto {
    fn new(next: u16, step: u16) -> Option<Auto> {
        if next > LineNumber::max_value() {
            return None;
        }
        Some(Auto { next, step })
    }

    fn after(self, number: u16) -> Option<Auto> {
        Auto::new(number.checked_add(self.step)?, self.step)
    }
}

fn starts_with_digit(text: &str) -> bool {
    text.trim_start().starts_with(|c: char| c.is_ascii_digit())
}
