extern crate ansi_term;
extern crate clap;
extern crate ctrlc;
extern crate linefeed;
use ansi_term::Style;
use basic::error;
use basic::lang::Error;
use basic::mach::{Console, Listing, Mode, ProgramStore, Runtime};
use clap::Parser;
use linefeed::{Completer, Completion, DefaultTerminal, Interface, Prompter, ReadResult, Signal, Terminal};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "basic7", version, about = "A line-numbered BASIC 7.0 style interpreter")]
struct Args {
    /// Program to load and run
    file: Option<PathBuf>,

    /// Stay at the prompt after running FILE
    #[arg(short, long)]
    interactive: bool,

    /// Start with AUTO line numbering at this step
    #[arg(long, value_name = "STEP")]
    auto: Option<u16>,
}

pub fn main() {
    let args = Args::parse();
    let result = match &args.file {
        Some(file) if !args.interactive => {
            let mut runtime = Runtime::new(Stdio);
            install_interrupt(&runtime);
            if load_file(&mut runtime, file) {
                runtime.run();
            }
            Ok(())
        }
        _ => Term::new().and_then(|term| repl(Runtime::new(term), &args)),
    };
    if let Err(error) = result {
        eprintln!("{}", error);
    }
}

fn install_interrupt<C: Console>(runtime: &Runtime<C>) {
    let flag = runtime.interrupt_flag();
    if let Err(error) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        eprintln!(
            "{}",
            Style::new()
                .bold()
                .paint(format!("Error setting Ctrl-C handler: {}", error))
        );
    }
}

fn load_file<C: Console>(runtime: &mut Runtime<C>, path: &Path) -> bool {
    let result = match File::open(path) {
        Ok(file) => runtime.load(BufReader::new(file)),
        Err(e) => Err(error!(InternalError; &format!("{}: {}", path.display(), e))),
    };
    match result {
        Ok(_) => true,
        Err(error) => {
            runtime.console_mut().error(&error);
            false
        }
    }
}

fn repl(mut runtime: Runtime<Term>, args: &Args) -> io::Result<()> {
    install_interrupt(&runtime);
    if let Some(path) = &args.file {
        if load_file(&mut runtime, path) {
            runtime.run();
        }
    }
    runtime.set_auto(args.auto);
    runtime.console_mut().println("READY.");
    while runtime.mode() != Mode::Quit {
        let prompt = match runtime.auto_line() {
            Some(number) => format!("{} ", number),
            None => String::new(),
        };
        let listing = runtime.listing().clone();
        let term = runtime.console_mut();
        term.complete_from(listing);
        let line = match term.read_command(&prompt)? {
            Some(line) => line,
            None => break,
        };
        if runtime.enter(&line) {
            runtime.console_mut().add_history(line);
        }
    }
    Ok(())
}

/// Interactive console on a linefeed interface.
struct Term {
    interface: Interface<DefaultTerminal>,
}

impl Term {
    fn new() -> io::Result<Term> {
        let interface = Interface::new("BASIC")?;
        interface.set_report_signal(Signal::Interrupt, true);
        Ok(Term { interface })
    }

    fn read_command(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.interface.set_prompt(prompt)?;
        match self.interface.read_line()? {
            ReadResult::Input(line) => Ok(Some(line)),
            ReadResult::Signal(Signal::Interrupt) => {
                self.interface.set_buffer("")?;
                Ok(Some(String::new()))
            }
            ReadResult::Signal(_) | ReadResult::Eof => Ok(None),
        }
    }

    fn complete_from(&mut self, listing: Listing) {
        self.interface
            .set_completer(Arc::new(LineCompleter::new(listing)));
    }

    fn add_history(&mut self, line: String) {
        self.interface.add_history_unique(line);
    }
}

impl Console for Term {
    fn write(&mut self, s: &str) {
        if let Err(error) = self.interface.write_fmt(format_args!("{}", s)) {
            eprintln!("{}", error);
        }
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.interface.set_prompt(prompt).ok()?;
        match self.interface.read_line() {
            Ok(ReadResult::Input(line)) => Some(line),
            Ok(ReadResult::Signal(Signal::Interrupt)) => {
                let _ = self.interface.set_buffer("");
                None
            }
            _ => None,
        }
    }

    fn error(&mut self, error: &Error) {
        let report = format!("?{}: {}", error.category(), error);
        self.println(&Style::new().bold().paint(report).to_string());
    }
}

/// Plain stdio for running a file without the prompt.
struct Stdio;

impl Console for Stdio {
    fn write(&mut self, s: &str) {
        let mut out = io::stdout();
        if let Err(error) = out.write_all(s.as_bytes()).and_then(|_| out.flush()) {
            eprintln!("{}", error);
        }
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.write(prompt);
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()),
        }
    }

    fn error(&mut self, error: &Error) {
        eprintln!(
            "{}",
            Style::new()
                .bold()
                .paint(format!("?{}: {}", error.category(), error))
        );
    }
}

/// Typing a line number then TAB brings back the stored line for editing.
struct LineCompleter {
    listing: Listing,
}

impl LineCompleter {
    fn new(listing: Listing) -> LineCompleter {
        LineCompleter { listing }
    }
}

impl<T: Terminal> Completer<T> for LineCompleter {
    fn complete(
        &self,
        _word: &str,
        prompter: &Prompter<T>,
        _start: usize,
        _end: usize,
    ) -> Option<Vec<Completion>> {
        let number = prompter.buffer().trim().parse::<u16>().ok()?;
        let text = self.listing.get_line(number)?;
        let mut completion = Completion::simple(text.to_string());
        completion.suffix = linefeed::complete::Suffix::None;
        Some(vec![completion])
    }
}
