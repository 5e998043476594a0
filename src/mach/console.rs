use crate::lang::Error;
use std::collections::VecDeque;

/// Where `PRINT`, `INPUT` and error reports go.
pub trait Console {
    fn write(&mut self, s: &str);

    fn println(&mut self, s: &str) {
        self.write(s);
        self.write("\n");
    }

    /// One line of input without its line ending, `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    fn error(&mut self, error: &Error) {
        self.println(&format!("?{}: {}", error.category(), error));
    }
}

/// ## In-memory console
///
/// Collects output and serves queued input lines. Used when no terminal is
/// attached and throughout the tests.

#[derive(Debug, Default)]
pub struct Buffer {
    output: String,
    input: VecDeque<String>,
}

impl Buffer {
    pub fn push_input(&mut self, line: &str) {
        self.input.push_back(line.to_string());
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Console for Buffer {
    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.write(prompt);
        let line = self.input.pop_front()?;
        self.println(&line);
        Some(line)
    }
}
