use crate::error;
use crate::lang::{Error, LineNumber, MaxValue};
use std::collections::BTreeMap;

type Result<T> = std::result::Result<T, Error>;

pub const MAX_LINE_LEN: usize = 1024;

/// Stored program text, indexed by line number.
pub trait ProgramStore {
    fn get_line(&self, number: u16) -> Option<&str>;
    fn set_line(&mut self, number: u16, text: &str) -> Result<()>;
    fn next_nonempty_line(&self, after: u16) -> Option<u16>;
    fn first_line(&self) -> Option<u16>;
    fn clear(&mut self);
}

/// ## Program listing
///
/// Lines are kept as entered, line number included, so the run loop
/// re-lexes the same text every time control reaches a line.

#[derive(Debug, Clone, Default)]
pub struct Listing {
    source: BTreeMap<u16, String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn last_line(&self) -> Option<u16> {
        self.source.keys().next_back().copied()
    }

    pub fn remove(&mut self, number: u16) -> Option<String> {
        self.source.remove(&number)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.source.values().map(String::as_str)
    }
}

impl ProgramStore for Listing {
    fn get_line(&self, number: u16) -> Option<&str> {
        self.source.get(&number).map(String::as_str)
    }

    fn set_line(&mut self, number: u16, text: &str) -> Result<()> {
        if number > LineNumber::max_value() {
            return Err(error!(LineNumberRange));
        }
        if text.len() > MAX_LINE_LEN {
            return Err(error!(OutOfMemory, Some(number); "LINE TOO LONG"));
        }
        self.source.insert(number, text.to_string());
        Ok(())
    }

    fn next_nonempty_line(&self, after: u16) -> Option<u16> {
        let start = after.checked_add(1)?;
        self.source.range(start..).map(|(n, _)| *n).next()
    }

    fn first_line(&self) -> Option<u16> {
        self.source.keys().next().copied()
    }

    fn clear(&mut self) {
        self.source.clear();
    }
}
