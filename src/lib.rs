//! # BASIC 7.0
//!
//! A line-numbered BASIC in the style of the Commodore 128, as a library
//! and a small terminal program.
//!
//! Begin by opening a terminal and running `basic7`. Lines typed with a
//! number are stored, lines without one run at once.
//! ```text
//! READY.
//! 10 FOR I# = 1 TO 3
//! 20 PRINT I#
//! 30 NEXT I#
//! RUN
//! 1
//! 2
//! 3
//! ```
//!
//! Variable names carry their type: `A$` is a string, `A#` an integer and
//! `A%` a float. Names without a sigil are only used for `LABEL` targets
//! and functions.
//!
//! `basic7 program.bas` loads a file of numbered lines and runs it.
//!
//! The [`lang`] module turns one line of text into statements. The
//! [`mach`] module owns the program, the frames and the run loop.
//!
//! ```
//! use basic::mach::Runtime;
//!
//! let mut r = Runtime::default();
//! r.enter("10 A# = 3 + 2");
//! r.enter("20 PRINT A#");
//! r.enter("RUN");
//! assert_eq!(r.console_mut().take_output(), "5\n");
//! ```

pub mod lang;
pub mod mach;
