/*!
## Rust Machine Module

This Rust module is a tree-walking evaluator for BASIC. Stored lines are
parsed as control reaches them and evaluated directly from the syntax tree.

*/

mod console;
mod env;
mod function;
mod listing;
pub mod memory;
mod operation;
mod runtime;
mod stack;
mod val;
mod var;

pub use console::Buffer;
pub use console::Console;
pub use env::FrameKind;
pub use env::FrameState;
pub use env::Frames;
pub use env::Loop;
pub use env::ReadState;
pub use function::Function;
pub use listing::Listing;
pub use listing::ProgramStore;
pub use listing::MAX_LINE_LEN;
pub use operation::Operation;
pub use runtime::Mode;
pub use runtime::Runtime;
pub use stack::Stack;
pub use val::Val;
pub use var::ElementType;
pub use var::Var;
