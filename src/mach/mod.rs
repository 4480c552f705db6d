/*!
## Rust Machine Module

This Rust module is the statement interpreter: the instruction alphabet,
the program store with its download filter, and a virtual machine that
runs one statement at a time.

*/

mod config;
pub mod download;
pub mod eval;
mod host;
pub mod label;
pub mod opcode;
pub mod program;
mod runtime;
mod stack;
mod var;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use host::{
    Clock, Destination, ManualClock, Outbox, Output, ReadingId, Readings, SystemClock,
};
pub use opcode::Opcode;
pub use program::{FileStorage, MemoryStorage, ProgramStore, Storage};
pub use runtime::{DeviceState, ProgramState, Runtime, Status};
pub use stack::Stack;
pub use var::{Slot, Variable, VariableTable};
