/*!
# Rust Language Module

This Rust module compiles the indentation-structured script language
into statements of the instruction alphabet.

*/

pub type LineNumber = Option<u16>;

#[macro_use]
mod error;
pub mod compile;
pub mod cursor;
mod keyword;

pub use compile::{Block, BlockKind, Compiler};
pub use error::Error;
pub use error::ErrorCode;
pub use keyword::Keyword;
