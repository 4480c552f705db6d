//! # scriptbox
//!
//! Console for the script interpreter.
//!

mod term;

fn main() {
    term::main();
}
