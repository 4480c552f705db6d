//! # scriptbox
//!
//! A small script language for control devices, and the cooperative
//! interpreter that runs it.
//!
//! Scripts are compiled a line at a time into a compact instruction
//! alphabet. Programs are stored in a fixed region, optionally backed by
//! a file, and executed one statement per tick so the host loop stays
//! responsive while a program runs or waits.
//!
//! ```
//! use scriptbox::mach::{Output, Runtime};
//!
//! let mut runtime = Runtime::default();
//! runtime.enter("x = 6 * 7").unwrap();
//! runtime.enter("println x").unwrap();
//! let text: String = runtime
//!     .take_output()
//!     .into_iter()
//!     .map(|(_, output)| output.to_string())
//!     .collect();
//! assert_eq!(text, "42\n");
//! ```

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

#[path = "doc/chapter_1.rs"]
#[allow(non_snake_case)]
pub mod __Chapter_1;

#[path = "doc/chapter_2.rs"]
#[allow(non_snake_case)]
pub mod __Chapter_2;

#[path = "doc/appendix_a.rs"]
#[allow(non_snake_case)]
pub mod ___Appendix_A;

pub mod lang;
pub mod mach;
