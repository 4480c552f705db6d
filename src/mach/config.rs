/// ## Fixed resource limits
///
/// Nothing grows past these limits at run time; exceeding one is an
/// error, never a reallocation.

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Bytes in the program store, including the program terminator.
    pub store_capacity: usize,
    pub variables: usize,
    pub name_len: usize,
    /// Longest statement the interpreter will buffer.
    pub statement_len: usize,
    /// Longest source line the compiler accepts.
    pub line_len: usize,
    pub nesting: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            store_capacity: 2000,
            variables: 20,
            name_len: 10,
            statement_len: 120,
            line_len: 120,
            nesting: 16,
        }
    }
}
