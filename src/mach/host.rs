use crate::lang::cursor::{is_name_char, is_name_start};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond time source.
pub trait Clock {
    fn millis(&self) -> u64;
}

pub struct SystemClock {
    started: Instant,
}

impl Default for SystemClock {
    fn default() -> SystemClock {
        SystemClock {
            started: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> ManualClock {
        ManualClock::default()
    }
    pub fn set(&self, millis: u64) {
        self.now.set(millis)
    }
    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis)
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u64 {
        self.now.get()
    }
}

pub type ReadingId = usize;

/// ## Named readings
///
/// Maps the `@name` operands of expressions to host functions. Lookup
/// yields an index that is later used to take the reading.

#[derive(Default)]
pub struct Readings {
    entries: Vec<(String, Box<dyn Fn() -> i32>)>,
}

impl std::fmt::Debug for Readings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|(n, _)| n.as_str()).collect();
        write!(f, "Readings {:?}", names)
    }
}

impl Readings {
    pub fn new() -> Readings {
        Readings::default()
    }

    /// Registers `reader` under `name`, replacing any earlier reader of
    /// the same name.
    pub fn register<F: Fn() -> i32 + 'static>(&mut self, name: &str, reader: F) {
        let reader: Box<dyn Fn() -> i32> = Box::new(reader);
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = reader,
            None => self.entries.push((name.to_string(), reader)),
        }
    }

    /// Finds the reading named at the start of `text` (after the `@`).
    pub fn find(&self, text: &[u8]) -> Option<(ReadingId, usize)> {
        if !is_name_start(*text.first()?) {
            return None;
        }
        let len = text.iter().take_while(|&&b| is_name_char(b)).count();
        let name = &text[..len];
        self.entries
            .iter()
            .position(|(n, _)| n.as_bytes().eq_ignore_ascii_case(name))
            .map(|id| (id, len))
    }

    pub fn read(&self, id: ReadingId) -> Option<i32> {
        self.entries.get(id).map(|(_, reader)| reader())
    }
}

/// Opaque identity of whoever should receive output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Destination(pub u8);

impl Destination {
    pub const CONSOLE: Destination = Destination(0);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Text(String),
    LineBreak,
    Value(i32),
    Diagnostic(String),
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Output::Text(s) => write!(f, "{}", s),
            Output::LineBreak => writeln!(f),
            Output::Value(n) => write!(f, "{}", n),
            Output::Diagnostic(s) => writeln!(f, "?{}", s),
        }
    }
}

/// Fire-and-forget output queue, drained by the host loop.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<(Destination, Output)>,
}

impl Outbox {
    pub fn push(&mut self, dest: Destination, output: Output) {
        self.queue.push_back((dest, output));
    }
    pub fn drain(&mut self) -> Vec<(Destination, Output)> {
        self.queue.drain(..).collect()
    }
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_lookup() {
        let mut r = Readings::new();
        r.register("temp", || 21);
        r.register("light", || 400);
        assert_eq!(r.find(b"light>5"), Some((1, 5)));
        assert_eq!(r.find(b"lightning"), None);
        assert_eq!(r.read(0), Some(21));
        r.register("temp", || 22);
        assert_eq!(r.read(0), Some(22));
        assert_eq!(r.read(9), None);
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(250);
        assert_eq!(other.millis(), 250);
    }
}
