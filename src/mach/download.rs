use super::opcode::STATEMENT_TERMINATOR;
use super::program::ProgramStore;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    LineStart,
    GotR,
    Storing,
    Skipping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// `RX` arrived; the program is terminated and marked valid.
    Finished,
    /// `RA` arrived; the store has been cleared.
    Aborted,
}

/// ## Download filter
///
/// Decides which bytes of an incoming stream become part of the stored
/// program. Remote management lines (those starting with `R`) are never
/// stored: `RX` completes the download, `RA` abandons it, and any other
/// `R` line is dropped. Control characters other than the statement
/// terminator are dropped everywhere.
///
/// Once the store overflows, the rest of the download is discarded and
/// the closing `RX` behaves like `RA`.

#[derive(Debug)]
pub struct DownloadFilter {
    state: FilterState,
    overflowed: bool,
}

impl Default for DownloadFilter {
    fn default() -> DownloadFilter {
        DownloadFilter {
            state: FilterState::LineStart,
            overflowed: false,
        }
    }
}

impl DownloadFilter {
    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn has_overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn reset(&mut self) {
        self.state = FilterState::LineStart;
        self.overflowed = false;
    }

    fn store(&mut self, byte: u8, store: &mut ProgramStore) -> Result<()> {
        if self.overflowed {
            return Ok(());
        }
        if let Err(error) = store.append_byte(byte) {
            self.overflowed = true;
            return Err(error);
        }
        Ok(())
    }

    pub fn process(&mut self, byte: u8, store: &mut ProgramStore) -> Result<Step> {
        use FilterState::*;
        if byte.is_ascii_control() && byte != STATEMENT_TERMINATOR {
            return Ok(Step::Continue);
        }
        match self.state {
            LineStart => match byte {
                b'r' | b'R' => self.state = GotR,
                STATEMENT_TERMINATOR => {}
                _ => {
                    self.state = Storing;
                    self.store(byte, store)?;
                }
            },
            GotR => match byte {
                b'x' | b'X' if self.overflowed => {
                    self.reset();
                    store.clear()?;
                    return Ok(Step::Aborted);
                }
                b'x' | b'X' => {
                    self.reset();
                    store.finish_download()?;
                    return Ok(Step::Finished);
                }
                b'a' | b'A' => {
                    self.reset();
                    store.clear()?;
                    return Ok(Step::Aborted);
                }
                STATEMENT_TERMINATOR => self.state = LineStart,
                _ => self.state = Skipping,
            },
            Storing => {
                if byte == STATEMENT_TERMINATOR {
                    self.state = LineStart;
                }
                self.store(byte, store)?;
            }
            Skipping => {
                if byte == STATEMENT_TERMINATOR {
                    self.state = LineStart;
                }
            }
        }
        Ok(Step::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use crate::mach::program::MemoryStorage;

    fn feed(filter: &mut DownloadFilter, store: &mut ProgramStore, bytes: &[u8]) -> Vec<Step> {
        bytes
            .iter()
            .map(|b| filter.process(*b, store).unwrap())
            .filter(|s| *s != Step::Continue)
            .collect()
    }

    fn stored(store: &ProgramStore) -> Vec<u8> {
        (0..store.len()).map(|i| store.read_byte(i)).collect()
    }

    fn new_store(capacity: usize) -> ProgramStore {
        let mut s = ProgramStore::new(Box::new(MemoryStorage::new(capacity)));
        s.begin_download().unwrap();
        s
    }

    #[test]
    fn test_stores_and_finishes() {
        let mut f = DownloadFilter::default();
        let mut s = new_store(64);
        let steps = feed(&mut f, &mut s, b"WThello\r\nVSx=1\rRX\r");
        assert_eq!(steps, vec![Step::Finished]);
        assert_eq!(stored(&s), b"WThello\rVSx=1\r");
        assert!(s.is_valid());
    }

    #[test]
    fn test_drops_other_remote_lines() {
        let mut f = DownloadFilter::default();
        let mut s = new_store(64);
        feed(&mut f, &mut s, b"WL\rRS\rrh\rWL\r");
        assert_eq!(stored(&s), b"WL\rWL\r");
        assert_eq!(f.state(), FilterState::LineStart);
    }

    #[test]
    fn test_abort_clears() {
        let mut f = DownloadFilter::default();
        let mut s = new_store(64);
        let steps = feed(&mut f, &mut s, b"WL\rra");
        assert_eq!(steps, vec![Step::Aborted]);
        assert!(s.is_empty());
        assert!(!s.is_valid());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut f = DownloadFilter::default();
        let mut s = new_store(4);
        let mut result = Ok(Step::Continue);
        for b in b"WTabc\r" {
            result = f.process(*b, &mut s);
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result.unwrap_err().code(), ErrorCode::StoreFull);
        assert!(f.has_overflowed());
    }

    #[test]
    fn test_end_after_overflow_aborts() {
        let mut f = DownloadFilter::default();
        let mut s = new_store(4);
        let steps: Vec<_> = b"WTabcdef\rWL\rRX\r"
            .iter()
            .filter_map(|b| f.process(*b, &mut s).ok())
            .filter(|s| *s != Step::Continue)
            .collect();
        assert_eq!(steps, vec![Step::Aborted]);
        assert!(!s.is_valid());
        assert!(s.is_empty());
        assert!(!f.has_overflowed());
    }
}
