use super::opcode::{PROGRAM_TERMINATOR, STATEMENT_TERMINATOR};
use crate::error;
use crate::lang::Error;
use std::convert::TryInto;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Error>;

/// Byte-addressable persistent region.
pub trait Storage {
    fn len(&self) -> usize;
    fn read(&self, offset: usize) -> u8;
    fn write(&mut self, offset: usize, byte: u8);
    /// Makes every write so far durable.
    fn commit(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    bytes: Vec<u8>,
}

impl MemoryStorage {
    pub fn new(capacity: usize) -> MemoryStorage {
        MemoryStorage {
            bytes: vec![PROGRAM_TERMINATOR; capacity],
        }
    }
}

impl Storage for MemoryStorage {
    fn len(&self) -> usize {
        self.bytes.len()
    }
    fn read(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(PROGRAM_TERMINATOR)
    }
    fn write(&mut self, offset: usize, byte: u8) {
        if let Some(b) = self.bytes.get_mut(offset) {
            *b = byte;
        }
    }
    fn commit(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// ## File backed storage
///
/// The image is the region followed by its CRC-32 (little endian).
/// An image of the wrong size or with a bad checksum loads as empty.

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> io::Result<FileStorage> {
        let path = path.as_ref().to_path_buf();
        let mut bytes = vec![PROGRAM_TERMINATOR; capacity];
        match fs::read(&path) {
            Ok(image) => match verify_image(&image, capacity) {
                Some(region) => bytes.copy_from_slice(region),
                None => log::warn!("ignoring damaged program image {}", path.display()),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(FileStorage { path, bytes })
    }
}

fn verify_image(image: &[u8], capacity: usize) -> Option<&[u8]> {
    if image.len() != capacity + 4 {
        return None;
    }
    let (region, sum) = image.split_at(capacity);
    let sum = u32::from_le_bytes(sum.try_into().ok()?);
    if crc::crc32::checksum_ieee(region) == sum {
        Some(region)
    } else {
        None
    }
}

impl Storage for FileStorage {
    fn len(&self) -> usize {
        self.bytes.len()
    }
    fn read(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(PROGRAM_TERMINATOR)
    }
    fn write(&mut self, offset: usize, byte: u8) {
        if let Some(b) = self.bytes.get_mut(offset) {
            *b = byte;
        }
    }
    fn commit(&mut self) -> io::Result<()> {
        let mut image = self.bytes.clone();
        image.extend_from_slice(&crc::crc32::checksum_ieee(&self.bytes).to_le_bytes());
        fs::write(&self.path, image)
    }
}

/// Outcome of reading one statement from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Program terminator or the end of the region.
    End,
    /// The statement was copied out; `next` is where the following one starts.
    Statement { next: usize, truncated: bool },
}

/// ## Program store
///
/// The compiled statement stream lives at the base of the region and
/// ends at the program terminator. Downloads append through a write
/// cursor and always keep room for the terminator.

pub struct ProgramStore {
    storage: Box<dyn Storage>,
    cursor: usize,
    valid: bool,
}

impl std::fmt::Debug for ProgramStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ProgramStore {{ capacity: {}, cursor: {}, valid: {} }}",
            self.capacity(),
            self.cursor,
            self.valid
        )
    }
}

impl ProgramStore {
    pub const BASE: usize = 0;

    pub fn new(storage: Box<dyn Storage>) -> ProgramStore {
        let valid = storage.read(Self::BASE) != PROGRAM_TERMINATOR;
        ProgramStore {
            storage,
            cursor: Self::BASE,
            valid,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Bytes of the stored program, not counting the terminator.
    pub fn len(&self) -> usize {
        (Self::BASE..self.capacity())
            .position(|offset| self.storage.read(offset) == PROGRAM_TERMINATOR)
            .unwrap_or_else(|| self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_byte(&self, offset: usize) -> u8 {
        if offset < self.capacity() {
            self.storage.read(offset)
        } else {
            PROGRAM_TERMINATOR
        }
    }

    pub fn begin_download(&mut self) -> Result<()> {
        self.cursor = Self::BASE;
        self.valid = false;
        self.storage.write(Self::BASE, PROGRAM_TERMINATOR);
        self.commit()
    }

    pub fn append_byte(&mut self, byte: u8) -> Result<()> {
        if self.cursor + 1 >= self.capacity() {
            return Err(error!(StoreFull));
        }
        self.storage.write(self.cursor, byte);
        self.cursor += 1;
        Ok(())
    }

    pub fn finish_download(&mut self) -> Result<()> {
        self.storage.write(self.cursor, PROGRAM_TERMINATOR);
        self.valid = true;
        self.commit()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.cursor = Self::BASE;
        self.valid = false;
        self.storage.write(Self::BASE, PROGRAM_TERMINATOR);
        self.commit()
    }

    fn commit(&mut self) -> Result<()> {
        match self.storage.commit() {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("program store commit failed: {}", e);
                Err(error!(StorageFailure))
            }
        }
    }

    /// Copies the statement at `offset` into `buf`, without its terminator.
    /// At most `max_len` bytes are kept; the rest of the statement is
    /// skipped and reported as truncated.
    pub fn fetch(&self, offset: usize, buf: &mut Vec<u8>, max_len: usize) -> Fetch {
        buf.clear();
        if self.read_byte(offset) == PROGRAM_TERMINATOR {
            return Fetch::End;
        }
        let mut pos = offset;
        let mut truncated = false;
        loop {
            let byte = self.read_byte(pos);
            if byte == PROGRAM_TERMINATOR {
                break;
            }
            pos += 1;
            if byte == STATEMENT_TERMINATOR {
                break;
            }
            if buf.len() < max_len {
                buf.push(byte);
            } else {
                truncated = true;
            }
        }
        Fetch::Statement {
            next: pos,
            truncated,
        }
    }
}
