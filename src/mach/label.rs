use super::opcode::{Opcode, PROGRAM_TERMINATOR, STATEMENT_TERMINATOR};
use super::program::ProgramStore;
use crate::lang::cursor::is_name_char;

/// ## Label resolution
///
/// Jumps name their target by label text, not by address. Every jump
/// scans the stored program from its base for the `CL` statement that
/// declares the label, so a jump costs time proportional to the
/// distance of the label from the start of the program. In exchange the
/// compiler stays single pass and nothing needs a jump table.
///
/// Returns the offset of the declaring statement.
pub fn find_label(store: &ProgramStore, label: &[u8]) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let declare = Opcode::Label.code();
    let mut offset = ProgramStore::BASE;
    loop {
        if store.read_byte(offset) == PROGRAM_TERMINATOR {
            return None;
        }
        let is_declaration = declare
            .iter()
            .enumerate()
            .all(|(i, b)| store.read_byte(offset + i).eq_ignore_ascii_case(b));
        if is_declaration && label_matches(store, offset + declare.len(), label) {
            return Some(offset);
        }
        offset = next_statement(store, offset)?;
    }
}

fn label_matches(store: &ProgramStore, start: usize, label: &[u8]) -> bool {
    let same_text = label
        .iter()
        .enumerate()
        .all(|(i, b)| store.read_byte(start + i) == *b);
    same_text && !is_name_char(store.read_byte(start + label.len()))
}

fn next_statement(store: &ProgramStore, offset: usize) -> Option<usize> {
    let mut pos = offset;
    while pos < store.capacity() {
        match store.read_byte(pos) {
            PROGRAM_TERMINATOR => return None,
            STATEMENT_TERMINATOR => return Some(pos + 1),
            _ => pos += 1,
        }
    }
    None
}
