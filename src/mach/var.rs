use crate::error;
use crate::lang::cursor::{is_name_char, is_name_start};
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

pub type Slot = usize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variable {
    name: String,
    value: i32,
    assigned: bool,
    empty: bool,
}

impl Variable {
    fn vacant() -> Variable {
        Variable {
            empty: true,
            ..Variable::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<i32> {
        if self.assigned {
            Some(self.value)
        } else {
            None
        }
    }
}

/// ## Variable memory
///
/// A fixed number of slots searched linearly by name. Slots are created
/// on first use and only ever freed all at once by [`clear`].
///
/// [`clear`]: VariableTable::clear

#[derive(Debug)]
pub struct VariableTable {
    slots: Vec<Variable>,
    name_len: usize,
}

impl VariableTable {
    pub fn new(capacity: usize, name_len: usize) -> VariableTable {
        VariableTable {
            slots: vec![Variable::vacant(); capacity],
            name_len,
        }
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Variable::vacant();
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|v| !v.empty).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupied slots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.slots.iter().filter(|v| !v.empty)
    }

    /// Finds the variable named at the start of `text`, returning its slot
    /// and the number of bytes the name occupies.
    pub fn find(&self, text: &[u8]) -> Result<(Slot, usize)> {
        let len = name_len(text)?;
        let name = &text[..len];
        match self
            .slots
            .iter()
            .position(|v| !v.empty && v.name.as_bytes() == name)
        {
            Some(slot) => Ok((slot, len)),
            None => Err(error!(VariableNotFound)),
        }
    }

    pub fn create(&mut self, text: &[u8]) -> Result<(Slot, usize)> {
        let len = name_len(text)?;
        let slot = match self.slots.iter().position(|v| v.empty) {
            Some(slot) => slot,
            None => return Err(error!(NoRoomForVariable)),
        };
        if len > self.name_len {
            return Err(error!(NameTooLong));
        }
        self.slots[slot] = Variable {
            name: String::from_utf8_lossy(&text[..len]).into_owned(),
            value: 0,
            assigned: false,
            empty: false,
        };
        Ok((slot, len))
    }

    pub fn find_or_create(&mut self, text: &[u8]) -> Result<(Slot, usize)> {
        match self.find(text) {
            Err(e) if e.code() == crate::lang::ErrorCode::VariableNotFound => self.create(text),
            found => found,
        }
    }

    pub fn get(&self, slot: Slot) -> Result<i32> {
        match self.slots.get(slot) {
            Some(v) if !v.empty => match v.value() {
                Some(value) => Ok(value),
                None => Err(error!(UsingUnassignedVariable)),
            },
            _ => Err(error!(VariableNotFound)),
        }
    }

    pub fn set(&mut self, slot: Slot, value: i32) -> Result<()> {
        match self.slots.get_mut(slot) {
            Some(v) if !v.empty => {
                v.value = value;
                v.assigned = true;
                Ok(())
            }
            _ => Err(error!(VariableNotFound)),
        }
    }

    pub fn variable(&self, slot: Slot) -> Option<&Variable> {
        self.slots.get(slot).filter(|v| !v.empty)
    }
}

fn name_len(text: &[u8]) -> Result<usize> {
    match text.first() {
        Some(&b) if is_name_start(b) => {}
        _ => return Err(error!(InvalidIdentifier)),
    }
    Ok(text.iter().take_while(|&&b| is_name_char(b)).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_lifecycle() {
        let mut vars = VariableTable::new(4, 10);
        assert_eq!(vars.find(b"x+1").unwrap_err().code(), ErrorCode::VariableNotFound);
        let (slot, len) = vars.create(b"x+1").unwrap();
        assert_eq!(len, 1);
        assert_eq!(vars.get(slot).unwrap_err().code(), ErrorCode::UsingUnassignedVariable);
        vars.set(slot, 42).unwrap();
        assert_eq!(vars.get(slot).unwrap(), 42);
        assert_eq!(vars.find(b"x").unwrap(), (slot, 1));
    }

    #[test]
    fn test_names_must_end_at_the_same_place() {
        let mut vars = VariableTable::new(4, 10);
        vars.create(b"count").unwrap();
        assert!(vars.find(b"counter").is_err());
        assert!(vars.find(b"cou").is_err());
        assert!(vars.find(b"count<3").is_ok());
    }

    #[test]
    fn test_no_room_keeps_existing() {
        let mut vars = VariableTable::new(2, 10);
        let (a, _) = vars.create(b"a").unwrap();
        vars.set(a, 7).unwrap();
        vars.create(b"b").unwrap();
        assert_eq!(vars.create(b"c").unwrap_err().code(), ErrorCode::NoRoomForVariable);
        assert_eq!(vars.get(a).unwrap(), 7);
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_name_too_long_releases_slot() {
        let mut vars = VariableTable::new(1, 4);
        assert_eq!(vars.create(b"toolong").unwrap_err().code(), ErrorCode::NameTooLong);
        assert!(vars.is_empty());
        assert!(vars.create(b"ok").is_ok());
    }

    #[test]
    fn test_invalid_identifier_and_clear() {
        let mut vars = VariableTable::new(2, 4);
        assert_eq!(vars.create(b"9x").unwrap_err().code(), ErrorCode::InvalidIdentifier);
        vars.find_or_create(b"x").unwrap();
        vars.find_or_create(b"x").unwrap();
        assert_eq!(vars.len(), 1);
        vars.clear();
        assert!(vars.is_empty());
        assert_eq!(vars.capacity(), 2);
    }
}
