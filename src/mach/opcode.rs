/// ## Instruction alphabet
///
/// Every statement is `<category><sub-command><arguments>` followed by
/// [`STATEMENT_TERMINATOR`]. A stored program ends at
/// [`PROGRAM_TERMINATOR`]. The same statements arrive live from a
/// transport or are replayed from the program store.
///
/// For example: `while x<3` compiles to `CLl0`, `CFx<3,l1`.

pub const STATEMENT_TERMINATOR: u8 = b'\r';
pub const PROGRAM_TERMINATOR: u8 = 0;

pub const LABEL_PREFIX: u8 = b'l';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // *** Program control
    /// Wait a number of tenths of a second without blocking.
    Delay,
    /// Declares a jump target. Does nothing when executed.
    Label,
    Jump,
    /// Jump with probability one half.
    CoinToss,
    JumpIfTrue,
    JumpIfFalse,

    // *** Remote management
    BeginDownload,
    Start,
    Halt,
    Pause,
    Resume,
    ClearProgram,
    /// Only meaningful to the download filter.
    EndDownload,
    /// Only meaningful to the download filter.
    AbortDownload,

    // *** Variables
    ClearVariables,
    SetVariable,
    ViewVariable,

    // *** Output
    WriteText,
    WriteLine,
    WriteValue,

    // *** Information
    Version,
    Status,
    Diagnostics,

    Comment,
}

const TABLE: [(Opcode, &[u8; 2]); 23] = [
    (Opcode::Delay, b"CD"),
    (Opcode::Label, b"CL"),
    (Opcode::Jump, b"CJ"),
    (Opcode::CoinToss, b"CC"),
    (Opcode::JumpIfTrue, b"CT"),
    (Opcode::JumpIfFalse, b"CF"),
    (Opcode::BeginDownload, b"RM"),
    (Opcode::Start, b"RS"),
    (Opcode::Halt, b"RH"),
    (Opcode::Pause, b"RP"),
    (Opcode::Resume, b"RR"),
    (Opcode::ClearProgram, b"RC"),
    (Opcode::EndDownload, b"RX"),
    (Opcode::AbortDownload, b"RA"),
    (Opcode::ClearVariables, b"VC"),
    (Opcode::SetVariable, b"VS"),
    (Opcode::ViewVariable, b"VV"),
    (Opcode::WriteText, b"WT"),
    (Opcode::WriteLine, b"WL"),
    (Opcode::WriteValue, b"WV"),
    (Opcode::Version, b"IV"),
    (Opcode::Status, b"IS"),
    (Opcode::Diagnostics, b"ID"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Info,
    Control,
    Remote,
    Variable,
    Write,
    Comment,
}

impl Category {
    pub fn decode(byte: u8) -> Option<Category> {
        match byte.to_ascii_uppercase() {
            b'I' => Some(Category::Info),
            b'C' => Some(Category::Control),
            b'R' => Some(Category::Remote),
            b'V' => Some(Category::Variable),
            b'W' => Some(Category::Write),
            b'#' => Some(Category::Comment),
            _ => None,
        }
    }
}

impl Opcode {
    /// Decodes the first two bytes of a statement. Unknown pairs decode
    /// to `None` and are ignored by the interpreter.
    pub fn decode(category: u8, sub: Option<u8>) -> Option<Opcode> {
        if Category::decode(category)? == Category::Comment {
            return Some(Opcode::Comment);
        }
        let pair = [category.to_ascii_uppercase(), sub?.to_ascii_uppercase()];
        TABLE
            .iter()
            .find(|(_, code)| **code == pair)
            .map(|(opcode, _)| *opcode)
    }

    pub fn category(self) -> Category {
        match self.code()[0] {
            b'I' => Category::Info,
            b'C' => Category::Control,
            b'R' => Category::Remote,
            b'V' => Category::Variable,
            b'W' => Category::Write,
            _ => Category::Comment,
        }
    }

    pub fn code(self) -> &'static [u8] {
        match TABLE.iter().find(|(opcode, _)| *opcode == self) {
            Some((_, code)) => *code,
            None => b"#",
        }
    }
}

/// Text of label number `n` as it appears in jump and label statements.
pub fn label_text(n: u32) -> String {
    format!("{}{}", LABEL_PREFIX as char, n)
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.code()))
    }
}
