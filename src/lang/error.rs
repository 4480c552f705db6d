use super::LineNumber;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    line_number: LineNumber,
    source: Option<String>,
    message: &'static str,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            source: None,
            message: "",
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }

    pub fn source_line(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_direct(&self) -> bool {
        self.line_number.is_none()
    }

    pub fn in_line_number(self, line: LineNumber) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            line_number: line,
            ..self
        }
    }

    pub fn in_source(self, source: &str) -> Error {
        Error {
            source: Some(source.trim_end().to_string()),
            ..self
        }
    }

    pub fn message(self, message: &'static str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error { message, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SyntaxError = 2,
    InvalidOperand = 3,
    MissingOperator = 4,
    Overflow = 6,
    DivisionByZero = 11,
    IllegalDirect = 12,
    InvalidIdentifier = 13,
    LineBufferOverflow = 23,
    ExtraText = 24,
    MissingQuote = 25,
    IndentNotAllowed = 30,
    IndentExpected = 31,
    IndentMismatch = 32,
    NotInProgram = 33,
    ElseWithoutIf = 34,
    EndifWithoutIf = 35,
    EndwhileWithoutWhile = 36,
    UntilWithoutDo = 37,
    BreakOutsideLoop = 38,
    ContinueOutsideLoop = 39,
    BlockNotClosed = 40,
    NestingTooDeep = 41,
    NotCompiling = 42,
    ProgramHasErrors = 43,
    ImmediateOnly = 44,
    LabelNotFound = 50,
    MissingDestination = 51,
    VariableNotFound = 60,
    UsingUnassignedVariable = 61,
    NoRoomForVariable = 62,
    NameTooLong = 63,
    InvalidReading = 64,
    StoreFull = 70,
    StatementTooLong = 71,
    StorageFailure = 72,
    NoProgram = 73,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        use ErrorCode::*;
        match self {
            SyntaxError => "SYNTAX ERROR",
            InvalidOperand => "INVALID OPERAND",
            MissingOperator => "MISSING OPERATOR",
            Overflow => "OVERFLOW",
            DivisionByZero => "DIVISION BY ZERO",
            IllegalDirect => "ILLEGAL DIRECT",
            InvalidIdentifier => "INVALID IDENTIFIER",
            LineBufferOverflow => "LINE BUFFER OVERFLOW",
            ExtraText => "UNEXPECTED TEXT",
            MissingQuote => "MISSING QUOTE",
            IndentNotAllowed => "INDENT NOT ALLOWED",
            IndentExpected => "INDENT EXPECTED",
            IndentMismatch => "UNMATCHED INDENT",
            NotInProgram => "ONLY IN PROGRAM",
            ElseWithoutIf => "ELSE WITHOUT IF",
            EndifWithoutIf => "ENDIF WITHOUT IF",
            EndwhileWithoutWhile => "ENDWHILE WITHOUT WHILE",
            UntilWithoutDo => "UNTIL WITHOUT DO",
            BreakOutsideLoop => "BREAK OUTSIDE LOOP",
            ContinueOutsideLoop => "CONTINUE OUTSIDE LOOP",
            BlockNotClosed => "BLOCK NOT CLOSED",
            NestingTooDeep => "NESTING TOO DEEP",
            NotCompiling => "END WITHOUT BEGIN",
            ProgramHasErrors => "PROGRAM HAS ERRORS",
            ImmediateOnly => "NOT ALLOWED IN PROGRAM",
            LabelNotFound => "LABEL NOT FOUND",
            MissingDestination => "MISSING DESTINATION",
            VariableNotFound => "VARIABLE NOT FOUND",
            UsingUnassignedVariable => "UNASSIGNED VARIABLE",
            NoRoomForVariable => "NO ROOM FOR VARIABLE",
            NameTooLong => "NAME TOO LONG",
            InvalidReading => "INVALID READING",
            StoreFull => "PROGRAM STORE FULL",
            StatementTooLong => "STATEMENT TOO LONG",
            StorageFailure => "STORAGE FAILURE",
            NoProgram => "NO PROGRAM",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(line_number) = self.line_number {
            write!(f, " IN {}", line_number)?;
        }
        if !self.message.is_empty() {
            write!(f, "; {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
