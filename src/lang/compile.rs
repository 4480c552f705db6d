use super::cursor::{is_name_char, is_name_start, Cursor};
use super::keyword::Keyword;
use super::{Error, ErrorCode, LineNumber};
use crate::error;
use crate::mach::eval::{parse_literal, Comparison, Operator};
use crate::mach::opcode::{label_text, Opcode, STATEMENT_TERMINATOR};
use crate::mach::{Config, Readings, Stack, VariableTable};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    While,
    Forever,
    /// A loop opened by `do`, closed by `until` or `forever`.
    Do,
}

impl BlockKind {
    fn is_loop(self) -> bool {
        self != BlockKind::If
    }
}

/// An open block on the construction stack.
///
/// For loops `label` is the loop top and `label + 1` the exit. For `if`
/// it is the label the block closer declares: the else target, or the
/// end target once `else` has been compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub label: u32,
    pub indent: usize,
    pub else_seen: bool,
}

/// Accumulates the statements of one source line.
struct Emitter<'a> {
    vars: &'a mut VariableTable,
    readings: &'a Readings,
    out: Vec<u8>,
}

impl<'a> Emitter<'a> {
    fn statement(&mut self, opcode: Opcode, args: &[u8]) {
        self.out.extend_from_slice(opcode.code());
        self.out.extend_from_slice(args);
        self.out.push(STATEMENT_TERMINATOR);
    }

    fn label(&mut self, opcode: Opcode, label: u32) {
        self.statement(opcode, label_text(label).as_bytes());
    }

    fn operand(&self, c: &mut Cursor, args: &mut Vec<u8>) -> Result<()> {
        c.skip_spaces();
        let before = c.remaining();
        match c.peek() {
            Some(b) if is_name_start(b) => {
                let (_, len) = self.vars.find(before)?;
                c.advance(len);
            }
            Some(b) if b.is_ascii_digit() || b == b'+' || b == b'-' => {
                parse_literal(c)?;
            }
            Some(b'@') => match self.readings.find(&before[1..]) {
                Some((_, len)) => c.advance(len + 1),
                None => return Err(error!(InvalidReading)),
            },
            _ => return Err(error!(InvalidOperand)),
        }
        let used = before.len() - c.remaining().len();
        args.extend_from_slice(&before[..used]);
        Ok(())
    }

    fn expression(&self, c: &mut Cursor, args: &mut Vec<u8>) -> Result<()> {
        self.operand(c, args)?;
        c.skip_spaces();
        if let Some(op) = Operator::parse(c) {
            args.extend_from_slice(op.as_str().as_bytes());
            self.operand(c, args)?;
        }
        Ok(())
    }

    fn condition(&self, c: &mut Cursor, args: &mut Vec<u8>) -> Result<()> {
        self.operand(c, args)?;
        c.skip_spaces();
        match Comparison::parse(c) {
            Some(cmp) => args.extend_from_slice(cmp.as_str().as_bytes()),
            None => return Err(error!(MissingOperator; "EXPECTED COMPARISON")),
        }
        self.operand(c, args)
    }
}

/// ## Script compiler
///
/// Compiles one source line at a time into statements of the instruction
/// alphabet. Between `begin` and `end` the compiler tracks indentation
/// and keeps a stack of open blocks; a line indented less than the one
/// before it closes blocks until it lines up with the statement that
/// opened one.
///
/// Jump targets are labels allocated from a counter, so every `CL`
/// declaration in one program is unique and the compiler never has to
/// look back at what it already emitted.

#[derive(Debug)]
pub struct Compiler {
    indent: usize,
    opened_block: bool,
    blocks: Stack<Block>,
    next_label: u32,
    compiling: bool,
    line_number: u16,
    program_error: bool,
    emit_on_error: bool,
    line_len: usize,
}

impl Compiler {
    pub fn new(config: &Config) -> Compiler {
        Compiler {
            indent: 0,
            opened_block: false,
            blocks: Stack::new(config.nesting, "TOO MANY NESTED BLOCKS"),
            next_label: 0,
            compiling: false,
            line_number: 0,
            program_error: false,
            emit_on_error: false,
            line_len: config.line_len,
        }
    }

    pub fn is_compiling(&self) -> bool {
        self.compiling
    }

    /// The sticky error flag of the current or last program.
    pub fn has_errors(&self) -> bool {
        self.program_error
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    pub fn labels_allocated(&self) -> u32 {
        self.next_label
    }

    /// Compiles `line` and passes the resulting bytes to `emit`. A line
    /// with an error emits nothing, except `end`, which always emits the
    /// statement that leaves download mode.
    pub fn compile_line<F: FnMut(u8)>(
        &mut self,
        line: &str,
        vars: &mut VariableTable,
        readings: &Readings,
        mut emit: F,
    ) -> Result<()> {
        let line_number: LineNumber = if self.compiling {
            self.line_number = self.line_number.saturating_add(1);
            Some(self.line_number)
        } else {
            None
        };
        let mut e = Emitter {
            vars,
            readings,
            out: vec![],
        };
        match self.line(line, &mut e) {
            Ok(()) => {
                e.out.into_iter().for_each(&mut emit);
                Ok(())
            }
            Err(error) => {
                if self.compiling {
                    self.program_error = true;
                }
                if self.emit_on_error {
                    self.emit_on_error = false;
                    e.out.into_iter().for_each(&mut emit);
                }
                let error = error.in_line_number(line_number).in_source(line);
                log::warn!("compile error: {}", error);
                Err(error)
            }
        }
    }

    fn line(&mut self, line: &str, e: &mut Emitter) -> Result<()> {
        if line.len() > self.line_len {
            return Err(error!(LineBufferOverflow));
        }
        let mut c = Cursor::new(line.trim_end().as_bytes());
        let indent = c.skip_spaces();
        match c.peek() {
            None | Some(b'#') => return Ok(()),
            _ => {}
        }
        if c.remaining().iter().any(|b| b.is_ascii_control()) {
            return Err(error!(SyntaxError; "CONTROL CHARACTER"));
        }
        if c.eat(b'*') {
            if let Some(block) = self.indentation(indent, e)? {
                self.close(block, e);
            }
            return self.direct(&mut c, e);
        }
        let keyword = Keyword::lookup(c.remaining()).map(|(keyword, len)| {
            c.advance(len);
            c.skip_spaces();
            keyword
        });
        match keyword {
            Some(Keyword::Begin) => self.begin(&mut c, e),
            Some(Keyword::End) => self.end(indent, &mut c, e),
            _ => {
                let matched = self.indentation(indent, e)?;
                self.statement(keyword, matched, indent, &mut c, e)?;
                c.skip_spaces();
                if c.is_at_end() {
                    Ok(())
                } else {
                    Err(error!(ExtraText))
                }
            }
        }
    }

    /// Applies the indentation rules. When the line closes blocks, all
    /// but the one opened at the line's own indent are closed here; that
    /// one is popped and returned so the statement can decide how to
    /// close it (`else`, `until`).
    fn indentation(&mut self, indent: usize, e: &mut Emitter) -> Result<Option<Block>> {
        if !self.compiling {
            return Ok(None);
        }
        if self.opened_block {
            self.opened_block = false;
            if indent <= self.indent {
                return Err(error!(IndentExpected));
            }
            self.indent = indent;
            return Ok(None);
        }
        if indent > self.indent {
            return Err(error!(IndentNotAllowed));
        }
        if indent == self.indent {
            return Ok(None);
        }
        self.indent = indent;
        loop {
            let top = match self.blocks.last() {
                Some(top) if top.indent >= indent => *top,
                _ => return Err(error!(IndentMismatch)),
            };
            self.blocks.pop()?;
            if top.indent == indent {
                return Ok(Some(top));
            }
            self.close(top, e);
        }
    }

    fn close(&mut self, block: Block, e: &mut Emitter) {
        match block.kind {
            BlockKind::If => e.label(Opcode::Label, block.label),
            BlockKind::While | BlockKind::Forever | BlockKind::Do => {
                e.label(Opcode::Jump, block.label);
                e.label(Opcode::Label, block.label + 1);
            }
        }
    }

    /// Closes `matched` normally, then reports `code`.
    fn mismatched(&mut self, matched: Option<Block>, code: ErrorCode, e: &mut Emitter) -> Error {
        if let Some(block) = matched {
            self.close(block, e);
        }
        Error::new(code)
    }

    fn allocate_labels(&mut self) -> u32 {
        let label = self.next_label;
        self.next_label += 2;
        label
    }

    fn open(&mut self, kind: BlockKind, label: u32, indent: usize) -> Result<()> {
        self.blocks.push(Block {
            kind,
            label,
            indent,
            else_seen: false,
        })?;
        self.opened_block = true;
        Ok(())
    }

    fn require_program(&self) -> Result<()> {
        if self.compiling {
            Ok(())
        } else {
            Err(error!(NotInProgram))
        }
    }

    fn statement(
        &mut self,
        keyword: Option<Keyword>,
        matched: Option<Block>,
        indent: usize,
        c: &mut Cursor,
        e: &mut Emitter,
    ) -> Result<()> {
        use Keyword::*;
        match (keyword, matched) {
            (Some(Else), _) => return self.r#else(matched, indent, e),
            (Some(Until), _) => return self.r#until(matched, c, e),
            (Some(Endif), Some(block)) if block.kind == BlockKind::If => {
                self.close(block, e);
                return Ok(());
            }
            (Some(Endif), _) => {
                self.require_program()?;
                return Err(self.mismatched(matched, ErrorCode::EndifWithoutIf, e));
            }
            (Some(Endwhile), Some(block))
                if block.kind == BlockKind::While || block.kind == BlockKind::Forever =>
            {
                self.close(block, e);
                return Ok(());
            }
            (Some(Endwhile), _) => {
                self.require_program()?;
                return Err(self.mismatched(matched, ErrorCode::EndwhileWithoutWhile, e));
            }
            (Some(Forever), Some(block)) if block.kind == BlockKind::Do => {
                self.close(block, e);
                return Ok(());
            }
            (_, Some(block)) => self.close(block, e),
            (_, None) => {}
        }
        match keyword {
            None => self.assignment(c, e),
            Some(Set) => self.assignment(c, e),
            Some(Delay) => {
                let mut args = vec![];
                e.expression(c, &mut args)?;
                e.statement(Opcode::Delay, &args);
                Ok(())
            }
            Some(Wait) => {
                let mut args = vec![];
                e.operand(c, &mut args)?;
                args.extend_from_slice(b"*10");
                e.statement(Opcode::Delay, &args);
                Ok(())
            }
            Some(Print) => self.print(c, e, false),
            Some(Println) => self.print(c, e, true),
            Some(Clear) => {
                e.statement(Opcode::ClearVariables, b"");
                Ok(())
            }
            Some(Run) => {
                if self.compiling {
                    return Err(error!(ImmediateOnly));
                }
                if self.program_error {
                    return Err(error!(ProgramHasErrors));
                }
                e.statement(Opcode::Start, b"");
                Ok(())
            }
            Some(Stop) => {
                if self.compiling {
                    return Err(error!(ImmediateOnly));
                }
                e.statement(Opcode::Halt, b"");
                Ok(())
            }
            Some(If) => {
                self.require_program()?;
                let mut args = vec![];
                e.condition(c, &mut args)?;
                let label = self.allocate_labels();
                args.push(b',');
                args.extend_from_slice(label_text(label).as_bytes());
                e.statement(Opcode::JumpIfFalse, &args);
                self.open(BlockKind::If, label, indent)
            }
            Some(While) => {
                self.require_program()?;
                let mut args = vec![];
                e.condition(c, &mut args)?;
                let label = self.allocate_labels();
                args.push(b',');
                args.extend_from_slice(label_text(label + 1).as_bytes());
                e.label(Opcode::Label, label);
                e.statement(Opcode::JumpIfFalse, &args);
                self.open(BlockKind::While, label, indent)
            }
            Some(Forever) | Some(Do) => {
                self.require_program()?;
                let label = self.allocate_labels();
                e.label(Opcode::Label, label);
                let kind = if keyword == Some(Do) {
                    BlockKind::Do
                } else {
                    BlockKind::Forever
                };
                self.open(kind, label, indent)
            }
            Some(Break) | Some(Continue) => {
                self.require_program()?;
                let is_break = keyword == Some(Break);
                let label = match self.blocks.iter_down().find(|b| b.kind.is_loop()) {
                    Some(block) => block.label,
                    None if is_break => return Err(error!(BreakOutsideLoop)),
                    None => return Err(error!(ContinueOutsideLoop)),
                };
                e.label(Opcode::Jump, if is_break { label + 1 } else { label });
                Ok(())
            }
            Some(Begin) | Some(End) | Some(Else) | Some(Until) | Some(Endif)
            | Some(Endwhile) => Err(error!(SyntaxError)),
        }
    }

    fn r#else(&mut self, matched: Option<Block>, indent: usize, e: &mut Emitter) -> Result<()> {
        self.require_program()?;
        match matched {
            Some(block) if block.kind == BlockKind::If && !block.else_seen => {
                let end = block.label + 1;
                e.label(Opcode::Jump, end);
                e.label(Opcode::Label, block.label);
                self.blocks.push(Block {
                    kind: BlockKind::If,
                    label: end,
                    indent,
                    else_seen: true,
                })?;
                self.opened_block = true;
                Ok(())
            }
            _ => Err(self.mismatched(matched, ErrorCode::ElseWithoutIf, e)),
        }
    }

    fn r#until(&mut self, matched: Option<Block>, c: &mut Cursor, e: &mut Emitter) -> Result<()> {
        self.require_program()?;
        match matched {
            Some(block) if block.kind == BlockKind::Do => {
                let mut args = vec![];
                e.condition(c, &mut args)?;
                args.push(b',');
                args.extend_from_slice(label_text(block.label).as_bytes());
                e.statement(Opcode::JumpIfFalse, &args);
                e.label(Opcode::Label, block.label + 1);
                Ok(())
            }
            _ => Err(self.mismatched(matched, ErrorCode::UntilWithoutDo, e)),
        }
    }

    fn assignment(&mut self, c: &mut Cursor, e: &mut Emitter) -> Result<()> {
        let name = c.take_while(is_name_char);
        match name.first() {
            Some(&b) if is_name_start(b) => {}
            _ => return Err(error!(InvalidIdentifier)),
        }
        c.skip_spaces();
        if !c.eat(b'=') {
            return Err(error!(MissingOperator; "EXPECTED ="));
        }
        e.vars.find_or_create(name)?;
        let mut args = name.to_vec();
        args.push(b'=');
        e.expression(c, &mut args)?;
        e.statement(Opcode::SetVariable, &args);
        Ok(())
    }

    fn print(&mut self, c: &mut Cursor, e: &mut Emitter, newline: bool) -> Result<()> {
        match c.peek() {
            None if newline => {}
            None => return Err(error!(InvalidOperand)),
            Some(b'"') => {
                c.advance(1);
                let text = c.take_while(|b| b != b'"');
                if !c.eat(b'"') {
                    return Err(error!(MissingQuote));
                }
                e.statement(Opcode::WriteText, text);
            }
            Some(_) => {
                let mut args = vec![];
                e.expression(c, &mut args)?;
                e.statement(Opcode::WriteValue, &args);
            }
        }
        if newline {
            e.statement(Opcode::WriteLine, b"");
        }
        Ok(())
    }

    fn direct(&mut self, c: &mut Cursor, e: &mut Emitter) -> Result<()> {
        let text = c.remaining();
        if text.is_empty() {
            return Err(error!(SyntaxError; "EMPTY DIRECT STATEMENT"));
        }
        if self.compiling && matches!(text[0], b'R' | b'r') {
            return Err(error!(ImmediateOnly));
        }
        e.out.extend_from_slice(text);
        e.out.push(STATEMENT_TERMINATOR);
        Ok(())
    }

    fn begin(&mut self, c: &mut Cursor, e: &mut Emitter) -> Result<()> {
        if !c.is_at_end() {
            return Err(error!(ExtraText));
        }
        if self.compiling {
            log::info!("program restarted at line {}", self.line_number);
            e.statement(Opcode::AbortDownload, b"");
        }
        self.reset();
        self.compiling = true;
        self.program_error = false;
        self.line_number = 0;
        self.next_label = 0;
        e.statement(Opcode::BeginDownload, b"");
        Ok(())
    }

    fn end(&mut self, indent: usize, c: &mut Cursor, e: &mut Emitter) -> Result<()> {
        if !self.compiling {
            return Err(error!(NotCompiling));
        }
        let mut result = match self.indentation(indent, e) {
            Ok(Some(block)) => {
                self.close(block, e);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(error) => Err(error),
        };
        if result.is_ok() && !c.is_at_end() {
            result = Err(error!(ExtraText));
        }
        if result.is_ok() && !self.blocks.is_empty() {
            result = Err(error!(BlockNotClosed));
        }
        if result.is_ok() && self.program_error {
            result = Err(error!(ProgramHasErrors));
        }
        self.reset();
        match result {
            Ok(()) => {
                e.statement(Opcode::EndDownload, b"");
                Ok(())
            }
            Err(error) => {
                self.program_error = true;
                self.emit_on_error = true;
                e.out.clear();
                e.statement(Opcode::AbortDownload, b"");
                Err(error)
            }
        }
    }

    fn reset(&mut self) {
        self.compiling = false;
        self.indent = 0;
        self.opened_block = false;
        self.blocks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        compiler: Compiler,
        vars: VariableTable,
        readings: Readings,
    }

    impl Harness {
        fn new() -> Harness {
            let config = Config::default();
            let mut readings = Readings::new();
            readings.register("temp", || 20);
            Harness {
                compiler: Compiler::new(&config),
                vars: VariableTable::new(config.variables, config.name_len),
                readings,
            }
        }

        fn line(&mut self, line: &str) -> (Vec<String>, Result<()>) {
            let mut bytes = vec![];
            let result =
                self.compiler
                    .compile_line(line, &mut self.vars, &self.readings, |b| bytes.push(b));
            let statements = String::from_utf8(bytes)
                .unwrap()
                .split_terminator('\r')
                .map(str::to_string)
                .collect();
            (statements, result)
        }

        fn program(&mut self, lines: &[&str]) -> Vec<String> {
            let mut all = vec![];
            for line in lines {
                let (statements, result) = self.line(line);
                assert!(result.is_ok(), "{}: {:?}", line, result);
                all.extend(statements);
            }
            all
        }
    }

    #[test]
    fn test_while_loop() {
        let mut h = Harness::new();
        let out = h.program(&[
            "begin",
            "x = 0",
            "while x < 3",
            "    println x",
            "    x = x + 1",
            "end",
        ]);
        assert_eq!(
            out,
            vec![
                "RM", "VSx=0", "CLl0", "CFx<3,l1", "WVx", "WL", "VSx=x+1", "CJl0", "CLl1", "RX"
            ]
        );
        assert!(!h.compiler.is_compiling());
        assert!(!h.compiler.has_errors());
    }

    #[test]
    fn test_if_else() {
        let mut h = Harness::new();
        let out = h.program(&[
            "begin",
            "set x = 1",
            "if x == 1",
            "  print \"a\"",
            "else",
            "  print \"b\"",
            "end",
        ]);
        assert_eq!(
            out,
            vec!["RM", "VSx=1", "CFx==1,l0", "WTa", "CJl1", "CLl0", "WTb", "CLl1", "RX"]
        );
    }

    #[test]
    fn test_do_until() {
        let mut h = Harness::new();
        let out = h.program(&[
            "begin",
            "n = 0",
            "do",
            "    n = n + 1",
            "until n >= 3",
            "end",
        ]);
        assert_eq!(
            out,
            vec!["RM", "VSn=0", "CLl0", "VSn=n+1", "CFn>=3,l0", "CLl1", "RX"]
        );
    }

    #[test]
    fn test_do_forever_and_break() {
        let mut h = Harness::new();
        let out = h.program(&[
            "begin",
            "do",
            "    if @temp > 30",
            "        break",
            "    wait 2",
            "forever",
            "end",
        ]);
        assert_eq!(
            out,
            vec![
                "RM",
                "CLl0",
                "CF@temp>30,l2",
                "CJl1",
                "CLl2",
                "CD2*10",
                "CJl0",
                "CLl1",
                "RX"
            ]
        );
    }

    #[test]
    fn test_explicit_closers() {
        let mut h = Harness::new();
        let out = h.program(&[
            "begin",
            "forever",
            "    if 1 < 2",
            "        continue",
            "    endif",
            "endwhile",
            "end",
        ]);
        assert_eq!(
            out,
            vec!["RM", "CLl0", "CF1<2,l2", "CJl0", "CLl2", "CJl0", "CLl1", "RX"]
        );
    }

    #[test]
    fn test_labels_are_unique() {
        let mut h = Harness::new();
        let out = h.program(&[
            "begin",
            "i = 0",
            "while i < 2",
            "    j = 0",
            "    while j < 2",
            "        j = j + 1",
            "    i = i + 1",
            "while i > 0",
            "    i = i - 1",
            "end",
        ]);
        let mut declared: Vec<&String> = out.iter().filter(|s| s.starts_with("CL")).collect();
        let count = declared.len();
        declared.sort();
        declared.dedup();
        assert_eq!(declared.len(), count);
        assert_eq!(count, 6);
        assert_eq!(h.compiler.labels_allocated(), 6);
    }

    #[test]
    fn test_blocks_need_a_program() {
        let mut h = Harness::new();
        let (out, result) = h.line("while 1 < 2");
        assert!(out.is_empty());
        assert_eq!(result.unwrap_err().code(), ErrorCode::NotInProgram);
        let (_, result) = h.line("break");
        assert_eq!(result.unwrap_err().code(), ErrorCode::NotInProgram);
        assert!(!h.compiler.has_errors());
    }

    #[test]
    fn test_direct_statements() {
        let mut h = Harness::new();
        assert_eq!(h.program(&["x = 5"]), vec!["VSx=5"]);
        assert_eq!(h.program(&["println"]), vec!["WL"]);
        assert_eq!(h.program(&["run"]), vec!["RS"]);
        assert_eq!(h.program(&["STOP"]), vec!["RH"]);
        assert_eq!(h.program(&["clear"]), vec!["VC"]);
        assert_eq!(h.program(&["*IS"]), vec!["IS"]);
        assert_eq!(h.program(&["# note", "   "]), Vec::<String>::new());
    }

    #[test]
    fn test_indent_expected() {
        let mut h = Harness::new();
        h.program(&["begin"]);
        h.program(&["if 1 < 2"]);
        let (out, result) = h.line("println 1");
        assert!(out.is_empty());
        let error = result.unwrap_err();
        assert_eq!(error.code(), ErrorCode::IndentExpected);
        assert_eq!(error.line_number(), Some(2));
        assert!(h.compiler.has_errors());
        let (out, result) = h.line("end");
        assert_eq!(out, vec!["RA"]);
        assert_eq!(result.unwrap_err().code(), ErrorCode::BlockNotClosed);
    }

    #[test]
    fn test_errors_are_sticky() {
        let mut h = Harness::new();
        h.program(&["begin", "x = 1"]);
        let (out, result) = h.line("x = ");
        assert!(out.is_empty());
        assert_eq!(result.unwrap_err().code(), ErrorCode::InvalidOperand);
        let (out, _) = h.line("x = 2");
        assert_eq!(out, vec!["VSx=2"]);
        let (out, result) = h.line("end");
        assert_eq!(out, vec!["RA"]);
        assert_eq!(result.unwrap_err().code(), ErrorCode::ProgramHasErrors);
        let (out, result) = h.line("run");
        assert!(out.is_empty());
        assert_eq!(result.unwrap_err().code(), ErrorCode::ProgramHasErrors);
        h.program(&["begin", "end"]);
        assert!(!h.compiler.has_errors());
    }

    #[test]
    fn test_indentation_errors() {
        let mut h = Harness::new();
        h.program(&["begin", "x = 1"]);
        let (_, result) = h.line("  x = 2");
        assert_eq!(result.unwrap_err().code(), ErrorCode::IndentNotAllowed);
        h.program(&["while x < 9", "    if x == 3", "        x = 4"]);
        let (_, result) = h.line("  x = 5");
        assert_eq!(result.unwrap_err().code(), ErrorCode::IndentMismatch);
    }

    #[test]
    fn test_mismatched_closers() {
        let mut h = Harness::new();
        h.program(&["begin", "while 1 < 2", "    x = 1"]);
        let (out, result) = h.line("endif");
        assert!(out.is_empty());
        assert_eq!(result.unwrap_err().code(), ErrorCode::EndifWithoutIf);
        let (_, result) = h.line("else");
        assert_eq!(result.unwrap_err().code(), ErrorCode::ElseWithoutIf);
        let (_, result) = h.line("until 1 < 2");
        assert_eq!(result.unwrap_err().code(), ErrorCode::UntilWithoutDo);
        let (_, result) = h.line("break");
        assert_eq!(result.unwrap_err().code(), ErrorCode::BreakOutsideLoop);
    }

    #[test]
    fn test_continue_outside_loop() {
        let mut h = Harness::new();
        h.program(&["begin", "if 1 < 2"]);
        let (out, result) = h.line("    continue");
        assert!(out.is_empty());
        assert_eq!(result.unwrap_err().code(), ErrorCode::ContinueOutsideLoop);
        assert!(h.compiler.has_errors());
    }

    #[test]
    fn test_begin_restarts_program() {
        let mut h = Harness::new();
        h.program(&["begin", "forever", "    println 1"]);
        let (out, result) = h.line("begin");
        assert!(result.is_ok());
        assert_eq!(out, vec!["RA", "RM"]);
        assert_eq!(h.compiler.depth(), 0);
        let out = h.program(&["x = 0", "while x < 2", "    x = x + 1", "end"]);
        assert_eq!(
            out,
            vec!["VSx=0", "CLl0", "CFx<2,l1", "VSx=x+1", "CJl0", "CLl1", "RX"]
        );
    }

    #[test]
    fn test_remote_passthrough_rejected_in_program() {
        let mut h = Harness::new();
        h.program(&["begin"]);
        let (out, result) = h.line("*RA");
        assert!(out.is_empty());
        assert_eq!(result.unwrap_err().code(), ErrorCode::ImmediateOnly);
        let (_, result) = h.line("*rx");
        assert_eq!(result.unwrap_err().code(), ErrorCode::ImmediateOnly);
        assert!(h.compiler.is_compiling());
        assert_eq!(h.program(&["*WTraw"]), vec!["WTraw"]);
    }

    #[test]
    fn test_run_and_stop_rejected_in_program() {
        let mut h = Harness::new();
        h.program(&["begin"]);
        let (out, result) = h.line("run");
        assert!(out.is_empty());
        assert_eq!(result.unwrap_err().code(), ErrorCode::ImmediateOnly);
        let (_, result) = h.line("stop");
        assert_eq!(result.unwrap_err().code(), ErrorCode::ImmediateOnly);
    }

    #[test]
    fn test_operands_checked() {
        let mut h = Harness::new();
        let (_, result) = h.line("println y");
        assert_eq!(result.unwrap_err().code(), ErrorCode::VariableNotFound);
        let (_, result) = h.line("println @pressure");
        assert_eq!(result.unwrap_err().code(), ErrorCode::InvalidReading);
        let (_, result) = h.line("print \"open");
        assert_eq!(result.unwrap_err().code(), ErrorCode::MissingQuote);
        let (_, result) = h.line("x 5");
        assert_eq!(result.unwrap_err().code(), ErrorCode::MissingOperator);
        assert!(h.vars.is_empty());
        let (_, result) = h.line("end");
        assert_eq!(result.unwrap_err().code(), ErrorCode::NotCompiling);
    }

    #[test]
    fn test_nesting_limit() {
        let mut h = Harness::new();
        h.program(&["begin"]);
        for depth in 0..16 {
            let line = format!("{}forever", " ".repeat(depth));
            h.program(&[line.as_str()]);
        }
        let (_, result) = h.line(&format!("{}forever", " ".repeat(16)));
        assert_eq!(result.unwrap_err().code(), ErrorCode::NestingTooDeep);
    }
}
