use super::download::{DownloadFilter, Step};
use super::eval::Evaluator;
use super::host::{Clock, Destination, Outbox, Output, Readings, SystemClock};
use super::label::find_label;
use super::opcode::{Category, Opcode, STATEMENT_TERMINATOR};
use super::program::{Fetch, MemoryStorage, ProgramStore, Storage};
use super::{Config, VariableTable};
use crate::error;
use crate::lang::cursor::{is_name_char, is_name_start, Cursor};
use crate::lang::{Compiler, Error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Stopped,
    Paused,
    Active,
    /// Active, but no statement runs until the delay deadline passes.
    AwaitingDelay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    ExecuteImmediately,
    /// Incoming bytes go through the download filter into the store.
    StoreProgram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Live,
    Program,
}

/// Snapshot reported by the `IS` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub program: ProgramState,
    pub device: DeviceState,
    pub pc: usize,
    pub program_len: usize,
    pub program_valid: bool,
    pub variables: usize,
    pub diagnostics: u8,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let program = match self.program {
            ProgramState::Stopped => "STOPPED",
            ProgramState::Paused => "PAUSED",
            ProgramState::Active => "ACTIVE",
            ProgramState::AwaitingDelay => "DELAY",
        };
        let device = match self.device {
            DeviceState::ExecuteImmediately => "EXECUTE",
            DeviceState::StoreProgram => "STORE",
        };
        write!(
            f,
            "PROGRAM {} AT {}; DEVICE {}; {} BYTES{}; {} VARIABLES; DIAGNOSTICS {}",
            program,
            self.pc,
            device,
            self.program_len,
            if self.program_valid { "" } else { " INVALID" },
            self.variables,
            self.diagnostics
        )
    }
}

/// ## Virtual machine
///
/// The runtime owns every piece of interpreter state and is driven from
/// outside: bytes arrive through `receive`, and the host loop calls
/// `execute_one_statement` whenever it has nothing better to do. No call
/// ever blocks; a delay only records a deadline.
///
/// Statements are executed from the same text whether they were typed
/// live or replayed from the program store, except that program control
/// (`C`) statements only make sense inside a stored program.

pub struct Runtime {
    config: Config,
    compiler: Compiler,
    vars: VariableTable,
    readings: Readings,
    store: ProgramStore,
    filter: DownloadFilter,
    clock: Box<dyn Clock>,
    rng: StdRng,
    outbox: Outbox,
    program_state: ProgramState,
    device_state: DeviceState,
    pc: usize,
    deadline: u64,
    program_dest: Destination,
    line: Vec<u8>,
    discard_line: bool,
    statement: Vec<u8>,
    diagnostics: u8,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(Config::default())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("status", &self.status())
            .field("store", &self.store)
            .finish()
    }
}

impl Runtime {
    pub const MAX_DIAGNOSTICS: u8 = 3;

    pub fn new(config: Config) -> Runtime {
        let storage = MemoryStorage::new(config.store_capacity);
        Runtime {
            compiler: Compiler::new(&config),
            vars: VariableTable::new(config.variables, config.name_len),
            readings: Readings::new(),
            store: ProgramStore::new(Box::new(storage)),
            filter: DownloadFilter::default(),
            clock: Box::new(SystemClock::default()),
            rng: StdRng::from_entropy(),
            outbox: Outbox::default(),
            program_state: ProgramState::Stopped,
            device_state: DeviceState::ExecuteImmediately,
            pc: ProgramStore::BASE,
            deadline: 0,
            program_dest: Destination::CONSOLE,
            line: Vec::with_capacity(config.statement_len),
            discard_line: false,
            statement: Vec::with_capacity(config.statement_len),
            diagnostics: 0,
            config,
        }
    }

    /// Replaces the program store. A program left in persistent storage
    /// is valid again, but does not start until asked to.
    pub fn with_storage(mut self, storage: Box<dyn Storage>) -> Runtime {
        self.store = ProgramStore::new(storage);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Runtime {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Runtime {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn readings_mut(&mut self) -> &mut Readings {
        &mut self.readings
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn store(&self) -> &ProgramStore {
        &self.store
    }

    pub fn variables(&self) -> &VariableTable {
        &self.vars
    }

    /// Value of a variable, `None` when it does not exist or was never
    /// assigned.
    pub fn variable(&self, name: &str) -> Option<i32> {
        let (slot, len) = self.vars.find(name.as_bytes()).ok()?;
        if len != name.len() {
            return None;
        }
        self.vars.variable(slot).and_then(|v| v.value())
    }

    pub fn program_state(&self) -> ProgramState {
        self.program_state
    }

    pub fn device_state(&self) -> DeviceState {
        self.device_state
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.program_state,
            ProgramState::Active | ProgramState::AwaitingDelay
        )
    }

    pub fn diagnostics(&self) -> u8 {
        self.diagnostics
    }

    pub fn set_diagnostics(&mut self, level: u8) {
        self.diagnostics = level.min(Self::MAX_DIAGNOSTICS);
    }

    pub fn status(&self) -> Status {
        Status {
            program: self.program_state,
            device: self.device_state,
            pc: self.pc,
            program_len: self.store.len(),
            program_valid: self.store.is_valid(),
            variables: self.vars.len(),
            diagnostics: self.diagnostics,
        }
    }

    pub fn take_output(&mut self) -> Vec<(Destination, Output)> {
        self.outbox.drain()
    }

    /// Compiles one line of script and feeds the result to the machine as
    /// if it arrived from the console.
    pub fn enter(&mut self, line: &str) -> Result<()> {
        let mut bytes = vec![];
        let result =
            self.compiler
                .compile_line(line, &mut self.vars, &self.readings, |b| bytes.push(b));
        for byte in bytes {
            self.receive(byte, Destination::CONSOLE);
        }
        result
    }

    /// Feeds one byte of the statement stream. While storing, bytes go
    /// to the download filter; otherwise they are assembled into a line
    /// and executed when the statement terminator arrives.
    pub fn receive(&mut self, byte: u8, dest: Destination) {
        match self.device_state {
            DeviceState::StoreProgram => self.download(byte, dest),
            DeviceState::ExecuteImmediately => self.assemble(byte, dest),
        }
    }

    fn download(&mut self, byte: u8, dest: Destination) {
        match self.filter.process(byte, &mut self.store) {
            Ok(Step::Continue) => {}
            Ok(Step::Finished) => {
                self.device_state = DeviceState::ExecuteImmediately;
                self.discard_line = true;
                log::info!("download complete, {} bytes", self.store.len());
                self.note(dest, "DOWNLOAD COMPLETE");
                self.start(dest);
            }
            Ok(Step::Aborted) => {
                self.device_state = DeviceState::ExecuteImmediately;
                self.discard_line = true;
                log::info!("download aborted");
                self.note(dest, "DOWNLOAD ABORTED");
            }
            Err(error) => {
                let cleared = self.store.clear();
                self.report(dest, error);
                if let Err(error) = cleared {
                    self.report(dest, error);
                }
            }
        }
    }

    fn assemble(&mut self, byte: u8, dest: Destination) {
        if byte == STATEMENT_TERMINATOR {
            let line = std::mem::take(&mut self.line);
            if self.discard_line {
                self.discard_line = false;
            } else if !line.is_empty() {
                self.execute(&line, Origin::Live, dest);
            }
            self.line = line;
            self.line.clear();
            return;
        }
        if byte.is_ascii_control() || self.discard_line {
            return;
        }
        if self.line.len() >= self.config.statement_len {
            self.line.clear();
            self.discard_line = true;
            self.report(dest, error!(StatementTooLong));
            return;
        }
        self.line.push(byte);
    }

    /// Executes the next stored statement if the program may run.
    /// Returns whether the program is still running.
    pub fn execute_one_statement(&mut self) -> bool {
        match self.program_state {
            ProgramState::Stopped | ProgramState::Paused => return false,
            ProgramState::AwaitingDelay => {
                if self.clock.millis() < self.deadline {
                    return true;
                }
                self.program_state = ProgramState::Active;
            }
            ProgramState::Active => {}
        }
        let mut statement = std::mem::take(&mut self.statement);
        match self
            .store
            .fetch(self.pc, &mut statement, self.config.statement_len)
        {
            Fetch::End => {
                log::debug!("program ended at {}", self.pc);
                self.set_program_state(ProgramState::Stopped, self.program_dest);
            }
            Fetch::Statement { next, truncated } => {
                self.pc = next;
                if truncated {
                    self.report(self.program_dest, error!(StatementTooLong));
                } else {
                    self.execute(&statement, Origin::Program, self.program_dest);
                }
            }
        }
        self.statement = statement;
        self.is_running()
    }

    /// Runs statements until the program stops or `max` statements have
    /// been attempted. Returns whether the program is still running.
    pub fn run_until_idle(&mut self, max: usize) -> bool {
        for _ in 0..max {
            if !self.execute_one_statement() {
                return false;
            }
        }
        self.is_running()
    }

    /// Stops a running program, e.g. on Ctrl-C.
    pub fn interrupt(&mut self) {
        if self.program_state != ProgramState::Stopped {
            log::info!("program interrupted at {}", self.pc);
            self.set_program_state(ProgramState::Stopped, self.program_dest);
        }
    }

    fn execute(&mut self, statement: &[u8], origin: Origin, dest: Destination) {
        if self.diagnostics >= 3 {
            let text = String::from_utf8_lossy(statement).into_owned();
            self.outbox.push(dest, Output::Diagnostic(text));
        }
        log::trace!("{:?}: {}", origin, String::from_utf8_lossy(statement));
        let mut cursor = Cursor::new(statement);
        let category = match cursor.next() {
            Some(byte) => byte,
            None => return,
        };
        let sub = cursor.next();
        let opcode = match Opcode::decode(category, sub) {
            Some(opcode) => opcode,
            None => {
                log::debug!("ignored: {}", String::from_utf8_lossy(statement));
                return;
            }
        };
        let result = match opcode.category() {
            Category::Control => self.control(opcode, &mut cursor, origin),
            Category::Remote => self.remote(opcode, dest),
            Category::Variable => self.variable_statement(opcode, &mut cursor, dest),
            Category::Write => self.write(opcode, &mut cursor, dest),
            Category::Info => self.info(opcode, &mut cursor, dest),
            Category::Comment => Ok(()),
        };
        if let Err(error) = result {
            let error = error.in_source(&String::from_utf8_lossy(statement));
            self.report(dest, error);
        }
    }

    fn control(&mut self, opcode: Opcode, c: &mut Cursor, origin: Origin) -> Result<()> {
        if origin == Origin::Live {
            return Err(error!(IllegalDirect));
        }
        match opcode {
            Opcode::Delay => {
                let tenths = Evaluator::new(&self.vars, &self.readings).value(c)?;
                let millis = u64::from(tenths.max(0) as u32) * 100;
                self.deadline = self.clock.millis().saturating_add(millis);
                self.program_state = ProgramState::AwaitingDelay;
                Ok(())
            }
            Opcode::Label => Ok(()),
            Opcode::Jump => {
                let target = label_operand(c)?;
                self.jump(target)
            }
            Opcode::CoinToss => {
                let target = label_operand(c)?;
                if self.rng.gen_bool(0.5) {
                    self.jump(target)
                } else {
                    Ok(())
                }
            }
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let outcome = Evaluator::new(&self.vars, &self.readings).condition(c)?;
                c.skip_spaces();
                if !c.eat(b',') {
                    return Err(error!(MissingDestination));
                }
                let target = label_operand(c)?;
                if outcome == (opcode == Opcode::JumpIfTrue) {
                    self.jump(target)
                } else {
                    Ok(())
                }
            }
            _ => Err(error!(SyntaxError)),
        }
    }

    fn jump(&mut self, label: &[u8]) -> Result<()> {
        match find_label(&self.store, label) {
            Some(offset) => {
                self.pc = offset;
                Ok(())
            }
            None => Err(error!(LabelNotFound)),
        }
    }

    fn remote(&mut self, opcode: Opcode, dest: Destination) -> Result<()> {
        match opcode {
            Opcode::BeginDownload => {
                if self.program_state != ProgramState::Stopped {
                    self.set_program_state(ProgramState::Stopped, dest);
                }
                self.filter.reset();
                self.store.begin_download()?;
                self.device_state = DeviceState::StoreProgram;
                log::info!("download started");
                self.note(dest, "STORING PROGRAM");
                Ok(())
            }
            Opcode::Start => {
                if !self.store.is_valid() || self.store.is_empty() {
                    return Err(error!(NoProgram));
                }
                self.start(dest);
                Ok(())
            }
            Opcode::Halt => {
                self.set_program_state(ProgramState::Stopped, dest);
                Ok(())
            }
            Opcode::Pause => {
                if self.is_running() {
                    self.set_program_state(ProgramState::Paused, dest);
                }
                Ok(())
            }
            Opcode::Resume => {
                if self.program_state == ProgramState::Paused {
                    let state = if self.clock.millis() < self.deadline {
                        ProgramState::AwaitingDelay
                    } else {
                        ProgramState::Active
                    };
                    self.set_program_state(state, dest);
                }
                Ok(())
            }
            Opcode::ClearProgram => {
                self.set_program_state(ProgramState::Stopped, dest);
                self.pc = ProgramStore::BASE;
                self.store.clear()
            }
            Opcode::EndDownload | Opcode::AbortDownload => {
                log::debug!("{} outside download", opcode);
                Ok(())
            }
            _ => Err(error!(SyntaxError)),
        }
    }

    fn start(&mut self, dest: Destination) {
        self.pc = ProgramStore::BASE;
        self.program_dest = dest;
        self.set_program_state(ProgramState::Active, dest);
    }

    fn variable_statement(&mut self, opcode: Opcode, c: &mut Cursor, dest: Destination) -> Result<()> {
        match opcode {
            Opcode::ClearVariables => {
                self.vars.clear();
                Ok(())
            }
            Opcode::SetVariable => {
                c.skip_spaces();
                let name = name_operand(c)?;
                c.skip_spaces();
                if !c.eat(b'=') {
                    return Err(error!(MissingOperator; "EXPECTED ="));
                }
                let value = Evaluator::new(&self.vars, &self.readings).value(c)?;
                let (slot, _) = self.vars.find_or_create(name)?;
                self.vars.set(slot, value)
            }
            Opcode::ViewVariable => {
                c.skip_spaces();
                let name = name_operand(c)?;
                let (slot, _) = self.vars.find(name)?;
                let output = match self.vars.variable(slot).and_then(|v| v.value()) {
                    Some(value) => Output::Value(value),
                    None => Output::Text("UNASSIGNED".to_string()),
                };
                self.outbox.push(dest, output);
                Ok(())
            }
            _ => Err(error!(SyntaxError)),
        }
    }

    fn write(&mut self, opcode: Opcode, c: &mut Cursor, dest: Destination) -> Result<()> {
        let output = match opcode {
            Opcode::WriteText => Output::Text(String::from_utf8_lossy(c.remaining()).into_owned()),
            Opcode::WriteLine => Output::LineBreak,
            Opcode::WriteValue => {
                Output::Value(Evaluator::new(&self.vars, &self.readings).value(c)?)
            }
            _ => return Err(error!(SyntaxError)),
        };
        self.outbox.push(dest, output);
        Ok(())
    }

    fn info(&mut self, opcode: Opcode, c: &mut Cursor, dest: Destination) -> Result<()> {
        match opcode {
            Opcode::Version => {
                let version = format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                self.outbox.push(dest, Output::Text(version));
            }
            Opcode::Status => {
                let status = self.status().to_string();
                self.outbox.push(dest, Output::Text(status));
            }
            Opcode::Diagnostics => {
                let level = Evaluator::new(&self.vars, &self.readings).value(c)?;
                self.set_diagnostics(level.max(0).min(i32::from(Self::MAX_DIAGNOSTICS)) as u8);
            }
            _ => return Err(error!(SyntaxError)),
        }
        Ok(())
    }

    fn set_program_state(&mut self, state: ProgramState, dest: Destination) {
        if self.program_state == state {
            return;
        }
        log::debug!("program {:?} -> {:?}", self.program_state, state);
        self.program_state = state;
        if self.diagnostics >= 2 {
            let text = match state {
                ProgramState::Stopped => "PROGRAM STOPPED",
                ProgramState::Paused => "PROGRAM PAUSED",
                ProgramState::Active => "PROGRAM ACTIVE",
                ProgramState::AwaitingDelay => "PROGRAM DELAYED",
            }
            .to_string();
            self.outbox.push(dest, Output::Diagnostic(text));
        }
    }

    fn note(&mut self, dest: Destination, text: &str) {
        if self.diagnostics >= 2 {
            self.outbox.push(dest, Output::Diagnostic(text.to_string()));
        }
    }

    fn report(&mut self, dest: Destination, error: Error) {
        log::warn!("{}", error);
        if self.diagnostics >= 1 {
            self.outbox.push(dest, Output::Diagnostic(error.to_string()));
        }
    }
}

fn name_operand<'a>(c: &mut Cursor<'a>) -> Result<&'a [u8]> {
    let name = c.take_while(is_name_char);
    match name.first() {
        Some(&b) if is_name_start(b) => Ok(name),
        _ => Err(error!(InvalidIdentifier)),
    }
}

fn label_operand<'a>(c: &mut Cursor<'a>) -> Result<&'a [u8]> {
    c.skip_spaces();
    let label = c.take_while(is_name_char);
    if label.is_empty() {
        Err(error!(MissingDestination))
    } else {
        Ok(label)
    }
}
