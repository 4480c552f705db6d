extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use ansi_term::Style;
use clap::{ArgAction, Parser};
use linefeed::{Interface, ReadResult, Terminal};
use scriptbox::lang::Error;
use scriptbox::mach::{Config, FileStorage, Output, ProgramState, Runtime};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const STATEMENTS_PER_TICK: usize = 5000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Program store image, created when missing
    #[arg(short, long)]
    store: Option<PathBuf>,
    /// Diagnostics level, 0 to 3
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
    diagnostics: Option<u8>,
    /// Raise log verbosity, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Script entered line by line before the prompt
    script: Option<PathBuf>,
}

pub fn main() {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::Level::Error,
        1 => log::Level::Warn,
        2 => log::Level::Info,
        3 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(error) = simple_logger::init_with_level(level) {
        eprintln!("{}", error);
    }
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");
    if let Err(error) = main_loop(args, interrupted) {
        eprintln!("{}", error);
    }
}

fn main_loop(args: Args, interrupted: Arc<AtomicBool>) -> std::io::Result<()> {
    let config = Config::default();
    let mut runtime = match &args.store {
        Some(path) => {
            let storage = FileStorage::open(path, config.store_capacity)?;
            Runtime::new(config).with_storage(Box::new(storage))
        }
        None => Runtime::new(config),
    };
    runtime.set_diagnostics(args.diagnostics.unwrap_or(1));
    let command = Interface::new("scriptbox")?;

    if let Some(path) = &args.script {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            if let Err(error) = runtime.enter(&line?) {
                print_error(&command, &error)?;
            }
            pump(&mut runtime, &command, &interrupted)?;
        }
    }

    loop {
        pump(&mut runtime, &command, &interrupted)?;
        let prompt = if runtime.compiler().is_compiling() {
            format!("{:>3}| ", runtime.compiler().depth())
        } else {
            "> ".to_string()
        };
        command.set_prompt(&prompt)?;
        let string = match command.read_line()? {
            ReadResult::Input(string) => string,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        match runtime.enter(&string) {
            Ok(()) => command.add_history_unique(string),
            Err(error) => print_error(&command, &error)?,
        }
    }
    Ok(())
}

/// Lets a running program execute until it stops, pausing briefly
/// while it waits on a delay.
fn pump<T: Terminal>(
    runtime: &mut Runtime,
    command: &Interface<T>,
    interrupted: &AtomicBool,
) -> std::io::Result<()> {
    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            runtime.interrupt();
        }
        let running = runtime.run_until_idle(STATEMENTS_PER_TICK);
        print_output(runtime, command)?;
        if !running {
            return Ok(());
        }
        if runtime.program_state() == ProgramState::AwaitingDelay {
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

fn print_output<T: Terminal>(runtime: &mut Runtime, command: &Interface<T>) -> std::io::Result<()> {
    for (_, output) in runtime.take_output() {
        match output {
            Output::Diagnostic(text) => command.write_fmt(format_args!(
                "{}\n",
                Style::new().dimmed().paint(format!("?{}", text))
            ))?,
            output => command.write_fmt(format_args!("{}", output))?,
        }
    }
    Ok(())
}

fn print_error<T: Terminal>(command: &Interface<T>, error: &Error) -> std::io::Result<()> {
    command.write_fmt(format_args!(
        "{}\n",
        Style::new().bold().paint(error.to_string())
    ))
}
