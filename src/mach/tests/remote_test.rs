use super::*;
use crate::mach::{DeviceState, FileStorage, ProgramState};

#[test]
fn test_abort_download() {
    let (mut r, _clock) = manual_runtime(Config::default());
    send(&mut r, b"RM\rWTa\r");
    assert_eq!(r.device_state(), DeviceState::StoreProgram);
    send(&mut r, b"RA\r");
    assert_eq!(r.device_state(), DeviceState::ExecuteImmediately);
    assert!(!r.store().is_valid());
    assert!(r.store().is_empty());
    send(&mut r, b"RS\r");
    assert_eq!(run(&mut r), "?NO PROGRAM: RS\n");
}

#[test]
fn test_output_goes_to_starter() {
    let (mut r, _clock) = manual_runtime(Config::default());
    let remote = Destination(3);
    send_from(&mut r, b"RM\rWTa\rRX\r", remote);
    r.run_until_idle(10);
    assert_eq!(r.take_output(), vec![(remote, Output::Text("a".to_string()))]);
    send(&mut r, b"RS\r");
    r.run_until_idle(10);
    assert_eq!(
        r.take_output(),
        vec![(Destination::CONSOLE, Output::Text("a".to_string()))]
    );
}

#[test]
fn test_pause_and_resume() {
    let (mut r, clock) = manual_runtime(Config::default());
    send(&mut r, b"RP\r");
    assert_eq!(r.program_state(), ProgramState::Stopped);
    send(&mut r, b"RM\rCLl0\rWTx\rCD10\rCJl0\rRX\r");
    r.run_until_idle(3);
    assert_eq!(r.program_state(), ProgramState::AwaitingDelay);
    send(&mut r, b"RP\r");
    assert_eq!(r.program_state(), ProgramState::Paused);
    clock.advance(2000);
    assert!(!r.execute_one_statement());
    assert_eq!(render(r.take_output()), "x");
    send(&mut r, b"RR\r");
    assert_eq!(r.program_state(), ProgramState::Active);
    r.run_until_idle(4);
    assert_eq!(render(r.take_output()), "x");
    send(&mut r, b"RP\rRR\r");
    assert_eq!(r.program_state(), ProgramState::AwaitingDelay);
    send(&mut r, b"RR\r");
    assert_eq!(r.program_state(), ProgramState::AwaitingDelay);
}

#[test]
fn test_halt_and_restart() {
    let (mut r, _clock) = manual_runtime(Config::default());
    send(&mut r, b"RM\rWTa\rWTb\rRX\r");
    assert!(r.execute_one_statement());
    send(&mut r, b"RH\r");
    assert_eq!(r.program_state(), ProgramState::Stopped);
    assert_eq!(run(&mut r), "a");
    send(&mut r, b"RS\r");
    assert_eq!(run(&mut r), "ab");
}

#[test]
fn test_clear_program() {
    let (mut r, _clock) = manual_runtime(Config::default());
    send(&mut r, b"RM\rWTa\rRX\rRC\r");
    assert_eq!(run(&mut r), "");
    assert!(r.store().is_empty());
    send(&mut r, b"RS\r");
    assert_eq!(run(&mut r), "?NO PROGRAM: RS\n");
}

#[test]
fn test_store_full() {
    let config = Config {
        store_capacity: 8,
        ..Config::default()
    };
    let (mut r, _clock) = manual_runtime(config);
    send(&mut r, b"RM\rWTabcdefgh\rWL\rRX\r");
    assert_eq!(r.device_state(), DeviceState::ExecuteImmediately);
    assert_eq!(r.program_state(), ProgramState::Stopped);
    assert!(!r.store().is_valid());
    assert_eq!(run(&mut r), "?PROGRAM STORE FULL\n");
}

#[test]
fn test_remote_lines_not_stored() {
    let (mut r, _clock) = manual_runtime(Config::default());
    send(&mut r, b"RM\rWL\rRS\rrh\rWL\rRX\r");
    assert_eq!(r.store().len(), 6);
    assert_eq!(run(&mut r), "\n\n");
}

#[test]
fn test_begin_download_halts_program() {
    let (mut r, _clock) = manual_runtime(Config::default());
    send(&mut r, b"RM\rCLl0\rCJl0\rRX\r");
    assert!(r.run_until_idle(10));
    send(&mut r, b"RM\r");
    assert_eq!(r.program_state(), ProgramState::Stopped);
    assert_eq!(r.device_state(), DeviceState::StoreProgram);
    assert!(!r.store().is_valid());
}

#[test]
fn test_information() {
    let (mut r, _clock) = manual_runtime(Config::default());
    send(&mut r, b"IV\r");
    let version = format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    assert_eq!(run(&mut r), version);
    send(&mut r, b"VSx=1\rIS\r");
    assert_eq!(
        run(&mut r),
        "PROGRAM STOPPED AT 0; DEVICE EXECUTE; 0 BYTES INVALID; 1 VARIABLES; DIAGNOSTICS 1"
    );
}

#[test]
fn test_view_variable() {
    let (mut r, _clock) = manual_runtime(Config::default());
    send(&mut r, b"VSx=3\rVVx\rVC\rVVx\r");
    assert_eq!(run(&mut r), "3?VARIABLE NOT FOUND: VVx\n");
}

#[test]
fn test_program_survives_restart() {
    let path = std::env::temp_dir().join(format!("scriptbox-remote-{}.img", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let capacity = Config::default().store_capacity;
    {
        let (r, _clock) = manual_runtime(Config::default());
        let mut r = r.with_storage(Box::new(FileStorage::open(&path, capacity).unwrap()));
        send(&mut r, b"RM\rWTsaved\rRX\r");
        assert_eq!(run(&mut r), "saved");
    }
    let (r, _clock) = manual_runtime(Config::default());
    let mut r = r.with_storage(Box::new(FileStorage::open(&path, capacity).unwrap()));
    assert!(r.store().is_valid());
    assert_eq!(r.program_state(), ProgramState::Stopped);
    send(&mut r, b"RS\r");
    assert_eq!(run(&mut r), "saved");
    std::fs::remove_file(&path).unwrap();
}
