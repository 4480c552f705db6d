use crate::mach::{Config, Destination, ManualClock, Output, Runtime};

mod remote_test;

fn render(outputs: Vec<(Destination, Output)>) -> String {
    outputs.iter().map(|(_, o)| o.to_string()).collect()
}

fn run(runtime: &mut Runtime) -> String {
    run_cycles(runtime, 5000)
}

fn run_cycles(runtime: &mut Runtime, cycles: usize) -> String {
    let running = runtime.run_until_idle(cycles);
    let mut s = render(runtime.take_output());
    if running {
        s.push_str(&format!("\n{} Execution cycles exceeded.\n", cycles));
    }
    s
}

fn send(runtime: &mut Runtime, bytes: &[u8]) {
    send_from(runtime, bytes, Destination::CONSOLE);
}

fn send_from(runtime: &mut Runtime, bytes: &[u8], dest: Destination) {
    for b in bytes {
        runtime.receive(*b, dest);
    }
}

fn manual_runtime(config: Config) -> (Runtime, ManualClock) {
    let clock = ManualClock::new();
    let mut runtime = Runtime::new(config)
        .with_clock(Box::new(clock.clone()))
        .with_seed(7);
    runtime.set_diagnostics(1);
    (runtime, clock)
}
