use scriptbox::mach::Runtime;

pub fn exec(runtime: &mut Runtime) -> String {
    exec_n(runtime, 5000)
}

pub fn exec_n(runtime: &mut Runtime, cycles: usize) -> String {
    let running = runtime.run_until_idle(cycles);
    let mut s: String = runtime
        .take_output()
        .into_iter()
        .map(|(_, output)| output.to_string())
        .collect();
    if running {
        s.push_str(&format!("\n{} Execution cycles exceeded.\n", cycles));
    }
    s
}

/// Enters each line, reporting compile errors inline the way the
/// console does.
pub fn enter(runtime: &mut Runtime, lines: &[&str]) -> String {
    let mut s = String::new();
    for line in lines {
        if let Err(error) = runtime.enter(line) {
            s.push_str(&format!("{}\n", error));
        }
    }
    s
}
