//! Simulation driver
//!
//! Runs a scenario to completion and prints the event log, the final frame
//! pool state, and the aggregate metrics. With no arguments it runs the
//! reference workload; otherwise it loads a JSON scenario file:
//!
//! ```json
//! {
//!   "config": { "num_frames": 8, "quantum": 20,
//!               "replacement": "lru", "scheduling": "round-robin" },
//!   "processes": [
//!     { "id": 1, "start_time": 0, "priority": "system", "total_pages": 4,
//!       "cpu_bursts": [50, 30, 40], "io_bursts": [20, 30, 10] }
//!   ]
//! }
//! ```

use pagesched::{Priority, ProcessSpec, SimConfig, Simulation};
use serde::Deserialize;
use std::process::ExitCode;

/// A complete scenario file: configuration plus process descriptors
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: SimConfig,
    processes: Vec<ProcessSpec>,
}

/// Built-in workload: four processes with staggered arrivals and three
/// CPU bursts each.
fn reference_scenario() -> Scenario {
    let spec = |id, start_time, priority, total_pages, cpu: [u64; 3], io: [u64; 3]| ProcessSpec {
        id,
        start_time,
        priority,
        total_pages,
        cpu_bursts: cpu.to_vec(),
        io_bursts: io.to_vec(),
    };
    Scenario {
        config: SimConfig::default(),
        processes: vec![
            spec(1, 0, Priority::System, 4, [50, 30, 40], [20, 30, 10]),
            spec(2, 5, Priority::Interactive, 6, [60, 40, 35], [25, 20, 15]),
            spec(3, 10, Priority::System, 5, [45, 25, 55], [15, 35, 25]),
            spec(4, 15, Priority::Interactive, 7, [55, 50, 45], [20, 40, 30]),
        ],
    }
}

/// Minimal stderr logger behind the `log` facade
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> ExitCode {
    let mut verbose = false;
    let mut scenario_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            _ => scenario_path = Some(arg),
        }
    }

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }

    match run(scenario_path.as_deref(), verbose) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("simulate: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(scenario_path: Option<&str>, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match scenario_path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => reference_scenario(),
    };

    let mut sim = Simulation::new(scenario.config)?;

    println!("registered processes:");
    for spec in &scenario.processes {
        sim.register(spec)?;
        println!(
            "  pid:{} priority {} pages {} cpu bursts {:?}",
            spec.id, spec.priority, spec.total_pages, spec.cpu_bursts
        );
    }
    println!(
        "policy: {} scheduling, {} replacement, {} frames, quantum {}",
        sim.config().scheduling,
        sim.config().replacement,
        sim.config().num_frames,
        sim.config().quantum
    );
    println!();

    let metrics = sim.run();

    println!("{}", sim.log().render());
    if verbose {
        println!();
        print!("{}", sim.memory().snapshot());
    }
    println!();
    println!(
        "run complete: {} processes in {} time units",
        metrics.completed,
        sim.clock()
    );
    Ok(())
}
