//! The simulation core - scheduling, demand paging, and their coupling
//!
//! A `Simulation` is the explicit context object a driver owns: it wires a
//! `Scheduler` (process queue + simulated clock) to a `MemoryManager` (frame
//! pool + replacement policy) and an `EventLog` (the observable artifact of
//! a run). Nothing is global, so multiple independent runs can coexist in
//! one process.

pub mod config;
pub mod log;
pub mod memory;
pub mod metrics;
pub mod process;
pub mod scheduler;

pub use config::{ConfigError, SimConfig};
pub use log::{Event, EventLog};
pub use memory::{FaultOutcome, Frame, MemoryManager, MemorySnapshot, ReplacementPolicy};
pub use metrics::Metrics;
pub use process::{Page, PageId, Pid, Priority, Process, ProcessSpec, ProcessState, SpecError};
pub use scheduler::{DispatchPolicy, RegisterError, Scheduler};

/// One self-contained simulation run
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    memory: MemoryManager,
    scheduler: Scheduler,
    log: EventLog,
}

impl Simulation {
    /// Validate the configuration and bring up an empty machine.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let memory = MemoryManager::new(config.num_frames, config.replacement)?;
        let scheduler = Scheduler::new(config.scheduling, config.quantum, config.max_processes);
        let log = EventLog::new();
        log.record(Event::MemoryInitialized {
            frames: config.num_frames,
        });
        Ok(Self {
            config,
            memory,
            scheduler,
            log,
        })
    }

    /// Register a process for the coming run.
    pub fn register(&mut self, spec: &ProcessSpec) -> Result<Pid, RegisterError> {
        self.scheduler.register(spec)
    }

    /// Run every registered process to termination and collect metrics.
    pub fn run(&mut self) -> Metrics {
        self.scheduler.run(&self.memory, &self.log);
        Metrics::collect(self.scheduler.processes(), self.scheduler.capacity())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> u64 {
        self.scheduler.clock()
    }

    pub fn processes(&self) -> &[Process] {
        self.scheduler.processes()
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: u32) -> ProcessSpec {
        ProcessSpec {
            id,
            start_time: 0,
            priority: Priority::System,
            total_pages: 2,
            cpu_bursts: vec![30],
            io_bursts: vec![],
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimConfig {
            num_frames: 0,
            ..SimConfig::default()
        };
        assert_eq!(Simulation::new(config).unwrap_err(), ConfigError::ZeroFrames);
    }

    #[test]
    fn test_memory_initialized_is_first_event() {
        let sim = Simulation::new(SimConfig::default()).unwrap();
        assert_eq!(
            sim.log().events().first(),
            Some(&Event::MemoryInitialized { frames: 8 })
        );
    }

    #[test]
    fn test_independent_runs() {
        let mut a = Simulation::new(SimConfig::default()).unwrap();
        let mut b = Simulation::new(SimConfig::default()).unwrap();
        a.register(&spec(1)).unwrap();
        b.register(&spec(1)).unwrap();

        a.run();

        // Run `a` leaves `b` untouched.
        assert_eq!(b.clock(), 0);
        assert_eq!(b.memory().resident_count(), 0);
        assert!(a.processes().iter().all(|p| p.is_terminated()));
        assert!(b.processes().iter().all(|p| !p.is_terminated()));
    }

    #[test]
    fn test_run_returns_metrics() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        sim.register(&spec(1)).unwrap();
        sim.register(&spec(2)).unwrap();

        let metrics = sim.run();
        assert_eq!(metrics.completed, 2);
        assert_eq!(metrics.throughput, 0.2);
    }
}
