//! Scheduler
//!
//! Owns the process queue and the simulated clock, and drives the run to
//! completion under a dispatch policy fixed at construction time.
//!
//! Design:
//! - Round Robin scans registered processes in registration order, charging
//!   `min(remaining burst, quantum)` per visit; I/O bursts are serialized
//!   straight into the shared clock, so one process's I/O wait stalls the
//!   whole simulation (the reference behavior, kept deliberately)
//! - Priority is non-preemptive run-to-completion: strict `<` over READY
//!   processes, earliest registration winning ties
//! - Before any CPU time is charged, every page of the dispatched process is
//!   made resident via the memory manager, in page-index order; residency
//!   flags of evicted victims are cleared here, since the scheduler owns
//!   every process record

use super::log::{Event, EventLog};
use super::memory::MemoryManager;
use super::metrics::Metrics;
use super::process::{PageId, Pid, Process, ProcessSpec, ProcessState, SpecError};
use serde::{Deserialize, Serialize};

/// Dispatch policy, chosen at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchPolicy {
    /// Time-sliced, registration-order scanning
    RoundRobin,
    /// Static priority, run-to-completion
    Priority,
}

impl std::fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchPolicy::RoundRobin => write!(f, "round-robin"),
            DispatchPolicy::Priority => write!(f, "priority"),
        }
    }
}

/// Rejected registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The queue already holds `capacity` processes
    QueueFull { capacity: usize },
    /// A process with this id is already registered. Frames key their
    /// occupants by (pid, page id), so pid uniqueness is load-bearing.
    DuplicatePid { pid: Pid },
    /// The descriptor failed validation
    Spec(SpecError),
}

impl std::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QueueFull { capacity } => {
                write!(f, "process queue is full ({} slots)", capacity)
            }
            Self::DuplicatePid { pid } => write!(f, "{} is already registered", pid),
            Self::Spec(err) => write!(f, "invalid process descriptor: {}", err),
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(err) => Some(err),
            Self::QueueFull { .. } | Self::DuplicatePid { .. } => None,
        }
    }
}

impl From<SpecError> for RegisterError {
    fn from(err: SpecError) -> Self {
        Self::Spec(err)
    }
}

/// The CPU scheduler
#[derive(Debug)]
pub struct Scheduler {
    policy: DispatchPolicy,
    quantum: u64,
    capacity: usize,
    clock: u64,
    processes: Vec<Process>,
}

impl Scheduler {
    pub fn new(policy: DispatchPolicy, quantum: u64, capacity: usize) -> Self {
        Self {
            policy,
            quantum,
            capacity,
            clock: 0,
            processes: Vec::new(),
        }
    }

    /// Validate a descriptor and enqueue the process.
    ///
    /// Configuration problems are caught here, before the run starts; a full
    /// queue is reported as a recoverable error.
    pub fn register(&mut self, spec: &ProcessSpec) -> Result<Pid, RegisterError> {
        if self.processes.len() >= self.capacity {
            return Err(RegisterError::QueueFull {
                capacity: self.capacity,
            });
        }
        if self.processes.iter().any(|p| p.pid == Pid(spec.id)) {
            return Err(RegisterError::DuplicatePid { pid: Pid(spec.id) });
        }
        let process = Process::from_spec(spec)?;
        let pid = process.pid;
        log::debug!(
            "registered {pid} ({} priority, {} pages, {} bursts)",
            process.priority,
            process.pages.len(),
            process.cpu_bursts.len()
        );
        self.processes.push(process);
        Ok(pid)
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Drive the simulation until every registered process is terminal,
    /// then record the aggregate metrics as the final log entry.
    pub fn run(&mut self, memory: &MemoryManager, log: &EventLog) {
        log::debug!("starting {} scheduler with quantum {}", self.policy, self.quantum);
        match self.policy {
            DispatchPolicy::RoundRobin => self.run_round_robin(memory, log),
            DispatchPolicy::Priority => self.run_priority(memory, log),
        }
        let metrics = Metrics::collect(&self.processes, self.capacity);
        log.record(Event::Summary { metrics });
        log::debug!("{} scheduler finished at t={}", self.policy, self.clock);
    }

    /// Time-sliced dispatch over the registration order.
    ///
    /// Terminates because every visit strictly shrinks some process's
    /// remaining burst (quantum > 0 and all bursts > 0 by validation).
    fn run_round_robin(&mut self, memory: &MemoryManager, log: &EventLog) {
        let mut active = self.processes.iter().filter(|p| !p.is_terminated()).count();

        while active > 0 {
            for i in 0..self.processes.len() {
                if self.processes[i].is_terminated() {
                    continue;
                }

                // A process cannot run before its declared arrival.
                if self.clock < self.processes[i].start_time {
                    self.clock = self.processes[i].start_time;
                }

                let pid = self.processes[i].pid;
                let slice = self.processes[i].current_burst_remaining().min(self.quantum);
                log.record(Event::ContextSwitch {
                    time: self.clock,
                    pid,
                    slice,
                });

                self.processes[i].state = ProcessState::Running;
                self.ensure_resident(i, memory, log);

                let burst_index = self.processes[i].burst_index;
                self.processes[i].cpu_bursts[burst_index] -= slice;
                self.clock += slice;

                if self.processes[i].cpu_bursts[burst_index] == 0 {
                    self.processes[i].burst_index += 1;
                    if self.processes[i].burst_index >= self.processes[i].cpu_bursts.len() {
                        self.terminate(i, log);
                        active -= 1;
                    } else {
                        // The completed burst's I/O wait blocks the shared
                        // clock; the process is eligible again on the next
                        // scan pass.
                        let io = self.processes[i]
                            .io_after(burst_index)
                            .unwrap_or_default();
                        self.processes[i].state = ProcessState::Waiting;
                        log.record(Event::IoWait {
                            pid,
                            duration: io,
                            time: self.clock,
                        });
                        self.clock += io;
                        self.processes[i].state = ProcessState::Ready;
                    }
                } else {
                    // Preempted at the quantum boundary.
                    self.processes[i].state = ProcessState::Ready;
                }
            }
        }
    }

    /// Static-priority, run-to-completion dispatch.
    fn run_priority(&mut self, memory: &MemoryManager, log: &EventLog) {
        loop {
            // Strict `<` keeps the earliest-registered process on ties.
            let mut chosen: Option<usize> = None;
            for (i, process) in self.processes.iter().enumerate() {
                if process.state != ProcessState::Ready {
                    continue;
                }
                match chosen {
                    None => chosen = Some(i),
                    Some(best) => {
                        if process.priority < self.processes[best].priority {
                            chosen = Some(i);
                        }
                    }
                }
            }
            let Some(i) = chosen else { break };

            let pid = self.processes[i].pid;
            self.processes[i].wait_time =
                self.clock.saturating_sub(self.processes[i].start_time);
            log.record(Event::ContextSwitch {
                time: self.clock,
                pid,
                slice: self.quantum,
            });

            self.ensure_resident(i, memory, log);

            let process = &mut self.processes[i];
            process.state = ProcessState::Running;
            if process.response_time.is_none() {
                process.response_time = Some(self.clock);
            }

            // The whole remaining work is charged as one fixed slice.
            self.clock += self.quantum;
            self.terminate(i, log);
        }
    }

    /// Fault in every non-resident page of process `i`, in page-index order,
    /// stamping access bookkeeping as execution references each page.
    fn ensure_resident(&mut self, i: usize, memory: &MemoryManager, log: &EventLog) {
        let now = self.clock;
        let pid = self.processes[i].pid;

        for page_index in 0..self.processes[i].pages.len() {
            let page_id = {
                let page = &mut self.processes[i].pages[page_index];
                page.active = true;
                page.last_access = Some(now);
                if page.in_memory {
                    continue;
                }
                page.id
            };

            let outcome = memory.fault(pid, page_id, now);
            match outcome.evicted {
                Some((victim_pid, victim_page)) => {
                    self.clear_resident(victim_pid, victim_page);
                    log.record(Event::PageReplaced {
                        pid,
                        page: page_id,
                        victim_pid,
                        victim_page,
                        frame: outcome.frame,
                        time: now,
                    });
                }
                None => log.record(Event::PageLoaded {
                    pid,
                    page: page_id,
                    frame: outcome.frame,
                    time: now,
                }),
            }
            self.processes[i].pages[page_index].in_memory = true;
        }
    }

    /// Clear the residency flag of an evicted page, wherever it lives.
    fn clear_resident(&mut self, pid: Pid, page: PageId) {
        if let Some(process) = self.processes.iter_mut().find(|p| p.pid == pid)
            && let Some(victim) = process.pages.iter_mut().find(|pg| pg.id == page)
        {
            victim.in_memory = false;
        }
    }

    fn terminate(&mut self, i: usize, log: &EventLog) {
        let process = &mut self.processes[i];
        process.state = ProcessState::Terminated;
        process.turnaround_time = self.clock.saturating_sub(process.start_time);
        log.record(Event::Completed {
            pid: process.pid,
            time: self.clock,
        });
    }
}
