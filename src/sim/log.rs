//! Simulation event log
//!
//! An ordered, append-only record of everything externally observable about
//! a run: fault resolutions, context switches, I/O waits, completions, and
//! the closing metrics summary.
//!
//! The buffer sits behind its own lock, independent of the frame-table lock,
//! so no emitted entry can be torn by interleaving and the two locks are
//! never held together.

use super::metrics::Metrics;
use super::process::{PageId, Pid};
use std::sync::Mutex;

/// One observable simulation event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Frame pool brought up with `frames` empty frames
    MemoryInitialized { frames: usize },
    /// Fault resolved into a free frame
    PageLoaded {
        pid: Pid,
        page: PageId,
        frame: usize,
        time: u64,
    },
    /// Fault resolved by evicting another page
    PageReplaced {
        pid: Pid,
        page: PageId,
        victim_pid: Pid,
        victim_page: PageId,
        frame: usize,
        time: u64,
    },
    /// A process was granted a CPU slice
    ContextSwitch { time: u64, pid: Pid, slice: u64 },
    /// A process entered an I/O burst, stalling the shared clock
    IoWait { pid: Pid, duration: u64, time: u64 },
    /// A process terminated
    Completed { pid: Pid, time: u64 },
    /// End-of-run aggregate metrics
    Summary { metrics: Metrics },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::MemoryInitialized { frames } => {
                write!(f, "memory initialized with {} frames", frames)
            }
            Event::PageLoaded {
                pid,
                page,
                frame,
                time,
            } => write!(
                f,
                "page fault: {} {} loaded into free frame {} (t={})",
                pid, page, frame, time
            ),
            Event::PageReplaced {
                pid,
                page,
                victim_pid,
                victim_page,
                frame,
                time,
            } => write!(
                f,
                "page fault: {} {} replaced {} of {} in frame {} (t={})",
                pid, page, victim_page, victim_pid, frame, time
            ),
            Event::ContextSwitch { time, pid, slice } => {
                write!(f, "t={}: switching to {} (slice {})", time, pid, slice)
            }
            Event::IoWait {
                pid,
                duration,
                time,
            } => write!(f, "t={}: {} waiting on I/O for {}", time, pid, duration),
            Event::Completed { pid, time } => write!(f, "{} completed at t={}", pid, time),
            Event::Summary { metrics } => write!(f, "{}", metrics),
        }
    }
}

/// Append-only event sink
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event. Appends are atomic per entry.
    pub fn record(&self, event: Event) {
        log::trace!("event: {event}");
        self.lock().push(event);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the recorded events, in emission order
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Render every event as one line
    pub fn render(&self) -> String {
        self.lock()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}
