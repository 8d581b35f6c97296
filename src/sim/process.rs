//! Process model
//!
//! A process is described up front by its burst plan (alternating CPU and
//! I/O bursts), a priority, and a fixed set of virtual pages. The scheduler
//! mutates its state machine and counters; the memory manager only ever sees
//! its pages by (pid, page id).
//!
//! State machine: READY -> RUNNING -> {WAITING | TERMINATED}, with
//! WAITING -> READY resolved synchronously by the scheduler. TERMINATED is
//! absorbing.

use serde::{Deserialize, Serialize};

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pid(pub u32);

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pid:{}", self.0)
    }
}

/// Page identifier, unique within its owning process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub u32);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page:{}", self.0)
    }
}

/// Static process priority. Lower discriminant means higher priority; the
/// derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Hard real-time work (highest)
    RealTime,
    /// System services
    System,
    /// Interactive/user-facing work
    Interactive,
    /// Batch/background work (lowest)
    Background,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::RealTime => write!(f, "real-time"),
            Priority::System => write!(f, "system"),
            Priority::Interactive => write!(f, "interactive"),
            Priority::Background => write!(f, "background"),
        }
    }
}

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Eligible for dispatch
    Ready,
    /// Currently being charged CPU time
    Running,
    /// Blocked on an I/O burst
    Waiting,
    /// Finished all bursts; absorbing
    Terminated,
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Waiting => write!(f, "WAITING"),
            ProcessState::Terminated => write!(f, "TERMINATED"),
        }
    }
}

/// One virtual page of a process
///
/// A page holds no frame pointer; residency is a flag kept in sync with the
/// frame table by the scheduler, which makes the one-frame-per-page
/// invariant checkable from either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Identifier, unique within the owning process
    pub id: PageId,
    /// Owning process (back-reference, not ownership)
    pub owner: Pid,
    /// Has this page ever been referenced by execution?
    pub active: bool,
    /// Simulated time of the most recent reference, if any
    pub last_access: Option<u64>,
    /// Is the page currently resident in some frame?
    pub in_memory: bool,
}

impl Page {
    pub fn new(id: PageId, owner: Pid) -> Self {
        Self {
            id,
            owner,
            active: false,
            last_access: None,
            in_memory: false,
        }
    }
}

/// Driver-supplied process descriptor
///
/// `cpu_bursts` and `io_bursts` interleave: CPU burst `i` is followed by I/O
/// burst `i` unless it is the last CPU burst. A trailing I/O entry (equal
/// lengths) is accepted and ignored, matching the reference workloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub id: u32,
    #[serde(default)]
    pub start_time: u64,
    pub priority: Priority,
    pub total_pages: u32,
    pub cpu_bursts: Vec<u64>,
    #[serde(default)]
    pub io_bursts: Vec<u64>,
}

/// Rejected process descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecError {
    /// The CPU burst list is empty
    NoBursts,
    /// A CPU burst of zero length (would stall the dispatch loop)
    ZeroCpuBurst { index: usize },
    /// An I/O burst of zero length
    ZeroIoBurst { index: usize },
    /// `io_bursts` must be one shorter than (or equal in length to) `cpu_bursts`
    BurstLengthMismatch { cpu: usize, io: usize },
}

impl std::fmt::Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBursts => write!(f, "process has no CPU bursts"),
            Self::ZeroCpuBurst { index } => write!(f, "CPU burst {} has zero length", index),
            Self::ZeroIoBurst { index } => write!(f, "I/O burst {} has zero length", index),
            Self::BurstLengthMismatch { cpu, io } => {
                write!(f, "{} CPU bursts cannot interleave with {} I/O bursts", cpu, io)
            }
        }
    }
}

impl std::error::Error for SpecError {}

/// A registered process
///
/// Fully initialized before registration, mutated only by the scheduler (and
/// by the memory manager's fault handling, via the scheduler, for page
/// flags). Immutable once `Terminated`.
#[derive(Debug, Clone)]
pub struct Process {
    /// Unique process identifier
    pub pid: Pid,
    /// Earliest simulated time this process may run
    pub start_time: u64,
    /// Static priority
    pub priority: Priority,
    /// Fixed page set; never grows or shrinks after creation
    pub pages: Vec<Page>,
    /// Remaining work per CPU burst; entries are consumed in place
    pub cpu_bursts: Vec<u64>,
    /// I/O wait following each CPU burst
    pub io_bursts: Vec<u64>,
    /// Cursor into the burst sequence
    pub burst_index: usize,
    /// Current state
    pub state: ProcessState,
    /// Time spent waiting before dispatch (priority scheduling only)
    pub wait_time: u64,
    /// Completion time minus start time, set on termination
    pub turnaround_time: u64,
    /// Clock at first dispatch; `None` until observed
    pub response_time: Option<u64>,
}

impl Process {
    /// Validate a descriptor and build the process, all pages non-resident.
    pub fn from_spec(spec: &ProcessSpec) -> Result<Self, SpecError> {
        if spec.cpu_bursts.is_empty() {
            return Err(SpecError::NoBursts);
        }
        let cpu = spec.cpu_bursts.len();
        let io = spec.io_bursts.len();
        if io != cpu && io + 1 != cpu {
            return Err(SpecError::BurstLengthMismatch { cpu, io });
        }
        if let Some(index) = spec.cpu_bursts.iter().position(|&b| b == 0) {
            return Err(SpecError::ZeroCpuBurst { index });
        }
        if let Some(index) = spec.io_bursts.iter().position(|&b| b == 0) {
            return Err(SpecError::ZeroIoBurst { index });
        }

        let pid = Pid(spec.id);
        let pages = (0..spec.total_pages)
            .map(|i| Page::new(PageId(i), pid))
            .collect();

        Ok(Self {
            pid,
            start_time: spec.start_time,
            priority: spec.priority,
            pages,
            cpu_bursts: spec.cpu_bursts.clone(),
            io_bursts: spec.io_bursts.clone(),
            burst_index: 0,
            state: ProcessState::Ready,
            wait_time: 0,
            turnaround_time: 0,
            response_time: None,
        })
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// Remaining work in the current CPU burst (0 once terminated)
    pub fn current_burst_remaining(&self) -> u64 {
        self.cpu_bursts.get(self.burst_index).copied().unwrap_or(0)
    }

    /// I/O wait attached to CPU burst `index`
    pub fn io_after(&self, index: usize) -> Option<u64> {
        self.io_bursts.get(index).copied()
    }

    /// Number of currently resident pages
    pub fn resident_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.in_memory).count()
    }
}
