//! pagesched - a coupled CPU-scheduling / demand-paging simulator
//!
//! Models, in discrete simulated time, how a single-core scheduler and a
//! demand-paged memory subsystem interact through the resources they share:
//! the frame table and the clock. Every scheduling decision first makes the
//! process's pages resident, and every eviction depends on the access-time
//! bookkeeping the scheduler keeps while dispatching.
//!
//! Design principles:
//! - Deterministic: a run is a pure function of its configuration and
//!   registered processes; the event log is the observable artifact
//! - No hidden state: the frame pool, queue, and clock live in an explicit
//!   `Simulation` context the driver owns
//! - Policies are values: dispatch (Round Robin | Priority) and replacement
//!   (LRU | FIFO) are chosen at construction time, not baked into the loops

pub mod sim;

pub use sim::{
    DispatchPolicy, Event, EventLog, FaultOutcome, MemoryManager, Metrics, PageId, Pid, Priority,
    Process, ProcessSpec, ReplacementPolicy, Scheduler, SimConfig, Simulation,
};
