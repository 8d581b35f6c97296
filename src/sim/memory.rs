//! Memory manager
//!
//! Owns the fixed pool of physical frames and resolves page faults.
//!
//! Design:
//! - Frames reference pages by (pid, page id), never by pointer, so the
//!   one-frame-per-page invariant stays mechanically checkable
//! - The scan-for-free-slot-or-victim-then-install sequence runs under a
//!   single lock; two concurrent faults can never claim the same frame
//! - Victim selection is a construction-time policy: LRU (smallest
//!   `last_used`, ties to the lowest index) or FIFO (rotating cursor that
//!   advances only when an eviction actually happens)
//! - Faulting never fails: with at least one frame there is always a free
//!   slot or an evictable occupant

use super::process::{PageId, Pid};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Page replacement policy, chosen at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplacementPolicy {
    /// Evict the least recently used frame
    Lru,
    /// Evict frames in insertion order
    Fifo,
}

impl std::fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplacementPolicy::Lru => write!(f, "LRU"),
            ReplacementPolicy::Fifo => write!(f, "FIFO"),
        }
    }
}

/// One slot of physical memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Page currently held, `None` when free
    pub occupant: Option<(Pid, PageId)>,
    /// Simulated time the frame was last used
    pub last_used: u64,
}

impl Frame {
    fn free() -> Self {
        Self {
            occupant: None,
            last_used: 0,
        }
    }
}

/// Frame pool plus the FIFO victim cursor; everything behind one lock
#[derive(Debug)]
struct FrameTable {
    frames: Vec<Frame>,
    fifo_cursor: usize,
}

/// Result of a resolved fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultOutcome {
    /// Frame the page was installed into
    pub frame: usize,
    /// Page that was evicted to make room, if any
    pub evicted: Option<(Pid, PageId)>,
}

/// Rejected memory configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryConfigError {
    /// A frame pool needs at least one frame
    NoFrames,
}

impl std::fmt::Display for MemoryConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFrames => write!(f, "frame pool must hold at least one frame"),
        }
    }
}

impl std::error::Error for MemoryConfigError {}

/// The physical memory subsystem
#[derive(Debug)]
pub struct MemoryManager {
    table: Mutex<FrameTable>,
    capacity: usize,
    policy: ReplacementPolicy,
}

impl MemoryManager {
    pub fn new(num_frames: usize, policy: ReplacementPolicy) -> Result<Self, MemoryConfigError> {
        if num_frames == 0 {
            return Err(MemoryConfigError::NoFrames);
        }
        Ok(Self {
            table: Mutex::new(FrameTable {
                frames: vec![Frame::free(); num_frames],
                fifo_cursor: 0,
            }),
            capacity: num_frames,
            policy,
        })
    }

    pub fn num_frames(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Resolve a fault for a page that is not resident.
    ///
    /// On return the page occupies exactly one frame, stamped with `now`.
    /// The caller is responsible for clearing the residency flag of any
    /// evicted page; the frame table itself is already consistent.
    pub fn fault(&self, pid: Pid, page: PageId, now: u64) -> FaultOutcome {
        let mut table = self.lock_table();

        if log::log_enabled!(log::Level::Debug) {
            let snapshot = MemorySnapshot {
                frames: table.frames.clone(),
            };
            log::debug!("frame pool before fault for {pid} {page} (t={now}):\n{snapshot}");
        }

        // Free slot first, in index order.
        for (index, frame) in table.frames.iter_mut().enumerate() {
            if frame.occupant.is_none() {
                frame.occupant = Some((pid, page));
                frame.last_used = now;
                log::debug!("fault: {pid} {page} -> free frame {index} (t={now})");
                return FaultOutcome {
                    frame: index,
                    evicted: None,
                };
            }
        }

        // No frame free: pick a victim.
        let victim = match self.policy {
            ReplacementPolicy::Lru => Self::least_recently_used(&table.frames),
            ReplacementPolicy::Fifo => {
                let cursor = table.fifo_cursor;
                table.fifo_cursor = (cursor + 1) % table.frames.len();
                cursor
            }
        };

        let frame = &mut table.frames[victim];
        let evicted = frame.occupant.take();
        frame.occupant = Some((pid, page));
        frame.last_used = now;
        log::debug!("fault: {pid} {page} -> frame {victim}, evicting {evicted:?} (t={now})");

        FaultOutcome {
            frame: victim,
            evicted,
        }
    }

    /// Smallest `last_used` wins; strict `<` keeps the lowest index on ties.
    fn least_recently_used(frames: &[Frame]) -> usize {
        let mut victim = 0;
        let mut oldest = frames[0].last_used;
        for (index, frame) in frames.iter().enumerate().skip(1) {
            if frame.last_used < oldest {
                victim = index;
                oldest = frame.last_used;
            }
        }
        victim
    }

    /// Number of occupied frames
    pub fn resident_count(&self) -> usize {
        self.lock_table()
            .frames
            .iter()
            .filter(|f| f.occupant.is_some())
            .count()
    }

    /// Is this page currently held by some frame?
    pub fn is_resident(&self, pid: Pid, page: PageId) -> bool {
        self.lock_table()
            .frames
            .iter()
            .any(|f| f.occupant == Some((pid, page)))
    }

    /// Point-in-time copy of the frame pool, for display and inspection
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            frames: self.lock_table().frames.clone(),
        }
    }

    fn lock_table(&self) -> std::sync::MutexGuard<'_, FrameTable> {
        // The simulation is single-threaded; a poisoned lock only means a
        // panicking test, so keep the data.
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Frame pool state at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub frames: Vec<Frame>,
}

impl std::fmt::Display for MemorySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "frame pool state:")?;
        for (index, frame) in self.frames.iter().enumerate() {
            match frame.occupant {
                Some((pid, page)) => writeln!(
                    f,
                    "  frame {}: {} of {} (last used {})",
                    index, page, pid, frame.last_used
                )?,
                None => writeln!(f, "  frame {}: [free]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mgr(frames: usize, policy: ReplacementPolicy) -> MemoryManager {
        MemoryManager::new(frames, policy).unwrap()
    }

    #[test]
    fn test_zero_frames_rejected() {
        assert_eq!(
            MemoryManager::new(0, ReplacementPolicy::Lru).unwrap_err(),
            MemoryConfigError::NoFrames
        );
    }

    #[test]
    fn test_free_frames_fill_in_index_order() {
        let mem = mgr(4, ReplacementPolicy::Lru);
        for i in 0..4 {
            let outcome = mem.fault(Pid(1), PageId(i), 10 + u64::from(i));
            assert_eq!(outcome.frame, i as usize);
            assert!(outcome.evicted.is_none());
        }
        assert_eq!(mem.resident_count(), 4);
    }

    #[test]
    fn test_lru_evicts_oldest_frame() {
        let mem = mgr(3, ReplacementPolicy::Lru);
        mem.fault(Pid(1), PageId(0), 5);
        mem.fault(Pid(1), PageId(1), 3);
        mem.fault(Pid(1), PageId(2), 8);

        // Frame 1 holds the smallest timestamp.
        let outcome = mem.fault(Pid(2), PageId(0), 9);
        assert_eq!(outcome.frame, 1);
        assert_eq!(outcome.evicted, Some((Pid(1), PageId(1))));
        assert!(mem.is_resident(Pid(2), PageId(0)));
        assert!(!mem.is_resident(Pid(1), PageId(1)));
    }

    #[test]
    fn test_lru_tie_breaks_to_lowest_index() {
        let mem = mgr(3, ReplacementPolicy::Lru);
        mem.fault(Pid(1), PageId(0), 7);
        mem.fault(Pid(1), PageId(1), 7);
        mem.fault(Pid(1), PageId(2), 7);

        let outcome = mem.fault(Pid(1), PageId(3), 9);
        assert_eq!(outcome.frame, 0);
        assert_eq!(outcome.evicted, Some((Pid(1), PageId(0))));
    }

    #[test]
    fn test_fifo_cursor_only_advances_on_eviction() {
        let mem = mgr(2, ReplacementPolicy::Fifo);
        mem.fault(Pid(1), PageId(0), 0);
        mem.fault(Pid(1), PageId(1), 1);

        // First eviction takes frame 0 regardless of recency.
        let outcome = mem.fault(Pid(1), PageId(2), 2);
        assert_eq!(outcome.frame, 0);
        assert_eq!(outcome.evicted, Some((Pid(1), PageId(0))));

        // Cursor advanced exactly once; next victim is frame 1.
        let outcome = mem.fault(Pid(1), PageId(3), 3);
        assert_eq!(outcome.frame, 1);
        assert_eq!(outcome.evicted, Some((Pid(1), PageId(1))));

        // Wraps modulo capacity.
        let outcome = mem.fault(Pid(1), PageId(4), 4);
        assert_eq!(outcome.frame, 0);
        assert_eq!(outcome.evicted, Some((Pid(1), PageId(2))));
    }

    #[test]
    fn test_fifo_ignores_recency() {
        let mem = mgr(2, ReplacementPolicy::Fifo);
        // Frame 0 carries the *newest* timestamp; FIFO must still pick it.
        mem.fault(Pid(1), PageId(0), 50);
        mem.fault(Pid(1), PageId(1), 1);

        let outcome = mem.fault(Pid(1), PageId(2), 60);
        assert_eq!(outcome.frame, 0);
        assert_eq!(outcome.evicted, Some((Pid(1), PageId(0))));
    }

    #[test]
    fn test_frame_bound_holds() {
        let mem = mgr(4, ReplacementPolicy::Lru);
        for i in 0..32 {
            mem.fault(Pid(1), PageId(i), u64::from(i));
            assert!(mem.resident_count() <= 4);
        }
        assert_eq!(mem.resident_count(), 4);
    }

    #[test]
    fn test_snapshot_reports_occupancy() {
        let mem = mgr(2, ReplacementPolicy::Lru);
        mem.fault(Pid(3), PageId(1), 12);

        let snap = mem.snapshot();
        assert_eq!(snap.frames[0].occupant, Some((Pid(3), PageId(1))));
        assert_eq!(snap.frames[0].last_used, 12);
        assert_eq!(snap.frames[1].occupant, None);

        let rendered = snap.to_string();
        assert!(rendered.contains("frame 0: page:1 of pid:3"));
        assert!(rendered.contains("frame 1: [free]"));
    }
}
