//! Simulation configuration
//!
//! All knobs a driver can turn, serializable so scenarios can live in JSON
//! files. Defaults match the reference machine: 8 frames, quantum 20, LRU
//! replacement, Round Robin dispatch, room for 10 processes.

use super::memory::{MemoryConfigError, ReplacementPolicy};
use super::scheduler::DispatchPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Physical frame count
    pub num_frames: usize,
    /// Round Robin slice length
    pub quantum: u64,
    /// Page replacement policy
    pub replacement: ReplacementPolicy,
    /// Dispatch policy
    pub scheduling: DispatchPolicy,
    /// Process queue capacity
    pub max_processes: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_frames: 8,
            quantum: 20,
            replacement: ReplacementPolicy::Lru,
            scheduling: DispatchPolicy::RoundRobin,
            max_processes: 10,
        }
    }
}

/// Rejected configurations; all are fatal to the run, caught before it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `num_frames` must be at least 1
    ZeroFrames,
    /// `quantum` must be positive or the dispatch loop cannot make progress
    ZeroQuantum,
    /// `max_processes` must be at least 1
    ZeroCapacity,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroFrames => write!(f, "num_frames must be at least 1"),
            Self::ZeroQuantum => write!(f, "quantum must be positive"),
            Self::ZeroCapacity => write!(f, "max_processes must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<MemoryConfigError> for ConfigError {
    fn from(err: MemoryConfigError) -> Self {
        match err {
            MemoryConfigError::NoFrames => Self::ZeroFrames,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_frames == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        if self.quantum == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        if self.max_processes == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}
