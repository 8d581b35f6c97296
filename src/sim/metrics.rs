//! Aggregate run metrics
//!
//! Collected over terminated processes at the end of a run. Mean response
//! time averages only the processes whose first dispatch was observed
//! (Round Robin never records one).

use super::process::Process;

/// End-of-run performance summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Processes that reached TERMINATED
    pub completed: usize,
    /// Mean time spent waiting before dispatch
    pub mean_wait: f64,
    /// Mean completion time minus start time
    pub mean_turnaround: f64,
    /// Mean clock value at first dispatch, over observed processes
    pub mean_response: f64,
    /// Completed processes divided by the configured process capacity
    pub throughput: f64,
}

impl Metrics {
    pub fn collect(processes: &[Process], capacity: usize) -> Self {
        let done: Vec<&Process> = processes.iter().filter(|p| p.is_terminated()).collect();
        let completed = done.len();

        let mean = |total: u64, n: usize| {
            if n == 0 { 0.0 } else { total as f64 / n as f64 }
        };

        let wait: u64 = done.iter().map(|p| p.wait_time).sum();
        let turnaround: u64 = done.iter().map(|p| p.turnaround_time).sum();
        let observed: Vec<u64> = done.iter().filter_map(|p| p.response_time).collect();
        let response: u64 = observed.iter().sum();

        let throughput = if capacity == 0 {
            0.0
        } else {
            completed as f64 / capacity as f64
        };

        Self {
            completed,
            mean_wait: mean(wait, completed),
            mean_turnaround: mean(turnaround, completed),
            mean_response: mean(response, observed.len()),
            throughput,
        }
    }
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "performance metrics:")?;
        writeln!(f, "  completed processes: {}", self.completed)?;
        writeln!(f, "  mean wait time: {:.2}", self.mean_wait)?;
        writeln!(f, "  mean turnaround time: {:.2}", self.mean_turnaround)?;
        writeln!(f, "  mean response time: {:.2}", self.mean_response)?;
        write!(f, "  throughput: {:.2}", self.throughput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::process::{Priority, Process, ProcessSpec, ProcessState};

    fn terminated(id: u32, wait: u64, turnaround: u64, response: Option<u64>) -> Process {
        let mut p = Process::from_spec(&ProcessSpec {
            id,
            start_time: 0,
            priority: Priority::System,
            total_pages: 1,
            cpu_bursts: vec![10],
            io_bursts: vec![],
        })
        .unwrap();
        p.state = ProcessState::Terminated;
        p.wait_time = wait;
        p.turnaround_time = turnaround;
        p.response_time = response;
        p
    }

    #[test]
    fn test_collect_means() {
        let procs = vec![
            terminated(1, 10, 100, Some(0)),
            terminated(2, 30, 200, Some(40)),
        ];
        let m = Metrics::collect(&procs, 10);
        assert_eq!(m.completed, 2);
        assert_eq!(m.mean_wait, 20.0);
        assert_eq!(m.mean_turnaround, 150.0);
        assert_eq!(m.mean_response, 20.0);
        assert_eq!(m.throughput, 0.2);
    }

    #[test]
    fn test_collect_skips_live_processes() {
        let mut live = terminated(3, 99, 99, Some(99));
        live.state = ProcessState::Ready;
        let procs = vec![terminated(1, 10, 100, None), live];

        let m = Metrics::collect(&procs, 4);
        assert_eq!(m.completed, 1);
        assert_eq!(m.mean_wait, 10.0);
        // No observed response times at all
        assert_eq!(m.mean_response, 0.0);
        assert_eq!(m.throughput, 0.25);
    }

    #[test]
    fn test_collect_empty() {
        let m = Metrics::collect(&[], 10);
        assert_eq!(m.completed, 0);
        assert_eq!(m.mean_turnaround, 0.0);
        assert_eq!(m.throughput, 0.0);
    }
}
