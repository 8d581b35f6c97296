//! Property tests
//!
//! Randomized workloads against the invariants no run may break, plus
//! shadow-model checks for the two replacement policies.

use pagesched::{
    DispatchPolicy, Event, FaultOutcome, MemoryManager, PageId, Pid, Priority, ProcessSpec,
    ReplacementPolicy, SimConfig, Simulation,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn arb_dispatch() -> impl Strategy<Value = DispatchPolicy> {
    prop_oneof![
        Just(DispatchPolicy::RoundRobin),
        Just(DispatchPolicy::Priority),
    ]
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::RealTime),
        Just(Priority::System),
        Just(Priority::Interactive),
        Just(Priority::Background),
    ]
}

/// CPU bursts with one fewer I/O burst interleaved, all positive
fn arb_bursts() -> impl Strategy<Value = (Vec<u64>, Vec<u64>)> {
    vec((1..40u64, 1..30u64), 1..4).prop_map(|pairs| {
        let cpu: Vec<u64> = pairs.iter().map(|&(c, _)| c).collect();
        let io: Vec<u64> = pairs[..pairs.len() - 1].iter().map(|&(_, i)| i).collect();
        (cpu, io)
    })
}

fn arb_spec(id: u32) -> impl Strategy<Value = ProcessSpec> {
    (0..50u64, arb_priority(), 0..6u32, arb_bursts()).prop_map(
        move |(start_time, priority, total_pages, (cpu_bursts, io_bursts))| ProcessSpec {
            id,
            start_time,
            priority,
            total_pages,
            cpu_bursts,
            io_bursts,
        },
    )
}

fn arb_workload() -> impl Strategy<Value = Vec<ProcessSpec>> {
    (1..5usize).prop_flat_map(|n| {
        (0..n)
            .map(|i| arb_spec(i as u32 + 1))
            .collect::<Vec<_>>()
    })
}

proptest! {
    /// Every workload runs to completion under either dispatch policy, and
    /// the resident-page count never exceeds the frame pool, as witnessed
    /// by the event log.
    #[test]
    fn any_workload_always_terminates(
        workload in arb_workload(),
        scheduling in arb_dispatch(),
        num_frames in 1..6usize,
        quantum in 1..25u64,
    ) {
        let config = SimConfig {
            num_frames,
            quantum,
            scheduling,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        for spec in &workload {
            sim.register(spec).unwrap();
        }

        let metrics = sim.run();
        prop_assert!(sim.processes().iter().all(|p| p.is_terminated()));
        prop_assert_eq!(metrics.completed, workload.len());

        // Round Robin charges every burst in full; priority dispatch
        // charges a fixed slice per process instead.
        if scheduling == DispatchPolicy::RoundRobin {
            let total_cpu: u64 = workload.iter().flat_map(|s| &s.cpu_bursts).sum();
            prop_assert!(sim.clock() >= total_cpu);
        }

        // Replay faults and evictions; residency must respect the pool size.
        let mut resident = std::collections::HashSet::new();
        for event in sim.log().events() {
            match event {
                Event::PageLoaded { pid, page, .. } => {
                    resident.insert((pid, page));
                }
                Event::PageReplaced { pid, page, victim_pid, victim_page, .. } => {
                    prop_assert!(resident.remove(&(victim_pid, victim_page)));
                    resident.insert((pid, page));
                }
                _ => {}
            }
            prop_assert!(resident.len() <= num_frames);
        }
        prop_assert_eq!(resident.len(), sim.memory().resident_count());
    }

    /// Drive `fault` directly and compare against a straight-line shadow
    /// model of LRU: free slot in index order, else the smallest timestamp,
    /// ties to the lowest index.
    #[test]
    fn lru_matches_shadow_model(
        ops in vec((1..4u32, 0..8u32), 1..60),
        num_frames in 1..5usize,
    ) {
        let mem = MemoryManager::new(num_frames, ReplacementPolicy::Lru).unwrap();
        let mut shadow: Vec<Option<((Pid, PageId), u64)>> = vec![None; num_frames];

        for (now, &(pid, page)) in ops.iter().enumerate() {
            let now = now as u64;
            let key = (Pid(pid), PageId(page));
            if shadow.iter().flatten().any(|&(held, _)| held == key) {
                // Already resident; a fault would violate the caller contract.
                prop_assert!(mem.is_resident(key.0, key.1));
                continue;
            }

            let expected = shadow
                .iter()
                .position(Option::is_none)
                .unwrap_or_else(|| {
                    let mut victim = 0;
                    for (index, slot) in shadow.iter().enumerate() {
                        if let (Some((_, t)), Some((_, oldest))) = (slot, &shadow[victim]) {
                            if t < oldest {
                                victim = index;
                            }
                        }
                    }
                    victim
                });

            let outcome = mem.fault(key.0, key.1, now);
            prop_assert_eq!(outcome.frame, expected);
            prop_assert_eq!(outcome.evicted, shadow[expected].map(|(held, _)| held));
            shadow[expected] = Some((key, now));
        }
    }

    /// With distinct pages and no reuse, FIFO evicts in exactly the order
    /// pages were installed, wrapping modulo the pool size.
    #[test]
    fn fifo_evicts_in_fill_order(
        num_frames in 1..6usize,
        evictions in 1..10usize,
    ) {
        let mem = MemoryManager::new(num_frames, ReplacementPolicy::Fifo).unwrap();
        let total = num_frames + evictions;

        let mut evicted = Vec::new();
        for i in 0..total {
            let FaultOutcome { frame, evicted: victim } =
                mem.fault(Pid(1), PageId(i as u32), i as u64);
            prop_assert_eq!(frame, i % num_frames);
            if let Some((_, page)) = victim {
                evicted.push(page);
            }
        }

        let expected: Vec<PageId> = (0..evictions as u32).map(PageId).collect();
        prop_assert_eq!(evicted, expected);
    }
}
