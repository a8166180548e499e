//! Stress tests for Arbit.
//!
//! These helpers drive a handle under heavy load and concurrent access and
//! report throughput.

use arbit_core::Arbit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Operations whose record reached the queue.
    pub logged_ops: usize,
    /// Operations whose record was rejected.
    pub lost_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(logged: usize, lost: usize, duration: Duration) -> Self {
        let total = logged + lost;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            logged_ops: logged,
            lost_ops: lost,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Logged: {}", self.logged_ops);
        println!("Lost: {}", self.lost_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of mutations to perform.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 100_000,
            threads: 4,
        }
    }
}

fn mutate(bits: &Arbit, i: u64) {
    let pos = i.wrapping_mul(0x9E37_79B9_7F4A_7C15) % bits.length();
    match i % 3 {
        0 => {
            bits.set(pos);
        }
        1 => {
            bits.clear(pos);
        }
        _ => {
            bits.flip(pos);
        }
    }
}

fn lost_since(bits: &Arbit, before: u64) -> usize {
    (bits.stats().records_lost - before) as usize
}

/// Runs mutations from a single thread.
///
/// # Panics
///
/// Panics if the handle has zero length.
pub fn stress_sequential_mutations(bits: &Arbit, config: &StressConfig) -> StressTestResult {
    assert!(bits.length() > 0, "stress needs at least one bit");
    let lost_before = bits.stats().records_lost;
    let start = Instant::now();

    for i in 0..config.operations {
        mutate(bits, i as u64);
    }

    let lost = lost_since(bits, lost_before);
    StressTestResult::new(config.operations - lost, lost, start.elapsed())
}

/// Runs mutations from `config.threads` threads sharing one handle.
///
/// # Panics
///
/// Panics if the handle has zero length or a worker panics.
pub fn stress_concurrent_mutations(bits: Arc<Arbit>, config: &StressConfig) -> StressTestResult {
    assert!(bits.length() > 0, "stress needs at least one bit");
    let lost_before = bits.stats().records_lost;
    let issued = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads;

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let bits = Arc::clone(&bits);
            let issued = Arc::clone(&issued);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    mutate(&bits, (t * ops_per_thread + i) as u64);
                    issued.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Stress worker panicked");
    }

    let total = issued.load(Ordering::Relaxed);
    let lost = lost_since(&bits, lost_before);
    StressTestResult::new(total - lost, lost, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TempLog;

    #[test]
    fn sequential_stress_logs_everything() {
        let log = TempLog::new();
        let bits = log.open(1 << 16);
        let config = StressConfig {
            operations: 20_000,
            threads: 1,
        };

        let result = stress_sequential_mutations(&bits, &config);
        bits.close().unwrap();

        assert_eq!(result.total_ops, 20_000);
        assert_eq!(result.lost_ops, 0);
        assert_eq!(log.len(), 9 * 20_001);
    }

    #[test]
    fn concurrent_stress_logs_everything() {
        let log = TempLog::new();
        let bits = Arc::new(log.open(1 << 16));
        let config = StressConfig {
            operations: 40_000,
            threads: 4,
        };

        let result = stress_concurrent_mutations(Arc::clone(&bits), &config);
        bits.close().unwrap();

        assert_eq!(result.total_ops, 40_000);
        assert_eq!(result.logged_ops, 40_000);
        assert_eq!(log.records().len(), 40_001);
    }

    #[test]
    fn stress_after_close_counts_losses() {
        let log = TempLog::new();
        let bits = log.open(64);
        bits.close().unwrap();

        let config = StressConfig {
            operations: 100,
            threads: 1,
        };
        let result = stress_sequential_mutations(&bits, &config);
        assert_eq!(result.lost_ops, 100);
        assert_eq!(result.logged_ops, 0);
    }
}
