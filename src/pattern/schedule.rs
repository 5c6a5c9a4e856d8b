//! Start and pacing schedules
//!
//! The run-time executor is not part of this crate. These helpers turn a
//! pattern into the numbers it needs: thread groups with their start offsets,
//! the per-thread share of a rate limit, and the pause before each iteration.

use super::{Pacing, ThreadingPattern};
use crate::distribution::even_load;
use crate::distribution::uniform::UniformSampler;
use crate::error::Error;
use crate::Result;
use std::time::Duration;

/// A group of threads started together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadGroup {
    /// Delay from the start of the run
    pub start_offset_ms: u64,
    /// Threads in this group
    pub threads: u32,
}

/// Thread groups of a pattern in start order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampUpSchedule {
    groups: Vec<ThreadGroup>,
}

impl RampUpSchedule {
    /// Compute the groups for a pattern
    ///
    /// All-at-once patterns and ramp-up patterns with a 0 ms interval start
    /// everything in one group. Otherwise there are `ceil(threads / step)`
    /// groups of `step` threads, the last holding the remainder.
    pub fn for_pattern(pattern: &ThreadingPattern) -> Self {
        let threads = pattern.thread_count();
        let groups = match pattern.ramp_up_steps() {
            Some(steps) if steps.interval_ms > 0 && steps.threads_per_step > 0 => {
                let step = steps.threads_per_step;
                let full = threads / step;
                let remainder = threads % step;
                let count = if remainder > 0 { full + 1 } else { full };

                (0..count)
                    .map(|i| ThreadGroup {
                        start_offset_ms: i as u64 * steps.interval_ms,
                        threads: if i == count - 1 && remainder > 0 { remainder } else { step },
                    })
                    .collect()
            }
            _ => vec![ThreadGroup {
                start_offset_ms: 0,
                threads,
            }],
        };

        Self { groups }
    }

    pub fn groups(&self) -> &[ThreadGroup] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Threads in the last group
    pub fn last_group_size(&self) -> u32 {
        self.groups.last().map_or(0, |g| g.threads)
    }

    /// Total time until the last group starts
    pub fn ramp_up_duration(&self) -> Duration {
        Duration::from_millis(self.groups.last().map_or(0, |g| g.start_offset_ms))
    }
}

/// Split the rate limit of a pattern over its threads
///
/// Returns an empty vector when the pattern is not rate limited. Fails when
/// there are fewer executions per time frame than threads.
pub fn executions_per_thread(pattern: &ThreadingPattern) -> Result<Vec<u64>> {
    let Some(speed) = pattern.execution_speed() else {
        return Ok(Vec::new());
    };

    let shares = even_load(speed.executions_per_time_frame, pattern.thread_count() as usize);
    if shares.is_empty() {
        return Err(Error::Distribution {
            quantity: "iterations per time frame".to_string(),
            available: speed.executions_per_time_frame,
            requested: pattern.thread_count() as usize,
            recipients: "threads",
        });
    }
    Ok(shares)
}

/// Produces the pause before each iteration of one thread
pub struct IterationPacer {
    pacing: Pacing,
    sampler: UniformSampler,
}

impl IterationPacer {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            sampler: UniformSampler::new(),
        }
    }

    /// Pacer with a fixed seed for varying intervals
    pub fn with_seed(pacing: Pacing, seed: u64) -> Self {
        Self {
            pacing,
            sampler: UniformSampler::with_seed(seed),
        }
    }

    /// Pause before the next iteration
    pub fn next_interval(&mut self) -> Duration {
        match self.pacing {
            Pacing::Fixed { interval_ms } => Duration::from_millis(interval_ms),
            Pacing::Varying { min_ms, max_ms } => Duration::from_millis(self.sampler.sample(min_ms, max_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_at_once_single_group() {
        let pattern = ThreadingPattern::all_at_once(25).build().unwrap();
        let schedule = RampUpSchedule::for_pattern(&pattern);
        assert_eq!(schedule.groups(), &[ThreadGroup { start_offset_ms: 0, threads: 25 }]);
    }

    #[test]
    fn test_zero_interval_single_group() {
        let pattern = ThreadingPattern::ramp_up(10).threads_per_step(3).build().unwrap();
        let schedule = RampUpSchedule::for_pattern(&pattern);
        assert_eq!(schedule.group_count(), 1);
        assert_eq!(schedule.last_group_size(), 10);
    }

    #[test]
    fn test_groups_with_remainder() {
        let pattern = ThreadingPattern::ramp_up(10)
            .threads_per_step(3)
            .ramp_up_interval(500)
            .build()
            .unwrap();
        let schedule = RampUpSchedule::for_pattern(&pattern);
        let sizes: Vec<u32> = schedule.groups().iter().map(|g| g.threads).collect();
        let offsets: Vec<u64> = schedule.groups().iter().map(|g| g.start_offset_ms).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
        assert_eq!(offsets, vec![0, 500, 1000, 1500]);
        assert_eq!(schedule.ramp_up_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_groups_exact() {
        let pattern = ThreadingPattern::fixed_duration_ramp_up(12, 30)
            .threads_per_step(4)
            .ramp_up_interval(100)
            .build()
            .unwrap();
        let schedule = RampUpSchedule::for_pattern(&pattern);
        assert_eq!(schedule.group_count(), 3);
        assert_eq!(schedule.last_group_size(), 4);
    }

    #[test]
    fn test_executions_per_thread() {
        let pattern = ThreadingPattern::all_at_once(3).execution_speed(1, 10).build().unwrap();
        assert_eq!(executions_per_thread(&pattern).unwrap(), vec![3, 3, 4]);

        let starved = ThreadingPattern::all_at_once(5).execution_speed(1, 2).build().unwrap();
        assert!(executions_per_thread(&starved).is_err());

        let unlimited = ThreadingPattern::all_at_once(5).build().unwrap();
        assert!(executions_per_thread(&unlimited).unwrap().is_empty());
    }

    #[test]
    fn test_pacer_fixed() {
        let mut pacer = IterationPacer::new(Pacing::Fixed { interval_ms: 250 });
        assert_eq!(pacer.next_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_pacer_varying_in_range() {
        let mut pacer = IterationPacer::with_seed(Pacing::Varying { min_ms: 100, max_ms: 200 }, 7);
        for _ in 0..100 {
            let pause = pacer.next_interval();
            assert!(pause >= Duration::from_millis(100) && pause < Duration::from_millis(200));
        }
    }
}
