//! Threading patterns
//!
//! A [`ThreadingPattern`] describes the concurrency shape of one load run:
//! how many threads run, whether they all start together or ramp up in
//! steps, whether each thread runs a fixed number of iterations or for a
//! fixed duration, how iterations are paced and whether the total rate is
//! limited.
//!
//! Patterns are created through a [`PatternBuilder`] and are immutable once
//! built. [`ThreadingPattern::distribute`] splits a pattern into one pattern
//! per host; the original is never modified.
//!
//! # Example
//!
//! ```
//! use loadsplit::pattern::ThreadingPattern;
//!
//! let pattern = ThreadingPattern::ramp_up(99)
//!     .iterations(20)
//!     .interval_between_iterations(500)
//!     .ramp_up_interval(1000)
//!     .threads_per_step(9)
//!     .build()
//!     .unwrap();
//!
//! let per_host = pattern.distribute(3).unwrap();
//! assert_eq!(per_host.len(), 3);
//! assert!(per_host.iter().all(|p| p.thread_count() == 33 && p.threads_per_step() == 3));
//! ```

pub mod builder;
pub mod description;
pub mod schedule;

pub use builder::PatternBuilder;

use crate::distribution::even_load;
use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Placeholder for the thread count in pattern descriptions
///
/// A description stored for a multi-host run is rendered from one host's
/// pattern, so the thread count is left as this token and replaced with the
/// total across all hosts before display.
pub const NUMBER_THREADS_TOKEN: &str = "<number_threads>";

/// Start shape and run bound of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternKind {
    /// All threads start together and run a fixed number of iterations
    AllAtOnce { iterations: u32 },
    /// All threads start together and run for a fixed number of seconds
    FixedDurationAllAtOnce { duration_secs: u32 },
    /// Threads start in steps and run a fixed number of iterations
    RampUp { iterations: u32, steps: RampUpSteps },
    /// Threads start in steps and run for a fixed number of seconds
    FixedDurationRampUp { duration_secs: u32, steps: RampUpSteps },
}

/// Ramp-up stepping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RampUpSteps {
    /// Milliseconds between two steps (0 starts everything at once)
    pub interval_ms: u64,
    /// Threads started on each step
    pub threads_per_step: u32,
}

/// Pause between two iterations of one thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pacing {
    /// Fixed pause; 0 means iterations run back to back
    Fixed { interval_ms: u64 },
    /// Pause drawn from `[min_ms, max_ms)` before every iteration
    Varying { min_ms: u64, max_ms: u64 },
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Fixed { interval_ms: 0 }
    }
}

/// Rate limit shared by all threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSpeed {
    /// Length of the time frame in seconds
    pub time_frame_secs: u64,
    /// Iterations all threads together may run per time frame
    pub executions_per_time_frame: u64,
}

/// Concurrency shape of a load run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadingPattern {
    pub(crate) kind: PatternKind,
    pub(crate) thread_count: u32,
    pub(crate) block_until_completion: bool,
    pub(crate) pacing: Pacing,
    pub(crate) iteration_timeout_secs: u32,
    pub(crate) execution_speed: Option<ExecutionSpeed>,
    pub(crate) queue_pass_rate: f32,
    pub(crate) synchronized_iterations: bool,
}

impl ThreadingPattern {
    /// All threads start at once, each runs 1 iteration unless changed
    pub fn all_at_once(threads: u32) -> PatternBuilder {
        PatternBuilder::new(builder::BuilderKind::AllAtOnce, threads)
    }

    /// All threads start at once and run for `duration_secs`
    pub fn fixed_duration_all_at_once(threads: u32, duration_secs: u32) -> PatternBuilder {
        PatternBuilder::new(builder::BuilderKind::FixedDurationAllAtOnce, threads).duration_secs(duration_secs)
    }

    /// Threads start in steps, each runs 1 iteration unless changed
    pub fn ramp_up(threads: u32) -> PatternBuilder {
        PatternBuilder::new(builder::BuilderKind::RampUp, threads)
    }

    /// Threads start in steps and run for `duration_secs`
    pub fn fixed_duration_ramp_up(threads: u32, duration_secs: u32) -> PatternBuilder {
        PatternBuilder::new(builder::BuilderKind::FixedDurationRampUp, threads).duration_secs(duration_secs)
    }

    /// Builder pre-filled with this pattern's values
    pub fn to_builder(&self) -> PatternBuilder {
        PatternBuilder::from_pattern(self)
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    pub fn is_block_until_completion(&self) -> bool {
        self.block_until_completion
    }

    /// Iterations per thread, for fixed-invocation patterns
    pub fn iteration_count(&self) -> Option<u32> {
        match self.kind {
            PatternKind::AllAtOnce { iterations } | PatternKind::RampUp { iterations, .. } => Some(iterations),
            _ => None,
        }
    }

    /// Run duration in seconds, for fixed-duration patterns
    pub fn duration_secs(&self) -> Option<u32> {
        match self.kind {
            PatternKind::FixedDurationAllAtOnce { duration_secs }
            | PatternKind::FixedDurationRampUp { duration_secs, .. } => Some(duration_secs),
            _ => None,
        }
    }

    /// Ramp-up stepping, for ramp-up patterns
    pub fn ramp_up_steps(&self) -> Option<RampUpSteps> {
        match self.kind {
            PatternKind::RampUp { steps, .. } | PatternKind::FixedDurationRampUp { steps, .. } => Some(steps),
            _ => None,
        }
    }

    /// Milliseconds between ramp-up steps (0 for all-at-once patterns)
    pub fn ramp_up_interval(&self) -> u64 {
        self.ramp_up_steps().map_or(0, |s| s.interval_ms)
    }

    /// Threads started per ramp-up step (all threads for all-at-once patterns)
    pub fn threads_per_step(&self) -> u32 {
        self.ramp_up_steps().map_or(self.thread_count, |s| s.threads_per_step)
    }

    pub fn is_ramp_up(&self) -> bool {
        self.ramp_up_steps().is_some()
    }

    pub fn is_fixed_duration(&self) -> bool {
        self.duration_secs().is_some()
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Fixed interval between iterations in ms (0 when the interval varies)
    pub fn interval_between_iterations(&self) -> u64 {
        match self.pacing {
            Pacing::Fixed { interval_ms } => interval_ms,
            Pacing::Varying { .. } => 0,
        }
    }

    /// Lower bound of a varying interval, -1 when the interval is fixed
    pub fn min_interval_between_iterations(&self) -> i64 {
        match self.pacing {
            Pacing::Varying { min_ms, .. } => min_ms as i64,
            Pacing::Fixed { .. } => -1,
        }
    }

    /// Upper bound of a varying interval, -1 when the interval is fixed
    pub fn max_interval_between_iterations(&self) -> i64 {
        match self.pacing {
            Pacing::Varying { max_ms, .. } => max_ms as i64,
            Pacing::Fixed { .. } => -1,
        }
    }

    /// Hard per-iteration deadline in seconds (0 = none)
    pub fn iteration_timeout(&self) -> u32 {
        self.iteration_timeout_secs
    }

    pub fn execution_speed(&self) -> Option<ExecutionSpeed> {
        self.execution_speed
    }

    /// Iterations per time frame across all threads (0 when not rate limited)
    pub fn executions_per_time_frame(&self) -> u64 {
        self.execution_speed.map_or(0, |s| s.executions_per_time_frame)
    }

    /// Rate limit time frame in seconds (0 when not rate limited)
    pub fn time_frame(&self) -> u64 {
        self.execution_speed.map_or(0, |s| s.time_frame_secs)
    }

    /// Percentage of passed iterations needed for the queue to pass
    pub fn queue_pass_rate(&self) -> f32 {
        self.queue_pass_rate
    }

    pub fn use_synchronized_iterations(&self) -> bool {
        self.synchronized_iterations
    }

    /// Copy of this pattern that does not block the caller
    pub fn without_blocking(&self) -> Self {
        Self {
            block_until_completion: false,
            ..self.clone()
        }
    }

    /// Split this pattern into one pattern per host
    ///
    /// Thread counts, executions per time frame and ramp-up threads per step
    /// are split with [`even_load`]; everything else is copied. When there
    /// are fewer threads (or rate-limited executions) than hosts the pattern
    /// is not split and a one-element vector holding a copy of it is
    /// returned.
    pub fn distribute(&self, num_hosts: usize) -> Result<Vec<ThreadingPattern>> {
        if num_hosts == 0 {
            return Err(Error::config("Cannot distribute a threading pattern to 0 hosts"));
        }

        if (self.thread_count as usize) < num_hosts {
            warn!(
                "We cannot distribute just {} threads on {} hosts. So all work will be done by one host",
                self.thread_count, num_hosts
            );
            return Ok(vec![self.clone()]);
        }
        if let Some(speed) = self.execution_speed {
            if speed.executions_per_time_frame < num_hosts as u64 {
                warn!(
                    "We cannot distribute just {} iterations per time frame on {} hosts. So all work will be done by one host",
                    speed.executions_per_time_frame, num_hosts
                );
                return Ok(vec![self.clone()]);
            }
        }

        let thread_shares = even_load(self.thread_count as u64, num_hosts);

        let step_shares = match self.ramp_up_steps() {
            Some(steps) => {
                if (steps.threads_per_step as usize) < num_hosts {
                    return Err(Error::Distribution {
                        quantity: "threads per step".to_string(),
                        available: steps.threads_per_step as u64,
                        requested: num_hosts,
                        recipients: "hosts",
                    });
                }
                even_load(steps.threads_per_step as u64, num_hosts)
            }
            None => Vec::new(),
        };

        let execution_shares = self
            .execution_speed
            .map(|speed| even_load(speed.executions_per_time_frame, num_hosts))
            .unwrap_or_default();

        let patterns: Vec<ThreadingPattern> = (0..num_hosts)
            .map(|host| {
                let kind = match self.kind {
                    PatternKind::RampUp { iterations, steps } => PatternKind::RampUp {
                        iterations,
                        steps: RampUpSteps {
                            threads_per_step: step_shares[host] as u32,
                            ..steps
                        },
                    },
                    PatternKind::FixedDurationRampUp { duration_secs, steps } => PatternKind::FixedDurationRampUp {
                        duration_secs,
                        steps: RampUpSteps {
                            threads_per_step: step_shares[host] as u32,
                            ..steps
                        },
                    },
                    other => other,
                };

                ThreadingPattern {
                    kind,
                    thread_count: thread_shares[host] as u32,
                    execution_speed: self.execution_speed.map(|speed| ExecutionSpeed {
                        executions_per_time_frame: execution_shares[host],
                        ..speed
                    }),
                    ..self.clone()
                }
            })
            .collect();

        debug!(
            "Distributed {} threads to {} hosts: {:?}",
            self.thread_count, num_hosts, thread_shares
        );

        Ok(patterns)
    }
}
