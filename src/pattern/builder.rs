//! Pattern builder
//!
//! Collects tuning values and validates them once in [`PatternBuilder::build`].
//! Signed arguments are accepted so that out-of-range input (negative
//! intervals, the `-1` "not set" sentinel for varying intervals) can be
//! reported instead of wrapping.

use super::{ExecutionSpeed, Pacing, PatternKind, RampUpSteps, ThreadingPattern};
use crate::error::Error;
use crate::Result;
use tracing::warn;

/// Sentinel for an unset min/max varying interval
pub const INTERVAL_NOT_SET: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuilderKind {
    AllAtOnce,
    FixedDurationAllAtOnce,
    RampUp,
    FixedDurationRampUp,
}

impl BuilderKind {
    fn is_ramp_up(self) -> bool {
        matches!(self, BuilderKind::RampUp | BuilderKind::FixedDurationRampUp)
    }

    fn is_fixed_duration(self) -> bool {
        matches!(self, BuilderKind::FixedDurationAllAtOnce | BuilderKind::FixedDurationRampUp)
    }

    fn name(self) -> &'static str {
        match self {
            BuilderKind::AllAtOnce => "all at once",
            BuilderKind::FixedDurationAllAtOnce => "fixed duration all at once",
            BuilderKind::RampUp => "ramp up",
            BuilderKind::FixedDurationRampUp => "fixed duration ramp up",
        }
    }
}

/// Builder for [`ThreadingPattern`]
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    kind: BuilderKind,
    threads: u32,
    block_until_completion: bool,
    iterations: Option<u32>,
    duration_secs: Option<u32>,
    interval_ms: i64,
    min_interval_ms: i64,
    max_interval_ms: i64,
    ramp_up_interval_ms: Option<i64>,
    threads_per_step: Option<i64>,
    inherited_step: Option<u32>,
    iteration_timeout_secs: u32,
    execution_speed: Option<(i64, i64)>,
    queue_pass_rate: f32,
    synchronized_iterations: bool,
}

impl PatternBuilder {
    pub(crate) fn new(kind: BuilderKind, threads: u32) -> Self {
        Self {
            kind,
            threads,
            block_until_completion: true,
            iterations: None,
            duration_secs: None,
            interval_ms: 0,
            min_interval_ms: INTERVAL_NOT_SET,
            max_interval_ms: INTERVAL_NOT_SET,
            ramp_up_interval_ms: None,
            threads_per_step: None,
            inherited_step: None,
            iteration_timeout_secs: 0,
            execution_speed: None,
            queue_pass_rate: 0.0,
            synchronized_iterations: false,
        }
    }

    pub(crate) fn from_pattern(pattern: &ThreadingPattern) -> Self {
        let (kind, iterations, duration_secs, steps) = match pattern.kind {
            PatternKind::AllAtOnce { iterations } => (BuilderKind::AllAtOnce, Some(iterations), None, None),
            PatternKind::FixedDurationAllAtOnce { duration_secs } => {
                (BuilderKind::FixedDurationAllAtOnce, None, Some(duration_secs), None)
            }
            PatternKind::RampUp { iterations, steps } => (BuilderKind::RampUp, Some(iterations), None, Some(steps)),
            PatternKind::FixedDurationRampUp { duration_secs, steps } => {
                (BuilderKind::FixedDurationRampUp, None, Some(duration_secs), Some(steps))
            }
        };

        let (interval_ms, min_interval_ms, max_interval_ms) = match pattern.pacing {
            Pacing::Fixed { interval_ms } => (interval_ms as i64, INTERVAL_NOT_SET, INTERVAL_NOT_SET),
            Pacing::Varying { min_ms, max_ms } => (0, min_ms as i64, max_ms as i64),
        };

        Self {
            kind,
            threads: pattern.thread_count,
            block_until_completion: pattern.block_until_completion,
            iterations,
            duration_secs,
            interval_ms,
            min_interval_ms,
            max_interval_ms,
            ramp_up_interval_ms: steps.map(|s| s.interval_ms as i64),
            threads_per_step: None,
            inherited_step: steps.map(|s| s.threads_per_step),
            iteration_timeout_secs: pattern.iteration_timeout_secs,
            execution_speed: pattern
                .execution_speed
                .map(|s| (s.time_frame_secs as i64, s.executions_per_time_frame as i64)),
            queue_pass_rate: pattern.queue_pass_rate,
            synchronized_iterations: pattern.synchronized_iterations,
        }
    }

    /// Thread count
    pub fn threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Block the caller until all threads finish (default: true)
    pub fn block_until_completion(mut self, block: bool) -> Self {
        self.block_until_completion = block;
        self
    }

    /// Iterations per thread (fixed-invocation patterns, default 1)
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Run duration in seconds (fixed-duration patterns)
    pub fn duration_secs(mut self, duration_secs: u32) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    /// Fixed pause between iterations in ms
    pub fn interval_between_iterations(mut self, interval_ms: i64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Pause between iterations drawn from `[min_ms, max_ms)`
    pub fn varying_interval(mut self, min_ms: i64, max_ms: i64) -> Self {
        self.interval_ms = 0;
        self.min_interval_ms = min_ms;
        self.max_interval_ms = max_ms;
        self
    }

    /// Milliseconds between ramp-up steps
    pub fn ramp_up_interval(mut self, interval_ms: i64) -> Self {
        self.ramp_up_interval_ms = Some(interval_ms);
        self
    }

    /// Threads started on each ramp-up step
    pub fn threads_per_step(mut self, threads_per_step: i64) -> Self {
        self.threads_per_step = Some(threads_per_step);
        self
    }

    /// Hard per-iteration deadline in seconds (0 = none)
    pub fn iteration_timeout(mut self, secs: u32) -> Self {
        self.iteration_timeout_secs = secs;
        self
    }

    /// Limit all threads together to `executions` iterations per `time_frame_secs`
    pub fn execution_speed(mut self, time_frame_secs: i64, executions: i64) -> Self {
        self.execution_speed = Some((time_frame_secs, executions));
        self
    }

    /// Percentage of passed iterations needed for the queue to pass
    pub fn queue_pass_rate(mut self, percents: f32) -> Self {
        self.queue_pass_rate = percents;
        self
    }

    /// Start every iteration on all threads at the same moment
    pub fn synchronized_iterations(mut self, synchronized: bool) -> Self {
        self.synchronized_iterations = synchronized;
        self
    }

    /// Validate and seal the pattern
    pub fn build(self) -> Result<ThreadingPattern> {
        if self.threads == 0 {
            return Err(Error::config(
                "0 is non-positive integer and is not accepted as thread count for threading pattern",
            ));
        }

        let pacing = self.pacing()?;
        let kind = self.pattern_kind()?;

        let execution_speed = match self.execution_speed {
            None => None,
            Some((time_frame, executions)) => {
                if executions < 1 {
                    return Err(Error::config(format!(
                        "Can't distribute {} iterations per thread.",
                        executions
                    )));
                }
                if time_frame < 1 {
                    return Err(Error::config(format!("{} seconds is not a valid time frame.", time_frame)));
                }
                Some(ExecutionSpeed {
                    time_frame_secs: time_frame as u64,
                    executions_per_time_frame: executions as u64,
                })
            }
        };

        if !(0.0..=100.0).contains(&self.queue_pass_rate) {
            return Err(Error::config(format!(
                "The provided queue pass rate {:?} is invalid. It must be a number between 0 and 100",
                self.queue_pass_rate
            )));
        }

        if self.synchronized_iterations && self.kind.is_ramp_up() {
            return Err(Error::config(format!(
                "Synchronized iterations are not supported by {} patterns",
                self.kind.name()
            )));
        }

        Ok(ThreadingPattern {
            kind,
            thread_count: self.threads,
            block_until_completion: self.block_until_completion,
            pacing,
            iteration_timeout_secs: self.iteration_timeout_secs,
            execution_speed,
            queue_pass_rate: self.queue_pass_rate,
            synchronized_iterations: self.synchronized_iterations,
        })
    }

    fn pacing(&self) -> Result<Pacing> {
        if self.interval_ms < 0 {
            return Err(Error::config(format!(
                "{} ms is not a valid interval between queue iterations",
                self.interval_ms
            )));
        }
        if self.min_interval_ms < 0 && self.min_interval_ms != INTERVAL_NOT_SET {
            return Err(Error::config(format!(
                "{} ms is not a valid min interval between queue iterations",
                self.min_interval_ms
            )));
        }
        if self.max_interval_ms < 0 && self.max_interval_ms != INTERVAL_NOT_SET {
            return Err(Error::config(format!(
                "{} ms is not a valid max interval between queue iterations",
                self.max_interval_ms
            )));
        }

        let (min, max) = (self.min_interval_ms, self.max_interval_ms);
        match (min == INTERVAL_NOT_SET, max == INTERVAL_NOT_SET) {
            (true, true) => Ok(Pacing::Fixed {
                interval_ms: self.interval_ms as u64,
            }),
            (false, false) => {
                if min > max {
                    warn!(
                        "We will switch the provided minimum '{}' and maximum '{}' intervals between the iterations",
                        min, max
                    );
                    Ok(Pacing::Varying {
                        min_ms: max as u64,
                        max_ms: min as u64,
                    })
                } else if min == max {
                    warn!(
                        "You have provided the same minimum and maximum interval between iterations: {}",
                        max
                    );
                    Ok(Pacing::Fixed { interval_ms: min as u64 })
                } else {
                    Ok(Pacing::Varying {
                        min_ms: min as u64,
                        max_ms: max as u64,
                    })
                }
            }
            _ => Err(Error::config(format!(
                "Both minimum and maximum interval between iterations must be set, got {} and {}",
                min, max
            ))),
        }
    }

    fn pattern_kind(&self) -> Result<PatternKind> {
        if self.kind.is_fixed_duration() && self.iterations.is_some() {
            return Err(Error::config(format!(
                "Iteration count is not applicable to {} patterns",
                self.kind.name()
            )));
        }
        if !self.kind.is_fixed_duration() && self.duration_secs.is_some() {
            return Err(Error::config(format!(
                "Duration is not applicable to {} patterns",
                self.kind.name()
            )));
        }
        if !self.kind.is_ramp_up() && (self.ramp_up_interval_ms.is_some() || self.threads_per_step.is_some()) {
            return Err(Error::config(format!(
                "Ramp up settings are not applicable to {} patterns",
                self.kind.name()
            )));
        }

        let iterations = self.iterations.unwrap_or(1);
        let duration_secs = self.duration_secs.unwrap_or(0);

        Ok(match self.kind {
            BuilderKind::AllAtOnce => PatternKind::AllAtOnce { iterations },
            BuilderKind::FixedDurationAllAtOnce => PatternKind::FixedDurationAllAtOnce { duration_secs },
            BuilderKind::RampUp => PatternKind::RampUp {
                iterations,
                steps: self.steps()?,
            },
            BuilderKind::FixedDurationRampUp => PatternKind::FixedDurationRampUp {
                duration_secs,
                steps: self.steps()?,
            },
        })
    }

    fn steps(&self) -> Result<RampUpSteps> {
        let interval_ms = self.ramp_up_interval_ms.unwrap_or(0);
        if interval_ms < 0 {
            return Err(Error::config(format!("{} ms is not a valid ramp up interval", interval_ms)));
        }

        let threads_per_step = match self.threads_per_step {
            None => self.inherited_step.unwrap_or(1),
            Some(step) => {
                if step <= 0 {
                    return Err(Error::config("The thread count per step must be a positive integer"));
                }
                if step >= self.threads as i64 {
                    return Err(Error::config(
                        "The thread count per step must be smaller than the total thread count",
                    ));
                }
                step as u32
            }
        };

        Ok(RampUpSteps {
            interval_ms: interval_ms as u64,
            threads_per_step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pattern = ThreadingPattern::ramp_up(100).build().unwrap();
        assert_eq!(pattern.thread_count(), 100);
        assert!(pattern.is_block_until_completion());
        assert_eq!(pattern.iteration_count(), Some(1));
        assert_eq!(pattern.ramp_up_interval(), 0);
        assert_eq!(pattern.threads_per_step(), 1);
        assert_eq!(pattern.interval_between_iterations(), 0);
        assert_eq!(pattern.min_interval_between_iterations(), -1);
        assert_eq!(pattern.max_interval_between_iterations(), -1);
        assert_eq!(pattern.queue_pass_rate(), 0.0);
        assert!(pattern.execution_speed().is_none());
    }

    #[test]
    fn test_ramp_up_full() {
        let pattern = ThreadingPattern::ramp_up(100)
            .iterations(20)
            .varying_interval(1000, 5000)
            .ramp_up_interval(1000)
            .threads_per_step(10)
            .build()
            .unwrap();
        assert_eq!(pattern.iteration_count(), Some(20));
        assert_eq!(pattern.ramp_up_interval(), 1000);
        assert_eq!(pattern.threads_per_step(), 10);
        assert_eq!(pattern.interval_between_iterations(), 0);
        assert_eq!(pattern.min_interval_between_iterations(), 1000);
        assert_eq!(pattern.max_interval_between_iterations(), 5000);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = ThreadingPattern::all_at_once(0).build().unwrap_err();
        assert!(err.to_string().contains("thread count"));
    }

    #[test]
    fn test_step_out_of_range() {
        assert!(ThreadingPattern::ramp_up(100).threads_per_step(0).build().is_err());
        assert!(ThreadingPattern::ramp_up(100).threads_per_step(100).build().is_err());
        assert!(ThreadingPattern::fixed_duration_ramp_up(10, 5).threads_per_step(-3).build().is_err());
        assert!(ThreadingPattern::ramp_up(100).threads_per_step(99).build().is_ok());
    }

    #[test]
    fn test_negative_intervals_rejected() {
        assert!(ThreadingPattern::all_at_once(2).interval_between_iterations(-5).build().is_err());
        assert!(ThreadingPattern::all_at_once(2).varying_interval(-2, 100).build().is_err());
        assert!(ThreadingPattern::all_at_once(2).varying_interval(100, -7).build().is_err());
        assert!(ThreadingPattern::ramp_up(2).ramp_up_interval(-1).build().is_err());
    }

    #[test]
    fn test_half_set_varying_interval_rejected() {
        assert!(ThreadingPattern::all_at_once(2).varying_interval(100, -1).build().is_err());
        assert!(ThreadingPattern::all_at_once(2).varying_interval(-1, 100).build().is_err());
    }

    #[test]
    fn test_min_max_swapped() {
        let pattern = ThreadingPattern::all_at_once(2).varying_interval(500, 100).build().unwrap();
        assert_eq!(pattern.pacing(), Pacing::Varying { min_ms: 100, max_ms: 500 });
    }

    #[test]
    fn test_min_equal_max_collapses() {
        let pattern = ThreadingPattern::fixed_duration_all_at_once(2, 10)
            .varying_interval(300, 300)
            .build()
            .unwrap();
        assert_eq!(pattern.pacing(), Pacing::Fixed { interval_ms: 300 });
        assert_eq!(pattern.min_interval_between_iterations(), -1);
    }

    #[test]
    fn test_execution_speed_validation() {
        assert!(ThreadingPattern::all_at_once(2).execution_speed(0, 10).build().is_err());
        assert!(ThreadingPattern::all_at_once(2).execution_speed(10, 0).build().is_err());
        let pattern = ThreadingPattern::all_at_once(2).execution_speed(10, 50).build().unwrap();
        assert_eq!(pattern.time_frame(), 10);
        assert_eq!(pattern.executions_per_time_frame(), 50);
    }

    #[test]
    fn test_queue_pass_rate_bounds() {
        assert!(ThreadingPattern::all_at_once(2).queue_pass_rate(-0.5).build().is_err());
        assert!(ThreadingPattern::all_at_once(2).queue_pass_rate(100.5).build().is_err());
        assert!(ThreadingPattern::all_at_once(2).queue_pass_rate(100.0).build().is_ok());
    }

    #[test]
    fn test_synchronized_only_all_at_once() {
        assert!(ThreadingPattern::ramp_up(4).synchronized_iterations(true).build().is_err());
        let pattern = ThreadingPattern::fixed_duration_all_at_once(4, 30)
            .synchronized_iterations(true)
            .build()
            .unwrap();
        assert!(pattern.use_synchronized_iterations());
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        assert!(ThreadingPattern::all_at_once(4).duration_secs(10).build().is_err());
        assert!(ThreadingPattern::fixed_duration_ramp_up(4, 10).iterations(3).build().is_err());
        assert!(ThreadingPattern::all_at_once(4).threads_per_step(2).build().is_err());
    }

    #[test]
    fn test_to_builder_retune() {
        let pattern = ThreadingPattern::ramp_up(10)
            .iterations(3)
            .ramp_up_interval(200)
            .threads_per_step(2)
            .build()
            .unwrap();
        let retuned = pattern.to_builder().queue_pass_rate(50.0).iteration_timeout(5).build().unwrap();
        assert_eq!(retuned.queue_pass_rate(), 50.0);
        assert_eq!(retuned.iteration_timeout(), 5);
        assert_eq!(retuned.threads_per_step(), 2);
        assert_eq!(pattern.queue_pass_rate(), 0.0);

        // an explicitly set step is validated again
        assert!(pattern.to_builder().threads_per_step(10).build().is_err());
    }

    #[test]
    fn test_to_builder_keeps_distributed_slice() {
        let pattern = ThreadingPattern::ramp_up(4).threads_per_step(3).build().unwrap();
        let slices = pattern.distribute(2).unwrap();
        let rebuilt = slices[1].to_builder().build().unwrap();
        assert_eq!(rebuilt, slices[1]);
    }
}
