//! Human-readable pattern descriptions
//!
//! Descriptions carry [`NUMBER_THREADS_TOKEN`] in place of the thread count.
//! Use [`ThreadingPattern::describe_for_threads`] to render one for display.

use super::{Pacing, PatternKind, ThreadingPattern, NUMBER_THREADS_TOKEN};
use std::fmt::Write;

impl ThreadingPattern {
    /// Stable summary of this pattern with a thread count placeholder
    pub fn description(&self) -> String {
        let mut description = match self.kind {
            PatternKind::AllAtOnce { iterations } => {
                let mut d = format!("All at once - {} threads", NUMBER_THREADS_TOKEN);
                if iterations > 0 {
                    let _ = write!(d, ", {}", iterations);
                    d.push_str(&match self.pacing {
                        Pacing::Fixed { interval_ms } if interval_ms > 0 => {
                            format!(" iterations with {} ms interval", interval_ms)
                        }
                        Pacing::Varying { min_ms, max_ms } => {
                            format!(" iterations with {} to {} ms varying interval", min_ms, max_ms)
                        }
                        Pacing::Fixed { .. } => " continuous iterations".to_string(),
                    });
                }
                d
            }
            PatternKind::FixedDurationAllAtOnce { duration_secs } => format!(
                "Fixed duration all at once - {} threads in {} seconds, {}",
                NUMBER_THREADS_TOKEN,
                duration_secs,
                self.fixed_duration_pacing()
            ),
            PatternKind::RampUp { iterations, steps } => {
                let mut d = format!(
                    "Ramp up - {} total threads, {} threads every {} ms",
                    NUMBER_THREADS_TOKEN, steps.threads_per_step, steps.interval_ms
                );
                if iterations > 0 {
                    let _ = write!(d, ", {}", iterations);
                    d.push_str(&match self.pacing {
                        Pacing::Fixed { interval_ms } if interval_ms > 0 => " continuous iterations".to_string(),
                        Pacing::Varying { min_ms, max_ms } => {
                            format!(" iterations with {} to {} ms varying interval", min_ms, max_ms)
                        }
                        Pacing::Fixed { interval_ms } => format!(" iterations with {} ms interval", interval_ms),
                    });
                }
                d
            }
            PatternKind::FixedDurationRampUp { duration_secs, steps } => format!(
                "Fixed duration ramp up - {} total threads in {} seconds, {} threads every {} ms, {}",
                NUMBER_THREADS_TOKEN,
                duration_secs,
                steps.threads_per_step,
                steps.interval_ms,
                self.fixed_duration_pacing()
            ),
        };

        if self.iteration_timeout_secs > 0 {
            let _ = write!(description, ", {} secs iteration timeout", self.iteration_timeout_secs);
        }

        // ramp-up descriptions leave out synchronization and rate limits
        if !self.is_ramp_up() {
            if self.synchronized_iterations {
                description.push_str(", running synchronized iterations");
            }
            if let Some(speed) = self.execution_speed {
                let _ = write!(
                    description,
                    ", max {} total iterations per {} secs",
                    speed.executions_per_time_frame, speed.time_frame_secs
                );
            }
        }

        if self.queue_pass_rate > 0.0 {
            let _ = write!(description, ", pass if {:?}% of the iterations pass", self.queue_pass_rate);
        }

        description
    }

    /// Description with the thread count placeholder replaced by `total_threads`
    pub fn describe_for_threads(&self, total_threads: u64) -> String {
        self.description()
            .replace(NUMBER_THREADS_TOKEN, &total_threads.to_string())
    }

    fn fixed_duration_pacing(&self) -> String {
        match self.pacing {
            Pacing::Fixed { interval_ms } if interval_ms > 0 => {
                format!("{} ms interval between iterations", interval_ms)
            }
            Pacing::Varying { min_ms, max_ms } => format!("{} to {} ms varying interval", min_ms, max_ms),
            Pacing::Fixed { .. } => "no interval between iterations".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_up_description() {
        let p1 = ThreadingPattern::ramp_up(2)
            .iterations(20)
            .interval_between_iterations(500)
            .ramp_up_interval(1000)
            .build()
            .unwrap();
        assert_eq!(
            p1.description(),
            "Ramp up - <number_threads> total threads, 1 threads every 1000 ms, 20 continuous iterations"
        );

        let p2 = p1.to_builder().interval_between_iterations(0).build().unwrap();
        assert_eq!(
            p2.description(),
            "Ramp up - <number_threads> total threads, 1 threads every 1000 ms, 20 iterations with 0 ms interval"
        );

        let p3 = p1.to_builder().iterations(0).build().unwrap();
        assert_eq!(p3.description(), "Ramp up - <number_threads> total threads, 1 threads every 1000 ms");
    }

    #[test]
    fn test_fixed_duration_ramp_up_description() {
        let pattern = ThreadingPattern::fixed_duration_ramp_up(2, 20)
            .interval_between_iterations(500)
            .ramp_up_interval(1000)
            .build()
            .unwrap();
        assert_eq!(
            pattern.description(),
            "Fixed duration ramp up - <number_threads> total threads in 20 seconds, 1 threads every 1000 ms, 500 ms interval between iterations"
        );

        let continuous = pattern.to_builder().interval_between_iterations(0).build().unwrap();
        assert!(continuous.description().ends_with("no interval between iterations"));
    }

    #[test]
    fn test_all_at_once_description_full() {
        let pattern = ThreadingPattern::all_at_once(10)
            .iterations(5)
            .varying_interval(100, 200)
            .iteration_timeout(30)
            .synchronized_iterations(true)
            .execution_speed(10, 100)
            .queue_pass_rate(90.0)
            .build()
            .unwrap();
        assert_eq!(
            pattern.description(),
            "All at once - <number_threads> threads, 5 iterations with 100 to 200 ms varying interval, \
             30 secs iteration timeout, running synchronized iterations, \
             max 100 total iterations per 10 secs, pass if 90.0% of the iterations pass"
        );
    }

    #[test]
    fn test_all_at_once_description_variants() {
        let fixed = ThreadingPattern::all_at_once(3).iterations(4).interval_between_iterations(250).build().unwrap();
        assert_eq!(
            fixed.description(),
            "All at once - <number_threads> threads, 4 iterations with 250 ms interval"
        );

        let continuous = ThreadingPattern::all_at_once(3).build().unwrap();
        assert_eq!(continuous.description(), "All at once - <number_threads> threads, 1 continuous iterations");
    }

    #[test]
    fn test_fixed_duration_all_at_once_description() {
        let pattern = ThreadingPattern::fixed_duration_all_at_once(8, 60)
            .varying_interval(10, 20)
            .queue_pass_rate(12.5)
            .build()
            .unwrap();
        assert_eq!(
            pattern.description(),
            "Fixed duration all at once - <number_threads> threads in 60 seconds, 10 to 20 ms varying interval, \
             pass if 12.5% of the iterations pass"
        );
    }

    #[test]
    fn test_ramp_up_omits_rate_limit() {
        let pattern = ThreadingPattern::ramp_up(10)
            .threads_per_step(2)
            .execution_speed(5, 50)
            .build()
            .unwrap();
        assert!(!pattern.description().contains("total iterations per"));
    }

    #[test]
    fn test_describe_for_threads() {
        let pattern = ThreadingPattern::ramp_up(99).threads_per_step(9).ramp_up_interval(1000).build().unwrap();
        let slices = pattern.distribute(3).unwrap();
        let text = slices[0].describe_for_threads(99);
        assert!(text.starts_with("Ramp up - 99 total threads, 3 threads every 1000 ms"));
        assert!(!text.contains(NUMBER_THREADS_TOKEN));
    }
}
