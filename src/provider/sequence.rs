//! Built-in `sequence` custom provider
//!
//! Counts upward from the `start` token in increments of `step` (defaults 0
//! and 1). Per-thread counters are independent; per-thread-static threads get
//! `start + thread_id * step`.

use super::ParameterDataProvider;
use crate::data::{ArgumentValue, CustomDataConfig, ParameterProviderLevel, ParameterValue};
use crate::error::Error;
use crate::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Registry tag of this provider
pub const SEQUENCE_TAG: &str = "sequence";

#[derive(Default)]
struct Counters {
    initialized: bool,
    shared: i64,
    per_thread: HashMap<u64, i64>,
}

pub struct SequenceParameterDataProvider {
    parameter_name: String,
    level: ParameterProviderLevel,
    start: i64,
    step: i64,
    counters: Mutex<Counters>,
}

fn token(config: &CustomDataConfig, key: &str, default: i64) -> Result<i64> {
    match config.control_tokens.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::config(format!(
                "Token '{}' of parameter '{}' is not an integer: '{}'",
                key, config.parameter_name, raw
            ))
        }),
    }
}

impl SequenceParameterDataProvider {
    pub fn from_config(config: &CustomDataConfig) -> Result<Self> {
        let step = token(config, "step", 1)?;
        if step == 0 {
            return Err(Error::config(format!(
                "Token 'step' of parameter '{}' must not be 0",
                config.parameter_name
            )));
        }
        Ok(Self {
            parameter_name: config.parameter_name.clone(),
            level: config.level,
            start: token(config, "start", 0)?,
            step,
            counters: Mutex::new(Counters::default()),
        })
    }

    fn with_counters<T>(&self, f: impl FnOnce(&mut Counters) -> T) -> Result<T> {
        let mut counters = self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !counters.initialized {
            return Err(Error::NotInitialized {
                parameter: self.parameter_name.clone(),
            });
        }
        Ok(f(&mut counters))
    }

    fn argument(&self, n: i64) -> ArgumentValue {
        ArgumentValue {
            name: self.parameter_name.clone(),
            value: ParameterValue::Integer(n),
        }
    }
}

impl ParameterDataProvider for SequenceParameterDataProvider {
    fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    fn level(&self) -> ParameterProviderLevel {
        self.level
    }

    fn initialize(&self) -> Result<()> {
        let mut counters = self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *counters = Counters {
            initialized: true,
            shared: self.start,
            per_thread: HashMap::new(),
        };
        Ok(())
    }

    fn generate_new_value_per_thread(&self, thread_id: u64, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let (start, step) = (self.start, self.step);
        let n = self.with_counters(|c| {
            let next = c.per_thread.entry(thread_id).or_insert(start);
            let n = *next;
            *next = next.wrapping_add(step);
            n
        })?;
        Ok(self.argument(n))
    }

    fn generate_new_value_per_thread_static(&self, thread_id: u64, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        self.with_counters(|_| ())?;
        Ok(self.argument(self.start.wrapping_add((thread_id as i64).wrapping_mul(self.step))))
    }

    fn generate_new_value_per_invocation(&self, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let step = self.step;
        let n = self.with_counters(|c| {
            let n = c.shared;
            c.shared = c.shared.wrapping_add(step);
            n
        })?;
        Ok(self.argument(n))
    }
}
