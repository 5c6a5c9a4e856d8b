//! Integer and string range provider, also serving range-form usernames

use super::{ParameterDataProvider, PoolCursors};
use crate::data::range::render;
use crate::data::{ArgumentValue, ParameterProviderLevel, RangeDataConfig};
use crate::error::Error;
use crate::Result;
use tracing::debug;

pub struct RangeParameterDataProvider {
    parameter_name: String,
    level: ParameterProviderLevel,
    template: Option<String>,
    start: i32,
    end: i32,
    cursors: PoolCursors,
}

impl RangeParameterDataProvider {
    pub fn new(
        parameter_name: impl Into<String>,
        template: Option<String>,
        start: i32,
        end: i32,
        level: ParameterProviderLevel,
    ) -> Self {
        let parameter_name = parameter_name.into();
        Self {
            cursors: PoolCursors::new(parameter_name.clone()),
            parameter_name,
            level,
            template,
            start,
            end,
        }
    }

    pub fn from_config(config: &RangeDataConfig) -> Self {
        Self::new(
            config.parameter_name.clone(),
            config.template.clone(),
            config.start,
            config.end,
            config.level,
        )
    }

    fn len(&self) -> u64 {
        (self.end as i64 - self.start as i64 + 1).max(0) as u64
    }

    fn argument(&self, index: u64) -> ArgumentValue {
        ArgumentValue {
            name: self.parameter_name.clone(),
            value: render(self.template.as_deref(), self.start as i64 + index as i64),
        }
    }
}

impl ParameterDataProvider for RangeParameterDataProvider {
    fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    fn level(&self) -> ParameterProviderLevel {
        self.level
    }

    fn initialize(&self) -> Result<()> {
        if self.end < self.start {
            return Err(Error::config(format!(
                "Range end {} is before range start {} for parameter '{}'",
                self.end, self.start, self.parameter_name
            )));
        }
        self.cursors.reset();
        debug!(
            "Initialized range provider '{}' over [{}, {}]",
            self.parameter_name, self.start, self.end
        );
        Ok(())
    }

    fn generate_new_value_per_thread(&self, thread_id: u64, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let index = self.cursors.next_per_thread(thread_id, self.len())?;
        Ok(self.argument(index))
    }

    fn generate_new_value_per_thread_static(&self, thread_id: u64, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let index = self.cursors.per_thread_static(thread_id, self.len())?;
        Ok(self.argument(index))
    }

    fn generate_new_value_per_invocation(&self, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let index = self.cursors.next_per_invocation(self.len())?;
        Ok(self.argument(index))
    }
}
