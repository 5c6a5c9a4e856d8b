//! Convert plan file sections into core values
//!
//! Every value goes through the same constructors and builder a library user
//! would call, so plan files get exactly the same validation.

use super::{ParameterConfig, PatternConfig, PatternKindConfig, PlanConfig};
use crate::data::{
    CustomDataConfig, FileNamesDataConfig, ListDataConfig, LoaderDataConfig, ParameterDataConfig,
    ParameterProviderLevel, RangeDataConfig, UsernameDataConfig,
};
use crate::error::Error;
use crate::pattern::builder::INTERVAL_NOT_SET;
use crate::pattern::ThreadingPattern;
use crate::Result;

impl PatternConfig {
    /// Build the threading pattern described by this section
    pub fn to_pattern(&self) -> Result<ThreadingPattern> {
        let duration = || {
            self.duration_secs.ok_or_else(|| {
                Error::config(format!("duration_secs is required for '{}' patterns", self.kind))
            })
        };

        let mut builder = match self.kind {
            PatternKindConfig::AllAtOnce => ThreadingPattern::all_at_once(self.threads),
            PatternKindConfig::FixedDurationAllAtOnce => {
                ThreadingPattern::fixed_duration_all_at_once(self.threads, duration()?)
            }
            PatternKindConfig::RampUp => ThreadingPattern::ramp_up(self.threads),
            PatternKindConfig::FixedDurationRampUp => ThreadingPattern::fixed_duration_ramp_up(self.threads, duration()?),
        };

        if let Some(iterations) = self.iterations {
            builder = builder.iterations(iterations);
        }
        // the constructor already took it for fixed-duration kinds
        if let (Some(duration_secs), false) = (self.duration_secs, self.kind.is_fixed_duration()) {
            builder = builder.duration_secs(duration_secs);
        }
        if let Some(interval) = self.interval_ms {
            builder = builder.interval_between_iterations(interval);
        }
        if self.min_interval_ms.is_some() || self.max_interval_ms.is_some() {
            builder = builder.varying_interval(
                self.min_interval_ms.unwrap_or(INTERVAL_NOT_SET),
                self.max_interval_ms.unwrap_or(INTERVAL_NOT_SET),
            );
        }
        if let Some(interval) = self.ramp_up_interval_ms {
            builder = builder.ramp_up_interval(interval);
        }
        if let Some(step) = self.threads_per_step {
            builder = builder.threads_per_step(step);
        }
        if let Some(timeout) = self.iteration_timeout_secs {
            builder = builder.iteration_timeout(timeout);
        }
        if let Some(block) = self.block_until_completion {
            builder = builder.block_until_completion(block);
        }
        if let Some(rate) = self.queue_pass_rate {
            builder = builder.queue_pass_rate(rate);
        }
        if let Some(synchronized) = self.synchronized_iterations {
            builder = builder.synchronized_iterations(synchronized);
        }
        if let Some(speed) = self.execution_speed {
            builder = builder.execution_speed(speed.time_frame_secs, speed.executions_per_time_frame);
        }

        builder.build()
    }
}

fn with_level(level: Option<ParameterProviderLevel>, default: ParameterProviderLevel) -> ParameterProviderLevel {
    level.unwrap_or(default)
}

impl ParameterConfig {
    /// Build the data config described by this entry
    pub fn to_data_config(&self) -> Result<ParameterDataConfig> {
        Ok(match self {
            ParameterConfig::List { name, level, values } => ListDataConfig::with_level(
                name.clone(),
                values.clone(),
                with_level(*level, ParameterProviderLevel::PerThreadStatic),
            )
            .into(),
            ParameterConfig::Range {
                name,
                level,
                start,
                end,
                template,
            } => {
                let config = match (template, end) {
                    (Some(template), Some(end)) => RangeDataConfig::templated(name.clone(), template.clone(), *start, *end),
                    (Some(template), None) => {
                        RangeDataConfig::templated(name.clone(), template.clone(), *start, i32::MAX)
                    }
                    (None, Some(end)) => RangeDataConfig::new(name.clone(), *start, *end),
                    (None, None) => RangeDataConfig::unbounded(name.clone(), *start),
                };
                let default = config.level;
                config.with_level(with_level(*level, default)).into()
            }
            ParameterConfig::FileNames {
                name,
                level,
                folders,
                recursive,
                full_path,
            } => {
                let mut config = FileNamesDataConfig::empty(name.clone());
                for folder in folders {
                    match &folder.pattern {
                        Some(pattern) => config.add_folder_matching(folder.path.clone(), folder.percentage, pattern.clone()),
                        None => config.add_folder(folder.path.clone(), folder.percentage),
                    }
                }
                if let Some(recursive) = recursive {
                    config = config.recursive_search(*recursive);
                }
                if let Some(full_path) = full_path {
                    config = config.return_full_path(*full_path);
                }
                let default = config.level;
                config.with_level(with_level(*level, default)).into()
            }
            ParameterConfig::Username {
                level,
                values,
                template,
                start,
                end,
            } => {
                let mut config = match (values, template) {
                    (Some(values), None) => UsernameDataConfig::from_list(values.clone()),
                    (None, Some(template)) => {
                        UsernameDataConfig::from_range(template.clone(), start.unwrap_or(1), end.unwrap_or(i32::MAX))
                    }
                    _ => {
                        return Err(Error::config(
                            "A username parameter needs either 'values' or 'template', not both",
                        ))
                    }
                };
                config.level = with_level(*level, config.level);
                config.into()
            }
            ParameterConfig::Custom {
                name,
                level,
                provider,
                tokens,
            } => {
                let mut config = CustomDataConfig::new(
                    name.clone(),
                    provider.clone(),
                    with_level(*level, ParameterProviderLevel::PerThread),
                );
                config.control_tokens = tokens.clone();
                config.into()
            }
        })
    }
}

impl PlanConfig {
    pub fn to_pattern(&self) -> Result<ThreadingPattern> {
        self.pattern.to_pattern()
    }

    /// Parameter configs in declaration order
    pub fn to_loader_data(&self) -> Result<LoaderDataConfig> {
        let mut loader = LoaderDataConfig::new();
        for parameter in &self.parameters {
            loader.add_parameter_config(parameter.to_data_config()?);
        }
        Ok(loader)
    }
}
