//! Numeric and string-templated ranges

use super::{values_of, ParameterProviderLevel, ParameterValue};
use crate::distribution::{bucket_offsets, even_load};
use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the number in string range templates
pub const RANGE_PLACEHOLDER: &str = "{0}";

/// Values taken from the integer span `[start, end]`
///
/// With a template every number is rendered into it, e.g. `user{0}@test.com`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeDataConfig {
    pub parameter_name: String,
    pub level: ParameterProviderLevel,
    pub template: Option<String>,
    pub start: i32,
    pub end: i32,
}

impl RangeDataConfig {
    /// Integer range, one value per thread
    pub fn new(parameter_name: impl Into<String>, start: i32, end: i32) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            level: ParameterProviderLevel::PerThreadStatic,
            template: None,
            start,
            end,
        }
    }

    /// Integer range with no upper bound
    pub fn unbounded(parameter_name: impl Into<String>, start: i32) -> Self {
        Self::new(parameter_name, start, i32::MAX)
    }

    /// String range rendering each number into `template`
    pub fn templated(parameter_name: impl Into<String>, template: impl Into<String>, start: i32, end: i32) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::new(parameter_name, start, end)
        }
    }

    pub fn with_level(mut self, level: ParameterProviderLevel) -> Self {
        self.level = level;
        self
    }

    /// Number of values in the range
    pub fn value_count(&self) -> u64 {
        if self.end < self.start {
            0
        } else {
            (self.end as i64 - self.start as i64 + 1) as u64
        }
    }

    /// Render the number `n` of this range
    pub fn format_value(&self, n: i64) -> ParameterValue {
        render(self.template.as_deref(), n)
    }

    pub(crate) fn verify(&self) -> Result<()> {
        if self.end < self.start {
            return Err(Error::config(format!(
                "Range end {} is before range start {} for parameter '{}'",
                self.end, self.start, self.parameter_name
            )));
        }
        Ok(())
    }

    /// Contiguous sub-ranges, each host starting where the previous ended
    pub fn distribute(&self, agents: usize) -> Result<Vec<RangeDataConfig>> {
        let (count, sizes) = split_span(self.start, self.end, agents);
        if sizes.is_empty() {
            return Err(Error::not_enough_for_agents(values_of(&self.parameter_name), count, agents));
        }

        Ok(sub_ranges(self.start, &sizes)
            .into_iter()
            .map(|(start, end)| Self {
                start,
                end,
                ..self.clone()
            })
            .collect())
    }
}

pub(crate) fn render(template: Option<&str>, n: i64) -> ParameterValue {
    match template {
        Some(template) => ParameterValue::Text(template.replace(RANGE_PLACEHOLDER, &n.to_string())),
        None => ParameterValue::Integer(n),
    }
}

/// Value count of `[start, end]` and its even split over `agents`
pub(crate) fn split_span(start: i32, end: i32, agents: usize) -> (u64, Vec<u64>) {
    let count = if end < start { 0 } else { (end as i64 - start as i64 + 1) as u64 };
    (count, even_load(count, agents))
}

/// `(start, end)` bounds of consecutive chunks of the given sizes
pub(crate) fn sub_ranges(start: i32, sizes: &[u64]) -> Vec<(i32, i32)> {
    bucket_offsets(sizes)
        .into_iter()
        .zip(sizes)
        .map(|(offset, &size)| {
            let first = start as i64 + offset as i64;
            (first as i32, (first + size as i64 - 1) as i32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let config = RangeDataConfig::templated("param1", "test{0}@test.com", 10, 20);
        assert_eq!(config.level, ParameterProviderLevel::PerThreadStatic);
        assert_eq!(config.template.as_deref(), Some("test{0}@test.com"));
        assert_eq!(config.value_count(), 11);

        let unbounded = RangeDataConfig::unbounded("param1", 5);
        assert_eq!(unbounded.end, i32::MAX);
        assert!(unbounded.template.is_none());

        let invocation = RangeDataConfig::new("param1", 10, 20).with_level(ParameterProviderLevel::PerInvocation);
        assert_eq!(invocation.level, ParameterProviderLevel::PerInvocation);
    }

    #[test]
    fn test_format_value() {
        let config = RangeDataConfig::templated("mail", "test{0}@test.com", 1, 3);
        assert_eq!(config.format_value(2), ParameterValue::Text("test2@test.com".to_string()));
        assert_eq!(RangeDataConfig::new("n", 1, 3).format_value(2), ParameterValue::Integer(2));
    }

    #[test]
    fn test_distribute_uneven_is_contiguous() {
        let config = RangeDataConfig::templated("param1", "test{0}@test.com", 10, 20);
        let slices = config.distribute(3).unwrap();
        let bounds: Vec<(i32, i32)> = slices.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, vec![(10, 12), (13, 15), (16, 20)]);

        let mut covered: Vec<i32> = slices.iter().flat_map(|s| s.start..=s.end).collect();
        covered.sort_unstable();
        assert_eq!(covered, (10..=20).collect::<Vec<_>>());
        assert!(slices.iter().all(|s| s.template == config.template && s.parameter_name == "param1"));
    }

    #[test]
    fn test_distribute_even() {
        let slices = RangeDataConfig::new("param1", 10, 42).distribute(3).unwrap();
        let bounds: Vec<(i32, i32)> = slices.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, vec![(10, 20), (21, 31), (32, 42)]);
    }

    #[test]
    fn test_distribute_unbounded() {
        let slices = RangeDataConfig::unbounded("id", 0).distribute(2).unwrap();
        assert_eq!(slices[0].start, 0);
        assert_eq!(slices[1].end, i32::MAX);
        assert_eq!(slices[0].end + 1, slices[1].start);
    }

    #[test]
    fn test_distribute_too_small() {
        let err = RangeDataConfig::new("id", 1, 2).distribute(3).unwrap_err();
        assert!(err.to_string().contains("only 2 values of parameter 'id'"));
    }

    #[test]
    fn test_verify_inverted() {
        assert!(RangeDataConfig::new("id", 5, 1).verify().is_err());
    }
}
