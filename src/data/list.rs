//! Ordered list of values

use super::{values_of, ParameterProviderLevel, ParameterValue};
use crate::distribution::{bucket_offsets, even_load};
use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Values taken from a fixed list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDataConfig {
    pub parameter_name: String,
    pub level: ParameterProviderLevel,
    pub values: Vec<ParameterValue>,
}

impl ListDataConfig {
    /// List config generating one value per thread
    pub fn new(parameter_name: impl Into<String>, values: Vec<ParameterValue>) -> Self {
        Self::with_level(parameter_name, values, ParameterProviderLevel::PerThreadStatic)
    }

    pub fn with_level(
        parameter_name: impl Into<String>,
        values: Vec<ParameterValue>,
        level: ParameterProviderLevel,
    ) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            level,
            values,
        }
    }

    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    pub(crate) fn verify(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(Error::config(format!(
                "No values are provided for parameter '{}'",
                self.parameter_name
            )));
        }
        Ok(())
    }

    /// Contiguous, non-overlapping slices in list order
    pub fn distribute(&self, agents: usize) -> Result<Vec<ListDataConfig>> {
        let sizes = even_load(self.values.len() as u64, agents);
        if sizes.is_empty() {
            return Err(Error::not_enough_for_agents(
                values_of(&self.parameter_name),
                self.values.len() as u64,
                agents,
            ));
        }

        Ok(bucket_offsets(&sizes)
            .into_iter()
            .zip(&sizes)
            .map(|(start, &size)| {
                let (start, end) = (start as usize, (start + size) as usize);
                Self {
                    values: self.values[start..end].to_vec(),
                    ..self.clone()
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(count: usize) -> Vec<ParameterValue> {
        (0..count).map(|i| ParameterValue::Text(i.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = ListDataConfig::new("user", generate(2));
        assert_eq!(config.level, ParameterProviderLevel::PerThreadStatic);
        assert_eq!(config.values().len(), 2);
    }

    #[test]
    fn test_distribute_one_host() {
        let config = ListDataConfig::new("param1", generate(100));
        let slices = config.distribute(1).unwrap();
        assert_eq!(slices, vec![config]);
    }

    #[test]
    fn test_distribute_two_agents_five_values() {
        let config = ListDataConfig::new("param1", generate(5));
        let slices = config.distribute(2).unwrap();
        assert_eq!(slices[0].values(), &generate(5)[0..2]);
        assert_eq!(slices[1].values(), &generate(5)[2..5]);
    }

    #[test]
    fn test_distribute_concatenation_restores_list() {
        let config = ListDataConfig::with_level("param1", generate(10), ParameterProviderLevel::PerInvocation);
        let slices = config.distribute(2).unwrap();
        let joined: Vec<ParameterValue> = slices.iter().flat_map(|s| s.values().to_vec()).collect();
        assert_eq!(joined, generate(10));
        assert!(slices.iter().all(|s| s.level == ParameterProviderLevel::PerInvocation));
    }

    #[test]
    fn test_distribute_three_agents_six_values() {
        let slices = ListDataConfig::new("param1", generate(6)).distribute(3).unwrap();
        let sizes: Vec<usize> = slices.iter().map(|s| s.values().len()).collect();
        assert_eq!(sizes, vec![2, 2, 2]);
        assert_eq!(slices[2].values(), &generate(6)[4..6]);
    }

    #[test]
    fn test_distribute_not_enough_values() {
        let err = ListDataConfig::new("sku", generate(2)).distribute(3).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("only 2 values of parameter 'sku' to 3 agents"), "{}", msg);
    }

    #[test]
    fn test_verify_empty() {
        assert!(ListDataConfig::new("sku", Vec::new()).verify().is_err());
    }
}
