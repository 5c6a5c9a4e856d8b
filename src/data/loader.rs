//! Parameter configs of one loader

use super::{ParameterDataConfig, UsernameDataConfig};
use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Ordered parameter configs of one loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderDataConfig {
    parameters: Vec<ParameterDataConfig>,
}

impl LoaderDataConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_parameter_config(&mut self, config: impl Into<ParameterDataConfig>) {
        self.parameters.push(config.into());
    }

    pub fn parameter_configurations(&self) -> &[ParameterDataConfig] {
        &self.parameters
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The username config, if any
    pub fn username_config(&self) -> Option<&UsernameDataConfig> {
        self.parameters.iter().find_map(|p| match p {
            ParameterDataConfig::Username(config) => Some(config),
            _ => None,
        })
    }

    /// Verify every config and reject duplicate parameter names
    pub fn verify(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for parameter in &self.parameters {
            parameter.verify()?;
            if !seen.insert(parameter.parameter_name()) {
                return Err(Error::config(format!(
                    "Parameter '{}' is configured more than once",
                    parameter.parameter_name()
                )));
            }
        }
        Ok(())
    }

    /// One loader config per agent
    ///
    /// Agent `i` receives the `i`-th slice of every parameter, in the
    /// original parameter order.
    pub fn distribute(&self, agents: usize) -> Result<Vec<LoaderDataConfig>> {
        let mut per_agent = vec![LoaderDataConfig::new(); agents];

        for parameter in &self.parameters {
            let slices = parameter.distribute(agents)?;
            debug!(
                "Distributed parameter '{}' ({}) to {} agents",
                parameter.parameter_name(),
                parameter.type_name(),
                slices.len()
            );
            for (loader, slice) in per_agent.iter_mut().zip(slices) {
                loader.parameters.push(slice);
            }
        }

        Ok(per_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FileNamesDataConfig, ListDataConfig, ParameterValue, RangeDataConfig};

    fn sample() -> LoaderDataConfig {
        let mut loader = LoaderDataConfig::new();
        loader.add_parameter_config(ListDataConfig::new("sku", (0..6).map(ParameterValue::Integer).collect()));
        loader.add_parameter_config(RangeDataConfig::new("id", 1, 9));
        loader.add_parameter_config(FileNamesDataConfig::new("doc", "/tmp/docs"));
        loader
    }

    #[test]
    fn test_distribute_regroups_by_agent() {
        let slices = sample().distribute(3).unwrap();
        assert_eq!(slices.len(), 3);
        for (agent, loader) in slices.iter().enumerate() {
            let names: Vec<&str> = loader.parameter_configurations().iter().map(|p| p.parameter_name()).collect();
            assert_eq!(names, vec!["sku", "id", "doc"]);

            match &loader.parameter_configurations()[1] {
                ParameterDataConfig::Range(range) => assert_eq!(range.start, 1 + agent as i32 * 3),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_distribute_fails_whole() {
        let mut loader = sample();
        loader.add_parameter_config(ListDataConfig::new("tiny", vec!["x".into()]));
        assert!(loader.distribute(2).is_err());
    }

    #[test]
    fn test_distribute_empty_loader() {
        let slices = LoaderDataConfig::new().distribute(2).unwrap();
        assert_eq!(slices.len(), 2);
        assert!(slices.iter().all(LoaderDataConfig::is_empty));
    }

    #[test]
    fn test_verify_duplicates() {
        let mut loader = sample();
        assert!(loader.verify().is_ok());
        loader.add_parameter_config(RangeDataConfig::new("sku", 1, 2));
        assert!(loader.verify().unwrap_err().to_string().contains("'sku'"));
    }

    #[test]
    fn test_username_lookup() {
        let mut loader = sample();
        assert!(loader.username_config().is_none());
        loader.add_parameter_config(UsernameDataConfig::from_list(vec!["a".to_string()]));
        assert!(loader.username_config().is_some());
    }
}
