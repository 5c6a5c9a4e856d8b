//! Custom provider configs
//!
//! The provider is looked up by `provider_tag` in a
//! [`crate::provider::ProviderRegistry`] on the agent.

use super::ParameterProviderLevel;
use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDataConfig {
    pub parameter_name: String,
    pub level: ParameterProviderLevel,
    /// Registry key of the provider constructor
    pub provider_tag: String,
    /// Free-form settings passed to the provider
    #[serde(default)]
    pub control_tokens: BTreeMap<String, String>,
}

impl CustomDataConfig {
    pub fn new(parameter_name: impl Into<String>, provider_tag: impl Into<String>, level: ParameterProviderLevel) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            level,
            provider_tag: provider_tag.into(),
            control_tokens: BTreeMap::new(),
        }
    }

    pub fn with_token(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.control_tokens.insert(key.into(), value.into());
        self
    }

    pub(crate) fn verify(&self) -> Result<()> {
        if self.provider_tag.trim().is_empty() {
            return Err(Error::config(format!(
                "No provider tag is set for custom parameter '{}'",
                self.parameter_name
            )));
        }
        Ok(())
    }

    /// Every agent receives a full copy
    pub fn distribute(&self, agents: usize) -> Vec<CustomDataConfig> {
        vec![self.clone(); agents]
    }
}
