//! Provider factory
//!
//! Built-in config variants map to their providers directly. Custom configs
//! are resolved through a table of constructors keyed by the config's
//! `provider_tag`, filled at startup with [`ProviderRegistry::register`].

use super::sequence::{SequenceParameterDataProvider, SEQUENCE_TAG};
use super::{FileNamesParameterDataProvider, ListParameterDataProvider, ParameterDataProvider, RangeParameterDataProvider};
use crate::data::username::USERNAME_PARAM;
use crate::data::{CustomDataConfig, LoaderDataConfig, ParameterDataConfig, ParameterValue, UsernameSource};
use crate::error::Error;
use crate::Result;
use std::collections::HashMap;
use tracing::debug;

/// Builds a provider from a custom data config
pub type ProviderConstructor = fn(&CustomDataConfig) -> Result<Box<dyn ParameterDataProvider>>;

fn sequence(config: &CustomDataConfig) -> Result<Box<dyn ParameterDataProvider>> {
    Ok(Box::new(SequenceParameterDataProvider::from_config(config)?))
}

pub struct ProviderRegistry {
    constructors: HashMap<String, ProviderConstructor>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    /// Registry holding the built-in `sequence` provider
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(SEQUENCE_TAG, sequence);
        registry
    }

    /// Registry without any custom constructors
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Map `tag` to a constructor, replacing any previous one
    pub fn register(&mut self, tag: impl Into<String>, constructor: ProviderConstructor) {
        self.constructors.insert(tag.into(), constructor);
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Create and initialise the provider for one parameter config
    pub fn create(&self, config: &ParameterDataConfig) -> Result<Box<dyn ParameterDataProvider>> {
        let provider: Box<dyn ParameterDataProvider> = match config {
            ParameterDataConfig::List(c) => Box::new(ListParameterDataProvider::from_config(c)),
            ParameterDataConfig::Range(c) => Box::new(RangeParameterDataProvider::from_config(c)),
            ParameterDataConfig::FileNames(c) => Box::new(FileNamesParameterDataProvider::new(c.clone())),
            ParameterDataConfig::Username(c) => match &c.source {
                UsernameSource::List { values } => Box::new(ListParameterDataProvider::new(
                    USERNAME_PARAM,
                    values.iter().cloned().map(ParameterValue::Text).collect(),
                    c.level,
                )),
                UsernameSource::Range { template, start, end } => Box::new(RangeParameterDataProvider::new(
                    USERNAME_PARAM,
                    Some(template.clone()),
                    *start,
                    *end,
                    c.level,
                )),
            },
            ParameterDataConfig::Custom(c) => {
                let constructor = self
                    .constructors
                    .get(&c.provider_tag)
                    .ok_or_else(|| Error::UnsupportedProvider {
                        tag: c.provider_tag.clone(),
                    })?;
                constructor(c)?
            }
        };

        provider.initialize()?;
        debug!(
            "Created {} provider for parameter '{}' ({})",
            config.type_name(),
            provider.parameter_name(),
            provider.level()
        );
        Ok(provider)
    }

    /// Providers for every parameter of a loader, in declaration order
    pub fn create_all(&self, loader: &LoaderDataConfig) -> Result<Vec<Box<dyn ParameterDataProvider>>> {
        loader
            .parameter_configurations()
            .iter()
            .map(|config| self.create(config))
            .collect()
    }
}
