//! Parameter data configurations
//!
//! A [`ParameterDataConfig`] describes where the values of one action
//! parameter come from and how often a new value is generated. Configs are
//! plain values: they are split on the controller with
//! [`ParameterDataConfig::distribute`] and the slices are shipped to agents,
//! where [`crate::provider`] turns them into value generators.

pub mod custom;
pub mod file_names;
pub mod list;
pub mod loader;
pub mod range;
pub mod username;

pub use custom::CustomDataConfig;
pub use file_names::{FileContainer, FileNamesDataConfig};
pub use list::ListDataConfig;
pub use loader::LoaderDataConfig;
pub use range::RangeDataConfig;
pub use username::{UsernameDataConfig, UsernameSource};

use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a provider generates a new value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterProviderLevel {
    /// Every call from a thread moves that thread to the next value
    PerThread,
    /// Every thread keeps one value for its whole lifetime
    PerThreadStatic,
    /// Every call, from any thread, moves one shared cursor
    PerInvocation,
}

impl fmt::Display for ParameterProviderLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterProviderLevel::PerThread => write!(f, "PER_THREAD"),
            ParameterProviderLevel::PerThreadStatic => write!(f, "PER_THREAD_STATIC"),
            ParameterProviderLevel::PerInvocation => write!(f, "PER_INVOCATION"),
        }
    }
}

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Integer(v) => write!(f, "{}", v),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Boolean(v) => write!(f, "{}", v),
            ParameterValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

/// A generated value together with the parameter it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentValue {
    pub name: String,
    pub value: ParameterValue,
}

impl ArgumentValue {
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Source of values for one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterDataConfig {
    List(ListDataConfig),
    Range(RangeDataConfig),
    FileNames(FileNamesDataConfig),
    Username(UsernameDataConfig),
    Custom(CustomDataConfig),
}

impl ParameterDataConfig {
    pub fn parameter_name(&self) -> &str {
        match self {
            ParameterDataConfig::List(c) => &c.parameter_name,
            ParameterDataConfig::Range(c) => &c.parameter_name,
            ParameterDataConfig::FileNames(c) => &c.parameter_name,
            ParameterDataConfig::Username(_) => username::USERNAME_PARAM,
            ParameterDataConfig::Custom(c) => &c.parameter_name,
        }
    }

    pub fn level(&self) -> ParameterProviderLevel {
        match self {
            ParameterDataConfig::List(c) => c.level,
            ParameterDataConfig::Range(c) => c.level,
            ParameterDataConfig::FileNames(c) => c.level,
            ParameterDataConfig::Username(c) => c.level,
            ParameterDataConfig::Custom(c) => c.level,
        }
    }

    /// Short variant name for listings
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterDataConfig::List(_) => "list",
            ParameterDataConfig::Range(_) => "range",
            ParameterDataConfig::FileNames(_) => "file_names",
            ParameterDataConfig::Username(_) => "username",
            ParameterDataConfig::Custom(_) => "custom",
        }
    }

    /// Check the config before it is distributed or initialised
    pub fn verify(&self) -> Result<()> {
        if self.parameter_name().trim().is_empty() {
            return Err(Error::config("Parameter name must not be empty"));
        }
        match self {
            ParameterDataConfig::List(c) => c.verify(),
            ParameterDataConfig::Range(c) => c.verify(),
            ParameterDataConfig::FileNames(c) => c.verify(),
            ParameterDataConfig::Username(c) => c.verify(),
            ParameterDataConfig::Custom(c) => c.verify(),
        }
    }

    /// Split into one config per agent
    ///
    /// Either all `agents` slices are returned or an error; never a partial
    /// result.
    pub fn distribute(&self, agents: usize) -> Result<Vec<ParameterDataConfig>> {
        Ok(match self {
            ParameterDataConfig::List(c) => c.distribute(agents)?.into_iter().map(Self::List).collect(),
            ParameterDataConfig::Range(c) => c.distribute(agents)?.into_iter().map(Self::Range).collect(),
            ParameterDataConfig::FileNames(c) => c.distribute(agents).into_iter().map(Self::FileNames).collect(),
            ParameterDataConfig::Username(c) => c.distribute(agents)?.into_iter().map(Self::Username).collect(),
            ParameterDataConfig::Custom(c) => c.distribute(agents).into_iter().map(Self::Custom).collect(),
        })
    }
}

impl From<ListDataConfig> for ParameterDataConfig {
    fn from(config: ListDataConfig) -> Self {
        Self::List(config)
    }
}

impl From<RangeDataConfig> for ParameterDataConfig {
    fn from(config: RangeDataConfig) -> Self {
        Self::Range(config)
    }
}

impl From<FileNamesDataConfig> for ParameterDataConfig {
    fn from(config: FileNamesDataConfig) -> Self {
        Self::FileNames(config)
    }
}

impl From<UsernameDataConfig> for ParameterDataConfig {
    fn from(config: UsernameDataConfig) -> Self {
        Self::Username(config)
    }
}

impl From<CustomDataConfig> for ParameterDataConfig {
    fn from(config: CustomDataConfig) -> Self {
        Self::Custom(config)
    }
}

/// Quantity label used in distribution errors
pub(crate) fn values_of(parameter: &str) -> String {
    format!("values of parameter '{}'", parameter)
}
