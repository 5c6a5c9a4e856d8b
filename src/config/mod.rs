//! Configuration module
//!
//! Handles CLI argument parsing, TOML plan files, conversion into core
//! values, and validation.

pub mod cli;
pub mod convert;
pub mod toml;
pub mod validator;

use crate::data::{ParameterProviderLevel, ParameterValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Complete load test plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Loader (test) name
    pub loader: String,
    /// Agent addresses; may be replaced from the command line
    #[serde(default)]
    pub agents: Vec<String>,
    pub pattern: PatternConfig,
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
}

/// Threading pattern variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKindConfig {
    AllAtOnce,
    FixedDurationAllAtOnce,
    RampUp,
    FixedDurationRampUp,
}

impl PatternKindConfig {
    pub fn is_fixed_duration(&self) -> bool {
        matches!(self, Self::FixedDurationAllAtOnce | Self::FixedDurationRampUp)
    }
}

impl fmt::Display for PatternKindConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllAtOnce => write!(f, "all_at_once"),
            Self::FixedDurationAllAtOnce => write!(f, "fixed_duration_all_at_once"),
            Self::RampUp => write!(f, "ramp_up"),
            Self::FixedDurationRampUp => write!(f, "fixed_duration_ramp_up"),
        }
    }
}

/// `[pattern]` section
///
/// Unset fields keep the pattern builder's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    pub kind: PatternKindConfig,
    pub threads: u32,
    pub iterations: Option<u32>,
    pub duration_secs: Option<u32>,
    pub interval_ms: Option<i64>,
    pub min_interval_ms: Option<i64>,
    pub max_interval_ms: Option<i64>,
    pub ramp_up_interval_ms: Option<i64>,
    pub threads_per_step: Option<i64>,
    pub iteration_timeout_secs: Option<u32>,
    pub block_until_completion: Option<bool>,
    pub queue_pass_rate: Option<f32>,
    pub synchronized_iterations: Option<bool>,
    pub execution_speed: Option<ExecutionSpeedConfig>,
}

/// `[pattern.execution_speed]` section
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExecutionSpeedConfig {
    pub time_frame_secs: i64,
    pub executions_per_time_frame: i64,
}

/// One `[[parameters]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterConfig {
    List {
        name: String,
        level: Option<ParameterProviderLevel>,
        values: Vec<ParameterValue>,
    },
    Range {
        name: String,
        level: Option<ParameterProviderLevel>,
        start: i32,
        /// Unbounded when omitted
        end: Option<i32>,
        /// String range template containing `{0}`
        template: Option<String>,
    },
    FileNames {
        name: String,
        level: Option<ParameterProviderLevel>,
        #[serde(default)]
        folders: Vec<FolderConfig>,
        recursive: Option<bool>,
        full_path: Option<bool>,
    },
    Username {
        level: Option<ParameterProviderLevel>,
        /// Explicit user names
        values: Option<Vec<String>>,
        /// Range form: template with `{0}` plus start/end
        template: Option<String>,
        start: Option<i32>,
        end: Option<i32>,
    },
    Custom {
        name: String,
        level: Option<ParameterProviderLevel>,
        /// Registry tag of the provider
        provider: String,
        #[serde(default)]
        tokens: BTreeMap<String, String>,
    },
}

impl ParameterConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::List { name, .. }
            | Self::Range { name, .. }
            | Self::FileNames { name, .. }
            | Self::Custom { name, .. } => name,
            Self::Username { .. } => crate::data::username::USERNAME_PARAM,
        }
    }
}

/// Folder of a `file_names` parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    pub path: PathBuf,
    #[serde(default = "default_percentage")]
    pub percentage: u32,
    /// Regex the whole file name has to match
    pub pattern: Option<String>,
}

fn default_percentage() -> u32 {
    100
}
