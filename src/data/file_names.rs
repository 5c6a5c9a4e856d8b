//! File names enumerated from folders
//!
//! Each [`FileContainer`] is a folder, a percentage and a regex matched
//! against bare file names. The files themselves are listed on the agent at
//! provider initialisation, so distribution copies the config unchanged.

use super::ParameterProviderLevel;
use crate::error::Error;
use crate::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Regex matching every file name
pub const MATCH_ALL_PATTERN: &str = ".*";

const HUNDRED_PERCENTS: u32 = 100;

/// One folder of a file-name pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContainer {
    pub folder: PathBuf,
    pub percentage: u32,
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_pattern() -> String {
    MATCH_ALL_PATTERN.to_string()
}

impl FileContainer {
    pub fn new(folder: impl Into<PathBuf>, percentage: u32, pattern: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            percentage,
            pattern: pattern.into(),
        }
    }

    /// Whether the pattern references other parameters as `${name}`
    pub fn is_pattern_containing_params(&self) -> bool {
        self.pattern.contains("${")
    }
}

/// Values taken from file names under one or more folders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNamesDataConfig {
    pub parameter_name: String,
    pub level: ParameterProviderLevel,
    pub containers: Vec<FileContainer>,
    pub recursive_search: bool,
    pub return_full_path: bool,
}

impl FileNamesDataConfig {
    /// All files of one folder, searched recursively, returned as full paths
    pub fn new(parameter_name: impl Into<String>, folder: impl Into<PathBuf>) -> Self {
        let mut config = Self::empty(parameter_name);
        config.add_folder(folder, HUNDRED_PERCENTS);
        config
    }

    /// Config without folders; add them with [`FileNamesDataConfig::add_folder`]
    pub fn empty(parameter_name: impl Into<String>) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            level: ParameterProviderLevel::PerThread,
            containers: Vec::new(),
            recursive_search: true,
            return_full_path: true,
        }
    }

    pub fn with_level(mut self, level: ParameterProviderLevel) -> Self {
        self.level = level;
        self
    }

    pub fn recursive_search(mut self, recursive: bool) -> Self {
        self.recursive_search = recursive;
        self
    }

    pub fn return_full_path(mut self, full_path: bool) -> Self {
        self.return_full_path = full_path;
        self
    }

    pub fn add_folder(&mut self, folder: impl Into<PathBuf>, percentage: u32) {
        self.add_folder_matching(folder, percentage, MATCH_ALL_PATTERN);
    }

    pub fn add_folder_matching(&mut self, folder: impl Into<PathBuf>, percentage: u32, pattern: impl Into<String>) {
        self.containers.push(FileContainer::new(folder, percentage, pattern));
    }

    pub fn containers(&self) -> &[FileContainer] {
        &self.containers
    }

    /// Percentages must add up to exactly 100 and plain patterns must compile
    pub(crate) fn verify(&self) -> Result<()> {
        let total: u64 = self.containers.iter().map(|c| u64::from(c.percentage)).sum();
        if total != u64::from(HUNDRED_PERCENTS) {
            return Err(Error::config(format!(
                "The sum of percentages of all folders for the file data configurator '{}' is {}% (different than 100)",
                self.parameter_name, total
            )));
        }

        for container in self.containers.iter().filter(|c| !c.is_pattern_containing_params()) {
            Regex::new(&container.pattern).map_err(|e| {
                Error::config(format!(
                    "Invalid file name regex '{}' for parameter '{}': {}",
                    container.pattern, self.parameter_name, e
                ))
            })?;
        }
        Ok(())
    }

    /// Every agent receives a full copy
    pub fn distribute(&self, agents: usize) -> Vec<FileNamesDataConfig> {
        vec![self.clone(); agents]
    }
}
