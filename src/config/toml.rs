//! TOML plan file parsing

use super::PlanConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML plan file
pub fn parse_toml_file(path: &Path) -> Result<PlanConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse plan file: {}", path.display()))
}

/// Parse TOML plan from string
pub fn parse_toml_string(contents: &str) -> Result<PlanConfig> {
    let config: PlanConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML plan")?;

    Ok(config)
}

/// Replace the plan's agents with `count` anonymous ones
pub fn override_agents(config: &mut PlanConfig, count: usize) {
    config.agents = (0..count).map(|i| format!("agent-{}", i)).collect();
}
