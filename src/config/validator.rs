//! Plan validation

use super::PlanConfig;
use crate::data::LoaderDataConfig;
use crate::pattern::ThreadingPattern;
use anyhow::{Context, Result};
use std::collections::HashSet;

/// Plan after validation, with the core values already built
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub loader: String,
    pub agents: Vec<String>,
    pub pattern: ThreadingPattern,
    pub data: LoaderDataConfig,
}

/// Validate complete plan
///
/// Builds every core value so pattern and data errors surface before any
/// distribution happens.
pub fn validate_plan(config: &PlanConfig) -> Result<ValidatedPlan> {
    if config.loader.trim().is_empty() {
        anyhow::bail!("loader name must not be empty");
    }
    validate_agents(&config.agents)?;

    let pattern = config
        .to_pattern()
        .with_context(|| format!("Invalid [pattern] section for loader '{}'", config.loader))?;

    let data = config
        .to_loader_data()
        .with_context(|| format!("Invalid [[parameters]] for loader '{}'", config.loader))?;
    data.verify()
        .with_context(|| format!("Invalid [[parameters]] for loader '{}'", config.loader))?;

    Ok(ValidatedPlan {
        loader: config.loader.clone(),
        agents: config.agents.clone(),
        pattern,
        data,
    })
}

/// Agent list must be non-empty and free of duplicates
pub fn validate_agents(agents: &[String]) -> Result<()> {
    if agents.is_empty() {
        anyhow::bail!("No agents specified (set 'agents' in the plan or pass --agents)");
    }

    let mut seen = HashSet::new();
    for agent in agents {
        if agent.trim().is_empty() {
            anyhow::bail!("Agent address must not be empty");
        }
        if !seen.insert(agent) {
            anyhow::bail!("Agent '{}' is listed more than once", agent);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml::parse_toml_string;

    fn plan(agents: &str, pattern: &str) -> PlanConfig {
        parse_toml_string(&format!(
            "loader = \"t\"\nagents = {}\n[pattern]\n{}\n[[parameters]]\ntype = \"range\"\nname = \"id\"\nstart = 1\nend = 10\n",
            agents, pattern
        ))
        .unwrap()
    }

    #[test]
    fn test_valid_plan() {
        let validated = validate_plan(&plan("[\"a\", \"b\"]", "kind = \"all_at_once\"\nthreads = 4")).unwrap();
        assert_eq!(validated.pattern.thread_count(), 4);
        assert_eq!(validated.data.parameter_configurations().len(), 1);
    }

    #[test]
    fn test_agents_checked() {
        assert!(validate_plan(&plan("[]", "kind = \"all_at_once\"\nthreads = 4")).is_err());
        let err = validate_plan(&plan("[\"a\", \"a\"]", "kind = \"all_at_once\"\nthreads = 4")).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_pattern_errors_have_context() {
        let err = validate_plan(&plan("[\"a\"]", "kind = \"ramp_up\"\nthreads = 4\nthreads_per_step = 8")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid [pattern] section for loader 't'"));
        assert!(message.contains("Invalid configuration"));
    }
}
