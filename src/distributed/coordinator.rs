//! Distribution planner
//!
//! The planner runs on the controller. It:
//! - Splits the threading pattern across the agents
//! - Splits the loader's parameter data across the resulting pattern slices
//! - Checks every agent has enough usernames for its threads
//! - Pairs pattern and data slices into [`AgentAssignment`]s

use crate::data::LoaderDataConfig;
use crate::distributed::protocol::{AgentAssignment, PROTOCOL_VERSION};
use crate::error::Error;
use crate::pattern::ThreadingPattern;
use crate::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of planning one load test
#[derive(Debug, Clone, Serialize)]
pub struct DistributionPlan {
    pub loader: String,
    /// Thread count of the undistributed pattern
    pub total_threads: u32,
    /// Pattern description rendered with the total thread count
    pub description: String,
    /// One assignment per agent that received work
    pub assignments: Vec<AgentAssignment>,
}

impl DistributionPlan {
    /// Agents that were given no slice because the pattern was too small
    pub fn idle_agents(&self, agents: &[String]) -> Vec<String> {
        agents
            .iter()
            .skip(self.assignments.len())
            .cloned()
            .collect()
    }
}

/// Splits one loader's pattern and data over a set of agents
pub struct DistributionPlanner {
    /// Loader (test) name
    loader: String,

    /// Agent addresses or labels
    agents: Vec<String>,

    /// Host name recorded in every assignment
    controller_host: String,
}

impl DistributionPlanner {
    /// Create a planner for the given agents
    pub fn new(loader: impl Into<String>, agents: Vec<String>) -> Result<Self> {
        if agents.is_empty() {
            return Err(Error::config("No agents specified for distribution"));
        }

        let controller_host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        Ok(Self {
            loader: loader.into(),
            agents,
            controller_host,
        })
    }

    /// Override the controller host name
    pub fn with_controller_host(mut self, host: impl Into<String>) -> Self {
        self.controller_host = host.into();
        self
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    /// Plan the run
    ///
    /// Fails as a whole if the data cannot be split over the pattern slices
    /// or an agent would get fewer usernames than threads.
    pub fn plan(&self, pattern: &ThreadingPattern, data: &LoaderDataConfig) -> Result<DistributionPlan> {
        data.verify()?;

        let patterns = pattern.distribute(self.agents.len())?;
        if patterns.len() < self.agents.len() {
            warn!(
                "Loader '{}': only {} of {} agents will get work",
                self.loader,
                patterns.len(),
                self.agents.len()
            );
        }

        let data_slices = data.distribute(patterns.len())?;

        if let Some(usernames) = data.username_config() {
            usernames.verify_enough_usernames(pattern.thread_count())?;
        }

        let created_at = Utc::now();
        let agent_count = patterns.len();
        let mut assignments = Vec::with_capacity(agent_count);

        for (index, (agent_pattern, agent_data)) in patterns.into_iter().zip(data_slices).enumerate() {
            if let Some(usernames) = agent_data.username_config() {
                usernames.verify_enough_usernames(agent_pattern.thread_count())?;
            }

            debug!(
                "Agent {} ({}): {}",
                index,
                self.agents[index],
                agent_pattern.describe_for_threads(agent_pattern.thread_count() as u64)
            );

            assignments.push(AgentAssignment {
                protocol_version: PROTOCOL_VERSION,
                loader: self.loader.clone(),
                agent: self.agents[index].clone(),
                agent_index: index,
                agent_count,
                controller_host: self.controller_host.clone(),
                created_at,
                pattern: agent_pattern,
                data: agent_data,
            });
        }

        let description = pattern.describe_for_threads(pattern.thread_count() as u64);
        info!("Planned loader '{}' on {} agents: {}", self.loader, agent_count, description);

        Ok(DistributionPlan {
            loader: self.loader.clone(),
            total_threads: pattern.thread_count(),
            description,
            assignments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ListDataConfig, ParameterDataConfig, ParameterValue, RangeDataConfig, UsernameDataConfig};

    fn agents(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("agent-{}", i)).collect()
    }

    fn data() -> LoaderDataConfig {
        let mut data = LoaderDataConfig::new();
        data.add_parameter_config(RangeDataConfig::new("id", 10, 42));
        data.add_parameter_config(ListDataConfig::new("sku", (0..9).map(ParameterValue::Integer).collect()));
        data
    }

    #[test]
    fn test_plan_pairs_slices() {
        let planner = DistributionPlanner::new("checkout", agents(3)).unwrap().with_controller_host("ctl");
        let pattern = ThreadingPattern::all_at_once(100).iterations(5).build().unwrap();
        let plan = planner.plan(&pattern, &data()).unwrap();

        assert_eq!(plan.total_threads, 100);
        assert_eq!(plan.description, "All at once - 100 threads, 5 continuous iterations");
        assert_eq!(plan.assignments.len(), 3);

        let threads: Vec<u32> = plan.assignments.iter().map(|a| a.pattern.thread_count()).collect();
        assert_eq!(threads, vec![33, 33, 34]);

        let ranges: Vec<(i32, i32)> = plan
            .assignments
            .iter()
            .map(|a| match &a.data.parameter_configurations()[0] {
                ParameterDataConfig::Range(r) => (r.start, r.end),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(ranges, vec![(10, 20), (21, 31), (32, 42)]);

        for (i, assignment) in plan.assignments.iter().enumerate() {
            assert_eq!(assignment.agent_index, i);
            assert_eq!(assignment.agent_count, 3);
            assert_eq!(assignment.controller_host, "ctl");
            assert_eq!(assignment.loader, "checkout");
        }
    }

    #[test]
    fn test_small_pattern_uses_one_agent() {
        let planner = DistributionPlanner::new("tiny", agents(4)).unwrap();
        let pattern = ThreadingPattern::all_at_once(2).build().unwrap();
        let plan = planner.plan(&pattern, &data()).unwrap();

        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].pattern.thread_count(), 2);
        assert_eq!(plan.assignments[0].data, data());
        assert_eq!(plan.idle_agents(planner.agents()), vec!["agent-1", "agent-2", "agent-3"]);
    }

    #[test]
    fn test_not_enough_data_fails() {
        let planner = DistributionPlanner::new("checkout", agents(10)).unwrap();
        let pattern = ThreadingPattern::all_at_once(100).build().unwrap();
        let err = planner.plan(&pattern, &data()).unwrap_err();
        assert!(matches!(err, Error::Distribution { requested: 10, available: 9, .. }));
    }

    #[test]
    fn test_usernames_per_agent() {
        let planner = DistributionPlanner::new("login", agents(2)).unwrap();
        let pattern = ThreadingPattern::all_at_once(10).build().unwrap();

        let mut data = LoaderDataConfig::new();
        data.add_parameter_config(UsernameDataConfig::from_range("user{0}", 1, 10));
        assert!(planner.plan(&pattern, &data).is_ok());

        let mut short = LoaderDataConfig::new();
        short.add_parameter_config(UsernameDataConfig::from_range("user{0}", 1, 8));
        let err = planner.plan(&pattern, &short).unwrap_err();
        assert!(err.to_string().contains("provided only 8 different user names"));
    }

    #[test]
    fn test_no_agents() {
        assert!(DistributionPlanner::new("x", Vec::new()).is_err());
    }
}
