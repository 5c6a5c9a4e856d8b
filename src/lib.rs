//! loadsplit - Threading patterns and parameter data for distributed load tests
//!
//! A controller describes one load test as a threading pattern plus a set of
//! parameter data configs, splits both evenly across its agents, and ships
//! each agent its share. Agents turn their data share into value providers
//! that worker threads pull from during the run.
//!
//! # Architecture
//!
//! - **Even load split**: one rule (`even_load`) for threads, steps, rate
//!   limits and data pools
//! - **Threading patterns**: all-at-once and ramp-up, by iterations or duration
//! - **Parameter data**: lists, ranges, file names, usernames, custom providers
//! - **Providers**: per-thread, per-thread-static and per-invocation value
//!   generation, safe to share between worker threads
//! - **Distribution**: versioned agent assignments encoded with MessagePack

pub mod config;
pub mod data;
pub mod distributed;
pub mod distribution;
pub mod error;
pub mod pattern;
pub mod provider;
pub mod util;

// Re-export commonly used types
pub use data::{LoaderDataConfig, ParameterDataConfig, ParameterProviderLevel, ParameterValue};
pub use distributed::{AgentAssignment, DistributionPlanner};
pub use distribution::even_load;
pub use error::Error;
pub use pattern::{PatternBuilder, ThreadingPattern};
pub use provider::{ParameterDataProvider, ProviderRegistry};

/// Result type used throughout loadsplit
pub type Result<T> = std::result::Result<T, Error>;
