//! Distribution to agents
//!
//! A load test is planned on the controller and executed by agents:
//!
//! - **Controller**: splits the pattern and data with the planner, ships one
//!   assignment to each agent
//! - **Agent**: decodes its assignment, creates parameter providers for its
//!   data slice and runs its pattern slice
//!
//! # Modules
//!
//! - `protocol`: Assignment envelope and framing
//! - `coordinator`: Distribution planner

pub mod coordinator;
pub mod protocol;

// Re-export key types
pub use coordinator::{DistributionPlan, DistributionPlanner};
pub use protocol::{
    decode_assignment, encode_assignment, read_assignment, write_assignment, AgentAssignment, PROTOCOL_VERSION,
};
