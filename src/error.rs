//! Error types
//!
//! Three classes of failure come out of this crate:
//!
//! - **Configuration** errors: invalid pattern or data configuration. Raised at
//!   build or verification time.
//! - **Distribution** errors: too few threads, steps or values to give every
//!   agent at least one unit. Raised by `distribute()`, which never returns a
//!   partial result.
//! - **Generation** errors: raised while a provider produces values during a run.
//!
//! Configuration and distribution errors are fatal for the run being planned.
//! Generation errors are returned to the caller, which decides what to do.

use thiserror::Error;

/// Errors produced while building, distributing or running load configurations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A quantity cannot be spread over the requested number of recipients
    #[error(
        "Could not distribute only {available} {quantity} to {requested} {recipients}! \
         Decrease the number of {recipients} or increase the {quantity}."
    )]
    Distribution {
        /// What was being split (e.g. "values of parameter 'user'")
        quantity: String,
        /// How many units were available
        available: u64,
        /// How many recipients were requested
        requested: usize,
        /// Who the recipients are (agents, hosts)
        recipients: &'static str,
    },

    /// A provider failed to produce a value
    #[error("{0}")]
    Generation(String),

    /// A provider was queried before `initialize()`
    #[error("Data provider for parameter '{parameter}' is not initialized")]
    NotInitialized {
        /// Parameter the provider serves
        parameter: String,
    },

    /// No registered constructor for a custom provider tag
    #[error("No data provider is registered for '{tag}'")]
    UnsupportedProvider {
        /// Tag carried by the custom data config
        tag: String,
    },

    /// Filesystem error while enumerating files
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode an agent assignment
    #[error("Failed to encode assignment: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode an agent assignment
    #[error("Failed to decode assignment: {0}")]
    Decode(String),
}

impl Error {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Distribution error for agents as recipients
    pub fn not_enough_for_agents(quantity: impl Into<String>, available: u64, requested: usize) -> Self {
        Self::Distribution {
            quantity: quantity.into(),
            available,
            requested,
            recipients: "agents",
        }
    }

    /// Whether this error was raised while configuring (as opposed to running)
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Distribution { .. } | Self::UnsupportedProvider { .. })
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
