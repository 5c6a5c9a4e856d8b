//! Agent assignment envelope
//!
//! The controller ships one [`AgentAssignment`] to every agent: the agent's
//! slice of the threading pattern plus its slice of the loader's parameter
//! data. Assignments are encoded with MessagePack (rmp-serde) using named
//! fields, since the data configs are internally tagged enums.
//!
//! # Protocol Version
//!
//! Current version: 1
//!
//! # Framing
//!
//! Each assignment is prefixed with a 4-byte length field (little-endian u32):
//!
//! ```text
//! [4 bytes: payload length][N bytes: MessagePack payload]
//! ```

use crate::data::LoaderDataConfig;
use crate::error::Error;
use crate::pattern::ThreadingPattern;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Protocol version
///
/// Increment this when the assignment layout changes.
/// Controller and agents must have matching protocol versions.
pub const PROTOCOL_VERSION: u32 = 1;

const LENGTH_PREFIX: usize = 4;

/// Everything one agent needs to run its share of a load test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAssignment {
    pub protocol_version: u32,
    /// Loader (test) name
    pub loader: String,
    /// Agent address or label
    pub agent: String,
    pub agent_index: usize,
    /// Number of agents that received a slice
    pub agent_count: usize,
    pub controller_host: String,
    pub created_at: DateTime<Utc>,
    pub pattern: ThreadingPattern,
    pub data: LoaderDataConfig,
}

/// Encode an assignment with its length prefix
pub fn encode_assignment(assignment: &AgentAssignment) -> Result<Vec<u8>> {
    let payload = rmp_serde::to_vec_named(assignment)?;

    let len = u32::try_from(payload.len())
        .map_err(|_| Error::Decode(format!("Assignment too large ({} bytes)", payload.len())))?;
    let mut framed = Vec::with_capacity(LENGTH_PREFIX + payload.len());
    framed.extend_from_slice(&len.to_le_bytes());
    framed.extend_from_slice(&payload);

    Ok(framed)
}

/// Decode one framed assignment
///
/// Returns the assignment and the number of bytes consumed.
pub fn decode_assignment(buf: &[u8]) -> Result<(AgentAssignment, usize)> {
    if buf.len() < LENGTH_PREFIX {
        return Err(Error::Decode(format!(
            "Buffer too small for assignment length (need {} bytes, got {})",
            LENGTH_PREFIX,
            buf.len()
        )));
    }

    let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if buf.len() < LENGTH_PREFIX + len {
        return Err(Error::Decode(format!(
            "Incomplete assignment (need {} bytes, got {})",
            LENGTH_PREFIX + len,
            buf.len()
        )));
    }

    let assignment: AgentAssignment = rmp_serde::from_slice(&buf[LENGTH_PREFIX..LENGTH_PREFIX + len])?;
    check_version(&assignment)?;
    Ok((assignment, LENGTH_PREFIX + len))
}

fn check_version(assignment: &AgentAssignment) -> Result<()> {
    if assignment.protocol_version != PROTOCOL_VERSION {
        return Err(Error::Decode(format!(
            "Protocol version mismatch: assignment has {}, expected {}",
            assignment.protocol_version, PROTOCOL_VERSION
        )));
    }
    Ok(())
}

/// Write one framed assignment
pub fn write_assignment<W: Write>(writer: &mut W, assignment: &AgentAssignment) -> Result<()> {
    writer.write_all(&encode_assignment(assignment)?)?;
    writer.flush()?;
    Ok(())
}

/// Read one framed assignment
pub fn read_assignment<R: Read>(reader: &mut R) -> Result<AgentAssignment> {
    let mut len_buf = [0u8; LENGTH_PREFIX];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    let assignment: AgentAssignment = rmp_serde::from_slice(&payload)?;
    check_version(&assignment)?;
    Ok(assignment)
}
