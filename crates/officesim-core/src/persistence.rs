//! Save/Load of office snapshots
//!
//! A snapshot is the active layout plus each primary agent's palette and
//! seat, encoded with bincode. Characters themselves are not saved: agents
//! come and go with their host processes, so a restored office only
//! remembers where each one likes to sit.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::office::{AgentRecord, OfficeState};
use officesim_logic::layout::{validate_layout, Layout, LayoutError};

/// Version number for snapshot format (increment when format changes)
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeSnapshot {
    /// Snapshot format version
    pub version: u32,
    pub layout: Layout,
    pub agents: Vec<AgentRecord>,
}

impl OfficeSnapshot {
    pub fn capture(office: &OfficeState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            layout: office.layout().clone(),
            agents: office.agent_records(),
        }
    }
}

/// Write a snapshot of the office to a writer
pub fn save_snapshot<W: Write>(writer: W, office: &OfficeState) -> Result<(), SaveError> {
    bincode::serialize_into(writer, &OfficeSnapshot::capture(office))?;
    Ok(())
}

/// Read a snapshot from a reader
pub fn load_snapshot<R: Read>(reader: R) -> Result<OfficeSnapshot, SaveError> {
    let snapshot: OfficeSnapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        log::warn!("Rejected office snapshot version {}", snapshot.version);
        return Err(SaveError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: snapshot.version,
        });
    }
    if let Err(e) = validate_layout(&snapshot.layout) {
        log::warn!("Rejected office snapshot layout: {}", e);
        return Err(e.into());
    }
    Ok(snapshot)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    Layout(LayoutError),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<LayoutError> for SaveError {
    fn from(e: LayoutError) -> Self {
        SaveError::Layout(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Snapshot version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::Layout(e) => write!(f, "Invalid snapshot layout: {}", e),
        }
    }
}

impl std::error::Error for SaveError {}
