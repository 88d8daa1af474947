//! Domain primitive types and the engine-to-generator data contract.

use std::fmt;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CradleError, Result};

/// Unique identifier for a container instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a new container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pod-membership metadata for a container that belongs to a pod.
///
/// Supplied by the engine; the generator only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    /// Service name of the pod's own unit. The container unit binds to and
    /// starts after it.
    pub service_name: String,
    /// Supervisor-expanded placeholder for the pod's ID file, referenced by
    /// member units when recreating the container.
    pub pod_id_file: String,
}

/// Container metadata handed to the unit generator by the engine.
///
/// This is the stable input contract: the engine (or any other caller) fills
/// it from its own records, typically via inspect output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerMetadata {
    /// Unique identifier of the container.
    pub id: ContainerId,
    /// Human-readable name of the container.
    pub name: String,
    /// Timeout in seconds the engine waits before killing the container.
    pub stop_timeout: u32,
    /// Path to the PID file of the container's conmon process.
    #[serde(default)]
    pub conmon_pid_file: String,
    /// Runtime root directory recorded for the container.
    #[serde(default)]
    pub run_root: String,
    /// Full command plus arguments the container was created with, when the
    /// container was created through the tracked entry point.
    #[serde(default)]
    pub create_command: Option<Vec<String>>,
    /// Environment variables of the container process.
    #[serde(default)]
    pub env: Vec<(String, String)>,
    /// Pod membership, if the container belongs to a pod.
    #[serde(default)]
    pub pod: Option<PodInfo>,
}

impl ContainerMetadata {
    /// Deserializes container metadata from a JSON reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid metadata JSON.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads container metadata from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| CradleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}
