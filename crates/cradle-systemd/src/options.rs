//! Generation options and the systemd restart policy.

use std::fmt;
use std::str::FromStr;

use cradle_common::constants::{DEFAULT_CONTAINER_PREFIX, DEFAULT_SEPARATOR};

use crate::error::GenerateError;

/// Restart policy of the generated systemd unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never restart the service.
    No,
    /// Restart only on unclean exit.
    #[default]
    OnFailure,
    /// Always restart the service.
    Always,
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::No => write!(f, "no"),
            Self::OnFailure => write!(f, "on-failure"),
            Self::Always => write!(f, "always"),
        }
    }
}

impl FromStr for RestartPolicy {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no" => Ok(Self::No),
            "on-failure" => Ok(Self::OnFailure),
            "always" => Ok(Self::Always),
            other => Err(GenerateError::InvalidRestartPolicy {
                value: other.to_owned(),
            }),
        }
    }
}

/// Options controlling how a container unit is generated.
#[derive(Debug, Clone)]
pub struct UnitOptions {
    /// Use the container name instead of its ID in the service name.
    pub use_name: bool,
    /// Prefix of the generated service name.
    pub container_prefix: String,
    /// Separator between the prefix and the container reference.
    pub separator: String,
    /// Restart policy of the generated unit.
    pub restart_policy: RestartPolicy,
    /// Override for the container's recorded stop timeout, in seconds.
    pub stop_timeout: Option<u32>,
    /// Generate a self-sufficient unit that recreates the container from its
    /// recorded create command on every start, rather than restarting an
    /// existing container.
    pub new: bool,
    /// Suppress the autogenerated header comment and timestamp.
    pub no_header: bool,
    /// Path of the engine binary to embed in exec lines. When unset, the
    /// running executable is used, falling back to
    /// [`cradle_common::constants::DEFAULT_EXECUTABLE`] with a warning.
    pub executable: Option<String>,
}

impl Default for UnitOptions {
    fn default() -> Self {
        Self {
            use_name: false,
            container_prefix: DEFAULT_CONTAINER_PREFIX.to_owned(),
            separator: DEFAULT_SEPARATOR.to_owned(),
            restart_policy: RestartPolicy::default(),
            stop_timeout: None,
            new: false,
            no_header: false,
            executable: None,
        }
    }
}
