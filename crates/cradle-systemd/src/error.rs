//! Error types for systemd unit generation.
//!
//! Every variant is terminal for the generation call that produced it; no
//! partial unit text is ever returned alongside an error.

use thiserror::Error;

/// Errors that can occur while generating a container unit file.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No conmon PID file path is recorded for the container.
    #[error(
        "conmon PID file path for container {id} is empty, try to recreate \
         the container with the --conmon-pidfile flag"
    )]
    MissingPidFile {
        /// Identifier of the offending container.
        id: String,
    },

    /// Self-sufficient mode was requested but no create command is recorded.
    #[error(
        "cannot use --new on container {id}: no create command found: only \
         works on containers created directly through the CLI"
    )]
    MissingCreateCommand {
        /// Identifier of the offending container.
        id: String,
    },

    /// The restart policy is not one of the recognized values.
    #[error("invalid restart policy {value:?}, expected one of no, on-failure, always")]
    InvalidRestartPolicy {
        /// The unrecognized policy string.
        value: String,
    },

    /// The recorded create command contains no `run` or `create` subcommand.
    #[error("container's create command is too short or invalid: {command:?}")]
    InvalidCreateCommand {
        /// The offending command tokens.
        command: Vec<String>,
    },

    /// The container's runtime root directory could not be looked up.
    #[error("could not lookup container {id}'s runroot: got empty string")]
    UnresolvedRuntimeRoot {
        /// Identifier of the offending container.
        id: String,
    },

    /// A macro-expansion pass over the unit template failed.
    ///
    /// Malformed descriptor content reaching the renderer is a programming
    /// error, not a user error.
    #[error("error expanding unit template: {message}")]
    Template {
        /// Description of the expansion failure.
        message: String,
    },
}

/// Convenience alias for unit-generation results.
pub type Result<T> = std::result::Result<T, GenerateError>;
