//! System-wide constants and defaults.

/// Application name used in CLI output and unit-file headers.
pub const APP_NAME: &str = "Cradle";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "cradle";

/// Fallback path to the engine binary when the running executable cannot be
/// resolved.
pub const DEFAULT_EXECUTABLE: &str = "/usr/bin/cradle";

/// Environment variable a generated unit exports so the recreated container
/// can learn the name of its owning systemd unit.
pub const SYSTEMD_ENV_VARIABLE: &str = "CRADLE_SYSTEMD_UNIT";

/// Default prefix for generated container service names.
pub const DEFAULT_CONTAINER_PREFIX: &str = "container";

/// Default separator between the service-name prefix and the container
/// reference.
pub const DEFAULT_SEPARATOR: &str = "-";
