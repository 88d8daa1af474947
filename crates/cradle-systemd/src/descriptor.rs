//! Normalized descriptor a container unit is rendered from.

use std::fmt;

use cradle_common::types::{ContainerMetadata, PodInfo};

use crate::error::{GenerateError, Result};
use crate::options::{RestartPolicy, UnitOptions};

/// Fixed base added to the container's stop timeout when computing the
/// unit's `TimeoutStopSec`, leaving systemd room for the engine's own
/// shutdown handling.
pub const MIN_TIMEOUT_STOP_SEC: u32 = 60;

/// Runtime root placeholder used by self-sufficient units. The unit
/// recreates the container on every start, so the recorded root of the
/// original container does not apply.
pub const NEW_MODE_RUN_ROOT: &str = "%t/containers";

/// Unit-scoped placeholder where a self-sufficient unit tracks the ID of
/// the container it creates.
pub const CONTAINER_ID_FILE: &str = "%t/%n.ctr-id";

/// Service type of the generated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitType {
    /// The exec'd process forks and exits; systemd tracks the service
    /// through its PID file.
    Forking,
    /// Readiness is signaled over the sd-notify socket.
    Notify,
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forking => write!(f, "forking"),
            Self::Notify => write!(f, "notify"),
        }
    }
}

/// All data required to render a container's systemd unit file.
///
/// Built once per generation call and discarded with it. Exec lines may
/// contain `{{field}}` macros that the renderer resolves against this same
/// descriptor.
#[derive(Debug)]
pub struct UnitDescriptor<'a> {
    /// Name of the systemd service.
    pub service_name: String,
    /// Name or ID of the container, never both.
    pub container_ref: String,
    /// Type of the unit. `Notify` only in self-sufficient mode.
    pub unit_type: UnitType,
    /// `NotifyAccess=` of the unit, when set.
    pub notify_access: Option<String>,
    /// Timeout in seconds the engine waits before killing the container
    /// during service stop.
    pub stop_timeout: u32,
    /// Restart policy of the unit.
    pub restart_policy: RestartPolicy,
    /// PID file of the service. Required for forking units; must point to
    /// the PID of the associated conmon process.
    pub pid_file: Option<String>,
    /// Container ID file referenced by self-sufficient units.
    pub container_id_file: Option<String>,
    /// Services this unit binds to and starts after. Sorted before
    /// rendering for deterministic output.
    pub bound_services: Vec<String>,
    /// Full command plus arguments the container was created with.
    pub create_command: Vec<String>,
    /// `ExecStartPre=` of the unit, when set.
    pub exec_start_pre: Option<String>,
    /// `ExecStart=` of the unit.
    pub exec_start: String,
    /// `ExecStop=` of the unit, when set.
    pub exec_stop: Option<String>,
    /// `ExecStopPost=` of the unit, when set.
    pub exec_stop_post: Option<String>,
    /// Rendered `TimeoutStopSec=`: [`MIN_TIMEOUT_STOP_SEC`] plus the stop
    /// timeout.
    pub timeout_stop_sec: u32,
    /// Literal `KEY=VALUE` environment entries pinned into the unit,
    /// already escaped.
    pub extra_envs: Vec<String>,
    /// Path to the engine executable embedded in exec lines.
    pub executable: String,
    /// Engine version for the header comment.
    pub version: String,
    /// Header timestamp. Absent when header suppression is requested.
    pub timestamp: Option<String>,
    /// Suppresses the autogenerated header comment and timestamp.
    pub no_header: bool,
    /// Runtime root the unit requires to be mounted.
    pub run_root: String,
    /// Pod membership of the container, if any. Read-only, never owned.
    pub pod: Option<&'a PodInfo>,
    /// Environment of the container process, used to pin `--env NAME`
    /// references.
    pub(crate) container_env: &'a [(String, String)],
}

impl<'a> UnitDescriptor<'a> {
    /// Builds a descriptor from container metadata and generation options.
    ///
    /// Pure transformation; exec lines, executable, and timestamp are
    /// completed by [`crate::unit`] before rendering.
    ///
    /// # Errors
    ///
    /// Fails with [`GenerateError::MissingPidFile`] if no conmon PID file is
    /// recorded and self-sufficient mode is not requested, with
    /// [`GenerateError::MissingCreateCommand`] if self-sufficient mode is
    /// requested but no create command is recorded, and with
    /// [`GenerateError::UnresolvedRuntimeRoot`] if the recorded runtime
    /// root is empty.
    pub fn build(metadata: &'a ContainerMetadata, options: &UnitOptions) -> Result<Self> {
        if metadata.conmon_pid_file.is_empty() && !options.new {
            return Err(GenerateError::MissingPidFile {
                id: metadata.id.to_string(),
            });
        }

        let create_command = match &metadata.create_command {
            Some(command) => command.clone(),
            None if options.new => {
                return Err(GenerateError::MissingCreateCommand {
                    id: metadata.id.to_string(),
                });
            }
            None => Vec::new(),
        };

        let run_root = if options.new {
            NEW_MODE_RUN_ROOT.to_owned()
        } else if metadata.run_root.is_empty() {
            return Err(GenerateError::UnresolvedRuntimeRoot {
                id: metadata.id.to_string(),
            });
        } else {
            metadata.run_root.clone()
        };

        let (container_ref, service_name) = service_name(metadata, options);

        let mut bound_services = Vec::new();
        if let Some(pod) = &metadata.pod {
            bound_services.push(pod.service_name.clone());
        }

        Ok(Self {
            service_name,
            container_ref,
            unit_type: UnitType::Forking,
            notify_access: None,
            stop_timeout: options.stop_timeout.unwrap_or(metadata.stop_timeout),
            restart_policy: options.restart_policy,
            pid_file: (!metadata.conmon_pid_file.is_empty())
                .then(|| metadata.conmon_pid_file.clone()),
            container_id_file: None,
            bound_services,
            create_command,
            exec_start_pre: None,
            exec_start: String::new(),
            exec_stop: None,
            exec_stop_post: None,
            timeout_stop_sec: 0,
            extra_envs: Vec::new(),
            executable: String::new(),
            version: String::new(),
            timestamp: None,
            no_header: options.no_header,
            run_root,
            pod: metadata.pod.as_ref(),
            container_env: &metadata.env,
        })
    }
}

/// Returns the container reference and the service name derived from it.
fn service_name(metadata: &ContainerMetadata, options: &UnitOptions) -> (String, String) {
    let container_ref = if options.use_name {
        metadata.name.clone()
    } else {
        metadata.id.to_string()
    };
    let service_name = format!(
        "{}{}{}",
        options.container_prefix, options.separator, container_ref
    );
    (container_ref, service_name)
}

#[cfg(test)]
mod tests {
    use cradle_common::types::ContainerId;

    use super::*;

    fn metadata() -> ContainerMetadata {
        ContainerMetadata {
            id: ContainerId::new("0123456789ab"),
            name: "redis".to_owned(),
            stop_timeout: 10,
            conmon_pid_file: "/run/conmon.pid".to_owned(),
            run_root: "/run/containers/storage".to_owned(),
            create_command: Some(vec![
                "/usr/local/bin/cradle".to_owned(),
                "run".to_owned(),
                "redis".to_owned(),
            ]),
            env: Vec::new(),
            pod: None,
        }
    }

    #[test]
    fn service_name_defaults_to_prefix_separator_id() {
        let meta = metadata();
        let descriptor =
            UnitDescriptor::build(&meta, &UnitOptions::default()).expect("build should succeed");
        assert_eq!(descriptor.service_name, "container-0123456789ab");
        assert_eq!(descriptor.container_ref, "0123456789ab");
    }

    #[test]
    fn service_name_uses_container_name_when_requested() {
        let meta = metadata();
        let options = UnitOptions {
            use_name: true,
            container_prefix: "app".to_owned(),
            separator: "_".to_owned(),
            ..UnitOptions::default()
        };
        let descriptor = UnitDescriptor::build(&meta, &options).expect("build should succeed");
        assert_eq!(descriptor.service_name, "app_redis");
        assert_eq!(descriptor.container_ref, "redis");
    }

    #[test]
    fn empty_pid_file_fails_without_self_sufficient_mode() {
        let mut meta = metadata();
        meta.conmon_pid_file = String::new();
        let err = UnitDescriptor::build(&meta, &UnitOptions::default())
            .expect_err("empty PID file should fail");
        assert!(matches!(err, GenerateError::MissingPidFile { id } if id == "0123456789ab"));
    }

    #[test]
    fn empty_pid_file_is_tolerated_in_self_sufficient_mode() {
        let mut meta = metadata();
        meta.conmon_pid_file = String::new();
        let options = UnitOptions {
            new: true,
            ..UnitOptions::default()
        };
        let descriptor = UnitDescriptor::build(&meta, &options).expect("build should succeed");
        assert!(descriptor.pid_file.is_none());
    }

    #[test]
    fn missing_create_command_fails_in_self_sufficient_mode() {
        let mut meta = metadata();
        meta.create_command = None;
        let options = UnitOptions {
            new: true,
            ..UnitOptions::default()
        };
        let err =
            UnitDescriptor::build(&meta, &options).expect_err("missing create command should fail");
        assert!(matches!(err, GenerateError::MissingCreateCommand { .. }));
    }

    #[test]
    fn missing_create_command_is_tolerated_without_self_sufficient_mode() {
        let mut meta = metadata();
        meta.create_command = None;
        let descriptor =
            UnitDescriptor::build(&meta, &UnitOptions::default()).expect("build should succeed");
        assert!(descriptor.create_command.is_empty());
    }

    #[test]
    fn empty_run_root_fails_without_self_sufficient_mode() {
        let mut meta = metadata();
        meta.run_root = String::new();
        let err = UnitDescriptor::build(&meta, &UnitOptions::default())
            .expect_err("empty run root should fail");
        assert!(matches!(err, GenerateError::UnresolvedRuntimeRoot { .. }));
    }

    #[test]
    fn self_sufficient_mode_uses_runtime_relative_run_root() {
        let mut meta = metadata();
        meta.run_root = String::new();
        let options = UnitOptions {
            new: true,
            ..UnitOptions::default()
        };
        let descriptor = UnitDescriptor::build(&meta, &options).expect("build should succeed");
        assert_eq!(descriptor.run_root, NEW_MODE_RUN_ROOT);
    }

    #[test]
    fn stop_timeout_override_wins_over_recorded_value() {
        let meta = metadata();
        let options = UnitOptions {
            stop_timeout: Some(42),
            ..UnitOptions::default()
        };
        let descriptor = UnitDescriptor::build(&meta, &options).expect("build should succeed");
        assert_eq!(descriptor.stop_timeout, 42);
    }

    #[test]
    fn pod_membership_binds_to_pod_service() {
        let mut meta = metadata();
        meta.pod = Some(cradle_common::types::PodInfo {
            service_name: "pod-demo".to_owned(),
            pod_id_file: "%t/pod-demo.pod-id".to_owned(),
        });
        let descriptor =
            UnitDescriptor::build(&meta, &UnitOptions::default()).expect("build should succeed");
        assert_eq!(descriptor.bound_services, vec!["pod-demo"]);
        assert!(descriptor.pod.is_some());
    }
}
