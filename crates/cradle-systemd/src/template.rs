//! Rendering of a completed descriptor into unit-file text.
//!
//! The skeleton is assembled in code (sections appear only when their
//! descriptor fields are set) with `{{field}}` macros for the values. Macro
//! expansion then runs in exactly two passes: pass one resolves the
//! skeleton's macros, whose replacement values — the exec lines — may
//! themselves contain macros such as `{{container_id_file}}`; pass two
//! resolves those. A third pass must never be needed; if it were, descriptor
//! construction was wrong.

use std::borrow::Cow;

use cradle_common::constants::{APP_NAME, BIN_NAME, SYSTEMD_ENV_VARIABLE};

use crate::descriptor::UnitDescriptor;
use crate::error::{GenerateError, Result};

/// Renders the unit text for a completed descriptor.
///
/// Deterministic: identical descriptors (including the timestamp) yield
/// byte-identical output.
///
/// # Errors
///
/// Fails with [`GenerateError::Template`] if either expansion pass hits an
/// unknown, unset, or unterminated macro.
pub(crate) fn render(descriptor: &UnitDescriptor<'_>) -> Result<String> {
    let text = skeleton(descriptor);
    let pass_one = expand(&text, descriptor)?;
    expand(&pass_one, descriptor)
}

/// Assembles the unit skeleton with conditional sections.
fn skeleton(descriptor: &UnitDescriptor<'_>) -> String {
    let mut text = String::new();
    text.push_str("# {{service_name}}.service\n");
    if !descriptor.no_header {
        text.push_str(&format!("# autogenerated by {APP_NAME} {{{{version}}}}\n"));
        if descriptor.timestamp.is_some() {
            text.push_str("# {{timestamp}}\n");
        }
    }

    text.push_str("\n[Unit]\n");
    text.push_str(&format!("Description={APP_NAME} {{{{service_name}}}}.service\n"));
    text.push_str(&format!("Documentation=man:{BIN_NAME}-generate(1)\n"));
    text.push_str("Wants=network-online.target\n");
    text.push_str("After=network-online.target\n");
    text.push_str("RequiresMountsFor={{run_root}}\n");
    if !descriptor.bound_services.is_empty() {
        let bound = descriptor
            .bound_services
            .iter()
            .map(|service| format!("{service}.service"))
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(&format!("BindsTo={bound}\n"));
        text.push_str(&format!("After={bound}\n"));
    }

    text.push_str("\n[Service]\n");
    text.push_str(&format!("Environment={SYSTEMD_ENV_VARIABLE}=%n\n"));
    if !descriptor.extra_envs.is_empty() {
        text.push_str(&format!("Environment={}\n", descriptor.extra_envs.join(" ")));
    }
    text.push_str("Restart={{restart_policy}}\n");
    text.push_str("TimeoutStopSec={{timeout_stop_sec}}\n");
    if descriptor.exec_start_pre.is_some() {
        text.push_str("ExecStartPre={{exec_start_pre}}\n");
    }
    text.push_str("ExecStart={{exec_start}}\n");
    if descriptor.exec_stop.is_some() {
        text.push_str("ExecStop={{exec_stop}}\n");
    }
    if descriptor.exec_stop_post.is_some() {
        text.push_str("ExecStopPost={{exec_stop_post}}\n");
    }
    if descriptor.pid_file.is_some() {
        text.push_str("PIDFile={{pid_file}}\n");
    }
    text.push_str("Type={{unit_type}}\n");
    if descriptor.notify_access.is_some() {
        text.push_str("NotifyAccess={{notify_access}}\n");
    }

    text.push_str("\n[Install]\n");
    text.push_str("WantedBy=multi-user.target default.target\n");
    text
}

/// Runs one macro-expansion pass over `input`.
fn expand(input: &str, descriptor: &UnitDescriptor<'_>) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find("{{") {
        output.push_str(&rest[..open]);
        let body = &rest[open + 2..];
        let Some(close) = body.find("}}") else {
            let context: String = rest[open..].chars().take(24).collect();
            return Err(GenerateError::Template {
                message: format!("unterminated macro near {context:?}"),
            });
        };
        output.push_str(&field(descriptor, &body[..close])?);
        rest = &body[close + 2..];
    }
    output.push_str(rest);
    Ok(output)
}

/// Looks up the replacement value for a macro name.
fn field<'d>(descriptor: &'d UnitDescriptor<'_>, name: &str) -> Result<Cow<'d, str>> {
    match name {
        "service_name" => Ok(Cow::Borrowed(descriptor.service_name.as_str())),
        "container_ref" => Ok(Cow::Borrowed(descriptor.container_ref.as_str())),
        "executable" => Ok(Cow::Borrowed(descriptor.executable.as_str())),
        "version" => Ok(Cow::Borrowed(descriptor.version.as_str())),
        "run_root" => Ok(Cow::Borrowed(descriptor.run_root.as_str())),
        "exec_start" => Ok(Cow::Borrowed(descriptor.exec_start.as_str())),
        "restart_policy" => Ok(Cow::Owned(descriptor.restart_policy.to_string())),
        "unit_type" => Ok(Cow::Owned(descriptor.unit_type.to_string())),
        "stop_timeout" => Ok(Cow::Owned(descriptor.stop_timeout.to_string())),
        "timeout_stop_sec" => Ok(Cow::Owned(descriptor.timeout_stop_sec.to_string())),
        "exec_start_pre" => optional(descriptor.exec_start_pre.as_deref(), name),
        "exec_stop" => optional(descriptor.exec_stop.as_deref(), name),
        "exec_stop_post" => optional(descriptor.exec_stop_post.as_deref(), name),
        "pid_file" => optional(descriptor.pid_file.as_deref(), name),
        "container_id_file" => optional(descriptor.container_id_file.as_deref(), name),
        "notify_access" => optional(descriptor.notify_access.as_deref(), name),
        "timestamp" => optional(descriptor.timestamp.as_deref(), name),
        "pod_id_file" => optional(descriptor.pod.map(|pod| pod.pod_id_file.as_str()), name),
        unknown => Err(GenerateError::Template {
            message: format!("unknown macro {unknown:?}"),
        }),
    }
}

/// Maps an optional field, failing when a macro references an unset one.
fn optional<'d>(value: Option<&'d str>, name: &str) -> Result<Cow<'d, str>> {
    value.map(Cow::Borrowed).ok_or_else(|| GenerateError::Template {
        message: format!("macro {name:?} referenced but not set"),
    })
}
