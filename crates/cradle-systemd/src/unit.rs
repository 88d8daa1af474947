//! Entry point assembling the full generation pipeline.

use chrono::Utc;
use cradle_common::constants::DEFAULT_EXECUTABLE;
use cradle_common::types::ContainerMetadata;

use crate::command;
use crate::descriptor::{CONTAINER_ID_FILE, MIN_TIMEOUT_STOP_SEC, UnitDescriptor, UnitType};
use crate::error::Result;
use crate::options::UnitOptions;
use crate::template;

/// Generates a systemd unit for the given container metadata.
///
/// Returns the service name and the unit text. The call is independent of
/// any other: no state is shared across invocations, and the result is
/// deterministic for a fixed timestamp and fixed inputs.
///
/// # Errors
///
/// Returns the first [`crate::error::GenerateError`] hit by the pipeline;
/// no partial unit text is returned alongside an error.
pub fn container_unit(
    metadata: &ContainerMetadata,
    options: &UnitOptions,
) -> Result<(String, String)> {
    let mut descriptor = UnitDescriptor::build(metadata, options)?;
    complete(&mut descriptor, options)?;
    let text = template::render(&descriptor)?;
    Ok((descriptor.service_name, text))
}

/// Completes a built descriptor: executable and version resolution, exec
/// lines, the self-sufficient rewrite, timeout arithmetic, header fields,
/// and deterministic ordering.
///
/// Fields already filled in (executable, version, timestamp) are kept,
/// which allows descriptors to be completed and rendered in isolation.
pub(crate) fn complete(descriptor: &mut UnitDescriptor<'_>, options: &UnitOptions) -> Result<()> {
    if descriptor.executable.is_empty() {
        descriptor.executable = resolve_executable(options);
    }

    descriptor.exec_start = "{{executable}} start {{container_ref}}".to_owned();
    descriptor.exec_stop =
        Some("{{executable}} stop -t {{stop_timeout}} {{container_ref}}".to_owned());
    descriptor.exec_stop_post =
        Some("{{executable}} stop -t {{stop_timeout}} {{container_ref}}".to_owned());

    if options.new {
        descriptor.unit_type = UnitType::Notify;
        descriptor.notify_access = Some("all".to_owned());
        descriptor.pid_file = None;
        descriptor.container_id_file = Some(CONTAINER_ID_FILE.to_owned());
        descriptor.exec_start_pre = Some("/bin/rm -f {{container_id_file}}".to_owned());
        descriptor.exec_stop =
            Some("{{executable}} stop --ignore --cidfile={{container_id_file}}".to_owned());
        descriptor.exec_stop_post =
            Some("{{executable}} rm -f --ignore --cidfile={{container_id_file}}".to_owned());
        descriptor.exec_start = command::rewrite_create_command(descriptor)?;
    }

    descriptor.timeout_stop_sec = MIN_TIMEOUT_STOP_SEC + descriptor.stop_timeout;

    if descriptor.version.is_empty() {
        descriptor.version = env!("CARGO_PKG_VERSION").to_owned();
    }

    if !descriptor.no_header && descriptor.timestamp.is_none() {
        descriptor.timestamp = Some(Utc::now().to_rfc3339());
    }

    descriptor.bound_services.sort_unstable();

    Ok(())
}

/// Resolves the engine executable to embed in exec lines.
fn resolve_executable(options: &UnitOptions) -> String {
    if let Some(executable) = &options.executable {
        return executable.clone();
    }
    match std::env::current_exe() {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(source) => {
            tracing::warn!(
                error = %source,
                fallback = DEFAULT_EXECUTABLE,
                "could not obtain executable location, using default"
            );
            DEFAULT_EXECUTABLE.to_owned()
        }
    }
}
