//! Reconstruction of a self-sufficient create command for `--new` units.
//!
//! The recorded create command cannot cover every corner case — a container
//! may have been created through a script that never passed through the CLI,
//! so the rewrite is best-effort and users must review the generated file.

use crate::descriptor::UnitDescriptor;
use crate::error::{GenerateError, Result};
use crate::escape::{escape_arg, escape_args};

/// Flags the classifier recognizes in a recorded create command.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RecognizedFlags {
    /// Value of `-d`/`--detach`, if the flag is present.
    pub detach: Option<bool>,
    /// Value of `--name`, if the flag is present.
    pub name: Option<String>,
    /// Value of `--replace`, if the flag is present.
    pub replace: Option<bool>,
    /// Values of every `-e`/`--env` occurrence in the flag region.
    pub envs: Vec<String>,
    /// Value of `--sdnotify`, if the flag is present.
    pub sdnotify: Option<String>,
}

/// Result of classifying the tokens that follow the run/create subcommand.
///
/// Classification never mutates or reorders tokens; it answers presence and
/// value questions and reports where the positional arguments begin. The
/// untouched tokens stay with the caller.
#[derive(Debug)]
pub(crate) struct ClassifiedCommand {
    /// Recognized flags and their values.
    pub flags: RecognizedFlags,
    /// Number of trailing positional tokens (image and container command).
    pub positional_count: usize,
}

/// `pflag`-style boolean values. Anything unparseable counts as true so a
/// present flag is never mistaken for an absent one.
fn parse_bool(value: &str) -> bool {
    !matches!(value, "false" | "FALSE" | "False" | "f" | "F" | "0")
}

/// Classifies create-command tokens with a flag-tolerant parser.
///
/// Unknown flags are skipped, not rejected: an unknown flag, long or short,
/// without an `=` consumes a following non-dash token as its value.
/// Interspersing is off, so the first non-flag token ends the flag region
/// and everything after it is positional.
pub(crate) fn classify(tokens: &[String]) -> ClassifiedCommand {
    let mut flags = RecognizedFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--" {
            i += 1;
            break;
        }
        if let Some(body) = token.strip_prefix("--") {
            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_owned())),
                None => (body, None),
            };
            match name {
                "detach" => flags.detach = Some(value.as_deref().map_or(true, parse_bool)),
                "replace" => flags.replace = Some(value.as_deref().map_or(true, parse_bool)),
                "name" | "env" | "sdnotify" => {
                    let value = if value.is_some() {
                        value
                    } else if let Some(next) = tokens.get(i + 1) {
                        i += 1;
                        Some(next.clone())
                    } else {
                        None
                    };
                    if let Some(value) = value {
                        match name {
                            "name" => flags.name = Some(value),
                            "env" => flags.envs.push(value),
                            _ => flags.sdnotify = Some(value),
                        }
                    }
                }
                _ => {
                    if value.is_none()
                        && tokens.get(i + 1).is_some_and(|next| !next.starts_with('-'))
                    {
                        i += 1;
                    }
                }
            }
            i += 1;
        } else if token.len() > 1 && token.starts_with('-') {
            let body = &token[1..];
            if let Some((cluster, value)) = body.split_once('=') {
                // `=<value>` binds to the leading flag character; the rest
                // of the cluster is ignored.
                match cluster.chars().next() {
                    Some('d') => flags.detach = Some(parse_bool(value)),
                    Some('e') => flags.envs.push(value.to_owned()),
                    _ => {}
                }
            } else {
                let mut consumed_value = false;
                let mut unknown = false;
                for (idx, c) in body.char_indices() {
                    match c {
                        'd' => flags.detach = Some(true),
                        'e' => {
                            let rest = &body[idx + 1..];
                            if rest.is_empty() {
                                if let Some(next) = tokens.get(i + 1) {
                                    flags.envs.push(next.clone());
                                    i += 1;
                                    consumed_value = true;
                                }
                            } else {
                                flags.envs.push(rest.to_owned());
                            }
                            break;
                        }
                        _ => unknown = true,
                    }
                }
                // An unknown shorthand takes a separate value, same as an
                // unknown long flag.
                if unknown
                    && !consumed_value
                    && tokens.get(i + 1).is_some_and(|next| !next.starts_with('-'))
                {
                    i += 1;
                }
            }
            i += 1;
        } else {
            break;
        }
    }
    ClassifiedCommand {
        flags,
        positional_count: tokens.len() - i,
    }
}

/// Removes the given value-taking flags from the flag region of `tokens`,
/// leaving the trailing `positional_count` tokens untouched.
fn filter_flags(tokens: &[String], positional_count: usize, flags: &[&str]) -> Vec<String> {
    let boundary = tokens.len() - positional_count;
    let mut processed = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < boundary {
        let token = tokens[i].as_str();
        if flags.contains(&token) {
            // Skip the flag and its value.
            i += 2;
            continue;
        }
        if flags
            .iter()
            .any(|flag| token.strip_prefix(flag).is_some_and(|rest| rest.starts_with('=')))
        {
            i += 1;
            continue;
        }
        processed.push(tokens[i].clone());
        i += 1;
    }
    processed.extend(tokens[boundary..].iter().cloned());
    processed
}

/// Strips pod-membership flags; membership is re-expressed through the
/// pod's ID-file placeholder.
pub(crate) fn filter_pod_flags(tokens: &[String], positional_count: usize) -> Vec<String> {
    filter_flags(tokens, positional_count, &["--pod", "--pod-id-file"])
}

/// Strips the flags the rewritten prefix re-specifies.
pub(crate) fn filter_common_flags(tokens: &[String], positional_count: usize) -> Vec<String> {
    filter_flags(
        tokens,
        positional_count,
        &["--conmon-pidfile", "--cidfile", "--cgroups"],
    )
}

/// Removes exact matches of `arg` from the flag region of `tokens`.
fn remove_arg(arg: &str, tokens: &[String], positional_count: usize) -> Vec<String> {
    let boundary = tokens.len() - positional_count;
    let mut processed: Vec<String> = tokens[..boundary]
        .iter()
        .filter(|token| token.as_str() != arg)
        .cloned()
        .collect();
    processed.extend(tokens[boundary..].iter().cloned());
    processed
}

/// Removes an explicit `--detach=false` or `-d=false`, which would
/// otherwise override the enforced `-d`.
fn remove_detach_arg(tokens: &[String], positional_count: usize) -> Vec<String> {
    let tokens = remove_arg("--detach=false", tokens, positional_count);
    remove_arg("-d=false", &tokens, positional_count)
}

/// Removes an explicit `--replace=false`, which would otherwise override
/// the enforced `--replace`.
fn remove_replace_arg(tokens: &[String], positional_count: usize) -> Vec<String> {
    remove_arg("--replace=false", tokens, positional_count)
}

/// Rebuilds the container's create command into the `ExecStart` command of
/// a self-sufficient unit and pins `--env NAME` references into the
/// descriptor's environment entries.
///
/// # Errors
///
/// Fails with [`GenerateError::InvalidCreateCommand`] if the recorded
/// command contains no `run` or `create` subcommand.
pub(crate) fn rewrite_create_command(descriptor: &mut UnitDescriptor<'_>) -> Result<String> {
    // The first run/create token splits the command: everything before it
    // (excluding the program name) is root flags, preserved ahead of the
    // rewritten subcommand.
    let index = descriptor
        .create_command
        .iter()
        .position(|token| token == "run" || token == "create")
        .map(|position| position + 1)
        .ok_or_else(|| GenerateError::InvalidCreateCommand {
            command: descriptor.create_command.clone(),
        })?;

    let mut start_command = vec![descriptor.executable.clone()];
    if index > 2 {
        start_command.extend(descriptor.create_command[1..index - 1].iter().cloned());
    }
    start_command.extend([
        "run".to_owned(),
        "--cidfile={{container_id_file}}".to_owned(),
        "--cgroups=no-conmon".to_owned(),
        "--rm".to_owned(),
    ]);

    let mut remaining: Vec<String> = descriptor.create_command[index..].to_vec();
    let classified = classify(&remaining);
    let positional_count = classified.positional_count;

    remaining = filter_common_flags(&remaining, positional_count);

    if descriptor.pod.is_some() {
        start_command.push("--pod-id-file".to_owned());
        start_command.push("{{pod_id_file}}".to_owned());
        remaining = filter_pod_flags(&remaining, positional_count);
    }

    // Route readiness notification through conmon unless the command
    // already chose a mechanism.
    if classified.flags.sdnotify.is_none() {
        start_command.push("--sdnotify=conmon".to_owned());
    }

    // The unit must never start an attached container; systemd would block
    // on `run` until the stop timeout fires.
    if classified.flags.detach != Some(true) {
        start_command.push("-d".to_owned());
        if classified.flags.detach == Some(false) {
            remaining = remove_detach_arg(&remaining, positional_count);
        }
    }

    // Enforce --replace for named containers so the unit can start even
    // when a crash left the previous container behind.
    if classified.flags.name.is_some() && classified.flags.replace != Some(true) {
        start_command.push("--replace".to_owned());
        if classified.flags.replace == Some(false) {
            remaining = remove_replace_arg(&remaining, positional_count);
        }
    }

    // `--env NAME` without a value reads the surrounding environment at run
    // time; pin the recorded value into the unit instead. Names absent from
    // the recorded environment are skipped, the container may set them
    // another way.
    let container_env = descriptor.container_env;
    for env in &classified.flags.envs {
        if env.contains('=') {
            continue;
        }
        if let Some((key, value)) = container_env.iter().find(|(key, _)| key == env) {
            descriptor
                .extra_envs
                .push(escape_arg(&format!("{key}={value}")));
        }
    }

    start_command.extend(remaining);
    Ok(escape_args(&start_command).join(" "))
}
