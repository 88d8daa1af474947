//! Systemd unit-file generation for Cradle containers.
//!
//! Translates container metadata recorded by the engine into a textual
//! systemd service definition, so that systemd — not an ad-hoc script —
//! owns the container's start/stop/restart lifecycle.
//!
//! The pipeline runs strictly forward:
//! 1. **Descriptor builder** ([`descriptor`]) normalizes metadata into a
//!    [`descriptor::UnitDescriptor`].
//! 2. **Command rewriter** (`--new` mode only) reconstructs a
//!    self-sufficient `run` command from the recorded create command.
//! 3. **Argument escaper** ([`escape`]) makes each token safe for unit-file
//!    command syntax.
//! 4. **Template renderer** expands the descriptor into unit text with a
//!    two-pass macro substitution.
//!
//! [`unit::container_unit`] ties the pipeline together. Generation is a pure
//! function of its inputs apart from resolving the running executable's path
//! and reading the wall clock for the optional header timestamp.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub(crate) mod command;
pub mod descriptor;
pub mod error;
pub mod escape;
pub mod options;
pub(crate) mod template;
pub mod unit;
