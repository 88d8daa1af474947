//! `cradle generate` — render a systemd unit from container metadata.

use std::path::PathBuf;

use clap::Args;
use cradle_common::constants::{DEFAULT_CONTAINER_PREFIX, DEFAULT_SEPARATOR};
use cradle_common::types::ContainerMetadata;
use cradle_systemd::options::{RestartPolicy, UnitOptions};
use cradle_systemd::unit::container_unit;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the container metadata JSON (engine inspect output). Reads
    /// from stdin when omitted.
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Use the container name instead of its ID in the service name.
    #[arg(long)]
    pub name: bool,

    /// Generate a unit that recreates the container from its recorded
    /// create command on every start.
    #[arg(long)]
    pub new: bool,

    /// Restart policy of the generated unit.
    #[arg(long, default_value_t = RestartPolicy::OnFailure)]
    pub restart_policy: RestartPolicy,

    /// Override the container's stop timeout, in seconds.
    #[arg(short = 't', long)]
    pub stop_timeout: Option<u32>,

    /// Prefix of the generated service name.
    #[arg(long, default_value = DEFAULT_CONTAINER_PREFIX)]
    pub container_prefix: String,

    /// Separator between the prefix and the container reference.
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,

    /// Suppress the autogenerated header comment and timestamp.
    #[arg(long)]
    pub no_header: bool,

    /// Write the unit to `<service-name>.service` in the current directory
    /// instead of printing it.
    #[arg(long)]
    pub files: bool,
}

impl GenerateArgs {
    /// Maps the CLI arguments onto generation options.
    fn to_options(&self) -> UnitOptions {
        UnitOptions {
            use_name: self.name,
            container_prefix: self.container_prefix.clone(),
            separator: self.separator.clone(),
            restart_policy: self.restart_policy,
            stop_timeout: self.stop_timeout,
            new: self.new,
            no_header: self.no_header,
            executable: None,
        }
    }
}

/// Executes the `generate` command.
///
/// # Errors
///
/// Returns an error if the metadata cannot be loaded, generation fails, or
/// the unit file cannot be written.
#[allow(clippy::print_stdout)]
pub fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    let metadata = match &args.metadata {
        Some(path) => ContainerMetadata::load(path)?,
        None => ContainerMetadata::from_reader(std::io::stdin().lock())?,
    };

    let (service_name, text) = container_unit(&metadata, &args.to_options())?;
    tracing::debug!(service = %service_name, "generated unit");

    if args.files {
        let path = std::env::current_dir()?.join(format!("{service_name}.service"));
        std::fs::write(&path, &text)?;
        println!("{}", path.display());
    } else {
        print!("{text}");
    }
    Ok(())
}
