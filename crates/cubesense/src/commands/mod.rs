//! Command dispatch: bridges CLI args -> repository reads -> output.

pub mod config_cmd;
pub mod devices;
pub mod refresh;
pub mod show;
pub mod watch;

use std::sync::Arc;

use cubesense_core::{Repository, SensorCloud};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a cloud-bound command to its handler.
pub async fn dispatch<C>(
    cmd: Command,
    repo: &Arc<Repository<C>>,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    C: SensorCloud + 'static,
{
    let shared: &Repository<C> = repo;
    match cmd {
        Command::Devices(args) => devices::handle(shared, &args, global).await,
        Command::Show(args) => show::handle(shared, &args, global).await,
        Command::Watch(args) => watch::handle(repo, &args, global).await,
        Command::Refresh => refresh::handle(shared, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before connecting".into(),
        }),
    }
}
