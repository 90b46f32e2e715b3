//! Command dispatch: bridges CLI args -> core calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod light;
pub mod run;
pub mod util;

use tago_core::IntegrationConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a bridge-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    config: IntegrationConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Run => run::handle(config, global).await,
        Command::Devices => devices::handle(&config, global).await,
        Command::Light(args) => light::handle(&config, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
