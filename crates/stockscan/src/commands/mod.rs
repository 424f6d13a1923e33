//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod barcode;
pub mod config_cmd;
pub mod history;
pub mod inventory;
pub mod scan;
pub mod stats;
pub mod util;
pub mod validate;

use stockscan_core::SessionConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session_config: SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Scan(args) => scan::handle(args, session_config, global).await,
        Command::Validate(args) => validate::handle(args, session_config, global).await,
        Command::Inventory(args) => {
            inventory::handle(&session_config.client()?, args, global).await
        }
        Command::History(args) => history::handle(&session_config.client()?, args, global).await,
        Command::Stats(args) => stats::handle(&session_config.client()?, args, global).await,
        Command::Barcode(args) => barcode::handle(&session_config.client()?, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command needs no server connection".into(),
        )),
    }
}
