//! Command handlers for everything that talks to a stove.

pub mod config_cmd;
pub mod stove;
pub mod watch;

use firenet_core::Stove;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Log in, then route a stove command to its handler.
pub async fn dispatch(cmd: Command, stove: &Stove, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => {
            stove.connect().await?;
            stove::status(args, stove, global).await
        }
        Command::Get(args) => {
            stove.connect().await?;
            stove::get(args, stove, global).await
        }
        Command::Set(args) => {
            // Bad values are usage errors and must not cost a login.
            let value = stove::parse_value(args.attribute, &args.value)?;
            stove.connect().await?;
            stove::set(args.attribute, value, stove, global).await
        }
        Command::Watch(args) => {
            stove.connect().await?;
            watch::handle(args, stove, global).await
        }
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a stove connection".into(),
        )),
    }
}
