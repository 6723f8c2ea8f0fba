//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`status`]. Each handler
//! lives in its own submodule.

pub mod run;
pub mod status;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::RotaryError;

pub async fn dispatch(cli: Cli) -> Result<(), RotaryError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Status(args)) => status::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  rotary v{version} \u{2014} round-robin HTTP load balancer\n\n  \
         No command provided. To get started:\n\n    \
         rotary run -b http://localhost:8081,http://localhost:8082\n    \
         rotary validate -b http://localhost:8081\n    \
         rotary --help                See all commands and options\n"
    );
}
