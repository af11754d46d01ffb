//! Command dispatch.

mod pack;

use crate::cli::{Cli, Command};
use std::process::ExitCode;

/// Route a parsed CLI invocation to its handler and translate the result
/// into a process exit code (spec §6).
pub fn dispatch(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Pack {
            repository,
            index,
            target,
            format,
            chunks,
            checksums,
            chunk_retention,
        } => pack::exec(
            &repository,
            &index,
            &target,
            &format,
            chunks,
            checksums,
            chunk_retention,
            cli.verbose,
        ),
    }
}
