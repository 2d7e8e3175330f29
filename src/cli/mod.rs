//! CLI module for objindex
//!
//! Provides command-line interface for:
//! - serve: HTTP notification endpoints
//! - index: one-shot creation notification from stdin
//! - remove: one-shot deletion by key or from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{index, remove, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_response};
