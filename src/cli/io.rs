//! JSON I/O handling for CLI
//!
//! - Input: one JSON document on stdin (may span lines)
//! - Output: one JSON line on stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use crate::api::Response;

use super::errors::{CliError, CliResult};

/// Read the whole of stdin
pub fn read_request() -> CliResult<Vec<u8>> {
    read_request_from(&mut io::stdin().lock())
}

fn read_request_from<R: Read>(reader: &mut R) -> CliResult<Vec<u8>> {
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(body)
}

/// Write a response line to stdout
pub fn write_response(response: &Response) -> CliResult<()> {
    write_response_to(response, &mut io::stdout().lock())
}

fn write_response_to<W: Write>(response: &Response, writer: &mut W) -> CliResult<()> {
    writeln!(writer, "{}", response.to_json())?;
    writer.flush()?;
    Ok(())
}
