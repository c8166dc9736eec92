//! Single-request entry point.
//!
//! # Responsibility
//! - Read one request envelope (JSON) from stdin.
//! - Run it through the pin handler with environment configuration.
//! - Print the response envelope (JSON) to stdout.
//!
//! Exits non-zero only when the process itself cannot be set up; request
//! failures are reported inside the response envelope.

use pinboard_core::{init_logging, PinHandler, Request, ServiceConfig};
use std::io::{self, Read, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("pinboard: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = ServiceConfig::from_env().map_err(|err| err.to_string())?;
    init_logging(&config.log_level, config.log_target.clone())?;
    let source = config
        .connection_source()
        .map_err(|err| err.to_string())?;

    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .map_err(|err| format!("failed to read request from stdin: {err}"))?;
    let request: Request = serde_json::from_str(&raw)
        .map_err(|err| format!("request envelope is not valid JSON: {err}"))?;

    let response = PinHandler::new(source).handle(&request);
    log::debug!(
        "event=cli_response module=cli status=ok status_code={}",
        response.status_code
    );

    let encoded = serde_json::to_string(&response)
        .map_err(|err| format!("failed to encode response: {err}"))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{encoded}").map_err(|err| format!("failed to write response: {err}"))?;
    Ok(())
}
