//! caja-metadata binary entry point.

use std::process::ExitCode;

use caja_metadata::cli;
use caja_metadata::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
