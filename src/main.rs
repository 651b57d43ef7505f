//! dupematch binary entry point.

use clap::Parser;

use dupematch::cli::Cli;
use dupematch::error::{ExitCode, StructuredError};
use dupematch::matching::BuildError;
use dupematch::run_app;

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    let exit_code = match run_app(cli) {
        Ok(code) => code,
        Err(err) => {
            let code = classify_error(&err);
            report_error(&err, code, json_errors);
            code
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// Map a top-level error to its exit code.
fn classify_error(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::Interrupted) => ExitCode::Interrupted,
        _ => ExitCode::GeneralError,
    }
}

fn report_error(err: &anyhow::Error, code: ExitCode, json: bool) {
    if json {
        let structured = StructuredError::new(err, code);
        match serde_json::to_string(&structured) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!("Error: {err:#}"),
        }
    } else if code == ExitCode::Interrupted {
        eprintln!("Interrupted.");
    } else {
        eprintln!("Error: {err:#}");
    }
}
