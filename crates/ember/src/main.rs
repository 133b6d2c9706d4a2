//! `ember <N> <M> <MAX_STEPS> <OUT_FILE>`
//!
//! Runs a heat-diffusion simulation into a new store file and prints one
//! summary line. Exit codes: `0` on success, `-1` on a usage error (no file
//! is touched), `1` if the run fails.

use std::error::Error;
use std::process::ExitCode;

use ember::cli;
use ember::engine::simulate;
use tracing::error;

fn main() -> ExitCode {
    ember::logging::init();

    let mut args = std::env::args_os();
    let program = args
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ember".to_string());
    let env = |key: &str| std::env::var_os(key).map(|value| value.to_string_lossy().into_owned());

    let invocation = match cli::parse(args, env) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("error: {e}\n");
            eprint!("{}", cli::usage(&program));
            std::process::exit(-1);
        }
    };

    match simulate(
        &invocation.path,
        invocation.dims,
        invocation.steps_max,
        &invocation.config,
    ) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(path = %invocation.path.display(), "run failed: {e}");
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
