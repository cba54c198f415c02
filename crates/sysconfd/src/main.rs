//! Binary entry point for the `system-confd` daemon.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match sysconfd::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "telemetry may not be installed when startup fails"
            )]
            {
                eprintln!("sysconfd: {error}");
            }
            ExitCode::FAILURE
        }
    }
}
