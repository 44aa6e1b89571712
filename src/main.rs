use std::process::ExitCode;

use metamodel_codegen::cli::CommandLineInterface;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // stdout carries generated source; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let command_line_interface = CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        tracing::error!("{error:?}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
