use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;

use evidence_catalog::cli::Cli;
use evidence_catalog::error::CatalogError;
use evidence_catalog::logging::Logger;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    Logger::init_tracing(cli.verbose);

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CatalogError::SessionExpired) => {
            eprintln!("{}", CatalogError::SessionExpired.to_string().yellow());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
