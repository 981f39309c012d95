//! `routable-token` binary entry point

use clap::Parser;
use routable_cli::commands::Cli;
use routable_common::LoggingTransformer;
use std::process::ExitCode;

fn main() -> ExitCode {
    LoggingTransformer::init();

    match routable_cli::run(Cli::parse()) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
