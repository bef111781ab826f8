use std::process::ExitCode;

use clap::Parser;

use pixelstack::cli::{self, CliArgs};
use pixelstack::logger;

fn main() -> ExitCode {
    logger::init();
    cli::run(CliArgs::parse())
}
