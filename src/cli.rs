// ============================================================================
// PixelStack CLI — headless layered image processing
// ============================================================================
//
// Usage examples:
//   pixelstack --script edits.txt
//   pixelstack -s edits.txt --verbose
//   pixelstack                         (interactive: commands from stdin)
//
// The script format is one command per line:
//   load image photo.ppm
//   apply blur
//   apply mosaic 200
//   export result.png
//   exit

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::script::Session;

/// PixelStack headless layered image processor.
///
/// Runs text command scripts over a layer stack — load images, apply
/// modifiers, blend, and export — without any GUI.
#[derive(Parser, Debug)]
#[command(
    name = "pixelstack",
    about = "Layered image processor with a scripted command interface",
    long_about = "Run layer commands from a script file or interactively from\n\
                  stdin. Commands: load image/state, create checkerboard,\n\
                  apply blur|sharpen|sepia|greyscale|mosaic|downscale,\n\
                  set, toggle, save image/state, export, exit."
)]
pub struct CliArgs {
    /// Command script to run. When omitted, commands are read from stdin
    /// until `exit` or end of input.
    #[arg(short, long, value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Print per-command timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the session and return an OS exit code: `0` on success, `1` when the
/// script could not be read or the output stream failed.
pub fn run(args: CliArgs) -> ExitCode {
    let result = match &args.script {
        Some(path) => {
            crate::log_info!("running script {}", path.display());
            match std::fs::File::open(path) {
                Ok(file) => drive(BufReader::new(file), args.verbose),
                Err(e) => {
                    eprintln!("error: could not read script '{}': {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => {
            crate::log_info!("interactive session on stdin");
            drive(io::stdin().lock(), args.verbose)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Feed every input line to a session writing to stdout.
fn drive<R: BufRead>(input: R, verbose: bool) -> crate::error::Result<()> {
    let mut session = Session::new(io::stdout());
    for line in input.lines() {
        let line = line?;
        let start = Instant::now();
        session.handle_line(&line)?;
        if verbose && !line.trim().is_empty() {
            println!("  ({:.0}ms) {}", start.elapsed().as_secs_f64() * 1000.0, line.trim());
        }
        if !session.is_running() {
            break;
        }
    }
    Ok(())
}
