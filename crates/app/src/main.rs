//! hz: compress or decompress a single file with Huffman coding over words.

mod config;
mod execution;
mod files;
mod stats;

use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use config::{Command, UsageError, USAGE};
use execution::ProgramExecution;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<OsString> = std::env::args_os().collect();
    let program = args
        .first()
        .map_or_else(|| "hz".to_string(), |p| p.to_string_lossy().into_owned());

    let command = match Command::from_args(args.get(1..).unwrap_or_default()) {
        Ok(command) => command,
        Err(UsageError::InvalidUsage) => {
            eprintln!("usage: {} {}", basename(&program), USAGE);
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("{program}: {err}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("{:?}", command);

    let execution = match command {
        Command::Help => {
            println!("usage: {} {}", basename(&program), USAGE);
            return ExitCode::SUCCESS;
        }
        Command::Compress { config, word_size } => ProgramExecution::compress(config, word_size),
        Command::Decompress(config) => ProgramExecution::decompress(config),
    };

    match execution.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{program}: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Last component of `path`, ignoring trailing slashes.
fn basename(path: &str) -> String {
    match Path::new(path).file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None if path.is_empty() => ".".to_string(),
        None => path.to_string(),
    }
}
