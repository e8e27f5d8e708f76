//! Command-line configuration for hz.
//!
//! Arguments are parsed by hand in the traditional getopt manner: switches
//! may be grouped (`-kv`), `-b` takes its value from the following argument,
//! and `--` ends switch parsing.
//!
//! # Valid combinations
//!
//! Every set of switches must fit inside one of `dkv`, `kvb` or `h`, so `-d`
//! with `-b` is a usage error and `-h` stands alone.

use hz_core::WordSize;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Usage text printed after `usage: <program> `.
pub const USAGE: &str = "[-dkhv] [-b num] [file]
  -d     Decompress file, else compress.
  -b num Specify symbol length for encoding (during compression) to be num bytes. 1 by default.
  -k     Keep input file. Normally input file is deleted.
  -v     Verbose mode. Print statistics.
  -h     Show this help text.";

/// Word size used when `-b` is not given.
pub const DEFAULT_WORD_SIZE: WordSize = 1;

/// Rejected command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("invalid usage")]
    InvalidUsage,

    #[error("invalid argument for {switch}: '{arg}': {reason}")]
    InvalidOptionArg {
        switch: &'static str,
        arg: String,
        reason: &'static str,
    },
}

/// Settings shared by compression and decompression jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File to read; the output name is derived from it
    pub input_file: PathBuf,

    /// Keep the input file after a successful job
    pub keep: bool,

    /// Print size statistics after a successful job
    pub verbose: bool,
}

/// What the program was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Compress { config: Config, word_size: WordSize },
    Decompress(Config),
    Help,
}

impl Command {
    /// Parse the command line, excluding the program name.
    ///
    /// Switches must be valid UTF-8; the file name may be any OS string.
    pub fn from_args(args: &[OsString]) -> Result<Self, UsageError> {
        let mut decompress = false;
        let mut keep = false;
        let mut verbose = false;
        let mut help = false;
        let mut word_size: Option<WordSize> = None;

        let mut i = 0;
        while i < args.len() {
            let text = args[i].to_string_lossy();
            let arg = text.as_ref();
            match arg {
                "" | "-" => return Err(UsageError::InvalidUsage),
                "--" => {
                    i += 1;
                    break;
                }
                _ => {}
            }
            let Some(group) = arg.strip_prefix('-') else {
                break;
            };

            let mut switches = group.chars().peekable();
            while let Some(switch) = switches.next() {
                match switch {
                    'd' => set_once(&mut decompress)?,
                    'k' => set_once(&mut keep)?,
                    'v' => set_once(&mut verbose)?,
                    'h' => set_once(&mut help)?,
                    'b' => {
                        // Takes the next argument, so must end its group
                        if word_size.is_some() || switches.peek().is_some() {
                            return Err(UsageError::InvalidUsage);
                        }
                        i += 1;
                        let value = args.get(i).ok_or(UsageError::InvalidUsage)?;
                        word_size = Some(parse_word_size(&value.to_string_lossy())?);
                    }
                    _ => return Err(UsageError::InvalidUsage),
                }
            }
            i += 1;
        }

        let combination_ok = if help {
            !(decompress || keep || verbose || word_size.is_some())
        } else {
            !(decompress && word_size.is_some())
        };
        if !combination_ok {
            return Err(UsageError::InvalidUsage);
        }

        let input_file = match &args[i..] {
            [] if help => return Ok(Command::Help),
            [file] if !help && !file.is_empty() => PathBuf::from(file.as_os_str()),
            _ => return Err(UsageError::InvalidUsage),
        };

        let config = Config {
            input_file,
            keep,
            verbose,
        };
        if decompress {
            Ok(Command::Decompress(config))
        } else {
            Ok(Command::Compress {
                config,
                word_size: word_size.unwrap_or(DEFAULT_WORD_SIZE),
            })
        }
    }
}

fn set_once(flag: &mut bool) -> Result<(), UsageError> {
    if *flag {
        return Err(UsageError::InvalidUsage);
    }
    *flag = true;
    Ok(())
}

/// Parse the value of `-b`: decimal digits only, 1..=255.
fn parse_word_size(arg: &str) -> Result<WordSize, UsageError> {
    let invalid = |reason| UsageError::InvalidOptionArg {
        switch: "-b",
        arg: arg.to_string(),
        reason,
    };

    if arg.is_empty() {
        return Err(invalid("empty"));
    }
    let mut total: WordSize = 0;
    for byte in arg.bytes() {
        if !byte.is_ascii_digit() {
            return Err(invalid("contains non-digits"));
        }
        total = total
            .checked_mul(10)
            .and_then(|t| t.checked_add(byte - b'0'))
            .ok_or_else(|| invalid("too big"))?;
    }
    if total == 0 {
        return Err(invalid("can't be 0"));
    }
    Ok(total)
}
