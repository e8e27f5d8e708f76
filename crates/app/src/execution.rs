//! Running one compression or decompression job against files on disk.
//!
//! A job:
//! 1. derives the output name from the input name
//! 2. opens the input and a guarded output
//! 3. streams the input through the codec
//! 4. commits the output, then (unless keeping) syncs it and deletes the input
//! 5. reports size statistics when asked

use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use hz_core::WordSize;

use crate::config::Config;
use crate::files::{ExistingFile, FileError, GuardedNewFile};
use crate::stats::{FileSizeChange, SpaceSaving, Statistics};

/// Extension carried by compressed files.
pub const COMPRESSED_EXTENSION: &str = "hz";

/// The transformation a job applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compress { word_size: WordSize },
    Decompress,
}

impl Operation {
    /// Name of the file the job writes.
    pub fn output_path(&self, input: &Path) -> Result<PathBuf, FileError> {
        let compressed = input
            .extension()
            .map_or(false, |ext| ext == COMPRESSED_EXTENSION);

        match self {
            Operation::Compress { .. } if compressed => Err(FileError::new(
                "compress",
                input,
                format!("file already has .{COMPRESSED_EXTENSION} extension"),
            )),
            Operation::Compress { .. } => {
                let mut name = input.as_os_str().to_owned();
                name.push(".");
                name.push(COMPRESSED_EXTENSION);
                Ok(PathBuf::from(name))
            }
            Operation::Decompress if compressed => Ok(input.with_extension("")),
            Operation::Decompress => Err(FileError::new(
                "decompress",
                input,
                "unknown extension",
            )),
        }
    }

    fn apply(&self, input: &ExistingFile, output: &GuardedNewFile) -> Result<(), FileError> {
        let mut reader = BufReader::new(input.file());
        let mut writer = BufWriter::new(output.file());

        let result = match *self {
            Operation::Compress { word_size } => {
                hz_core::compress(&mut reader, &mut writer, word_size)
            }
            Operation::Decompress => hz_core::decompress(&mut reader, &mut writer),
        };
        result.map_err(|err| match err {
            hz_core::Error::StreamWrite(e) => FileError::new("write", output.path(), e),
            other => FileError::new("read", input.path(), other),
        })?;

        writer
            .flush()
            .map_err(|e| FileError::new("write", output.path(), e))
    }

    fn space_saving(&self, size_change: FileSizeChange) -> SpaceSaving {
        match self {
            Operation::Compress { .. } => {
                SpaceSaving::new(size_change.final_size, size_change.original_size)
            }
            Operation::Decompress => {
                SpaceSaving::new(size_change.original_size, size_change.final_size)
            }
        }
    }
}

/// A configured job, ready to run.
#[derive(Debug, Clone)]
pub struct ProgramExecution {
    operation: Operation,
    config: Config,
}

impl ProgramExecution {
    pub fn compress(config: Config, word_size: WordSize) -> Self {
        Self {
            operation: Operation::Compress { word_size },
            config,
        }
    }

    pub fn decompress(config: Config) -> Self {
        Self {
            operation: Operation::Decompress,
            config,
        }
    }

    /// Run the job, printing statistics in verbose mode.
    pub fn run(&self) -> Result<()> {
        let stats = self.execute()?;
        if self.config.verbose {
            stats.print_summary();
        }
        Ok(())
    }

    /// Run the job and return its statistics without printing them.
    pub fn execute(&self) -> Result<Statistics> {
        let input_path = &self.config.input_file;
        let output_path = self.operation.output_path(input_path)?;
        log::info!(
            "{:?}: {} -> {}",
            self.operation,
            input_path.display(),
            output_path.display()
        );

        let input = ExistingFile::open(input_path)?;
        let original_size = input.size()?;
        let output = GuardedNewFile::create(output_path)?;

        self.operation.apply(&input, &output)?;

        if !self.config.keep {
            output.sync()?;
        }
        let output_path = output.path().to_path_buf();
        let committed = output.commit()?;
        let final_size = committed
            .metadata()
            .map_err(|e| FileError::new("stat", &output_path, e))?
            .len();
        if !self.config.keep {
            input.remove()?;
        }

        let size_change = FileSizeChange {
            original_size,
            final_size,
        };
        log::debug!("{} bytes in, {} bytes out", original_size, final_size);
        Ok(Statistics {
            size_change,
            space_saving: self.operation.space_saving(size_change),
        })
    }
}
