//! Size statistics reported in verbose mode.
//!
//! Printed to stdout after a successful job:
//!
//! ```text
//! in:     <original size>
//! out:    <final size>
//! saving: <percent>%
//! ```
//!
//! When the decompressed side is empty no percentage exists, and the
//! compressed size is shown negated instead.

use std::fmt;

/// File sizes before and after a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSizeChange {
    pub original_size: u64,
    pub final_size: u64,
}

/// Space saved by compression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpaceSaving {
    /// Nothing to compress; holds the size of the compressed file
    Empty { compressed_size: u64 },
    /// `(1 - compressed / decompressed) * 100`
    Percent(f64),
}

impl SpaceSaving {
    pub fn new(compressed_size: u64, decompressed_size: u64) -> Self {
        if decompressed_size == 0 {
            SpaceSaving::Empty { compressed_size }
        } else {
            SpaceSaving::Percent((1.0 - compressed_size as f64 / decompressed_size as f64) * 100.0)
        }
    }
}

impl fmt::Display for SpaceSaving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceSaving::Empty { compressed_size } => write!(f, "-{compressed_size}"),
            SpaceSaving::Percent(percent) => write!(f, "{percent:.1}%"),
        }
    }
}

/// Everything printed in verbose mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub size_change: FileSizeChange,
    pub space_saving: SpaceSaving,
}

impl Statistics {
    pub fn print_summary(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "in:\t{}", self.size_change.original_size)?;
        writeln!(f, "out:\t{}", self.size_change.final_size)?;
        write!(f, "saving:\t{}", self.space_saving)
    }
}
