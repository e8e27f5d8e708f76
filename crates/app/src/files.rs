//! Input and output files for a single job.
//!
//! [`ExistingFile`] is the file being read. [`GuardedNewFile`] is the file
//! being produced: its contents go to a temporary file next to the target,
//! and only [`GuardedNewFile::commit`] gives it the final name. A job that
//! fails part way therefore never leaves a truncated output behind.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// A file operation that failed, with the file it failed on.
#[derive(Debug, Error)]
#[error("error occurred while trying to {operation} file \"{}\": {source}", .path.display())]
pub struct FileError {
    pub operation: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl FileError {
    pub fn new(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            operation,
            path: path.into(),
            source: source.into(),
        }
    }
}

/// A regular file opened for reading.
#[derive(Debug)]
pub struct ExistingFile {
    path: PathBuf,
    file: File,
}

impl ExistingFile {
    /// Open `path`, refusing anything that is not a regular file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| FileError::new("open", &path, e))?;
        let metadata = file
            .metadata()
            .map_err(|e| FileError::new("open", &path, e))?;
        if !metadata.is_file() {
            return Err(FileError::new("open", &path, "not a regular file"));
        }
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn size(&self) -> Result<u64, FileError> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| FileError::new("stat", &self.path, e))
    }

    /// Close and delete the file.
    pub fn remove(self) -> Result<(), FileError> {
        let Self { path, file } = self;
        drop(file);
        fs::remove_file(&path).map_err(|e| FileError::new("delete", &path, e))
    }
}

/// An output file that only appears under its final name once committed.
///
/// Dropping an uncommitted `GuardedNewFile` deletes the temporary file.
#[derive(Debug)]
pub struct GuardedNewFile {
    path: PathBuf,
    temp: NamedTempFile,
}

impl GuardedNewFile {
    /// Prepare to write `path`, which must not exist yet.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        if fs::symlink_metadata(&path).is_ok() {
            return Err(FileError::new(
                "open",
                &path,
                io::Error::from(io::ErrorKind::AlreadyExists),
            ));
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".hz-");
        // rw-r--r-- before umask, like any newly created file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o644));
        }
        let temp = builder
            .tempfile_in(dir)
            .map_err(|e| FileError::new("open", &path, e))?;
        log::debug!(
            "writing {} through {}",
            path.display(),
            temp.path().display()
        );
        Ok(Self { path, temp })
    }

    /// Final name of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        self.temp.as_file()
    }

    /// Flush file contents to disk.
    pub fn sync(&self) -> Result<(), FileError> {
        self.temp
            .as_file()
            .sync_all()
            .map_err(|e| FileError::new("disk sync", &self.path, e))
    }

    /// Move the written file to its final name without replacing anything
    /// that appeared there in the meantime.
    pub fn commit(self) -> Result<File, FileError> {
        let Self { path, temp } = self;
        temp.persist_noclobber(&path)
            .map_err(|e| FileError::new("create", &path, e.error))
    }
}
