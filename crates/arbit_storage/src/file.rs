//! File-based storage backend for persistent logs.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default write buffer: 1 MiB, so small records coalesce into large writes.
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 20;

/// A file-based log backend.
///
/// Opening a `FileBackend` creates the file if needed, takes an exclusive
/// advisory lock on it and truncates it. Appends go through a large
/// [`BufWriter`]; nothing reaches the file until the buffer fills or the
/// backend is flushed.
///
/// # Durability
///
/// - `flush()` drains the write buffer into the OS
/// - `sync()` additionally calls `File::sync_all()`
/// - `close()` syncs and releases the lock
///
/// # Example
///
/// ```no_run
/// use arbit_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::create(Path::new("bits.log")).unwrap();
/// backend.append(&[1, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
/// backend.close().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    size: u64,
}

impl FileBackend {
    /// Creates (or truncates) a log file with the default buffer size.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another backend holds the file,
    /// or an I/O error if the file cannot be opened.
    pub fn create(path: &Path) -> StorageResult<Self> {
        Self::create_with_capacity(path, DEFAULT_BUFFER_SIZE)
    }

    /// Creates (or truncates) a log file with a `capacity`-byte write buffer.
    ///
    /// The file is locked before it is truncated, so a second writer can
    /// never clobber a log that is in use.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another backend holds the file,
    /// or an I/O error if the file cannot be opened.
    pub fn create_with_capacity(path: &Path, capacity: usize) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                path: path.to_path_buf(),
            });
        }
        file.set_len(0)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::with_capacity(capacity, file)),
            size: 0,
        })
    }

    /// Like [`create_with_capacity`](Self::create_with_capacity), creating
    /// parent directories first.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn create_with_dirs(path: &Path, capacity: usize) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::create_with_capacity(path, capacity)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes sitting in the write buffer.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.writer.as_ref().map_or(0, |w| w.buffer().len())
    }

    fn writer(&mut self) -> StorageResult<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or(StorageError::Closed)
    }
}

impl StorageBackend for FileBackend {
    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let offset = self.size;
        self.writer()?.write_all(data)?;
        self.size += data.len() as u64;
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.writer()?.flush()?;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        let writer = self.writer()?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn close(&mut self) -> StorageResult<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        file.unlock()?;
        Ok(())
    }
}
