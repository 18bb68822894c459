//! Append-only newline-delimited JSON log used by the file backend.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::StorageError;

/// An open append-only log file.
///
/// Each [`JsonLog::append`] call writes all its entries with one write and
/// flushes before returning.
#[derive(Debug)]
pub struct JsonLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl JsonLog {
    /// Opens (creating if needed) the log at `path` and returns it together
    /// with every entry already stored, in file order.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptLog`] with the 1-based line number if a
    /// line is not a valid entry, or [`StorageError::Io`] if the file cannot
    /// be opened or read.
    pub async fn open<T: DeserializeOwned>(path: &Path) -> Result<(Self, Vec<T>), StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        let content = tokio::fs::read_to_string(path).await?;
        let mut entries = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry = serde_json::from_str(line).map_err(|source| StorageError::CorruptLog {
                line: number + 1,
                source,
            })?;
            entries.push(entry);
        }

        let log = Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        };

        Ok((log, entries))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Appends one JSON line per entry and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] once the log has been closed.
    pub async fn append<T, I>(&mut self, entries: I) -> Result<(), StorageError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let Some(writer) = self.writer.as_mut() else {
            return Err(StorageError::unavailable(format!(
                "log {} is closed",
                self.path.display()
            )));
        };

        let mut buf = Vec::new();
        for entry in entries {
            serde_json::to_writer(&mut buf, &entry)?;
            buf.push(b'\n');
        }
        if buf.is_empty() {
            return Ok(());
        }

        writer.write_all(&buf).await?;
        writer.flush().await?;

        Ok(())
    }

    /// Flushes and syncs the file, then releases it. Later appends fail.
    pub async fn close(&mut self) -> Result<(), StorageError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            writer.into_inner().sync_all().await?;
        }
        Ok(())
    }
}

/// Path of the users log stored next to the URL log (`<path>.users`).
pub fn users_log_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".users");
    PathBuf::from(name)
}
