//! File system storage implementation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{LucernaError, Result};
use crate::storage::{Storage, StorageInput, StorageLock, StorageOutput};

/// A storage backend over a directory on disk.
///
/// Outputs are written to a temporary file and renamed into place on close,
/// so readers never observe a half-written file. Locks are files created
/// with `create_new`, which is atomic on all supported platforms.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at the given directory, creating the
    /// directory if it does not exist.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;
        Ok(FileStorage { path })
    }

    /// The root directory of this storage.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let path = self.file_path(name);
        let file = File::open(&path).map_err(|e| {
            LucernaError::storage(format!("cannot open {}: {e}", path.display()))
        })?;
        Ok(Box::new(FileInput {
            reader: BufReader::new(file),
        }))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let final_path = self.file_path(name);
        let tmp_path = self.file_path(&format!("{name}.tmp"));
        let file = File::create(&tmp_path)?;
        Ok(Box::new(FileOutput {
            writer: Some(BufWriter::new(file)),
            tmp_path,
            final_path,
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        fs::remove_file(self.file_path(name))?;
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if entry.file_type()?.is_file()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn acquire_lock(&self, name: &str) -> Result<Box<dyn StorageLock>> {
        let path = self.file_path(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Box::new(FileLock {
                name: name.to_string(),
                path,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(
                LucernaError::storage(format!("lock already held: {name}")),
            ),
            Err(e) => Err(e.into()),
        }
    }
}

struct FileInput {
    reader: BufReader<File>,
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {}

struct FileOutput {
    writer: Option<BufWriter<File>>,
    tmp_path: PathBuf,
    final_path: PathBuf,
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.writer {
            Some(writer) => writer.write(buf),
            None => Err(std::io::Error::other("output already closed")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl StorageOutput for FileOutput {
    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            let file = writer
                .into_inner()
                .map_err(|e| LucernaError::storage(format!("flush failed: {e}")))?;
            file.sync_all()?;
            fs::rename(&self.tmp_path, &self.final_path)?;
        }
        Ok(())
    }
}

impl Drop for FileOutput {
    fn drop(&mut self) {
        // Unclosed outputs are discarded; remove the temp file.
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

struct FileLock {
    name: String,
    path: PathBuf,
}

impl StorageLock for FileLock {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut output = storage.create_output("segment.bin").unwrap();
        output.write_all(b"hello storage").unwrap();
        output.close().unwrap();

        let mut input = storage.open_input("segment.bin").unwrap();
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, b"hello storage");
    }

    #[test]
    fn test_unclosed_output_not_published() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        {
            let mut output = storage.create_output("partial.bin").unwrap();
            output.write_all(b"partial").unwrap();
        }

        assert!(!storage.file_exists("partial.bin"));
    }

    #[test]
    fn test_lock_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let lock = storage.acquire_lock("write.lock").unwrap();
        assert!(storage.acquire_lock("write.lock").is_err());

        drop(lock);
        assert!(storage.acquire_lock("write.lock").is_ok());
    }

    #[test]
    fn test_reopen_directory() {
        let dir = tempfile::tempdir().unwrap();

        {
            let storage = FileStorage::new(dir.path()).unwrap();
            let mut output = storage.create_output("data.bin").unwrap();
            output.write_all(b"persisted").unwrap();
            output.close().unwrap();
        }

        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(storage.file_exists("data.bin"));
    }
}
