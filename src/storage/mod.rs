//! Storage abstraction layer.
//!
//! Segments are persisted through a pluggable [`Storage`] trait so the same
//! index code runs over a directory on disk ([`file::FileStorage`]) or over
//! memory for tests and ephemeral indexes ([`memory::MemoryStorage`]).
//!
//! The single-writer guarantee is enforced here: a writer holds an
//! exclusive [`StorageLock`] for the lifetime of its session, released on
//! drop so every exit path gives the lock back.

pub mod file;
pub mod memory;
pub mod structured;

use std::io::{Read, Write};

use crate::error::Result;

/// Name of the exclusive writer lock file.
pub const WRITE_LOCK_NAME: &str = "write.lock";

/// A trait for storage backends that can store and retrieve files.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open an existing file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any existing file.
    ///
    /// The data only becomes visible to readers once the output is closed;
    /// an output dropped without `close` is discarded.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files, sorted by name.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Acquire an exclusive named lock.
    ///
    /// Fails if the lock is already held. The lock is released when the
    /// returned guard is dropped.
    fn acquire_lock(&self, name: &str) -> Result<Box<dyn StorageLock>>;
}

/// A readable file handle.
pub trait StorageInput: Read + Send {}

/// A writable file handle with an explicit close.
pub trait StorageOutput: Write + Send {
    /// Flush buffered data, make it durable, and publish the file.
    fn close(&mut self) -> Result<()>;
}

/// An exclusive lock guard. Dropping the guard releases the lock.
pub trait StorageLock: Send {
    /// The name the lock was acquired under.
    fn name(&self) -> &str;
}
