//! Storage-adapter contract
//!
//! Generic filesystem operations are default methods that report
//! [`Error::Unsupported`]; a backend overrides only the capabilities it has.
//! Uploading is a separate capability, [`MediaUploader`].

use crate::models::{BatchOutcome, PutOptions, UploadResult};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tokio::io::AsyncRead;

/// Generic operations a filesystem adapter may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FileExists,
    DirectoryExists,
    Write,
    WriteStream,
    Read,
    ReadStream,
    Delete,
    DeleteDirectory,
    CreateDirectory,
    SetVisibility,
    Visibility,
    ListContents,
    Move,
    Copy,
    MimeType,
    LastModified,
    Checksum,
    FileSize,
    Url,
}

impl Operation {
    pub const ALL: [Operation; 19] = [
        Operation::FileExists,
        Operation::DirectoryExists,
        Operation::Write,
        Operation::WriteStream,
        Operation::Read,
        Operation::ReadStream,
        Operation::Delete,
        Operation::DeleteDirectory,
        Operation::CreateDirectory,
        Operation::SetVisibility,
        Operation::Visibility,
        Operation::ListContents,
        Operation::Move,
        Operation::Copy,
        Operation::MimeType,
        Operation::LastModified,
        Operation::Checksum,
        Operation::FileSize,
        Operation::Url,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Operation::FileExists => "file existence check",
            Operation::DirectoryExists => "directory existence check",
            Operation::Write => "file writing",
            Operation::WriteStream => "stream writing",
            Operation::Read => "file reading",
            Operation::ReadStream => "stream reading",
            Operation::Delete => "file deletion",
            Operation::DeleteDirectory => "directory deletion",
            Operation::CreateDirectory => "directory creation",
            Operation::SetVisibility => "visibility controls",
            Operation::Visibility => "visibility lookup",
            Operation::ListContents => "listing contents",
            Operation::Move => "file moving",
            Operation::Copy => "file copying",
            Operation::MimeType => "mime type detection",
            Operation::LastModified => "file last modified calculation",
            Operation::Checksum => "checksum calculation",
            Operation::FileSize => "file size calculation",
            Operation::Url => "file URL retrieval",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

pub fn unsupported(operation: Operation, path: &str) -> Error {
    Error::Unsupported {
        operation,
        path: path.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Metadata about a path. Fields the backend cannot provide stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileAttributes {
    pub path: String,
    pub file_size: Option<u64>,
    pub visibility: Option<Visibility>,
    pub last_modified: Option<i64>,
    pub mime_type: Option<String>,
}

impl FileAttributes {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

#[async_trait]
pub trait FilesystemAdapter: Send + Sync {
    /// Whether `operation` does something other than fail with `Unsupported`.
    fn supports(&self, _operation: Operation) -> bool {
        false
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        Err(unsupported(Operation::FileExists, path))
    }

    async fn directory_exists(&self, path: &str) -> Result<bool> {
        Err(unsupported(Operation::DirectoryExists, path))
    }

    async fn write(&self, path: &str, _contents: &[u8]) -> Result<()> {
        Err(unsupported(Operation::Write, path))
    }

    async fn write_stream(&self, path: &str, _contents: ByteStream) -> Result<()> {
        Err(unsupported(Operation::WriteStream, path))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Err(unsupported(Operation::Read, path))
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream> {
        Err(unsupported(Operation::ReadStream, path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        Err(unsupported(Operation::Delete, path))
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        Err(unsupported(Operation::DeleteDirectory, path))
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        Err(unsupported(Operation::CreateDirectory, path))
    }

    async fn set_visibility(&self, path: &str, _visibility: Visibility) -> Result<()> {
        Err(unsupported(Operation::SetVisibility, path))
    }

    async fn visibility(&self, path: &str) -> Result<FileAttributes> {
        Err(unsupported(Operation::Visibility, path))
    }

    async fn list_contents(&self, path: &str, _deep: bool) -> Result<Vec<FileAttributes>> {
        Err(unsupported(Operation::ListContents, path))
    }

    async fn move_file(&self, source: &str, _destination: &str) -> Result<()> {
        Err(unsupported(Operation::Move, source))
    }

    async fn copy(&self, source: &str, _destination: &str) -> Result<()> {
        Err(unsupported(Operation::Copy, source))
    }

    async fn mime_type(&self, path: &str) -> Result<FileAttributes> {
        Err(unsupported(Operation::MimeType, path))
    }

    async fn last_modified(&self, path: &str) -> Result<FileAttributes> {
        Err(unsupported(Operation::LastModified, path))
    }

    async fn checksum(&self, path: &str) -> Result<String> {
        Err(unsupported(Operation::Checksum, path))
    }

    async fn file_size(&self, path: &str) -> Result<FileAttributes> {
        Err(unsupported(Operation::FileSize, path))
    }

    async fn url(&self, path: &str) -> Result<String> {
        Err(unsupported(Operation::Url, path))
    }
}

/// Upload capability: write media and get back the platform's record of it.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn put(&self, file_name: &str, contents: &[u8], options: &PutOptions)
        -> Result<UploadResult>;

    async fn put_many(
        &self,
        files: Vec<(String, Vec<u8>)>,
        options: &PutOptions,
    ) -> Vec<(String, BatchOutcome)>;
}
