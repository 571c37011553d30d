//! Post-download file validation (size and checksum)

use sha1::{Digest, Sha1};
use sha2::Sha256;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::downloader::core::error::{DownloadError, FileOperation, HashAlgorithm, Result};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Expected properties of a downloaded file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileValidation {
    /// Expected hex-encoded digest
    pub hash: Option<String>,
    pub algorithm: HashAlgorithm,
    /// Expected file size in bytes
    pub expected_size: Option<u64>,
}

impl FileValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hash<S: Into<String>>(mut self, algorithm: HashAlgorithm, hash: S) -> Self {
        self.algorithm = algorithm;
        self.hash = Some(hash.into());
        self
    }

    pub fn with_expected_size(mut self, size: u64) -> Self {
        self.expected_size = Some(size);
        self
    }

    /// Check if validation is needed
    pub fn is_empty(&self) -> bool {
        self.hash.is_none() && self.expected_size.is_none()
    }

    /// Validate a file on disk, returning its size on success.
    ///
    /// Size is checked first since it needs no read of the content.
    pub async fn validate_file(&self, path: &Path) -> Result<u64> {
        let file_size = fs::metadata(path)
            .await
            .map_err(|e| DownloadError::file_system(path, FileOperation::Metadata, e))?
            .len();

        if let Some(expected) = self.expected_size {
            if file_size != expected {
                return Err(DownloadError::SizeMismatch {
                    file: path.to_path_buf(),
                    expected,
                    actual: file_size,
                    diff: file_size as i64 - expected as i64,
                });
            }
        }

        if let Some(ref expected) = self.hash {
            let actual = digest_file(path, self.algorithm).await?;
            debug!("{} for {}: expected={}, actual={}", self.algorithm, path.display(), expected, actual);
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                return Err(DownloadError::ChecksumMismatch {
                    file: path.to_path_buf(),
                    algorithm: self.algorithm,
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(file_size)
    }
}

enum Hasher {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Hasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Hasher::Sha1(h) => h.update(chunk),
            Hasher::Sha256(h) => h.update(chunk),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Hasher::Sha1(h) => hex::encode(h.finalize()),
            Hasher::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

/// Stream a file through the requested digest and return it hex-encoded
pub async fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let mut file = fs::File::open(path)
        .await
        .map_err(|e| DownloadError::file_system(path, FileOperation::Read, e))?;
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| DownloadError::file_system(path, FileOperation::Read, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize_hex())
}

/// Digest an in-memory buffer
pub fn digest_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize_hex()
}
