//! Durable JSON documents with whole-image replacement.
//!
//! A [`Document`] wraps one path on disk. Reads treat a missing file as the
//! type's default value; writes serialize the full value to a sibling
//! temporary file and rename it into place, so a crash mid-write never
//! leaves a partially written document behind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write document {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("document {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize document {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, DocumentError>;

/// Handle to one durable JSON document.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and deserialize the document, or return the default value when
    /// the file does not exist yet.
    pub async fn load_or_default<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(T::default())
            }
            Err(error) => {
                return Err(DocumentError::Read {
                    path: self.path.clone(),
                    source: error,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|error| DocumentError::Parse {
            path: self.path.clone(),
            source: error,
        })
    }

    /// Serialize `value` and replace the document atomically.
    ///
    /// The bytes land in `<path>.tmp` first and are renamed over the
    /// document, so readers only ever observe a complete image.
    pub async fn save<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let serialized =
            serde_json::to_vec_pretty(value).map_err(|error| DocumentError::Serialize {
                path: self.path.clone(),
                source: error,
            })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| DocumentError::Write {
                    path: self.path.clone(),
                    source: error,
                })?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, &serialized)
            .await
            .map_err(|error| DocumentError::Write {
                path: staging.clone(),
                source: error,
            })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|error| DocumentError::Write {
                path: self.path.clone(),
                source: error,
            })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
