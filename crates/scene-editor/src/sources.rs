//! Where scene documents come from and where exports go

use std::fmt;
use std::path::{Path, PathBuf};

use futures::future::{self, BoxFuture, FutureExt};

use crate::task::run_blocking;

/// Reference to a scene document
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRef {
    /// File path, relative paths resolve against the asset root
    Path(PathBuf),
    Url(String),
    /// Bytes already in memory (file picker output)
    Bytes { name: String, data: Vec<u8> },
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Path(path) => write!(f, "{}", path.display()),
            SourceRef::Url(url) => write!(f, "{url}"),
            SourceRef::Bytes { name, data } => write!(f, "{name} ({} bytes)", data.len()),
        }
    }
}

/// Reading or writing a document failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Worker stopped: {0}")]
    Worker(String),
}

impl SourceError {
    fn from_io(path: &Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(path.display().to_string())
        } else {
            SourceError::Io(format!("{}: {e}", path.display()))
        }
    }
}

/// Produces document bytes
pub trait DocumentSource: Send + Sync {
    fn read(&self, source: &SourceRef) -> BoxFuture<'static, Result<Vec<u8>, SourceError>>;
}

/// Filesystem, HTTP and in-memory documents
#[derive(Debug, Clone)]
pub struct DefaultDocumentSource {
    asset_root: PathBuf,
}

impl DefaultDocumentSource {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }
}

impl DocumentSource for DefaultDocumentSource {
    fn read(&self, source: &SourceRef) -> BoxFuture<'static, Result<Vec<u8>, SourceError>> {
        match source {
            SourceRef::Path(path) => {
                let path = self.resolve(path);
                tracing::debug!("Reading document {:?}", path);
                run_blocking(
                    "document-reader",
                    move || std::fs::read(&path).map_err(|e| SourceError::from_io(&path, e)),
                    || SourceError::Worker("document reader stopped".into()),
                )
            }
            SourceRef::Url(url) => {
                let url = url.clone();
                tracing::debug!("Fetching document {}", url);
                run_blocking(
                    "document-fetch",
                    move || fetch(&url),
                    || SourceError::Worker("document fetch stopped".into()),
                )
            }
            SourceRef::Bytes { data, .. } => future::ready(Ok(data.clone())).boxed(),
        }
    }
}

fn fetch(url: &str) -> Result<Vec<u8>, SourceError> {
    let response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::StatusCode(404) => SourceError::NotFound(url.to_string()),
        other => SourceError::Http(format!("{url}: {other}")),
    })?;

    response
        .into_body()
        .read_to_vec()
        .map_err(|e| SourceError::Http(format!("{url}: {e}")))
}

/// Receives exported documents
pub trait DocumentSink: Send + Sync {
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SourceError>;
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSink for DirectorySink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SourceError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SourceError::from_io(&self.dir, e))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(|e| SourceError::from_io(&path, e))?;
        tracing::info!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }
}
