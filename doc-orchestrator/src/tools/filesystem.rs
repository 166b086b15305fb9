//! Local file reader

use doc_orchestrator_sdk::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{ToolError, ToolResult};
use crate::tools::{FileContent, FileData, FileReader};

/// Reads files relative to a base directory
#[derive(Debug, Clone)]
pub struct LocalFileReader {
    base_path: PathBuf,
}

impl LocalFileReader {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Absolute paths are used as-is, relative ones are joined to the base.
    pub fn resolve(&self, file_path: &str) -> PathBuf {
        let path = Path::new(file_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

#[async_trait]
impl FileReader for LocalFileReader {
    async fn read(&self, file_path: &str) -> ToolResult<FileData> {
        let path = self.resolve(file_path);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound(path));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(ToolError::NotAFile(path));
        }

        let bytes = fs::read(&path).await?;
        let size = bytes.len();
        let content = match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(e) => FileContent::Binary(e.into_bytes()),
        };

        Ok(FileData {
            path,
            content,
            size,
        })
    }
}
