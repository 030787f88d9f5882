//! Upload directory for imported assets
//!
//! Files are stored flat under the root by their derived filename, and served
//! from `base_url/<filename>`. Writes go through a temp file and a rename so a
//! crashed import never leaves a truncated file under the final name.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
    base_url: String,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Public URL for a stored filename
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url, filename)
    }

    /// True when `url` points into this upload directory
    pub fn is_local(&self, url: &str) -> bool {
        url.strip_prefix(&self.base_url)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    pub async fn exists(&self, filename: &str) -> io::Result<bool> {
        fs::try_exists(self.path_for(filename)).await
    }

    pub async fn read(&self, filename: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_for(filename)).await
    }

    pub async fn size(&self, filename: &str) -> io::Result<u64> {
        Ok(fs::metadata(self.path_for(filename)).await?.len())
    }

    /// Write `data` under `filename`, replacing any existing file
    pub async fn write(&self, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;

        let path = self.path_for(filename);
        let temp_path = self.root.join(format!("{filename}{TEMP_SUFFIX}"));
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        Ok(path)
    }

    /// Remove temp files left behind by interrupted writes
    pub async fn cleanup_temp_files(&self) -> io::Result<usize> {
        if !fs::try_exists(&self.root).await? {
            return Ok(0);
        }

        let mut cleaned = 0;
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_temp = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(TEMP_SUFFIX));
            if is_temp && path.is_file() {
                fs::remove_file(&path).await?;
                cleaned += 1;
            }
        }

        Ok(cleaned)
    }
}
