//! Asset import
//!
//! Downloads a remote image once and registers it in the asset store. The
//! filename derived from the URL is the idempotence key: a second import of
//! the same URL finds the file and its record and returns the same id.

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, ImageReader};
use regex::Regex;
use std::io::Cursor;
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{AssetError, DownloadError, StoreError};
use crate::storage::{AssetId, AssetStore, EntryId, NewAsset, UploadDir};

static MEDIA_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"media/(.*?)~").expect("media name pattern is valid"));

/// Fetches the body of a remote resource
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Bytes, DownloadError>;
}

#[async_trait]
impl Downloader for remote::Client {
    async fn download(&self, url: &str) -> Result<Bytes, DownloadError> {
        self.get_bytes(url)
            .await
            .map_err(|e| DownloadError::from_remote(url, e))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedAsset {
    pub id: AssetId,
    /// Public URL of the local copy
    pub url: String,
    pub filename: String,
    /// False when the file was already in the upload directory
    pub downloaded: bool,
}

/// Derive the local filename for a remote media URL.
///
/// Media URLs look like `.../media/<name>~mv2.jpg/...`; the name between
/// `media/` and the first `~` plus the extension of the last path segment
/// gives `<name>.jpg`. Other URLs use their sanitized last path segment.
pub fn derive_filename(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(percent_decode)?;
    let extension = last_segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(captures) = MEDIA_NAME.captures(url.path()) {
        let base = sanitize(&percent_decode(&captures[1]));
        if !base.is_empty() {
            return Some(match extension {
                Some(ext) => format!("{base}.{ext}"),
                None => base,
            });
        }
    }

    let fallback = sanitize(&last_segment);
    (!fallback.is_empty()).then_some(fallback)
}

/// Invalid UTF-8 keeps the raw segment
fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

pub fn mime_type_for(filename: &str) -> &'static str {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return "application/octet-stream";
    };
    match ImageFormat::from_extension(ext) {
        Some(format) => format.to_mime_type(),
        None if ext.eq_ignore_ascii_case("svg") => "image/svg+xml",
        None => "application/octet-stream",
    }
}

fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

pub struct AssetImporter<S: AssetStore> {
    store: Arc<S>,
    uploads: UploadDir,
    downloader: Arc<dyn Downloader>,
    // serializes check-then-create per filename
    import_lock: Mutex<()>,
}

impl<S: AssetStore> AssetImporter<S> {
    pub fn new(store: Arc<S>, uploads: UploadDir, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            store,
            uploads,
            downloader,
            import_lock: Mutex::new(()),
        }
    }

    pub fn uploads(&self) -> &UploadDir {
        &self.uploads
    }

    /// True when `url` already points at the upload directory
    pub fn is_local(&self, url: &str) -> bool {
        self.uploads.is_local(url)
    }

    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn import_by_url(&self, url: &str, owner: &EntryId) -> Result<ImportedAsset, AssetError> {
        let filename =
            derive_filename(url).ok_or_else(|| AssetError::UnrecognizedUrl(url.to_string()))?;
        let _guard = self.import_lock.lock().await;

        if self.uploads.exists(&filename).await? {
            if let Some(existing) = self
                .store
                .find_asset_by_filename(&filename)
                .await
                .map_err(StoreError::from)?
            {
                debug!(%filename, asset_id = %existing.id, "reusing existing asset");
                return Ok(ImportedAsset {
                    id: existing.id,
                    url: existing.asset.url,
                    filename,
                    downloaded: false,
                });
            }

            // file left by an earlier run without a record
            let data = self.uploads.read(&filename).await?;
            let id = self.register(&filename, &data, owner).await?;
            info!(%filename, asset_id = %id, "registered orphaned upload");
            return Ok(ImportedAsset {
                id,
                url: self.uploads.url_for(&filename),
                filename,
                downloaded: false,
            });
        }

        let data = self.downloader.download(url).await?;
        self.uploads.write(&filename, &data).await?;

        if let Some(existing) = self
            .store
            .find_asset_by_filename(&filename)
            .await
            .map_err(StoreError::from)?
        {
            debug!(%filename, asset_id = %existing.id, "restored missing file for existing asset");
            return Ok(ImportedAsset {
                id: existing.id,
                url: existing.asset.url,
                filename,
                downloaded: true,
            });
        }

        let id = self.register(&filename, &data, owner).await?;
        info!(%filename, asset_id = %id, bytes = data.len(), "imported asset");
        Ok(ImportedAsset {
            id,
            url: self.uploads.url_for(&filename),
            filename,
            downloaded: true,
        })
    }

    async fn register(&self, filename: &str, data: &[u8], owner: &EntryId) -> Result<AssetId, AssetError> {
        let asset = NewAsset::new(
            filename,
            mime_type_for(filename),
            data.len() as i64,
            self.uploads.path_for(filename).to_string_lossy(),
            self.uploads.url_for(filename),
        )
        .with_owner(owner)
        .with_dimensions(image_dimensions(data));

        Ok(self
            .store
            .register_asset(asset)
            .await
            .map_err(StoreError::from)?)
    }
}
