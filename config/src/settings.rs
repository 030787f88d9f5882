//! Import settings stored in settings.toml

use crate::PathManager;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Base URL of the hosted blog API
pub const DEFAULT_API_URL: &str = "https://www.wixapis.com/blog/v3";

/// Base URL that embedded image media ids are resolved against
pub const DEFAULT_STATIC_MEDIA_URL: &str = "https://static.wixstatic.com/media";

/// Posts requested per page when nothing else is configured
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "BLOG_API_KEY";

/// Settings for an import run. Every field is optional so a partial file
/// (or no file) works; accessors apply the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    pub api_url: Option<String>,
    pub static_media_url: Option<String>,
    pub page_limit: Option<u32>,
    /// Directory downloaded images are written to
    pub uploads_dir: Option<PathBuf>,
    /// Public URL the uploads directory is served from
    pub uploads_url: Option<String>,
}

impl Settings {
    /// Load settings from the default settings file, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = PathManager::settings_path() else {
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Save settings to the default settings file
    pub fn save(&self) -> Result<(), String> {
        let path = PathManager::settings_path().ok_or("Could not determine settings path")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(path, content).map_err(|e| format!("Failed to write settings: {}", e))?;
        Ok(())
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn static_media_url(&self) -> &str {
        self.static_media_url
            .as_deref()
            .unwrap_or(DEFAULT_STATIC_MEDIA_URL)
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    /// Uploads directory, falling back to `<data_dir>/uploads`
    pub fn uploads_dir(&self) -> Option<PathBuf> {
        self.uploads_dir.clone().or_else(PathManager::uploads_dir)
    }

    /// Public uploads URL, falling back to a `file://` URL of the uploads directory
    pub fn uploads_url(&self) -> Option<String> {
        if let Some(url) = &self.uploads_url {
            return Some(url.clone());
        }
        self.uploads_dir()
            .map(|dir| format!("file://{}", dir.display()))
    }

    /// Read the API key from the environment
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_unset() {
        let settings = Settings::default();
        assert_eq!(settings.api_url(), DEFAULT_API_URL);
        assert_eq!(settings.static_media_url(), DEFAULT_STATIC_MEDIA_URL);
        assert_eq!(settings.page_limit(), 100);
    }

    #[test]
    fn test_partial_file_parses() {
        let settings: Settings = toml::from_str("page_limit = 25\nuploads_url = \"https://example.com/uploads\"\n").unwrap();
        assert_eq!(settings.page_limit(), 25);
        assert_eq!(settings.uploads_url().as_deref(), Some("https://example.com/uploads"));
        assert_eq!(settings.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("blogimport_settings_{}", uuid::Uuid::new_v4()))
            .join("settings.toml");
        let settings = Settings {
            api_url: Some("http://localhost:9000".to_string()),
            page_limit: Some(10),
            ..Default::default()
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let path = std::env::temp_dir().join("blogimport_missing_settings.toml");
        assert!(Settings::load_from(&path).is_err());
    }
}
