pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::{
    Settings, API_KEY_ENV, DEFAULT_API_URL, DEFAULT_PAGE_LIMIT, DEFAULT_STATIC_MEDIA_URL,
};

/// Load environment variables from .env files.
/// First loads from ~/.env (home directory), then from ./.env (project directory).
/// Project directory values take precedence over home directory values.
/// Call this before parsing CLI args so `BLOG_API_KEY` can come from a .env file.
pub fn load_env_file() {
    if let Some(home) = dirs::home_dir() {
        let home_env_path = home.join(".env");
        dotenv::from_path(home_env_path).ok();
    }

    dotenv::dotenv().ok();
}
