use anyhow::{Context, Result};
use clap::Parser;
use config::{PathManager, Settings, load_env_file};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use blogimport_core::{
    AssetImporter, ContentStore, ImportError, ImportOptions, ImportReport, Importer, MemoryStore,
    PostStatus, RichTextConverter, SqliteStore, UploadDir,
};
use remote::{HostedBlogClient, PostsQuery};

mod logging;

/// Import posts, categories, tags and images from a hosted blog
#[derive(clap_derive::Parser, Debug)]
#[command(name = "blogimport", author, version, about, long_about = None)]
struct Args {
    /// API key sent in the Authorization header
    #[arg(long, env = "BLOG_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the blog API
    #[arg(long)]
    api_url: Option<String>,

    /// Base URL embedded image ids are resolved against
    #[arg(long)]
    media_url: Option<String>,

    /// Posts per page
    #[arg(long)]
    limit: Option<u32>,

    /// Offset of the first post to fetch
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Keep fetching pages until the remote reports no more posts
    #[arg(long)]
    all_pages: bool,

    /// Stop after this many pages (with --all-pages)
    #[arg(long)]
    max_pages: Option<usize>,

    /// SQLite database to import into
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory downloaded images are stored in
    #[arg(long)]
    uploads_dir: Option<PathBuf>,

    /// Public URL the uploads directory is served from
    #[arg(long)]
    uploads_url: Option<String>,

    /// Import into an in-memory store; images go to a scratch directory
    #[arg(long)]
    dry_run: bool,

    /// Import posts again even when an entry for them already exists
    #[arg(long)]
    keep_existing: bool,

    /// Root for the database, uploads, logs and settings
    #[arg(long, env = "BLOGIMPORT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Settings file (defaults to settings.toml in the config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

struct Run {
    source: HostedBlogClient,
    uploads: UploadDir,
    converter: RichTextConverter,
    options: ImportOptions,
    query: PostsQuery,
    all_pages: bool,
}

impl Run {
    async fn execute<S: ContentStore>(self, store: Arc<S>) -> Result<ImportReport, ImportError> {
        let assets = AssetImporter::new(store.clone(), self.uploads, Arc::new(remote::Client::new()));
        let importer = Importer::new(self.source, store, assets, self.converter).with_options(self.options);
        if self.all_pages {
            importer.import_all(&self.query).await
        } else {
            importer.import(&self.query).await
        }
    }
}

fn print_report(report: &ImportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for post in &report.posts {
        if let PostStatus::Failed { stage, error } = &post.status {
            println!("failed: {} ({}) at {:?}: {}", post.title, post.remote_id, stage, error);
        }
    }
    println!("{}", report.summary());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_file();
    let args = Args::parse();
    if let Some(dir) = &args.data_dir {
        PathManager::set_data_dir(dir.clone());
    }
    let _log_guard = logging::init_logging(&args.log_level);

    let settings = match &args.settings {
        Some(path) => Settings::load_from(path).map_err(anyhow::Error::msg)?,
        None => Settings::load(),
    };

    let api_key = args
        .api_key
        .clone()
        .or_else(Settings::api_key_from_env)
        .context("missing API key: pass --api-key or set BLOG_API_KEY")?;
    let api_url = args.api_url.clone().unwrap_or_else(|| settings.api_url().to_string());
    let media_url = args
        .media_url
        .clone()
        .unwrap_or_else(|| settings.static_media_url().to_string());
    let limit = args.limit.unwrap_or_else(|| settings.page_limit());

    let uploads_dir = if args.dry_run {
        std::env::temp_dir().join("blogimport-dry-run")
    } else {
        args.uploads_dir
            .clone()
            .or_else(|| settings.uploads_dir())
            .context("could not determine an uploads directory, pass --uploads-dir")?
    };
    let uploads_url = args
        .uploads_url
        .clone()
        .or_else(|| settings.uploads_url.clone())
        .unwrap_or_else(|| format!("file://{}", uploads_dir.display()));

    if let Err(e) = PathManager::ensure_dirs_exist() {
        warn!(error = %e, "failed to create data directories");
    }

    let uploads = UploadDir::new(&uploads_dir, uploads_url);
    let cleaned = uploads.cleanup_temp_files().await?;
    if cleaned > 0 {
        info!(cleaned, "removed interrupted uploads");
    }

    let run = Run {
        source: HostedBlogClient::new(&api_key, &api_url)?,
        uploads,
        converter: RichTextConverter::new(media_url),
        options: ImportOptions {
            skip_existing: !args.keep_existing,
            max_pages: args.max_pages,
        },
        query: PostsQuery::default().with_paging(limit, args.offset),
        all_pages: args.all_pages,
    };

    info!(%api_url, uploads = %uploads_dir.display(), dry_run = args.dry_run, "starting import");
    let result = if args.dry_run {
        run.execute(Arc::new(MemoryStore::new())).await
    } else {
        let db_path = args
            .db
            .clone()
            .or_else(PathManager::db_path)
            .context("could not determine a database path, pass --db")?;
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("failed to open database {}", db_path.display()))?;
        run.execute(Arc::new(store)).await
    };

    match result {
        Ok(report) => print_report(&report, args.json),
        Err(e) => {
            error!(error = %e, "import aborted");
            Err(e.into())
        }
    }
}
