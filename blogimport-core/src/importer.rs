//! Import orchestration
//!
//! One run walks `Start -> CategoriesImported -> PostsFetched -> Done`:
//! categories are mirrored into local terms, then each post of the fetched
//! page goes through the per-post pipeline. Only a failed posts fetch ends a
//! run early; everything else is isolated to the item and recorded in the
//! [`ImportReport`].

use chrono::{DateTime, Utc};
use remote::{BlogSource, PostsQuery, RemoteCategory, RemotePost};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::assets::AssetImporter;
use crate::error::ImportError;
use crate::hooks::{ImportHooks, NoopHooks};
use crate::report::{
    ImportReport, Phase, PostOutcome, PostStage, PostStatus, RunState, SkipReason,
};
use crate::rewrite::{FailedImage, rewrite_images};
use crate::richtext::RichTextConverter;
use crate::storage::helper::dedup_preserving_order;
use crate::storage::{
    AssetId, ContentStore, EXTERNAL_ID_KEY, EntryId, EntryStore, NewEntry, NewTerm, TermId,
    TermStore,
};

/// Taxonomy remote categories are imported into
pub const CATEGORY_TAXONOMY: &str = "category";

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Skip posts whose external id is already recorded on an entry
    pub skip_existing: bool,
    /// Upper bound on pages fetched by `import_all`
    pub max_pages: Option<usize>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_existing: true,
            max_pages: None,
        }
    }
}

pub struct Importer<B: BlogSource, S: ContentStore> {
    source: B,
    store: Arc<S>,
    assets: AssetImporter<S>,
    converter: RichTextConverter,
    hooks: Arc<dyn ImportHooks>,
    options: ImportOptions,
    /// tag id -> label, successful lookups only
    tag_cache: Mutex<HashMap<String, String>>,
}

impl<B: BlogSource, S: ContentStore> Importer<B, S> {
    pub fn new(
        source: B,
        store: Arc<S>,
        assets: AssetImporter<S>,
        converter: RichTextConverter,
    ) -> Self {
        Self {
            source,
            store,
            assets,
            converter,
            hooks: Arc::new(NoopHooks),
            options: ImportOptions::default(),
            tag_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ImportHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn assets(&self) -> &AssetImporter<S> {
        &self.assets
    }

    /// Import categories and exactly one page of posts
    pub async fn import(&self, query: &PostsQuery) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();
        self.import_categories(&mut report).await;

        let page = self.source.fetch_posts(query).await.map_err(|e| {
            error!(error = %e, offset = query.paging.offset, "failed to fetch posts page");
            ImportError::from(e)
        })?;
        report.pages_fetched += 1;
        report.advance(RunState::PostsFetched);
        info!(posts = page.posts.len(), offset = query.paging.offset, "fetched posts page");

        for post in &page.posts {
            let outcome = self.import_post(post).await;
            report.posts.push(outcome);
        }

        report.advance(RunState::Done);
        info!(summary = %report.summary(), "import finished");
        Ok(report)
    }

    /// Import categories, then every page of posts starting at the query's offset.
    ///
    /// A failure on the first page fails the run. A failure on a later page
    /// keeps what was imported and records the posts phase as aborted.
    pub async fn import_all(&self, query: &PostsQuery) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();
        self.import_categories(&mut report).await;

        let mut page_query = query.clone();
        loop {
            let page = match self.source.fetch_posts(&page_query).await {
                Ok(page) => page,
                Err(e) if report.pages_fetched == 0 => {
                    error!(error = %e, offset = page_query.paging.offset, "failed to fetch posts page");
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(error = %e, offset = page_query.paging.offset, "failed to fetch posts page, stopping");
                    report.abort(Phase::Posts);
                    break;
                }
            };
            report.pages_fetched += 1;
            report.advance(RunState::PostsFetched);
            info!(posts = page.posts.len(), offset = page_query.paging.offset, "fetched posts page");

            for post in &page.posts {
                let outcome = self.import_post(post).await;
                report.posts.push(outcome);
            }

            let page_limit_reached = self
                .options
                .max_pages
                .is_some_and(|max| report.pages_fetched >= max);
            if page.posts.is_empty()
                || page_query.paging.limit == 0
                || !page.has_more(&page_query.paging)
                || page_limit_reached
            {
                break;
            }
            page_query.paging = page_query.paging.next();
        }

        report.advance(RunState::Done);
        info!(summary = %report.summary(), pages = report.pages_fetched, "import finished");
        Ok(report)
    }

    async fn import_categories(&self, report: &mut ImportReport) {
        let categories = match self.source.fetch_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "failed to fetch categories, continuing with posts");
                report.abort(Phase::Categories);
                return;
            }
        };

        for category in &categories {
            match self.import_category(category).await {
                Ok(true) => report.categories.created += 1,
                Ok(false) => report.categories.reused += 1,
                Err(e) => {
                    warn!(category_id = %category.id, error = %e, "failed to import category");
                    report.categories.failed += 1;
                }
            }
        }

        report.advance(RunState::CategoriesImported);
        info!(
            created = report.categories.created,
            reused = report.categories.reused,
            failed = report.categories.failed,
            "imported categories"
        );
    }

    /// Returns true when a new term was created
    async fn import_category(&self, category: &RemoteCategory) -> anyhow::Result<bool> {
        let known = self
            .store
            .find_terms_by_meta(CATEGORY_TAXONOMY, EXTERNAL_ID_KEY, &category.id)
            .await?;
        if !known.is_empty() {
            return Ok(false);
        }

        let slug = if category.slug.trim().is_empty() {
            slugify(&category.label, &category.id)
        } else {
            category.slug.clone()
        };
        let label = if category.label.is_empty() {
            slug.clone()
        } else {
            category.label.clone()
        };

        let term = self
            .store
            .create_or_get_term(NewTerm::new(CATEGORY_TAXONOMY, label, slug))
            .await?;
        self.store
            .add_term_meta(&term.id, EXTERNAL_ID_KEY, &category.id)
            .await?;
        debug!(category_id = %category.id, term_id = %term.id, created = term.created, "linked category");
        Ok(term.created)
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn import_post(&self, post: &RemotePost) -> PostOutcome {
        let status = self.run_post_pipeline(post).await;
        PostOutcome {
            remote_id: post.id.clone(),
            title: post.title.clone(),
            status,
        }
    }

    async fn run_post_pipeline(&self, post: &RemotePost) -> PostStatus {
        if self.options.skip_existing {
            match self.store.find_entries_by_meta(EXTERNAL_ID_KEY, &post.id).await {
                Ok(existing) => {
                    if let Some(entry_id) = existing.into_iter().next() {
                        info!(%entry_id, "post already imported, skipping");
                        return PostStatus::Skipped {
                            reason: SkipReason::AlreadyImported { entry_id },
                        };
                    }
                }
                Err(e) => {
                    warn!(error = %e, "existing entry lookup failed");
                    return PostStatus::Failed {
                        stage: PostStage::Lookup,
                        error: e.to_string(),
                    };
                }
            }
        }

        let html = match self.converter.convert(post.content.as_ref()) {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "rich-text conversion failed, skipping post");
                return PostStatus::Failed {
                    stage: PostStage::Convert,
                    error: e.to_string(),
                };
            }
        };

        let entry = NewEntry::post(post.title.clone(), html)
            .with_slug(post.slug.clone())
            .with_published_at(parse_published(post.first_published_date.as_deref()));
        let entry = self.hooks.filter_entry(entry, post);

        let entry_id = match self.store.create_entry(entry).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "failed to create entry, skipping post");
                return PostStatus::Failed {
                    stage: PostStage::CreateEntry,
                    error: e.to_string(),
                };
            }
        };
        debug!(%entry_id, "created entry");

        self.insert_metadata(&entry_id, post).await;
        let terms_linked = self.link_categories(&entry_id, &post.category_ids).await;
        let tags = self.link_tags(&entry_id, &post.tag_ids).await;
        let (images_rewritten, images_failed) = self.rewrite_content(&entry_id).await;
        let featured_image = self.import_cover(&entry_id, post).await;

        self.hooks.post_imported(&entry_id, post);
        info!(%entry_id, terms_linked, tags = tags.len(), images_rewritten, "imported post");

        PostStatus::Imported {
            entry_id,
            terms_linked,
            tags,
            images_rewritten,
            images_failed,
            featured_image,
        }
    }

    async fn insert_metadata(&self, entry_id: &EntryId, post: &RemotePost) {
        let mut metadata = self.hooks.entry_metadata(entry_id, post);
        metadata.push((EXTERNAL_ID_KEY.to_string(), post.id.clone()));

        for (key, value) in metadata {
            if let Err(e) = self.store.add_entry_meta(entry_id, &key, &value).await {
                warn!(%key, error = %e, "failed to store entry metadata");
            }
        }
    }

    /// Categories without a local term are dropped silently
    async fn link_categories(&self, entry_id: &EntryId, category_ids: &[String]) -> usize {
        let mut terms: Vec<TermId> = Vec::new();
        for category_id in category_ids {
            match self
                .store
                .find_terms_by_meta(CATEGORY_TAXONOMY, EXTERNAL_ID_KEY, category_id)
                .await
            {
                Ok(found) => terms.extend(found.into_iter().next()),
                Err(e) => warn!(%category_id, error = %e, "category lookup failed"),
            }
        }

        let terms = dedup_preserving_order(&terms);
        if terms.is_empty() {
            return 0;
        }
        match self
            .store
            .set_entry_terms(entry_id, CATEGORY_TAXONOMY, &terms)
            .await
        {
            Ok(()) => terms.len(),
            Err(e) => {
                warn!(error = %e, "failed to link categories");
                0
            }
        }
    }

    async fn link_tags(&self, entry_id: &EntryId, tag_ids: &[String]) -> Vec<String> {
        let mut labels = Vec::new();
        for tag_id in tag_ids {
            if let Some(label) = self.cached_tag(tag_id) {
                labels.push(label);
                continue;
            }
            match self.source.fetch_tag(tag_id).await {
                Ok(tag) if !tag.label.is_empty() => {
                    if let Ok(mut cache) = self.tag_cache.lock() {
                        cache.insert(tag_id.clone(), tag.label.clone());
                    }
                    labels.push(tag.label);
                }
                Ok(_) => debug!(%tag_id, "tag has no label, skipping"),
                Err(e) => warn!(%tag_id, error = %e, "failed to resolve tag, skipping"),
            }
        }

        let labels = dedup_preserving_order(&labels);
        if labels.is_empty() {
            return labels;
        }
        match self.store.set_entry_tags(entry_id, &labels).await {
            Ok(()) => labels,
            Err(e) => {
                warn!(error = %e, "failed to set entry tags");
                Vec::new()
            }
        }
    }

    fn cached_tag(&self, tag_id: &str) -> Option<String> {
        self.tag_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(tag_id).cloned())
    }

    /// Rewrites the stored content, which may differ from the converted HTML
    /// once hooks have filtered the entry
    async fn rewrite_content(&self, entry_id: &EntryId) -> (usize, Vec<FailedImage>) {
        let content = match self.store.get_entry(entry_id).await {
            Ok(Some(entry)) => entry.entry.content,
            Ok(None) => {
                warn!(%entry_id, "entry vanished before image rewrite");
                return (0, Vec::new());
            }
            Err(e) => {
                warn!(error = %e, "failed to read entry for image rewrite");
                return (0, Vec::new());
            }
        };

        let outcome = rewrite_images(&content, entry_id, &self.assets).await;
        if outcome.rewritten == 0 {
            return (0, outcome.failed);
        }
        match self.store.update_entry_content(entry_id, &outcome.html).await {
            Ok(()) => (outcome.rewritten, outcome.failed),
            Err(e) => {
                warn!(error = %e, "failed to persist rewritten content");
                (0, outcome.failed)
            }
        }
    }

    async fn import_cover(&self, entry_id: &EntryId, post: &RemotePost) -> Option<AssetId> {
        let url = post.cover_image_url()?;
        let asset = match self.assets.import_by_url(url, entry_id).await {
            Ok(asset) => asset,
            Err(e) => {
                warn!(%url, error = %e, "failed to import cover image");
                return None;
            }
        };
        match self.store.set_primary_image(entry_id, &asset.id).await {
            Ok(()) => Some(asset.id),
            Err(e) => {
                warn!(error = %e, "failed to set featured image");
                None
            }
        }
    }
}

fn parse_published(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => Some(date.with_timezone(&Utc)),
        Err(e) => {
            warn!(%value, error = %e, "unparseable publish date");
            None
        }
    }
}

/// Lowercase ASCII slug; falls back to `fallback` when nothing is left
fn slugify(label: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBlogSource, MockDownloader};
    use crate::storage::{MemoryStore, UploadDir};
    use remote::{CoverImage, CoverMedia};
    use serde_json::json;
    use tempfile::TempDir;

    const MEDIA: &str = "https://static.example.com/media";

    fn category(id: &str, slug: &str) -> RemoteCategory {
        RemoteCategory {
            id: id.to_string(),
            label: slug.to_uppercase(),
            slug: slug.to_string(),
            description: None,
        }
    }

    fn post(id: &str) -> RemotePost {
        RemotePost {
            id: id.to_string(),
            title: format!("Post {id}"),
            first_published_date: Some("2023-05-01T08:30:00.000Z".to_string()),
            content: Some(json!({
                "blocks": [{"text": "Body", "type": "unstyled", "inlineStyleRanges": [], "entityRanges": []}],
                "entityMap": {}
            })),
            ..Default::default()
        }
    }

    fn importer(
        source: MockBlogSource,
        downloader: MockDownloader,
    ) -> (Importer<MockBlogSource, MemoryStore>, Arc<MemoryStore>, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let assets = AssetImporter::new(
            store.clone(),
            UploadDir::new(temp.path(), "http://local/up"),
            Arc::new(downloader),
        );
        let importer = Importer::new(source, store.clone(), assets, RichTextConverter::new(MEDIA));
        (importer, store, temp)
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!", "x"), "hello-world");
        assert_eq!(slugify("  ", "cat-1"), "cat-1");
    }

    #[test]
    fn test_parse_published() {
        let date = parse_published(Some("2023-05-01T08:30:00.000Z")).unwrap();
        assert_eq!(date.timestamp(), 1_682_929_800);
        assert!(parse_published(Some("yesterday")).is_none());
        assert!(parse_published(None).is_none());
    }

    #[tokio::test]
    async fn test_rerun_skips_imported_posts() {
        let source = MockBlogSource::new().with_posts(vec![post("p1")]);
        let (importer, store, _temp) = importer(source, MockDownloader::new());

        let first = importer.import(&PostsQuery::default()).await.unwrap();
        let second = importer.import(&PostsQuery::default()).await.unwrap();

        assert_eq!(first.imported(), 1);
        assert_eq!(second.skipped(), 1);
        assert_eq!(second.posts[0].entry_id(), first.posts[0].entry_id());
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_keep_existing_off_reimports() {
        let source = MockBlogSource::new().with_posts(vec![post("p1")]);
        let (importer, store, _temp) = importer(source, MockDownloader::new());
        let importer = importer.with_options(ImportOptions {
            skip_existing: false,
            ..Default::default()
        });

        importer.import(&PostsQuery::default()).await.unwrap();
        importer.import(&PostsQuery::default()).await.unwrap();
        assert_eq!(store.entry_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_content_fails_only_that_post() {
        let mut bad = post("bad");
        bad.content = Some(json!("{broken"));
        let source = MockBlogSource::new().with_posts(vec![bad, post("good")]);
        let (importer, store, _temp) = importer(source, MockDownloader::new());

        let report = importer.import(&PostsQuery::default()).await.unwrap();
        assert!(matches!(
            report.posts[0].status,
            PostStatus::Failed { stage: PostStage::Convert, .. }
        ));
        assert_eq!(report.imported(), 1);
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_tags_resolved_with_cache() {
        let mut a = post("a");
        a.tag_ids = vec!["t1".to_string(), "missing".to_string()];
        let mut b = post("b");
        b.tag_ids = vec!["t1".to_string()];
        let source = MockBlogSource::new()
            .with_posts(vec![a, b])
            .with_tag("t1", "rust");
        let (importer, store, _temp) = importer(source, MockDownloader::new());

        let report = importer.import(&PostsQuery::default()).await.unwrap();
        let entry_id = report.posts[0].entry_id().unwrap();
        assert_eq!(store.get_entry_tags(entry_id).await.unwrap(), vec!["rust"]);
        assert_eq!(importer.source.tag_calls("t1"), 1);
        assert_eq!(importer.source.tag_calls("missing"), 1);
    }

    #[tokio::test]
    async fn test_cover_image_failure_is_not_fatal() {
        let mut with_cover = post("c");
        with_cover.cover_media = Some(CoverMedia {
            enabled: Some(true),
            image: Some(CoverImage {
                url: Some(format!("{MEDIA}/cover~mv2.jpg")),
                ..Default::default()
            }),
        });
        let source = MockBlogSource::new().with_posts(vec![with_cover]);
        let (importer, store, _temp) = importer(source, MockDownloader::new());

        let report = importer.import(&PostsQuery::default()).await.unwrap();
        match &report.posts[0].status {
            PostStatus::Imported { entry_id, featured_image, .. } => {
                assert!(featured_image.is_none());
                let entry = store.get_entry(entry_id).await.unwrap().unwrap();
                assert!(entry.primary_image.is_none());
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_category_fetch_failure_continues() {
        let mut p = post("p");
        p.category_ids = vec!["c1".to_string()];
        let source = MockBlogSource::new()
            .with_posts(vec![p])
            .with_categories(vec![category("c1", "news")])
            .failing_categories();
        let (importer, store, _temp) = importer(source, MockDownloader::new());

        let report = importer.import(&PostsQuery::default()).await.unwrap();
        assert_eq!(report.aborted_phases, vec![Phase::Categories]);
        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.imported(), 1);
        assert!(store.list_terms(CATEGORY_TAXONOMY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_matched_by_slug_gets_back_reference() {
        let source = MockBlogSource::new().with_categories(vec![category("c1", "news")]);
        let (importer, store, _temp) = importer(source, MockDownloader::new());
        let existing = store
            .create_or_get_term(NewTerm::new(CATEGORY_TAXONOMY, "News", "news"))
            .await
            .unwrap();

        let report = importer.import(&PostsQuery::default()).await.unwrap();
        assert_eq!(report.categories.reused, 1);
        assert_eq!(
            store
                .find_terms_by_meta(CATEGORY_TAXONOMY, EXTERNAL_ID_KEY, "c1")
                .await
                .unwrap(),
            vec![existing.id]
        );
    }

    #[tokio::test]
    async fn test_import_all_walks_pages() {
        let posts: Vec<RemotePost> = (0..5).map(|i| post(&format!("p{i}"))).collect();
        let source = MockBlogSource::new().with_posts(posts).with_page_meta();
        let (importer, store, _temp) = importer(source, MockDownloader::new());

        let report = importer
            .import_all(&PostsQuery::default().with_paging(2, 0))
            .await
            .unwrap();
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.imported(), 5);
        assert_eq!(store.entry_count(), 5);
        let offsets: Vec<u32> = importer
            .source
            .posts_calls()
            .iter()
            .map(|q| q.paging.offset)
            .collect();
        assert_eq!(offsets, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn test_import_all_without_meta_stops_on_short_page() {
        let posts: Vec<RemotePost> = (0..4).map(|i| post(&format!("p{i}"))).collect();
        let source = MockBlogSource::new().with_posts(posts);
        let (importer, _store, _temp) = importer(source, MockDownloader::new());

        let report = importer
            .import_all(&PostsQuery::default().with_paging(2, 0))
            .await
            .unwrap();
        // the third fetch returns an empty page
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.imported(), 4);
    }

    #[tokio::test]
    async fn test_import_all_later_page_failure_is_recorded() {
        let posts: Vec<RemotePost> = (0..4).map(|i| post(&format!("p{i}"))).collect();
        let source = MockBlogSource::new()
            .with_posts(posts)
            .with_page_meta()
            .failing_posts_from(2);
        let (importer, _store, _temp) = importer(source, MockDownloader::new());

        let report = importer
            .import_all(&PostsQuery::default().with_paging(2, 0))
            .await
            .unwrap();
        assert_eq!(report.imported(), 2);
        assert_eq!(report.aborted_phases, vec![Phase::Posts]);
    }

    #[tokio::test]
    async fn test_max_pages_bounds_import_all() {
        let posts: Vec<RemotePost> = (0..6).map(|i| post(&format!("p{i}"))).collect();
        let source = MockBlogSource::new().with_posts(posts).with_page_meta();
        let (importer, _store, _temp) = importer(source, MockDownloader::new());
        let importer = importer.with_options(ImportOptions {
            max_pages: Some(2),
            ..Default::default()
        });

        let report = importer
            .import_all(&PostsQuery::default().with_paging(2, 0))
            .await
            .unwrap();
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.imported(), 4);
    }
}
