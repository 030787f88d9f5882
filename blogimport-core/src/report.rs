//! Outcome of an import run

use serde::Serialize;

use crate::rewrite::FailedImage;
use crate::storage::{AssetId, EntryId};

/// Furthest point an import run reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Start,
    CategoriesImported,
    PostsFetched,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Categories,
    Posts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub created: usize,
    pub reused: usize,
    pub failed: usize,
}

/// Per-post step a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStage {
    Lookup,
    Convert,
    CreateEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyImported { entry_id: EntryId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostStatus {
    Imported {
        entry_id: EntryId,
        terms_linked: usize,
        tags: Vec<String>,
        images_rewritten: usize,
        images_failed: Vec<FailedImage>,
        featured_image: Option<AssetId>,
    },
    Skipped {
        #[serde(flatten)]
        reason: SkipReason,
    },
    Failed {
        stage: PostStage,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostOutcome {
    pub remote_id: String,
    pub title: String,
    #[serde(flatten)]
    pub status: PostStatus,
}

impl PostOutcome {
    pub fn entry_id(&self) -> Option<&EntryId> {
        match &self.status {
            PostStatus::Imported { entry_id, .. } => Some(entry_id),
            PostStatus::Skipped {
                reason: SkipReason::AlreadyImported { entry_id },
            } => Some(entry_id),
            PostStatus::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub state: RunState,
    pub aborted_phases: Vec<Phase>,
    pub categories: CategoryStats,
    pub posts: Vec<PostOutcome>,
    pub pages_fetched: usize,
}

impl ImportReport {
    pub(crate) fn advance(&mut self, state: RunState) {
        if state > self.state {
            self.state = state;
        }
    }

    pub(crate) fn abort(&mut self, phase: Phase) {
        if !self.aborted_phases.contains(&phase) {
            self.aborted_phases.push(phase);
        }
    }

    pub fn imported(&self) -> usize {
        self.count(|s| matches!(s, PostStatus::Imported { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, PostStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, PostStatus::Failed { .. }))
    }

    pub fn images_rewritten(&self) -> usize {
        self.posts
            .iter()
            .map(|p| match &p.status {
                PostStatus::Imported { images_rewritten, .. } => *images_rewritten,
                _ => 0,
            })
            .sum()
    }

    pub fn images_failed(&self) -> usize {
        self.posts
            .iter()
            .map(|p| match &p.status {
                PostStatus::Imported { images_failed, .. } => images_failed.len(),
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&PostStatus) -> bool) -> usize {
        self.posts.iter().filter(|p| pred(&p.status)).count()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} imported, {} skipped, {} failed; categories: {} created, {} reused, {} failed; images: {} rewritten, {} failed",
            self.imported(),
            self.skipped(),
            self.failed(),
            self.categories.created,
            self.categories.reused,
            self.categories.failed,
            self.images_rewritten(),
            self.images_failed(),
        );
        if !self.aborted_phases.is_empty() {
            let phases: Vec<&str> = self
                .aborted_phases
                .iter()
                .map(|p| match p {
                    Phase::Categories => "categories",
                    Phase::Posts => "posts",
                })
                .collect();
            line.push_str(&format!("; aborted: {}", phases.join(", ")));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: PostStatus) -> PostOutcome {
        PostOutcome {
            remote_id: "p".to_string(),
            title: "T".to_string(),
            status,
        }
    }

    #[test]
    fn test_state_only_advances() {
        let mut report = ImportReport::default();
        report.advance(RunState::PostsFetched);
        report.advance(RunState::CategoriesImported);
        assert_eq!(report.state, RunState::PostsFetched);
    }

    #[test]
    fn test_counts_and_summary() {
        let mut report = ImportReport::default();
        report.posts.push(outcome(PostStatus::Imported {
            entry_id: EntryId::from_string("e1"),
            terms_linked: 1,
            tags: vec![],
            images_rewritten: 2,
            images_failed: vec![FailedImage {
                url: "u".to_string(),
                error: "404".to_string(),
            }],
            featured_image: None,
        }));
        report.posts.push(outcome(PostStatus::Failed {
            stage: PostStage::Convert,
            error: "bad".to_string(),
        }));
        report.abort(Phase::Categories);
        report.abort(Phase::Categories);

        assert_eq!(report.imported(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.images_rewritten(), 2);
        assert_eq!(report.aborted_phases, vec![Phase::Categories]);
        assert!(report.summary().ends_with("; aborted: categories"));
    }

    #[test]
    fn test_report_serializes_flat_statuses() {
        let skipped = outcome(PostStatus::Skipped {
            reason: SkipReason::AlreadyImported {
                entry_id: EntryId::from_string("e9"),
            },
        });
        let value = serde_json::to_value(&skipped).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["reason"], "already_imported");
        assert_eq!(value["entry_id"], "e9");
        assert_eq!(skipped.entry_id(), Some(&EntryId::from_string("e9")));
    }
}
