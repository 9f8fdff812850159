//! Boundary traits for the systems the orchestrator drives, plus an in-memory
//! article store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::orchestrator::Orchestrator;
use crate::types::{GenerationOptions, HotelData, PostStatus};

pub type PostId = u64;

pub const META_HQC_SCORE: &str = "_hrs_hqc_score";
pub const META_H_SCORE: &str = "_hrs_hqc_h_score";
pub const META_Q_SCORE: &str = "_hrs_hqc_q_score";
pub const META_C_SCORE: &str = "_hrs_hqc_c_score";
pub const META_HOTEL_NAME: &str = "_hrs_hotel_name";
pub const META_LOCATION: &str = "_hrs_location";

pub const AXIS_META_KEYS: [&str; 3] = [META_H_SCORE, META_Q_SCORE, META_C_SCORE];

// ---------------------------------------------------------------------------
// Inbound collaborators
// ---------------------------------------------------------------------------

pub trait DataCollector: Send + Sync {
    /// `None` when nothing usable was found.
    fn collect_hotel_data(&self, hotel_name: &str, location: &str) -> Option<HotelData>;
}

pub trait PromptEngine: Send + Sync {
    fn build_prompt(&self, hotel: &HotelData, options: &GenerationOptions) -> String;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    pub hotel_name: String,
    pub min_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub issues: Vec<String>,
    improvement_prompt: String,
}

impl ValidationResult {
    pub fn passed() -> Self {
        Self::default()
    }

    pub fn failed(issues: Vec<String>, improvement_prompt: impl Into<String>) -> Self {
        Self {
            issues,
            improvement_prompt: improvement_prompt.into(),
        }
    }

    pub fn requires_regeneration(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn improvement_prompt(&self) -> &str {
        &self.improvement_prompt
    }
}

pub trait ContentValidator: Send + Sync {
    fn validate(&self, content: &str, ctx: &ValidationContext) -> ValidationResult;
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
}

/// Post and post-meta storage. Every write replaces the whole value.
pub trait ArticleStore: Send + Sync {
    fn insert_post(&self, draft: &PostDraft) -> Result<PostId, StoreError>;
    fn set_meta(&self, post_id: PostId, key: &str, value: Value) -> Result<(), StoreError>;
    fn get_meta(&self, post_id: PostId, key: &str) -> Option<Value>;
    fn post_content(&self, post_id: PostId) -> Option<String>;
    fn find_post_by_hotel(&self, hotel_name: &str) -> Option<PostId>;
}

/// Side effects that run after an article is persisted (SEO passes and the
/// like). They run while the generation is still in flight.
pub trait PostSaveHook: Send + Sync {
    fn after_save(&self, post_id: PostId, orchestrator: &Orchestrator);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPost {
    pub draft: PostDraft,
    pub meta: BTreeMap<String, Value>,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: PostId,
    posts: BTreeMap<PostId, StoredPost>,
}

#[derive(Debug, Default)]
pub struct InMemoryArticleStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Storage("store mutex poisoned".to_string()))
    }

    pub fn post(&self, post_id: PostId) -> Option<StoredPost> {
        self.lock().ok()?.posts.get(&post_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.posts.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArticleStore for InMemoryArticleStore {
    fn insert_post(&self, draft: &PostDraft) -> Result<PostId, StoreError> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.posts.insert(
            id,
            StoredPost {
                draft: draft.clone(),
                meta: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    fn set_meta(&self, post_id: PostId, key: &str, value: Value) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let post = inner
            .posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;
        post.meta.insert(key.to_string(), value);
        Ok(())
    }

    fn get_meta(&self, post_id: PostId, key: &str) -> Option<Value> {
        self.lock().ok()?.posts.get(&post_id)?.meta.get(key).cloned()
    }

    fn post_content(&self, post_id: PostId) -> Option<String> {
        self.lock()
            .ok()?
            .posts
            .get(&post_id)
            .map(|p| p.draft.content.clone())
    }

    fn find_post_by_hotel(&self, hotel_name: &str) -> Option<PostId> {
        let inner = self.lock().ok()?;
        inner
            .posts
            .iter()
            .find(|(_, post)| {
                post.meta
                    .get(META_HOTEL_NAME)
                    .and_then(Value::as_str)
                    .is_some_and(|name| name == hotel_name)
            })
            .map(|(id, _)| *id)
    }
}
