use crate::normalize::ContentDigest;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Digests of every page body seen during one crawl run.
///
/// Clones share the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct DedupRegistry {
    seen: Arc<Mutex<HashSet<ContentDigest>>>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `digest`, returning `true` only for the first caller to present it.
    ///
    /// Presence check and insertion happen under one lock acquisition.
    pub fn check_and_insert(&self, digest: ContentDigest) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.insert(digest)
    }

    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
