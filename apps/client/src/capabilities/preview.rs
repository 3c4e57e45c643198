//! Preview references: short-lived handles that let the page display the
//! selected file before it is analysed.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::workflow::validator::CandidateFile;

/// Handle to a preview held by a `PreviewStore`. Must be revoked when the
/// file it points at is replaced or discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PreviewRef {
    pub id: Uuid,
}

impl PreviewRef {
    pub fn url(&self) -> String {
        format!("/api/v1/preview/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewContent {
    pub media_type: String,
    pub content: Bytes,
}

pub trait PreviewStore: Send + Sync {
    fn create(&self, file: &CandidateFile) -> PreviewRef;
    fn revoke(&self, preview: &PreviewRef);
    fn fetch(&self, id: Uuid) -> Option<PreviewContent>;
}

/// Process-local store. `Bytes` clones share the upload buffer, so a preview
/// costs no copy.
#[derive(Debug, Default)]
pub struct InMemoryPreviewStore {
    entries: Mutex<HashMap<Uuid, PreviewContent>>,
}

impl InMemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreviewStore for InMemoryPreviewStore {
    fn create(&self, file: &CandidateFile) -> PreviewRef {
        let id = Uuid::new_v4();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                PreviewContent {
                    media_type: file.essence(),
                    content: file.content.clone(),
                },
            );
        debug!("Created preview {id} for '{}'", file.name);
        PreviewRef { id }
    }

    fn revoke(&self, preview: &PreviewRef) {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&preview.id);
        if removed.is_some() {
            debug!("Revoked preview {}", preview.id);
        }
    }

    fn fetch(&self, id: Uuid) -> Option<PreviewContent> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}
