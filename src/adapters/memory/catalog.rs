//! In-memory catalog lookup.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::catalog::Content;
use crate::domain::foundation::{ContentId, DomainError};
use crate::ports::CatalogLookup;

/// Catalog lookup over a seeded map, for tests and local development.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned.
pub struct InMemoryCatalog {
    contents: RwLock<HashMap<ContentId, Content>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            contents: RwLock::new(HashMap::new()),
        }
    }

    /// Adds or replaces a content entry.
    pub fn seed(&self, content: Content) {
        self.contents
            .write()
            .expect("InMemoryCatalog: lock poisoned")
            .insert(content.id.clone(), content);
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn get_content(&self, id: &ContentId) -> Result<Option<Content>, DomainError> {
        Ok(self
            .contents
            .read()
            .expect("InMemoryCatalog: lock poisoned")
            .get(id)
            .cloned())
    }
}
