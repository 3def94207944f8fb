//! CatalogLookup port - Read-side view of the content catalog.

use async_trait::async_trait;

use crate::domain::catalog::Content;
use crate::domain::foundation::{ContentId, DomainError};

/// Port for catalog reads.
///
/// Pure request/response; the catalog collaborator owns the records and
/// this core never writes to it.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Fetches a content entry by id.
    async fn get_content(&self, id: &ContentId) -> Result<Option<Content>, DomainError>;
}
