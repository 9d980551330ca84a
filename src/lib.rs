//! Positional rich-text document model for a word-processor API simulator.
//!
//! Documents are addressed by a single global character index starting at 1.
//! Batches of insert, delete, and replace-all mutations are applied
//! atomically per document, and the result is persisted as a JSON snapshot
//! in the vendor API's wire shape.

use std::path::Path;
use std::sync::Arc;

pub mod document;
mod error;
mod request;
pub(crate) mod server;
pub(crate) mod settings;
mod store;

pub use document::{Body, Document, IndexUnit};
pub use error::{DocsError, Result};
pub use request::{
    BatchUpdateRequest, BatchUpdateResponse, CreateDocumentRequest, DeleteContentRangeRequest,
    InsertTextRequest, Location, Range, ReplaceAllTextRequest, Request, SubstringMatchCriteria,
};
pub use server::{handle_line, serve};
pub use settings::{discover_settings, load_settings, DocumentSettings, SeedDocument, Settings};
pub use store::{DocumentService, DocumentStorage, MemoryStorage};

/// Build an in-memory service from settings and seed its documents.
///
/// Seed documents that cannot be built or fail validation are skipped with a
/// warning.
pub async fn create_service(
    settings: &Settings,
    settings_dir: &Path,
) -> Arc<DocumentService<MemoryStorage>> {
    let service = DocumentService::with_settings(MemoryStorage::new(), &settings.documents);

    for seed in &settings.seed {
        let Some(document) = seed.to_document(settings_dir, service.index_unit()) else {
            continue;
        };
        if let Err(e) = service.seed(document).await {
            tracing::warn!("skipping seed document '{}': {}", seed.document_id, e);
        }
    }

    Arc::new(service)
}
