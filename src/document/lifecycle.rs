//! Document creation, snapshot load/save, and atomic batch application.

use uuid::Uuid;

use crate::error::{DocsError, Result};
use crate::request::Request;

use super::model::{Body, Document};
use super::mutation::{delete_content_range, insert_text, replace_all_text};
use super::offset::IndexUnit;

/// 32 lowercase hex characters.
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 16 lowercase hex characters.
pub fn new_revision_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

/// Create an empty document with fresh identifiers.
pub fn create(title: &str) -> Document {
    Document {
        document_id: new_document_id(),
        title: title.to_string(),
        revision_id: new_revision_id(),
        body: Body::empty(),
    }
}

/// Build a document from plain text, one paragraph per line.
pub fn from_text(
    document_id: impl Into<String>,
    title: impl Into<String>,
    revision_id: impl Into<String>,
    text: &str,
    unit: IndexUnit,
) -> Document {
    Document {
        document_id: document_id.into(),
        title: title.into(),
        revision_id: revision_id.into(),
        body: Body::from_text(text, unit),
    }
}

/// Decode a snapshot and check the body invariants.
pub fn load(snapshot: &[u8], unit: IndexUnit) -> Result<Document> {
    let document: Document = serde_json::from_slice(snapshot)?;
    document
        .body
        .validate(unit)
        .map_err(|e| DocsError::CorruptSnapshot(format!("{}: {}", document.document_id, e)))?;
    Ok(document)
}

/// Encode a document for storage.
pub fn snapshot(document: &Document) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(document)?)
}

/// Apply one mutation to `body`.
fn apply_request(body: &mut Body, request: &Request, unit: IndexUnit) -> Result<()> {
    match request {
        Request::InsertText(req) => insert_text(body, req.location.index, &req.text, unit),
        Request::DeleteContentRange(req) => {
            delete_content_range(body, req.range.start_index, req.range.end_index, unit)
        }
        Request::ReplaceAllText(req) => {
            let occurrences = replace_all_text(
                body,
                &req.contains_text.text,
                &req.replace_text,
                req.contains_text.match_case,
                unit,
            )?;
            tracing::debug!(
                "replaceAllText {:?} changed {} occurrences",
                req.contains_text.text,
                occurrences
            );
            Ok(())
        }
    }
}

/// Apply `requests` in order and return the resulting document.
///
/// Works on a copy: if any request fails, `document` is untouched and the
/// error is returned. The revision id is regenerated when the body changed.
pub fn apply_batch(document: &Document, requests: &[Request], unit: IndexUnit) -> Result<Document> {
    let mut body = document.body.clone();

    for (i, request) in requests.iter().enumerate() {
        apply_request(&mut body, request, unit).map_err(|e| {
            tracing::debug!("request {} ({}) rejected: {}", i, request.kind(), e);
            e
        })?;
        body.validate(unit).map_err(|e| {
            DocsError::CorruptSnapshot(format!(
                "request {} ({}) produced an invalid body: {}",
                i,
                request.kind(),
                e
            ))
        })?;
    }

    let revision_id = if body == document.body {
        document.revision_id.clone()
    } else {
        new_revision_id()
    };

    Ok(Document {
        document_id: document.document_id.clone(),
        title: document.title.clone(),
        revision_id,
        body,
    })
}
