//! Wire types for batch updates.
//!
//! Shapes and field names mirror the emulated vendor API.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// A single mutation in a batch. Exactly one kind per request object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertTextRequest),
    DeleteContentRange(DeleteContentRangeRequest),
    ReplaceAllText(ReplaceAllTextRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertTextRequest {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteContentRangeRequest {
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllTextRequest {
    pub contains_text: SubstringMatchCriteria,
    #[serde(default)]
    pub replace_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatchCriteria {
    pub text: String,
    #[serde(default)]
    pub match_case: bool,
}

impl Request {
    pub fn insert_text(index: i64, text: impl Into<String>) -> Self {
        Request::InsertText(InsertTextRequest {
            location: Location { index },
            text: text.into(),
        })
    }

    pub fn delete_content_range(start_index: i64, end_index: i64) -> Self {
        Request::DeleteContentRange(DeleteContentRangeRequest {
            range: Range {
                start_index,
                end_index,
            },
        })
    }

    pub fn replace_all_text(
        find: impl Into<String>,
        replace: impl Into<String>,
        match_case: bool,
    ) -> Self {
        Request::ReplaceAllText(ReplaceAllTextRequest {
            contains_text: SubstringMatchCriteria {
                text: find.into(),
                match_case,
            },
            replace_text: replace.into(),
        })
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::InsertText(_) => "insertText",
            Request::DeleteContentRange(_) => "deleteContentRange",
            Request::ReplaceAllText(_) => "replaceAllText",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdateRequest {
    #[serde(default)]
    pub requests: Vec<Request>,
}

/// Response to a batch update. Replies are always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    pub document_id: String,
    pub replies: Vec<serde_json::Value>,
}

impl BatchUpdateResponse {
    pub fn for_document(document: &Document) -> Self {
        Self {
            document_id: document.document_id.clone(),
            replies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    #[serde(default)]
    pub title: String,
}
