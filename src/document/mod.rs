//! Positional document model.
//!
//! This module provides:
//! - `IndexUnit` and `Edit` for index arithmetic
//! - `Document`, `Body` and friends, the content model
//! - `insert_text`, `delete_content_range`, `replace_all_text` mutations
//! - create / load / snapshot / apply_batch lifecycle functions

mod lifecycle;
mod model;
mod mutation;
mod offset;

pub use lifecycle::{
    apply_batch, create, from_text, load, new_document_id, new_revision_id, snapshot,
};
pub use model::{Body, Document, Paragraph, ParagraphElement, StructuralElement, TextRun};
pub use mutation::{delete_content_range, insert_text, replace_all_text};
pub use offset::{contains, overlap, Edit, IndexUnit};
