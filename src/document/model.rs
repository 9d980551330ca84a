//! Content model for a positional rich-text document.
//!
//! A [`Body`] is an ordered list of paragraphs, each owning an ordered list of
//! text runs. Every paragraph and run carries a half-open `[startIndex,
//! endIndex)` range in one global index space that starts at 1. Field names
//! follow the emulated vendor API so the types serialize to its wire shape.

use serde::{Deserialize, Serialize};

use super::offset::{contains, Edit, IndexUnit};

/// A document: identity, title, revision token, and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: String,
    pub title: String,
    /// Opaque token that changes whenever the body changes.
    pub revision_id: String,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub content: Vec<StructuralElement>,
}

/// A paragraph and its range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    pub start_index: i64,
    pub end_index: i64,
    pub paragraph: Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub elements: Vec<ParagraphElement>,
}

/// A text run and its range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    pub start_index: i64,
    pub end_index: i64,
    pub text_run: TextRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub content: String,
}

impl ParagraphElement {
    pub fn new(start_index: i64, content: String, unit: IndexUnit) -> Self {
        let end_index = start_index + unit.len(&content);
        Self {
            start_index,
            end_index,
            text_run: TextRun { content },
        }
    }

    fn remap(&mut self, edit: &Edit) {
        self.start_index = edit.remap(self.start_index);
        self.end_index = edit.remap(self.end_index);
    }
}

impl StructuralElement {
    /// A paragraph holding a single run.
    pub fn with_text(start_index: i64, content: String, unit: IndexUnit) -> Self {
        let run = ParagraphElement::new(start_index, content, unit);
        Self {
            start_index,
            end_index: run.end_index,
            paragraph: Paragraph {
                elements: vec![run],
            },
        }
    }

    pub fn runs(&self) -> &[ParagraphElement] {
        &self.paragraph.elements
    }
}

impl Body {
    /// The body of a freshly created document: one paragraph holding `"\n"`.
    pub fn empty() -> Self {
        Self {
            content: vec![StructuralElement::with_text(
                1,
                "\n".to_string(),
                IndexUnit::default(),
            )],
        }
    }

    /// Build a body with one paragraph per line of `text`.
    ///
    /// A trailing newline is appended when missing, so the result always
    /// ends with one.
    pub fn from_text(text: &str, unit: IndexUnit) -> Self {
        let mut text = text.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }

        let mut content = Vec::new();
        let mut start = 1;
        for line in text.split_inclusive('\n') {
            let element = StructuralElement::with_text(start, line.to_string(), unit);
            start = element.end_index;
            content.push(element);
        }

        Self { content }
    }

    /// One past the last valid index.
    pub fn end_index(&self) -> i64 {
        self.content.last().map(|e| e.end_index).unwrap_or(1)
    }

    /// Number of index units in the body, including the trailing newline.
    pub fn total_length(&self) -> i64 {
        self.end_index() - 1
    }

    /// Concatenated content of every run in document order.
    pub fn text(&self) -> String {
        self.runs().map(|run| run.text_run.content.as_str()).collect()
    }

    /// Iterate every run in document order.
    pub fn runs(&self) -> impl Iterator<Item = &ParagraphElement> {
        self.content.iter().flat_map(|e| e.paragraph.elements.iter())
    }

    /// Find the paragraph and run whose half-open range contains `index`.
    pub fn locate(&self, index: i64) -> Option<(usize, usize)> {
        let para = self
            .content
            .iter()
            .position(|e| contains(e.start_index, e.end_index, index))?;
        let run = self.content[para]
            .paragraph
            .elements
            .iter()
            .position(|r| contains(r.start_index, r.end_index, index))?;
        Some((para, run))
    }

    /// Re-thread every paragraph and run boundary through `edit`.
    pub fn remap(&mut self, edit: &Edit) {
        for element in &mut self.content {
            element.start_index = edit.remap(element.start_index);
            element.end_index = edit.remap(element.end_index);
            for run in &mut element.paragraph.elements {
                run.remap(edit);
            }
        }
    }

    /// Drop zero-length runs, then paragraphs left without runs.
    pub fn prune(&mut self) {
        for element in &mut self.content {
            element
                .paragraph
                .elements
                .retain(|r| !r.text_run.content.is_empty());
        }
        self.content.retain(|e| !e.paragraph.elements.is_empty());
    }

    /// Check the body invariants.
    ///
    /// Indices start at 1 and are contiguous with no gaps or overlaps at both
    /// levels, each run's range length equals its content length in `unit`,
    /// no run or paragraph is empty, and the body ends with a newline.
    pub fn validate(&self, unit: IndexUnit) -> Result<(), String> {
        if self.content.is_empty() {
            return Err("body has no content".to_string());
        }

        let mut expected = 1;
        for (i, element) in self.content.iter().enumerate() {
            if element.start_index != expected {
                return Err(format!(
                    "element {} starts at {}, expected {}",
                    i, element.start_index, expected
                ));
            }
            if element.end_index < element.start_index {
                return Err(format!(
                    "element {} ends at {} before it starts at {}",
                    i, element.end_index, element.start_index
                ));
            }
            if element.paragraph.elements.is_empty() {
                return Err(format!("element {} has no text runs", i));
            }

            let mut run_expected = element.start_index;
            for (j, run) in element.paragraph.elements.iter().enumerate() {
                if run.start_index != run_expected {
                    return Err(format!(
                        "run {}.{} starts at {}, expected {}",
                        i, j, run.start_index, run_expected
                    ));
                }
                let len = unit.len(&run.text_run.content);
                if len == 0 {
                    return Err(format!("run {}.{} is empty", i, j));
                }
                if run.end_index.checked_sub(run.start_index) != Some(len) {
                    return Err(format!(
                        "run {}.{} spans [{}, {}) but holds {} units",
                        i, j, run.start_index, run.end_index, len
                    ));
                }
                run_expected = run.end_index;
            }

            if element.end_index != run_expected {
                return Err(format!(
                    "element {} ends at {} but its runs end at {}",
                    i, element.end_index, run_expected
                ));
            }
            expected = element.end_index;
        }

        let ends_with_newline = self
            .runs()
            .last()
            .is_some_and(|r| r.text_run.content.ends_with('\n'));
        if !ends_with_newline {
            return Err("body does not end with a newline".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_shape() {
        let body = Body::empty();
        assert_eq!(body.content.len(), 1);
        assert_eq!(body.content[0].start_index, 1);
        assert_eq!(body.content[0].end_index, 2);
        assert_eq!(body.text(), "\n");
        assert_eq!(body.total_length(), 1);
        assert!(body.validate(IndexUnit::Utf16).is_ok());
    }

    #[test]
    fn from_text_splits_paragraphs() {
        let body = Body::from_text("one\ntwo", IndexUnit::Utf16);
        assert_eq!(body.content.len(), 2);
        assert_eq!(body.content[0].start_index, 1);
        assert_eq!(body.content[0].end_index, 5);
        assert_eq!(body.content[1].start_index, 5);
        assert_eq!(body.content[1].end_index, 9);
        assert_eq!(body.text(), "one\ntwo\n");
        assert!(body.validate(IndexUnit::Utf16).is_ok());
    }

    #[test]
    fn locate_is_half_open() {
        let body = Body::from_text("ab\ncd\n", IndexUnit::Utf16);
        // "ab\n" spans [1, 4), "cd\n" spans [4, 7)
        assert_eq!(body.locate(1), Some((0, 0)));
        assert_eq!(body.locate(3), Some((0, 0)));
        assert_eq!(body.locate(4), Some((1, 0)));
        assert_eq!(body.locate(6), Some((1, 0)));
        assert_eq!(body.locate(7), None);
        assert_eq!(body.locate(0), None);
    }

    #[test]
    fn validate_detects_gap() {
        let mut body = Body::from_text("ab\ncd\n", IndexUnit::Utf16);
        body.content[1].start_index += 1;
        let err = body.validate(IndexUnit::Utf16).unwrap_err();
        assert!(err.contains("element 1 starts at 5"), "{}", err);
    }

    #[test]
    fn validate_detects_length_mismatch() {
        let mut body = Body::from_text("abc", IndexUnit::Utf16);
        body.content[0].paragraph.elements[0].text_run.content = "ab\n".to_string();
        assert!(body.validate(IndexUnit::Utf16).is_err());
    }

    #[test]
    fn validate_requires_trailing_newline() {
        let mut body = Body::from_text("abc", IndexUnit::Utf16);
        let run = &mut body.content[0].paragraph.elements[0];
        run.text_run.content = "abcd".to_string();
        let err = body.validate(IndexUnit::Utf16).unwrap_err();
        assert_eq!(err, "body does not end with a newline");
    }

    #[test]
    fn prune_drops_empty_runs_and_paragraphs() {
        let mut body = Body::from_text("ab\ncd\n", IndexUnit::Utf16);
        body.content[0].paragraph.elements[0].text_run.content.clear();
        body.prune();
        assert_eq!(body.content.len(), 1);
        assert_eq!(body.text(), "cd\n");
    }

    #[test]
    fn serializes_vendor_field_names() {
        let json = serde_json::to_value(Body::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": [{
                    "startIndex": 1,
                    "endIndex": 2,
                    "paragraph": {
                        "elements": [{
                            "startIndex": 1,
                            "endIndex": 2,
                            "textRun": { "content": "\n" }
                        }]
                    }
                }]
            })
        );
    }
}
