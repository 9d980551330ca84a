//! Insert, delete, and replace-all mutations over a [`Body`].
//!
//! Each mutation edits run content locally, then re-threads every paragraph
//! and run boundary through a single [`Edit`] so that nothing downstream keeps
//! a stale index. Range checks run before any content is touched. A
//! replace-all that fails its trailing-newline check has already edited the
//! body, so callers apply mutations to a scratch copy and discard it on error.

use std::ops::Range;

use regex::RegexBuilder;

use crate::error::{DocsError, Result};

use super::model::Body;
use super::offset::{overlap, Edit, IndexUnit};

/// Insert `text` so the character previously at `index` begins at
/// `index + len(text)`.
pub fn insert_text(body: &mut Body, index: i64, text: &str, unit: IndexUnit) -> Result<()> {
    if text.is_empty() {
        return Err(DocsError::MalformedRequest(
            "insertText requires non-empty text".to_string(),
        ));
    }

    let total = body.total_length();
    if index < 1 || index > total {
        return Err(DocsError::InvalidRange(format!(
            "insert index {} outside [1, {}]",
            index, total
        )));
    }

    let (para, run) = body
        .locate(index)
        .ok_or_else(|| DocsError::InvalidRange(format!("no text run contains index {}", index)))?;

    let run = &mut body.content[para].paragraph.elements[run];
    let byte = unit
        .byte_offset(&run.text_run.content, index - run.start_index)
        .ok_or_else(|| {
            DocsError::InvalidRange(format!("insert index {} splits a character", index))
        })?;
    run.text_run.content.insert_str(byte, text);

    body.remap(&Edit::insert(index, unit.len(text)));
    Ok(())
}

/// Remove the characters in `[start, end)`.
///
/// The body's final newline is never deletable. Runs and paragraphs emptied
/// by the deletion are dropped.
pub fn delete_content_range(body: &mut Body, start: i64, end: i64, unit: IndexUnit) -> Result<()> {
    if start >= end {
        return Err(DocsError::InvalidRange(format!(
            "delete range [{}, {}) is empty or inverted",
            start, end
        )));
    }

    let total = body.total_length();
    if start < 1 || end > total + 1 {
        return Err(DocsError::InvalidRange(format!(
            "delete range [{}, {}) outside [1, {})",
            start,
            end,
            total + 1
        )));
    }
    if end > total {
        return Err(DocsError::InvalidRange(
            "cannot delete the final newline of the document".to_string(),
        ));
    }

    // Resolve every cut to byte offsets before mutating anything.
    let mut cuts: Vec<(usize, usize, Range<usize>)> = Vec::new();
    for (i, element) in body.content.iter().enumerate() {
        if overlap(element.start_index, element.end_index, start, end).is_none() {
            continue;
        }
        for (j, run) in element.paragraph.elements.iter().enumerate() {
            let Some((from, to)) = overlap(run.start_index, run.end_index, start, end) else {
                continue;
            };
            let content = &run.text_run.content;
            let byte_range = unit
                .byte_offset(content, from - run.start_index)
                .zip(unit.byte_offset(content, to - run.start_index))
                .ok_or_else(|| {
                    DocsError::InvalidRange(format!(
                        "delete range [{}, {}) splits a character",
                        start, end
                    ))
                })?;
            cuts.push((i, j, byte_range.0..byte_range.1));
        }
    }

    for (i, j, bytes) in cuts {
        body.content[i].paragraph.elements[j]
            .text_run
            .content
            .replace_range(bytes, "");
    }

    body.remap(&Edit::delete(start, end));
    body.prune();
    Ok(())
}

/// Replace every non-overlapping occurrence of `find` with `replace`.
///
/// Matches are found within a single run's content; text spanning a run
/// boundary is not matched. Returns the number of occurrences replaced.
pub fn replace_all_text(
    body: &mut Body,
    find: &str,
    replace: &str,
    match_case: bool,
    unit: IndexUnit,
) -> Result<usize> {
    if find.is_empty() {
        return Err(DocsError::MalformedRequest(
            "replaceAllText requires non-empty search text".to_string(),
        ));
    }

    let pattern = RegexBuilder::new(&regex::escape(find))
        .case_insensitive(!match_case)
        .build()
        .map_err(|e| DocsError::MalformedRequest(e.to_string()))?;
    let replace_len = unit.len(replace);

    let mut occurrences = 0;
    for i in 0..body.content.len() {
        for j in 0..body.content[i].paragraph.elements.len() {
            let run = &body.content[i].paragraph.elements[j];
            let original = run.text_run.content.clone();
            let run_start = run.start_index;

            let mut rebuilt = String::with_capacity(original.len());
            let mut cursor = 0;
            let mut changed = false;
            for m in pattern.find_iter(&original) {
                rebuilt.push_str(&original[cursor..m.start()]);
                let at = run_start + unit.len(&rebuilt);
                // Re-thread after each occurrence so later matches see current indices.
                body.remap(&Edit::replace(at, at + unit.len(m.as_str()), replace_len));
                rebuilt.push_str(replace);
                cursor = m.end();
                occurrences += 1;
                changed = true;
            }

            if changed {
                rebuilt.push_str(&original[cursor..]);
                body.content[i].paragraph.elements[j].text_run.content = rebuilt;
            }
        }
    }

    body.prune();
    let ends_with_newline = body
        .runs()
        .last()
        .is_some_and(|r| r.text_run.content.ends_with('\n'));
    if !ends_with_newline {
        return Err(DocsError::InvalidRange(
            "replacement would remove the final newline of the document".to_string(),
        ));
    }

    Ok(occurrences)
}
