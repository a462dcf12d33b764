//! LSP type conversion utilities.

use tower_lsp::lsp_types::{
    DocumentFilter as LspDocumentFilter, Position, Range, TextEdit as LspTextEdit,
};

use fmtbridge_core::{ByteRange, DocumentFilter, TextEdit};

/// Converts a core edit to an LSP edit against `text`.
pub fn to_lsp_edit(edit: &TextEdit, text: &str) -> Option<LspTextEdit> {
    let range = offset_to_range(edit.range.start, edit.range.end, text)?;
    Some(LspTextEdit {
        range,
        new_text: edit.new_text.clone(),
    })
}

pub fn to_lsp_filter(filter: &DocumentFilter) -> LspDocumentFilter {
    LspDocumentFilter {
        language: filter.language.clone(),
        scheme: filter.scheme.clone(),
        pattern: filter.pattern.clone(),
    }
}

/// Converts an LSP range to byte offsets in `text`.
pub fn range_to_byte_range(range: Range, text: &str) -> Option<ByteRange> {
    let start = position_to_offset(range.start, text)?;
    let end = position_to_offset(range.end, text)?;
    if start > end {
        return None;
    }
    Some(ByteRange::new(start, end))
}

/// Converts byte offsets to an LSP range.
pub fn offset_to_range(start: usize, end: usize, text: &str) -> Option<Range> {
    let start_pos = offset_to_position(start, text)?;
    let end_pos = offset_to_position(end, text)?;
    Some(Range::new(start_pos, end_pos))
}

/// Converts a byte offset to an LSP position.
pub fn offset_to_position(offset: usize, text: &str) -> Option<Position> {
    if offset > text.len() {
        return None;
    }

    let mut line = 0u32;
    let mut col = 0u32;
    let mut current_offset = 0;

    for ch in text.chars() {
        if current_offset >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += ch.len_utf16() as u32;
        }

        current_offset += ch.len_utf8();
    }

    Some(Position::new(line, col))
}

/// Converts an LSP position to a byte offset.
///
/// A character past the end of its line clamps to the line end. A line past
/// the end of the text yields `None`.
pub fn position_to_offset(position: Position, text: &str) -> Option<usize> {
    let mut line = 0u32;
    let mut line_start = 0usize;

    if position.line > 0 {
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line += 1;
                if line == position.line {
                    line_start = idx + 1;
                    break;
                }
            }
        }
        if line != position.line {
            return None;
        }
    }

    let mut col = 0u32;
    let mut offset = line_start;
    for ch in text[line_start..].chars() {
        if ch == '\n' || col >= position.character {
            break;
        }
        col += ch.len_utf16() as u32;
        offset += ch.len_utf8();
    }
    Some(offset)
}
