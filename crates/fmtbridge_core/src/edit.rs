//! Text edit computation.

use serde::{Deserialize, Serialize};

/// Half-open byte range into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Replacement of `range` in the original text with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: ByteRange,
    pub new_text: String,
}

impl TextEdit {
    /// Applies the edit to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.new_text.len());
        out.push_str(&text[..self.range.start]);
        out.push_str(&self.new_text);
        out.push_str(&text[self.range.end..]);
        out
    }
}

/// Computes the smallest single replacement turning `old` into `new`.
///
/// Returns `None` when the texts are equal. The common prefix and suffix
/// are measured in whole characters, so the range always lies on char
/// boundaries.
pub fn minimal_edit(old: &str, new: &str) -> Option<TextEdit> {
    if old == new {
        return None;
    }

    let prefix: usize = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c.len_utf8())
        .sum();

    let old_rest = &old[prefix..];
    let new_rest = &new[prefix..];
    let suffix: usize = old_rest
        .chars()
        .rev()
        .zip(new_rest.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c.len_utf8())
        .sum();

    Some(TextEdit {
        range: ByteRange::new(prefix, old.len() - suffix),
        new_text: new_rest[..new_rest.len() - suffix].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_identical_text_has_no_edit() {
        assert_eq!(minimal_edit("const a = 1;\n", "const a = 1;\n"), None);
    }

    #[test]
    fn test_replaces_only_the_middle() {
        let edit = minimal_edit("const a=1;\n", "const a = 1;\n").unwrap();
        assert_eq!(edit.range, ByteRange::new(7, 8));
        assert_eq!(edit.new_text, " = ");
    }

    #[rstest]
    #[case("a  \nb", "a\nb\n")]
    #[case("", "x\n")]
    #[case("x\n", "")]
    #[case("héllo wörld", "héllo, wörld")]
    #[case("日本語のテキスト", "日本語 の テキスト")]
    #[case("aaa", "aa")]
    fn test_edit_reproduces_new_text(#[case] old: &str, #[case] new: &str) {
        let edit = minimal_edit(old, new).unwrap();
        assert!(old.is_char_boundary(edit.range.start));
        assert!(old.is_char_boundary(edit.range.end));
        assert_eq!(edit.apply(old), new);
    }
}
