//! Line/column conversion for diagnostics
//!
//! Offsets handed around by the lexer are byte offsets. Diagnostics want
//! 1-based line and column numbers plus the offending source line with a
//! caret under the failing character.

use text_size::TextSize;

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// How columns are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnUnit {
    /// Unicode code points
    #[default]
    Chars,
    /// Raw bytes
    Bytes,
}

/// Maps byte offsets of a text to lines and columns.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset at which each line starts
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, byte)| byte == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, line_starts }
    }

    /// Number of lines in the text
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn clamp(&self, offset: TextSize) -> usize {
        usize::from(offset).min(self.text.len())
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// 0-indexed position of `offset`
    pub fn position(&self, offset: TextSize, unit: ColumnUnit) -> Position {
        let offset = self.clamp(offset);
        let line = self.line_of(offset);
        let start = self.line_starts[line];
        let column = match unit {
            ColumnUnit::Bytes => offset - start,
            ColumnUnit::Chars => self.chars_between(start, offset),
        };
        Position::new(line, column)
    }

    /// Text of the 0-indexed `line`, without its line terminator
    pub fn line_text(&self, line: usize) -> &'a str {
        let Some(&start) = self.line_starts.get(line) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let raw = self.text.get(start..end).unwrap_or("");
        raw.strip_suffix('\r').unwrap_or(raw)
    }

    /// The source line holding `offset` followed by a caret line pointing at it
    pub fn excerpt(&self, offset: TextSize) -> String {
        let offset = self.clamp(offset);
        let line = self.line_of(offset);
        let indent = self.chars_between(self.line_starts[line], offset);
        format!("{}\n{}↑", self.line_text(line), " ".repeat(indent))
    }

    /// The character starting at `offset`, lossily decoded
    pub fn char_at(&self, offset: TextSize) -> String {
        let offset = self.clamp(offset);
        let bytes = &self.text.as_bytes()[offset..];
        let width = bytes.len().min(4);
        String::from_utf8_lossy(&bytes[..width])
            .chars()
            .next()
            .map(String::from)
            .unwrap_or_default()
    }

    fn chars_between(&self, start: usize, end: usize) -> usize {
        match self.text.get(start..end) {
            Some(slice) => slice.chars().count(),
            // `end` sits inside a multi-byte character (byte-oriented lexing)
            None => String::from_utf8_lossy(&self.text.as_bytes()[start..end])
                .chars()
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_line() {
        let index = LineIndex::new("abczdef");
        assert_eq!(
            index.position(TextSize::new(3), ColumnUnit::Chars),
            Position::new(0, 3)
        );
    }

    #[test]
    fn test_position_after_newline() {
        let index = LineIndex::new("ab\ncd\nef");
        assert_eq!(
            index.position(TextSize::new(4), ColumnUnit::Chars),
            Position::new(1, 1)
        );
        assert_eq!(
            index.position(TextSize::new(6), ColumnUnit::Chars),
            Position::new(2, 0)
        );
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_columns_in_chars_and_bytes() {
        let index = LineIndex::new("…ß");
        assert_eq!(index.position(TextSize::new(3), ColumnUnit::Chars).column, 1);
        assert_eq!(index.position(TextSize::new(3), ColumnUnit::Bytes).column, 3);
    }

    #[test]
    fn test_excerpt_points_at_offset() {
        let index = LineIndex::new("abczdef");
        assert_eq!(index.excerpt(TextSize::new(3)), "abczdef\n   ↑");
    }

    #[test]
    fn test_excerpt_uses_single_line() {
        let index = LineIndex::new("first\nsecond line\r\nthird");
        assert_eq!(index.excerpt(TextSize::new(13)), "second line\n       ↑");
    }

    #[test]
    fn test_char_at() {
        let index = LineIndex::new("…ß");
        assert_eq!(index.char_at(TextSize::new(3)), "ß");
        assert_eq!(index.char_at(TextSize::new(5)), "");
    }
}
