//! Source locations
//!
//! Error messages report byte offsets. Line and column travel with every
//! offset so action files and multi-line inputs get readable diagnostics.
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Byte offset with its 1-based line and character column. Orders by offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Position just past `ch`
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self::new(self.offset + 1, self.line + 1, 1),
            _ => Self::new(self.offset + ch.len_utf8(), self.line, self.column + 1),
        }
    }

    pub fn advance_str(self, text: &str) -> Self {
        text.chars().fold(self, Self::advance)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open range `[start, end)` of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "span starts after it ends");
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Zero-width span, used for end of input
    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Smallest span covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

/// A token or node together with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

/// Line table over one source text
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Line and column of a byte offset. Offsets past the end clamp to the
    /// end; offsets inside a multi-byte character snap back to its start.
    pub fn position_at(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }

        let line_index = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line_index];
        let column = self.source[line_start..offset].chars().count();

        Position::new(offset, line_index as u32 + 1, column as u32 + 1)
    }

    /// Text of a 1-based line, without `\n` or `\r\n`
    pub fn line_text(&self, line: u32) -> Option<&'a str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.source.len(), |next| next - 1);

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// `error:` header, location, and the source line with carets under `span`
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut out = format!("error: {}\n  --> {}\n", message, span.start);

        let Some(text) = self.line_text(span.start.line) else {
            return out;
        };

        let gutter = span.start.line.to_string();
        let blank = " ".repeat(gutter.len());
        let indent = span.start.column.saturating_sub(1) as usize;
        let width = if span.start.line == span.end.line {
            span.end.column.saturating_sub(span.start.column) as usize
        } else {
            (text.chars().count() + 1).saturating_sub(indent + 1)
        };

        let _ = writeln!(out, "{} |", blank);
        let _ = writeln!(out, "{} | {}", gutter, text);
        let _ = writeln!(out, "{} | {}{}", blank, " ".repeat(indent), "^".repeat(width.max(1)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance_str("ab\ncé");
        assert_eq!(pos, Position::new(6, 2, 3));
    }

    #[test]
    fn test_span_merge() {
        let name = Span::new(Position::new(5, 1, 6), Position::new(6, 1, 7));
        let close = Span::new(Position::new(8, 1, 9), Position::new(9, 1, 10));

        let call = close.merge(name);
        assert_eq!(call.start, name.start);
        assert_eq!(call.end, close.end);
        assert!(Span::point(Position::start()).is_empty());
    }

    #[test]
    fn test_source_map_positions() {
        let map = SourceMap::new("x := 1\r\ny := 2");
        assert_eq!(map.position_at(0), Position::new(0, 1, 1));
        assert_eq!(map.position_at(8), Position::new(8, 2, 1));
        assert_eq!(map.position_at(99), Position::new(14, 2, 7));
        assert_eq!(map.line_text(1), Some("x := 1"));
        assert_eq!(map.line_text(2), Some("y := 2"));
        assert_eq!(map.line_text(3), None);
        assert_eq!(map.line_text(0), None);
    }

    #[test]
    fn test_position_inside_multibyte_character() {
        let map = SourceMap::new("s := 'é'");
        assert_eq!(map.position_at(7), Position::new(6, 1, 7));
    }

    #[test]
    fn test_format_error_underlines_span() {
        let source = "x := f(a";
        let map = SourceMap::new(source);
        let end = map.position_at(source.len());

        let rendered = map.format_error(&Span::point(end), "expected ')' at position 8");
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "error: expected ')' at position 8");
        assert_eq!(lines[1], "  --> 1:9");
        assert_eq!(lines[3], "1 | x := f(a");
        assert_eq!(lines[4], "  |         ^");
    }
}
