use std::collections::BTreeMap;

use serde::Serialize;

use crate::{span::Span, RcString};

/// One-based line and column, columns count unicode code points.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

impl LineColumn {
    pub const START: LineColumn = LineColumn { line: 1, column: 1 };

    pub const fn new(line: u32, column: u32) -> LineColumn {
        Self { line, column }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<RcString>,
    pub start: Position,
    pub end: Position,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{source}:")?;
        }
        write!(f, "{}:{}", self.start.line, self.start.column)
    }
}

/// Memoized offset to line/column mapping for a single parse.
///
/// Offsets are mostly queried in increasing order, so every computed position becomes an
/// anchor the next query can continue from instead of rescanning from the start.
pub struct PositionCache<'a> {
    src: &'a str,
    source: Option<RcString>,
    cache: BTreeMap<usize, LineColumn>,
}

impl<'a> PositionCache<'a> {
    pub fn new(src: &'a str, source: Option<RcString>) -> PositionCache<'a> {
        let mut cache = BTreeMap::new();
        cache.insert(0, LineColumn::START);
        Self { src, source, cache }
    }

    #[track_caller]
    pub fn line_column(&mut self, offset: usize) -> LineColumn {
        assert!(offset <= self.src.len(), "Offset is past the end of input");

        if let Some(&cached) = self.cache.get(&offset) {
            return cached;
        }

        let (anchor, mut details) = self
            .cache
            .range(..offset)
            .next_back()
            .map(|(&anchor, &details)| (anchor, details))
            .unwrap_or((0, LineColumn::START));

        for ch in self.src[anchor..offset].chars() {
            if ch == '\n' {
                details.line += 1;
                details.column = 1;
            } else {
                details.column += 1;
            }
        }

        self.cache.insert(offset, details);
        details
    }

    pub fn position(&mut self, offset: usize) -> Position {
        let LineColumn { line, column } = self.line_column(offset);
        Position {
            offset,
            line,
            column,
        }
    }

    pub fn location(&mut self, span: Span) -> Location {
        Location {
            source: self.source.clone(),
            start: self.position(span.start()),
            end: self.position(span.end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn reference(src: &str, offset: usize) -> LineColumn {
        let mut details = LineColumn::START;
        for ch in src[..offset].chars() {
            if ch == '\n' {
                details.line += 1;
                details.column = 1;
            } else {
                details.column += 1;
            }
        }
        details
    }

    #[test]
    fn decodes_lines() {
        let mut cache = PositionCache::new("a\nbc", None);
        assert_eq!(cache.line_column(0), LineColumn::new(1, 1));
        assert_eq!(cache.line_column(2), LineColumn::new(2, 1));
        assert_eq!(cache.line_column(3), LineColumn::new(2, 2));
        assert_eq!(cache.line_column(1), LineColumn::new(1, 2));
        assert_eq!(cache.line_column(4), LineColumn::new(2, 3));
    }

    #[test]
    fn out_of_order_queries_match_reference() {
        let src = "first line\nsecond\n\nfourth ünïcode line\nlast";
        let offsets = [31, 3, 41, 11, 0, 18, 17, 25, 11, 5, src.len()];

        let mut cache = PositionCache::new(src, None);
        for offset in offsets {
            assert_eq!(cache.line_column(offset), reference(src, offset), "{offset}");
        }
        for offset in src.char_indices().map(|(i, _)| i).rev() {
            assert_eq!(cache.line_column(offset), reference(src, offset), "{offset}");
        }
    }

    #[test]
    fn stores_only_queried_offsets() {
        let mut cache = PositionCache::new("abc\ndef", None);
        cache.line_column(6);
        assert_eq!(cache.cache.len(), 2);
        cache.line_column(6);
        assert_eq!(cache.cache.len(), 2);
    }

    #[test]
    fn location_carries_source() {
        let mut cache = PositionCache::new("ab\ncd", Some("input.txt".into()));
        let location = cache.location(Span::new(3, 4));
        assert_eq!(location.source.as_deref(), Some("input.txt"));
        assert_eq!(location.start, Position { offset: 3, line: 2, column: 1 });
        assert_eq!(location.end, Position { offset: 4, line: 2, column: 2 });
        assert_eq!(location.to_string(), "input.txt:2:1");
    }
}
