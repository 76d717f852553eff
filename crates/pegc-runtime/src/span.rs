use std::fmt::Display;

use serde::Serialize;

/// Byte range into the parsed input.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        debug_assert!(start <= end, "Span start is past its end");
        Self { start, end }
    }
    pub fn at(pos: usize) -> Span {
        Self {
            start: pos,
            end: pos,
        }
    }
    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }
    #[track_caller]
    pub fn as_str(self, src: &str) -> &str {
        &src[self.start..self.end]
    }
    pub fn start(self) -> usize {
        self.start
    }
    pub fn end(self) -> usize {
        self.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[test]
fn test_span() {
    let src = "hello world";
    let span = Span::new(6, 11);
    assert_eq!(span.as_str(src), "world");
    assert_eq!((span.start(), span.end()), (6, 11));
    assert!(Span::at(3).is_empty());
    assert_eq!(span.to_string(), "6..11");
}
