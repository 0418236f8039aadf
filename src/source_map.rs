// ABOUTME: Source text storage plus byte-offset to line/column resolution

use std::fmt;
use std::rc::Rc;

/// A location within a single loaded source: the text that owns it
/// and a byte offset into that text.
#[derive(Debug, Clone)]
pub struct Location {
    pub filename: Rc<str>,
    pub text: Rc<str>,
    pub offset: usize,
}

impl Location {
    pub fn new(filename: Rc<str>, text: Rc<str>, offset: usize) -> Self {
        Location {
            filename,
            text,
            offset,
        }
    }

    /// 1-based (line, column), computed by scanning from the start of
    /// the buffer. Empty input yields (1, 1).
    pub fn line_and_column(&self) -> (usize, usize) {
        let mut line = 1usize;
        let mut column = 1usize;
        for ch in self.text.chars().take(self.offset) {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    /// The full source line containing this location, without the
    /// trailing newline.
    pub fn source_line(&self) -> &str {
        let bytes = self.text.as_bytes();
        let mut start = self.offset.min(bytes.len());
        while start > 0 && bytes[start - 1] != b'\n' {
            start -= 1;
        }
        let mut end = self.offset.min(bytes.len());
        while end < bytes.len() && bytes[end] != b'\n' {
            end += 1;
        }
        &self.text[start..end]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.line_and_column();
        write!(f, "{}:{}:{}", self.filename, line, col)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.filename == other.filename && self.offset == other.offset
    }
}
impl Eq for Location {}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.filename.as_ref(), self.offset).cmp(&(other.filename.as_ref(), other.offset))
    }
}

/// An ordered pair of locations in the same source; invariant:
/// `start.offset <= end.offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: Location,
    pub end: Location,
}

impl Range {
    pub fn new(start: Location, end: Location) -> Self {
        Range { start, end }
    }

    /// Combine two ranges into one spanning from the first's start to
    /// the second's end.
    pub fn enclosing(left: &Range, right: &Range) -> Range {
        Range::new(left.start.clone(), right.end.clone())
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(text: &str, offset: usize) -> Location {
        Location::new(Rc::from("test.li"), Rc::from(text), offset)
    }

    #[test]
    fn empty_source_is_line_one_col_one() {
        let l = loc("", 0);
        assert_eq!(l.line_and_column(), (1, 1));
    }

    #[test]
    fn counts_newlines_for_line_number() {
        let text = "a\nbc\nd";
        let l = loc(text, 5); // 'd'
        assert_eq!(l.line_and_column(), (3, 1));
    }

    #[test]
    fn source_line_extracts_enclosing_line() {
        let text = "first\nsecond line\nthird";
        let l = loc(text, 10); // inside "second line"
        assert_eq!(l.source_line(), "second line");
    }
}
