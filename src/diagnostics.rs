// ABOUTME: Renders and deduplicates diagnostics against source locations

use crate::error::LithiumError;
use crate::source_map::{Location, Range};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

thread_local! {
    static REPORTED: RefCell<HashSet<(String, usize)>> = RefCell::new(HashSet::new());
    static REPORT_ALL: Cell<bool> = const { Cell::new(false) };
}

/// Disable dedup for the remainder of this run (useful in tests, where
/// the same offending location may be exercised more than once).
pub fn set_report_all(enabled: bool) {
    REPORT_ALL.with(|f| f.set(enabled));
}

/// Forget every previously-reported location. Call between independent
/// compilation units (e.g. between test cases) so dedup does not leak
/// across them.
pub fn reset() {
    REPORTED.with(|r| r.borrow_mut().clear());
}

fn already_reported(loc: &Location) -> bool {
    if REPORT_ALL.with(|f| f.get()) {
        return false;
    }
    let key = (loc.filename.to_string(), loc.offset);
    REPORTED.with(|r| !r.borrow_mut().insert(key))
}

/// Render one diagnostic (`error: file:line:col: message` plus the
/// boxed source-line/squiggle/caret block) and write it to stderr,
/// honoring the dedup policy. Returns whether it was actually printed
/// (false if suppressed as a repeat).
pub fn report(err: &LithiumError) -> bool {
    report_at(err.message(), &err.range().start, err.range())
}

/// As `report`, but with an explicit caret location distinct from the
/// broader squiggle range (mirrors the source's `tokenRangeError` /
/// `locationRangeError` variants, used when the offending token is
/// narrower than the range being highlighted).
pub fn report_at(message: &str, caret: &Location, range: &Range) -> bool {
    if already_reported(caret) {
        return false;
    }

    eprintln!("{}", render(message, caret, range));
    true
}

pub fn render(message: &str, caret: &Location, range: &Range) -> String {
    let (line_no, col_no) = caret.line_and_column();
    let (line, squiggle) = squiggle_line(range);
    let caret_line = caret_column(caret, range);

    format!(
        "error: {}:{}:{}: {}\n│ {}\n│ {}\n│ {}",
        caret.filename, line_no, col_no, message, line, squiggle, caret_line
    )
}

/// Computes the left-trimmed source line and a squiggle string
/// spanning the (column-adjusted-for-trim) offending range.
fn squiggle_line(range: &Range) -> (String, String) {
    let raw_line = range.start.source_line();
    let trimmed: String = raw_line.trim_start().to_string();
    let trim_amount = raw_line.chars().count() - trimmed.chars().count();

    let (start_line, start_col) = range.start.line_and_column();
    let (end_line, end_col) = range.end.line_and_column();

    let mut start = start_col.saturating_sub(1).saturating_sub(trim_amount);
    let mut end = end_col.saturating_sub(1).saturating_sub(trim_amount);

    let line_len = trimmed.chars().count();
    if start_line != end_line {
        end = line_len;
    }
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    start = start.min(line_len);
    end = end.min(line_len);
    if start == end {
        end = (start + 1).min(line_len.max(start + 1));
    }

    let squiggle = format!("{}{}", " ".repeat(start), "~".repeat(end - start));
    (trimmed, squiggle)
}

fn caret_column(caret: &Location, range: &Range) -> String {
    let raw_line = range.start.source_line();
    let trimmed_len = raw_line.trim_start().chars().count();
    let trim_amount = raw_line.chars().count() - trimmed_len;
    let (_, col) = caret.line_and_column();
    let pos = col.saturating_sub(1).saturating_sub(trim_amount).min(trimmed_len);
    format!("{}^", " ".repeat(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn range_in(text: &str, start: usize, end: usize) -> Range {
        let filename: Rc<str> = Rc::from("t.li");
        let text: Rc<str> = Rc::from(text);
        Range::new(
            Location::new(filename.clone(), text.clone(), start),
            Location::new(filename, text, end),
        )
    }

    #[test]
    fn single_point_range_highlights_one_column() {
        let r = range_in("let y = z;", 8, 8);
        let (_, squiggle) = squiggle_line(&r);
        assert_eq!(squiggle.trim_end().len() - squiggle.trim_end().chars().filter(|c| *c == ' ').count(), 1);
    }

    #[test]
    fn dedup_suppresses_repeat_at_same_location() {
        reset();
        let r = range_in("let y = z;", 8, 9);
        assert!(report_at("undefined", &r.start, &r));
        assert!(!report_at("undefined", &r.start, &r));
    }

    #[test]
    fn report_all_disables_dedup() {
        reset();
        set_report_all(true);
        let r = range_in("let y = z;", 8, 9);
        assert!(report_at("undefined", &r.start, &r));
        assert!(report_at("undefined", &r.start, &r));
        set_report_all(false);
    }
}
