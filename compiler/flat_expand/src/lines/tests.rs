use pretty_assertions::assert_eq;

use super::*;

#[test]
fn plain_text_counts_newlines() {
    let text = "a\nb\n\nc";
    let map = LineMap::new();
    assert_eq!(map.line_at(text, 0), 1);
    assert_eq!(map.line_at(text, 2), 2);
    assert_eq!(map.line_at(text, 5), 4);
}

#[test]
fn fixed_runs_report_one_line() {
    // "x\n" is source line 3, the generated block is from line 1, and the
    // tail resumes at source line 7.
    let text = "x\ngen\ngen\ny\nz";
    let mut map = LineMap::new();
    map.source_from(0, 3);
    map.fixed_from(2, 1);
    map.source_from(10, 7);
    assert_eq!(map.line_at(text, 0), 3);
    assert_eq!(map.line_at(text, 2), 1);
    assert_eq!(map.line_at(text, 7), 1);
    assert_eq!(map.line_at(text, 10), 7);
    assert_eq!(map.line_at(text, 12), 8);
}

#[test]
fn spliced_maps_shift_by_their_offset() {
    let mut inner = LineMap::fixed(5);
    inner.source_from(4, 6);
    inner.fixed_from(9, 5);
    let mut map = LineMap::new();
    map.splice(3, &inner);
    let text = "ab\nhead{b\nc};tail";
    assert_eq!(map.line_at(text, 1), 1);
    assert_eq!(map.line_at(text, 3), 5);
    assert_eq!(map.line_at(text, 7), 6);
    assert_eq!(map.line_at(text, 10), 7);
    assert_eq!(map.line_at(text, 13), 5);
}

#[test]
fn cursor_restarts_when_moving_back() {
    let text = "a\nb\nc\nd";
    let map = LineMap::new();
    let mut cursor = LineCursor::new(&map);
    assert_eq!(cursor.at(text.as_bytes(), 6), 4);
    assert_eq!(cursor.at(text.as_bytes(), 2), 2);
    assert_eq!(cursor.at(text.as_bytes(), 4), 3);
}
