//! End-to-end editing scenarios on [`Document`].
//!
//! Run with:
//!   cargo test --test `document_scenarios` -- --nocapture

mod common;

use common::{MS, assert_lines_consistent, init_logging};
use gapdoc::text::GapBuffer;
use gapdoc::{Document, EOF, HighlightSpan, TokenKind};
use tracing::{Level, info, span};

#[test]
fn scenario_insert_into_empty_buffer() {
    init_logging();
    let mut doc = Document::new();
    assert!(doc.insert_before("ab\ncd", 0, 0).unwrap());

    assert_eq!(doc.doc_length(), 6);
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.line(0), "ab\n");
    assert_eq!(doc.line(1), format!("cd{EOF}"));
    assert_lines_consistent(&doc);
}

#[test]
fn scenario_delete_range_and_undo() {
    init_logging();
    let mut doc = Document::with_text("hello").unwrap();
    doc.delete_at(1, 3, 0).unwrap();
    assert_eq!(doc.text(), "ho");

    assert_eq!(doc.undo(), 3);
    assert_eq!(doc.text(), "hello");
    assert!(doc.can_redo());
}

#[test]
fn scenario_typing_coalesces_into_one_undo() {
    init_logging();
    let mut doc = Document::new();
    doc.insert_before("x", 0, 0).unwrap();
    doc.insert_before("y", 1, 200 * MS).unwrap();

    assert_eq!(doc.undo(), -2);
    assert!(doc.is_empty());
    assert!(!doc.can_undo());
}

#[test]
fn scenario_newline_insert_invalidates_line_anchors() {
    init_logging();
    let mut buffer = GapBuffer::with_text("first line\nsecond").unwrap();
    // Warm the cache with an anchor for line 1.
    assert_eq!(buffer.line_offset(1), Some(11));
    assert_eq!(buffer.find_line_number(13), Some(1));
    assert!(buffer.cached_anchors().iter().any(|a| a.line == 1));

    buffer.insert(5, &['\n']).unwrap();
    assert_eq!(buffer.line_count(), 3);
    assert!(buffer.cached_anchors().iter().all(|a| a.offset < 5));

    // A stale (1, 11) anchor would still place offset 13 on line 1.
    assert_eq!(buffer.find_line_number(13), Some(2));
    assert_eq!(buffer.find_line_number(8), Some(1));
    assert_eq!(buffer.line_offset(2), Some(12));
    assert_eq!(buffer.line(1), " line\n");
}

#[test]
fn scenario_newline_insert_through_document() {
    init_logging();
    let mut doc = Document::with_text("let a = 1;\nlet b = 2;").unwrap();
    assert_eq!(doc.find_line_number(15), Some(1));

    doc.insert_before("\n", 4, 0).unwrap();
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.find_line_number(15), Some(2));
    assert_eq!(doc.find_line_number(8), Some(1));
    assert_lines_consistent(&doc);

    doc.undo();
    assert_eq!(doc.line_count(), 2);
    assert_lines_consistent(&doc);
}

#[test]
fn batch_of_inserts_undoes_as_one_step() {
    init_logging();
    let span = span!(Level::INFO, "batch_undo");
    let _enter = span.enter();

    for n in 1..=8 {
        let mut doc = Document::with_text("fn main() {}").unwrap();
        doc.begin_batch_edit();
        for i in 0..n {
            // Spread far apart in time so only the batch keeps them together.
            doc.insert_before("// x\n", 0, i * 10_000 * MS).unwrap();
        }
        doc.end_batch_edit();
        info!(n, len = doc.doc_length(), "batch applied");

        assert!(doc.can_undo());
        doc.undo();
        assert_eq!(doc.text(), "fn main() {}");
        assert!(!doc.can_undo());
    }
}

#[test]
fn nested_batches_close_at_outermost_end() {
    init_logging();
    let mut doc = Document::new();
    doc.begin_batch_edit();
    doc.insert_before("a", 0, 0).unwrap();
    doc.begin_batch_edit();
    doc.insert_before("b", 1, 0).unwrap();
    doc.end_batch_edit();
    assert!(doc.is_batch_edit());
    doc.insert_before("c", 2, 0).unwrap();
    doc.end_batch_edit();
    assert!(!doc.is_batch_edit());

    assert_eq!(doc.undo(), -3);
    assert!(doc.is_empty());
}

#[test]
fn empty_batch_leaves_no_undo_step() {
    init_logging();
    let mut doc = Document::with_text("keep").unwrap();
    doc.begin_batch_edit();
    doc.end_batch_edit();
    assert!(!doc.can_undo());
}

#[test]
fn edit_clears_redo() {
    init_logging();
    let mut doc = Document::new();
    doc.insert_before("one", 0, 0).unwrap();
    doc.undo();
    assert!(doc.can_redo());
    doc.insert_before("two", 0, 0).unwrap();
    assert!(!doc.can_redo());
    assert_eq!(doc.redo(), 0);
}

#[test]
fn redo_restores_post_insert_state() {
    init_logging();
    let mut doc = Document::with_text("abc\ndef").unwrap();
    doc.insert_before("XY\n", 2, 0).unwrap();
    let after = doc.text();
    let lines = doc.line_count();

    doc.undo();
    assert_eq!(doc.text(), "abc\ndef");
    assert_eq!(doc.redo(), 3);
    assert_eq!(doc.text(), after);
    assert_eq!(doc.line_count(), lines);
    assert_eq!(doc.caret_hint(), Some(5));
}

#[test]
fn backspace_run_undoes_in_one_step() {
    init_logging();
    let mut doc = Document::with_text("hello world").unwrap();
    for (i, offset) in (6..11).rev().enumerate() {
        doc.delete_char_at(offset, i as u64 * 50 * MS).unwrap();
    }
    assert_eq!(doc.text(), "hello ");
    assert_eq!(doc.undo(), 5);
    assert_eq!(doc.text(), "hello world");
    assert_eq!(doc.redo(), -5);
    assert_eq!(doc.text(), "hello ");
}

#[test]
fn forward_delete_run_undoes_in_one_step() {
    init_logging();
    let mut doc = Document::with_text("abcdef").unwrap();
    for i in 0..3 {
        doc.delete_char_at(1, i * 50 * MS).unwrap();
    }
    assert_eq!(doc.text(), "aef");
    assert_eq!(doc.undo(), 3);
    assert_eq!(doc.text(), "abcdef");
}

#[test]
fn undo_after_later_edit_replays_snapshot() {
    init_logging();
    let mut doc = Document::with_text("0123456789").unwrap();
    doc.delete_at(2, 3, 0).unwrap();
    // A separate edit moves the gap over the slots the delete left behind.
    doc.insert_before("zz", 4, 5_000 * MS).unwrap();
    assert_eq!(doc.text(), "0156zz789");

    assert_eq!(doc.undo(), -2);
    // The delete now restores from its stored text.
    assert_eq!(doc.undo(), 3);
    assert_eq!(doc.text(), "0123456789");
}

#[test]
fn untracked_shrinking_delete_drops_history() {
    init_logging();
    let mut doc = Document::new();
    doc.insert_before("abc", 0, 0).unwrap();
    assert!(doc.delete_at_with(0, 3, 0, false).unwrap());
    assert!(!doc.can_undo());
    assert_eq!(doc.undo(), 0);
    assert_eq!(doc.redo(), 0);
    assert!(doc.is_empty());
    assert_lines_consistent(&doc);
}

#[test]
fn untracked_delete_over_tracked_insert_drops_history() {
    init_logging();
    let mut doc = Document::with_text("0123456789").unwrap();
    doc.insert_before("a\nb\n", 8, 0).unwrap();
    assert!(doc.delete_at_with(0, 12, 0, false).unwrap());
    assert_eq!(doc.text(), "89");
    assert_eq!(doc.undo(), 0);
    assert_eq!(doc.text(), "89");
    assert_lines_consistent(&doc);
}

#[test]
fn untracked_edit_inside_batch_keeps_batch_open() {
    init_logging();
    let mut doc = Document::with_text("head\ntail").unwrap();
    doc.begin_batch_edit();
    doc.insert_before(">> ", 0, 0).unwrap();
    doc.delete_at_with(0, 7, 0, false).unwrap();
    assert!(doc.is_batch_edit());
    assert!(!doc.can_undo());
    doc.insert_before("# ", 0, 0).unwrap();
    doc.insert_before("!", 3, 0).unwrap();
    doc.end_batch_edit();
    assert_eq!(doc.text(), "# \n!tail");

    assert_eq!(doc.undo(), -3);
    assert_eq!(doc.text(), "\ntail");
    assert!(!doc.can_undo());
    assert_lines_consistent(&doc);
}

#[test]
fn untracked_insert_clears_redo() {
    init_logging();
    let mut doc = Document::with_text("base").unwrap();
    doc.insert_before("+", 4, 0).unwrap();
    doc.undo();
    assert!(doc.can_redo());
    doc.insert_before_with("!", 0, 0, false).unwrap();
    assert!(!doc.can_redo());
    assert_eq!(doc.redo(), 0);
    assert_eq!(doc.text(), "!base");
}

#[test]
fn seek_and_scan_whole_document() {
    init_logging();
    let mut doc = Document::with_text("a\nb").unwrap();
    assert_eq!(doc.seek_char(0), Some(0));
    let mut seen = String::new();
    while doc.has_next() {
        seen.extend(doc.next_char());
    }
    assert_eq!(seen, format!("a\nb{EOF}"));
}

#[test]
fn spans_survive_edits_untouched() {
    init_logging();
    let mut doc = Document::with_text("fn f() {}").unwrap();
    doc.set_spans(vec![
        HighlightSpan::new(0, TokenKind::Keyword),
        HighlightSpan::new(2, TokenKind::Normal),
        HighlightSpan::new(3, TokenKind::Function),
    ]);
    doc.insert_before("pub ", 0, 0).unwrap();
    assert_eq!(doc.spans().len(), 3);
    assert_eq!(doc.token_kind_at(3), TokenKind::Function);
}
