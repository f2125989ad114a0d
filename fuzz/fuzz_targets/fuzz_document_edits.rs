//! Fuzz target for document editing.
//!
//! Replays arbitrary edit scripts against a `String` model and checks that
//! content, line count, and full undo stay consistent. Non-undoable edits
//! drop the history, so full undo lands on the text after the last one.

#![no_main]

use arbitrary::Arbitrary;
use gapdoc::{Document, DocumentOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { at: u16, text: String, dt: u16 },
    Delete { at: u16, count: u8, dt: u16 },
    UntrackedInsert { at: u16, text: String },
    UntrackedDelete { at: u16, count: u8 },
    Undo,
    Redo,
    BeginBatch,
    EndBatch,
    Commit,
}

#[derive(Arbitrary, Debug)]
struct Script {
    initial: String,
    min_gap: u8,
    ops: Vec<Op>,
}

fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map_or(s.len(), |(i, _)| i)
}

fuzz_target!(|script: Script| {
    let initial: String = script.initial.chars().filter(|&c| c != gapdoc::EOF).collect();
    let options = DocumentOptions::default().min_gap(usize::from(script.min_gap));
    let mut doc = Document::with_options(options);
    if doc.load(&initial, gapdoc::SourceFormat::default()).is_err() {
        return;
    }

    // Follows plain edits; resynced after undo/redo.
    let mut model = initial.clone();
    let mut baseline = initial;
    let mut ts = 0u64;

    for op in script.ops.into_iter().take(256) {
        match op {
            Op::Insert { at, text, dt } => {
                ts += u64::from(dt) * 1_000_000;
                let at = usize::from(at) % doc.doc_length();
                if doc.insert_before(&text, at, ts).unwrap_or(false) {
                    model.insert_str(byte_index(&model, at), &text);
                }
            }
            Op::Delete { at, count, dt } => {
                ts += u64::from(dt) * 1_000_000;
                let at = usize::from(at) % doc.doc_length();
                let count = usize::from(count);
                if doc.delete_at(at, count, ts).unwrap_or(false) {
                    let start = byte_index(&model, at);
                    let end = byte_index(&model, at + count);
                    model.replace_range(start..end, "");
                }
            }
            Op::UntrackedInsert { at, text } => {
                let at = usize::from(at) % doc.doc_length();
                if doc.insert_before_with(&text, at, ts, false).unwrap_or(false) {
                    model.insert_str(byte_index(&model, at), &text);
                    baseline = model.clone();
                }
            }
            Op::UntrackedDelete { at, count } => {
                let at = usize::from(at) % doc.doc_length();
                let count = usize::from(count);
                if doc.delete_at_with(at, count, ts, false).unwrap_or(false) {
                    let start = byte_index(&model, at);
                    let end = byte_index(&model, at + count);
                    model.replace_range(start..end, "");
                    baseline = model.clone();
                }
            }
            Op::Undo => {
                let len = doc.doc_length() as isize;
                let delta = doc.undo();
                assert_eq!(doc.doc_length() as isize, len + delta);
                model = doc.text();
            }
            Op::Redo => {
                let len = doc.doc_length() as isize;
                let delta = doc.redo();
                assert_eq!(doc.doc_length() as isize, len + delta);
                model = doc.text();
            }
            Op::BeginBatch => doc.begin_batch_edit(),
            Op::EndBatch => doc.end_batch_edit(),
            Op::Commit => doc.commit(),
        }

        assert_eq!(doc.text(), model);
        assert_eq!(doc.line_count(), model.matches('\n').count() + 1);
    }

    while doc.can_undo() {
        doc.undo();
    }
    assert_eq!(doc.text(), baseline);
    assert_eq!(doc.line_count(), baseline.matches('\n').count() + 1);
});
