//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Once;

use gapdoc::{Document, LogLevel, set_log_callback};
use tracing::Level;

/// Nanoseconds per millisecond, for readable edit timestamps.
pub const MS: u64 = 1_000_000;

/// Install a test subscriber and route the crate's log callback into it.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_test_writer()
            .try_init();
        set_log_callback(|level, message| match level {
            LogLevel::Debug => tracing::debug!(target: "gapdoc", "{message}"),
            LogLevel::Info => tracing::info!(target: "gapdoc", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "gapdoc", "{message}"),
            LogLevel::Error => tracing::error!(target: "gapdoc", "{message}"),
        });
    });
}

/// Check the line bookkeeping of `doc` against its full text.
pub fn assert_lines_consistent(doc: &Document) {
    let text = doc.text();
    let newlines = text.matches('\n').count();
    assert_eq!(doc.line_count(), newlines + 1, "line count for {text:?}");
    for line in 0..doc.line_count() {
        let offset = doc
            .line_offset(line)
            .unwrap_or_else(|| panic!("line {line} has no offset"));
        assert_eq!(doc.find_line_number(offset), Some(line), "line {line}");
    }
}
