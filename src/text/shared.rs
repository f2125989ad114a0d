//! Thread-safe handle to a [`Document`].

use crate::text::document::Document;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle sharing one document between threads.
///
/// The UI thread edits through [`write`](Self::write) while a background
/// tokenizer reads through [`read`](Self::read) or works on a
/// [`snapshot`](Self::snapshot). Every access holds the lock for the whole
/// closure, so an edit and its history capture are never interleaved with
/// another thread's access.
///
/// ```
/// use gapdoc::{Document, SharedDocument};
///
/// let shared = SharedDocument::new(Document::new());
/// let worker = shared.clone();
/// std::thread::spawn(move || {
///     worker.write(|doc| doc.insert_before("hi", 0, 0)).unwrap();
/// })
/// .join()
/// .unwrap();
/// assert_eq!(shared.read(|doc| doc.text()), "hi");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SharedDocument {
    inner: Arc<Mutex<Document>>,
}

impl SharedDocument {
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(doc)),
        }
    }

    /// Run `f` with shared access to the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access to the document.
    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Detached copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.read(Document::snapshot)
    }
}

impl From<Document> for SharedDocument {
    fn from(doc: Document) -> Self {
        Self::new(doc)
    }
}
