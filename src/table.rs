//! In-memory translation lookup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{
    Arc,
    RwLock,
};

use crate::corpus::{
    Corpus,
    CorpusError,
    load_corpus,
};

/// Mapping from original text (literal or pattern) to translated text.
///
/// Built once from a [`Corpus`] and never mutated afterwards; a reload
/// builds a new table and swaps it into a [`SharedTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    /// original text → translated text
    entries: HashMap<String, String>,
}

impl TranslationTable {
    /// Builds a table from `corpus`. Duplicate keys resolve to the last entry.
    #[must_use]
    pub fn load(corpus: &Corpus) -> Self {
        let entries = corpus
            .iter()
            .map(|entry| (entry.original_text.clone(), entry.translated_text.clone()))
            .collect();
        Self { entries }
    }

    /// Loads the corpus file at `path`.
    ///
    /// A missing or malformed file is not fatal: the condition is logged and
    /// an empty table is returned together with the error, so the caller
    /// keeps running with zero translations.
    pub fn load_from_path(path: &Path) -> (Self, Option<CorpusError>) {
        match load_corpus(path) {
            Ok(loaded) => {
                let table = Self::load(&loaded.corpus);
                tracing::info!(
                    path = %path.display(),
                    translations = table.len(),
                    dropped = loaded.dropped,
                    "Loaded translations"
                );
                (table, None)
            }
            Err(error @ CorpusError::Missing(_)) => {
                tracing::warn!("{error}; continuing without translations");
                (Self::default(), Some(error))
            }
            Err(error) => {
                tracing::error!(path = %path.display(), "Error loading translations: {error}");
                (Self::default(), Some(error))
            }
        }
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide handle to the current table.
///
/// Readers take a snapshot with [`SharedTable::current`] and keep using it
/// for a whole pass, even if a reload swaps in a new table meanwhile.
#[derive(Debug, Clone, Default)]
pub struct SharedTable {
    /// Current table; replaced wholesale, never edited.
    inner: Arc<RwLock<Arc<TranslationTable>>>,
}

impl SharedTable {
    #[must_use]
    pub fn new(table: TranslationTable) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(table))) }
    }

    /// Snapshot of the current table.
    #[must_use]
    pub fn current(&self) -> Arc<TranslationTable> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the current table.
    pub fn replace(&self, table: TranslationTable) {
        let table = Arc::new(table);
        match self.inner.write() {
            Ok(mut guard) => *guard = table,
            Err(poisoned) => *poisoned.into_inner() = table,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::corpus::TranslationEntry;

    #[googletest::test]
    fn load_last_duplicate_wins() {
        let corpus = Corpus::new(vec![
            TranslationEntry::new("Hi", "first"),
            TranslationEntry::new("Hi", "second"),
            TranslationEntry::new("Bye", "Пока"),
        ]);

        let table = TranslationTable::load(&corpus);

        expect_that!(table.len(), eq(2));
        expect_that!(table.lookup("Hi"), some(eq("second")));
        expect_that!(table.lookup("Nope"), none());
    }

    #[googletest::test]
    fn load_from_missing_path_is_empty() {
        let temp_dir = TempDir::new().unwrap();

        let (table, error) = TranslationTable::load_from_path(&temp_dir.path().join("none.json"));

        expect_that!(table.is_empty(), eq(true));
        assert!(matches!(error, Some(CorpusError::Missing(_))));
    }

    #[googletest::test]
    fn load_from_malformed_path_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let (table, error) = TranslationTable::load_from_path(&path);

        expect_that!(table.is_empty(), eq(true));
        assert!(matches!(error, Some(CorpusError::Malformed(_))));
    }

    #[googletest::test]
    fn load_from_valid_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("translations.json");
        fs::write(&path, r#"{"entries": [{"originalText": "Hi", "translatedText": "Hej"}]}"#)
            .unwrap();

        let (table, error) = TranslationTable::load_from_path(&path);

        expect_that!(table.lookup("Hi"), some(eq("Hej")));
        assert!(error.is_none());
    }

    #[googletest::test]
    fn replace_swaps_without_touching_snapshots() {
        let shared = SharedTable::default();
        let before = shared.current();

        shared.replace(TranslationTable::load(&Corpus::new(vec![TranslationEntry::new("a", "b")])));

        let after = shared.current();
        expect_that!(before.is_empty(), eq(true));
        expect_that!(after.lookup("a"), some(eq("b")));
    }
}
