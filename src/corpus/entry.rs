use serde::{
    Deserialize,
    Serialize,
};

/// One original → translated pair.
///
/// `original_text` is either a literal observed string or a numeric pattern
/// (see [`crate::pattern::to_pattern`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    pub original_text: String,
    pub translated_text: String,
}

impl TranslationEntry {
    #[must_use]
    pub fn new(original_text: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self { original_text: original_text.into(), translated_text: translated_text.into() }
    }

    /// Entry whose translation echoes its key, ready for a human to fill in.
    #[must_use]
    pub fn untranslated(original_text: impl Into<String>) -> Self {
        let original_text = original_text.into();
        Self { translated_text: original_text.clone(), original_text }
    }

    /// `true` if the translation is still the key itself.
    #[must_use]
    pub fn is_untranslated(&self) -> bool {
        self.original_text == self.translated_text
    }
}

/// Ordered sequence of entries as stored on disk.
///
/// Order carries no meaning for lookups but is kept stable across merges so
/// that the file diffs cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Corpus {
    entries: Vec<TranslationEntry>,
}

impl Corpus {
    #[must_use]
    pub const fn new(entries: Vec<TranslationEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<TranslationEntry> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranslationEntry> {
        self.entries.iter()
    }

    /// Translation stored under `original_text`, last occurrence winning.
    #[must_use]
    pub fn get(&self, original_text: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.original_text == original_text)
            .map(|entry| entry.translated_text.as_str())
    }
}

impl FromIterator<TranslationEntry> for Corpus {
    fn from_iter<I: IntoIterator<Item = TranslationEntry>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a TranslationEntry;
    type IntoIter = std::slice::Iter<'a, TranslationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// On-disk layout of a corpus file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CorpusFormat {
    /// Top-level array of entries.
    #[default]
    Array,
    /// Object with the entries under an `"entries"` field.
    Entries,
}
