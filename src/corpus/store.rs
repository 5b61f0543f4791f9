//! Corpus file loading and saving.
//!
//! Corpus files are edited by hand, so loading is lenient: comments and
//! trailing commas are accepted, and individual records that do not look
//! like entries are skipped instead of failing the whole file. Saving goes
//! through a temporary file in the target directory followed by a rename,
//! so a failed export never leaves a truncated corpus behind.

use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use jsonc_parser::ParseOptions;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::{
    Corpus,
    CorpusFormat,
    TranslationEntry,
};

/// Errors raised while reading or writing a corpus file.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to access corpus file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed corpus: {0}")]
    Malformed(String),

    #[error("Failed to serialize corpus: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to replace corpus file {}: {source}", .path.display())]
    Persist {
        /// Destination that was left untouched.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedCorpus {
    pub corpus: Corpus,
    /// Layout the file was written in.
    pub format: CorpusFormat,
    /// Records skipped because they were not valid entries.
    pub dropped: usize,
}

/// Reads and parses the corpus at `path`.
///
/// # Errors
/// - [`CorpusError::Missing`] if the file does not exist
/// - [`CorpusError::Io`] if it cannot be read
/// - [`CorpusError::Malformed`] if it is not a corpus document at all
pub fn load_corpus(path: &Path) -> Result<LoadedCorpus, CorpusError> {
    if !path.exists() {
        return Err(CorpusError::Missing(path.to_path_buf()));
    }

    tracing::debug!("Loading corpus from: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let loaded = parse_corpus(&content)?;

    if loaded.dropped > 0 {
        tracing::warn!(
            path = %path.display(),
            dropped = loaded.dropped,
            "Skipped malformed corpus records"
        );
    }

    Ok(loaded)
}

/// Parses corpus text in either the array or the `entries` layout.
///
/// An empty document is an empty corpus.
///
/// # Errors
/// Returns [`CorpusError::Malformed`] on a syntax error or when the top-level
/// value is neither an array nor an object with an `entries` array.
pub fn parse_corpus(content: &str) -> Result<LoadedCorpus, CorpusError> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| CorpusError::Malformed(e.to_string()))?;

    let (records, format) = match value {
        None => return Ok(LoadedCorpus::default()),
        Some(Value::Array(records)) => (records, CorpusFormat::Array),
        Some(Value::Object(mut map)) => match map.remove("entries") {
            Some(Value::Array(records)) => (records, CorpusFormat::Entries),
            Some(Value::Null) | None => (Vec::new(), CorpusFormat::Entries),
            Some(_) => {
                return Err(CorpusError::Malformed("`entries` must be an array".to_string()));
            }
        },
        Some(_) => {
            return Err(CorpusError::Malformed(
                "expected an array of entries or an object with an `entries` array".to_string(),
            ));
        }
    };

    let total = records.len();
    let corpus: Corpus = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let entry = entry_from_value(record);
            if entry.is_none() {
                tracing::warn!(index, "Dropping malformed corpus record: {}", record);
            }
            entry
        })
        .collect();
    let dropped = total - corpus.len();

    Ok(LoadedCorpus { corpus, format, dropped })
}

/// Converts one record into an entry, if it has both text fields.
fn entry_from_value(record: &Value) -> Option<TranslationEntry> {
    let original = record.get("originalText")?.as_str()?;
    let translated = record.get("translatedText")?.as_str()?;
    if original.is_empty() {
        return None;
    }
    Some(TranslationEntry::new(original, translated))
}

/// Document shape for [`CorpusFormat::Entries`].
#[derive(Serialize)]
struct EntriesDocument<'a> {
    /// Corpus entries in order.
    entries: &'a [TranslationEntry],
}

/// Renders `corpus` in the given layout, with a trailing newline.
///
/// # Errors
/// Returns [`CorpusError::Serialize`] if serialization fails.
pub fn render_corpus(corpus: &Corpus, format: CorpusFormat) -> Result<String, CorpusError> {
    let mut text = match format {
        CorpusFormat::Array => serde_json::to_string_pretty(corpus)?,
        CorpusFormat::Entries => {
            serde_json::to_string_pretty(&EntriesDocument { entries: corpus.entries() })?
        }
    };
    text.push('\n');
    Ok(text)
}

/// Writes `corpus` to `path`, replacing the previous file in full.
///
/// The content is written to a temporary file next to `path` and renamed
/// over it, so on failure the previous file is left as it was.
///
/// # Errors
/// Returns an error if serialization, the temporary write or the final
/// rename fails.
pub fn save_corpus(path: &Path, corpus: &Corpus, format: CorpusFormat) -> Result<(), CorpusError> {
    let text = render_corpus(corpus, format)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(text.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| CorpusError::Persist { path: path.to_path_buf(), source: e.error })?;

    tracing::debug!(path = %path.display(), entries = corpus.len(), "Corpus written");
    Ok(())
}
