//! Persisted translation corpus: entry types, file store and merge logic.

/// Corpus entry and collection types
mod entry;
/// Merging observed strings into a corpus
pub mod merge;
/// Loading and saving corpus files
pub mod store;

pub use entry::{
    Corpus,
    CorpusFormat,
    TranslationEntry,
};
pub use merge::{
    MergeOutcome,
    merge_observed,
};
pub use store::{
    CorpusError,
    LoadedCorpus,
    load_corpus,
    parse_corpus,
    render_corpus,
    save_corpus,
};
