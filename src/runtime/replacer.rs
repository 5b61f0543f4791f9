//! The scan-and-replace cycle and corpus export.

use std::collections::HashSet;
use std::path::{
    Path,
    PathBuf,
};
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;

use super::state::{
    CycleGuard,
    ReplacerState,
};
use crate::backend::{
    BackendError,
    TranslationBackend,
};
use crate::config::{
    ConfigManager,
    ReplacerSettings,
};
use crate::corpus::{
    Corpus,
    CorpusError,
    MergeOutcome,
    load_corpus,
    merge_observed,
    save_corpus,
};
use crate::host::{
    FragmentId,
    HostAdapter,
    LiveTextFragment,
};
use crate::matcher::{
    Decision,
    match_text,
};
use crate::pattern::is_translatable;
use crate::table::{
    SharedTable,
    TranslationTable,
};

/// Errors returned by the replacer entry points. None of them is fatal.
#[derive(Error, Debug)]
pub enum ReplacerError {
    /// A previous cycle is still running.
    #[error("A scan cycle is already in progress")]
    Busy,

    #[error("Export failed: {0}")]
    Export(#[from] CorpusError),
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Fragments reported by the host.
    pub scanned: usize,
    /// Fragments skipped because they still show our own output.
    pub already_translated: usize,
    pub direct: usize,
    pub pattern: usize,
    /// Translatable fragments without a table match.
    pub unmatched: usize,
    /// Fragments filled in by the translation backend.
    pub auto_translated: usize,
    /// Backend requests that failed or timed out.
    pub backend_failures: usize,
    /// Backend results dropped because the fragment changed or vanished.
    pub stale: usize,
    /// Export result, when the cycle exported.
    pub export: Option<ExportSummary>,
}

impl CycleReport {
    /// Number of fragments whose text was replaced.
    #[must_use]
    pub const fn replaced(&self) -> usize {
        self.direct + self.pattern + self.auto_translated
    }
}

/// Counts from one export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Entries in the written corpus.
    pub entries: usize,
    pub added: usize,
    pub carried: usize,
    pub absorbed: usize,
}

impl From<&MergeOutcome> for ExportSummary {
    fn from(outcome: &MergeOutcome) -> Self {
        Self {
            entries: outcome.corpus.len(),
            added: outcome.added,
            carried: outcome.carried,
            absorbed: outcome.absorbed,
        }
    }
}

/// Result of the synchronous part of a cycle.
#[derive(Debug, Default)]
struct Pass {
    /// Counters so far.
    report: CycleReport,
    /// Translatable fragments that had no table match.
    unmatched: Vec<LiveTextFragment>,
    /// Texts seen on screen that are not our own output.
    observed: Vec<String>,
}

/// Runtime text replacer.
///
/// Created once per process: construction loads the corpus into the
/// translation table. Handles are cheap to clone and share the same state.
#[derive(Debug, Clone)]
pub struct TextReplacer {
    /// Effective settings.
    settings: ReplacerSettings,
    /// Table source.
    corpus_path: PathBuf,
    /// Merge/export target.
    export_path: PathBuf,
    /// Shared runtime state.
    state: ReplacerState,
}

impl TextReplacer {
    /// Creates a replacer from loaded configuration and loads the table.
    ///
    /// A missing or malformed corpus is reported and leaves the table empty.
    #[must_use]
    pub fn new(config: &ConfigManager) -> Self {
        Self::with_paths(config.get_settings().clone(), config.corpus_path(), config.export_path())
    }

    /// Creates a replacer with explicit paths and loads the table.
    #[must_use]
    pub fn with_paths(settings: ReplacerSettings, corpus_path: PathBuf, export_path: PathBuf) -> Self {
        let (table, _) = TranslationTable::load_from_path(&corpus_path);
        let state = ReplacerState::new(SharedTable::new(table));
        Self { settings, corpus_path, export_path, state }
    }

    #[must_use]
    pub const fn settings(&self) -> &ReplacerSettings {
        &self.settings
    }

    #[must_use]
    pub const fn state(&self) -> &ReplacerState {
        &self.state
    }

    #[must_use]
    pub fn corpus_path(&self) -> &Path {
        &self.corpus_path
    }

    #[must_use]
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Reloads the table from the corpus file and swaps it in.
    ///
    /// Returns the load error, if any; the table is then empty.
    pub fn reload_table(&self) -> Option<CorpusError> {
        let (table, error) = TranslationTable::load_from_path(&self.corpus_path);
        self.state.table.replace(table);
        error
    }

    /// Forgets which fragments were already translated.
    ///
    /// The host calls this when its displayed content is rebuilt, since
    /// fragment ids from before no longer mean anything.
    pub fn reset(&self) {
        let tracked = self.state.processed_count();
        self.state.clear_processed();
        tracing::debug!(tracked, "Replacer reset");
    }

    /// Runs one scan-and-replace cycle against the table.
    ///
    /// # Errors
    /// Returns [`ReplacerError::Busy`] if another cycle is running. Export
    /// failures are logged and do not fail the cycle.
    pub fn run_cycle<H: HostAdapter>(&self, host: &mut H) -> Result<CycleReport, ReplacerError> {
        let _guard = self.begin()?;

        let pass = self.replace_from_table(host);
        Ok(self.finish(pass))
    }

    /// Runs one cycle, asking `backend` for fragments the table misses.
    ///
    /// Requests run concurrently, each bounded by the configured timeout. A
    /// translation is applied only if its fragment still shows the text that
    /// was sent; failed requests are simply tried again next cycle.
    ///
    /// # Errors
    /// Returns [`ReplacerError::Busy`] if another cycle is running.
    pub async fn run_cycle_with_backend<H, B>(
        &self,
        host: &mut H,
        backend: &B,
    ) -> Result<CycleReport, ReplacerError>
    where
        H: HostAdapter,
        B: TranslationBackend,
    {
        let _guard = self.begin()?;

        let mut pass = self.replace_from_table(host);
        let timeout = Duration::from_millis(self.settings.auto_translate.timeout_ms);

        let requests = pass.unmatched.iter().map(|fragment| async move {
            let result = match tokio::time::timeout(timeout, backend.translate(&fragment.text)).await
            {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout(timeout)),
            };
            (fragment, result)
        });
        let responses = join_all(requests).await;

        for (fragment, result) in responses {
            match result {
                Ok(translated) => {
                    if host.fragment_text(fragment.id).as_deref() != Some(fragment.text.as_str()) {
                        tracing::debug!(fragment = %fragment.id, "Fragment changed before translation arrived");
                        pass.report.stale += 1;
                        continue;
                    }
                    if host.apply_text(fragment.id, &translated) {
                        self.state.mark_applied(fragment.id, &translated);
                        pass.report.auto_translated += 1;
                    } else {
                        pass.report.stale += 1;
                    }
                }
                Err(error) => {
                    tracing::warn!(fragment = %fragment.id, text = %fragment.text, "Auto-translation failed: {error}");
                    pass.report.backend_failures += 1;
                }
            }
        }

        Ok(self.finish(pass))
    }

    /// Merges the host's current strings into the export corpus.
    ///
    /// # Errors
    /// See [`TextReplacer::export_observed`].
    pub fn export<H: HostAdapter>(&self, host: &H) -> Result<MergeOutcome, ReplacerError> {
        let observed: Vec<String> = host
            .list_visible_text(self.settings.include_inactive)
            .into_iter()
            .filter(|fragment| !self.state.is_own_output(fragment.id, &fragment.text))
            .map(|fragment| fragment.text)
            .collect();
        self.export_observed(&observed)
    }

    /// Merges `observed` into the export corpus and rewrites it.
    ///
    /// Exports are serialized. Individual malformed records in the current
    /// file are dropped with a warning, but a file that does not parse at
    /// all is left alone rather than overwritten.
    ///
    /// # Errors
    /// Returns [`ReplacerError::Export`] if the current file cannot be read
    /// or parsed, or the new one cannot be written. The previous file is
    /// untouched in every case.
    pub fn export_observed<S: AsRef<str>>(
        &self,
        observed: &[S],
    ) -> Result<MergeOutcome, ReplacerError> {
        let _lock = self.state.lock_export();

        let existing = match load_corpus(&self.export_path) {
            Ok(loaded) => loaded.corpus,
            Err(CorpusError::Missing(_)) => Corpus::default(),
            Err(error) => {
                tracing::error!(path = %self.export_path.display(), "Error reading existing export file: {error}");
                return Err(error.into());
            }
        };

        let outcome = merge_observed(observed.iter().map(AsRef::as_ref), &existing);
        if let Err(error) = save_corpus(&self.export_path, &outcome.corpus, self.settings.corpus_format) {
            tracing::error!(path = %self.export_path.display(), "Error writing export file: {error}");
            return Err(error.into());
        }

        tracing::info!(
            path = %self.export_path.display(),
            entries = outcome.corpus.len(),
            added = outcome.added,
            "Exported unique texts"
        );
        Ok(outcome)
    }

    /// Marks a cycle as running.
    fn begin(&self) -> Result<CycleGuard, ReplacerError> {
        self.state.try_begin().ok_or_else(|| {
            tracing::debug!("Skipping cycle: previous cycle still running");
            ReplacerError::Busy
        })
    }

    /// Applies table translations to every candidate fragment.
    fn replace_from_table<H: HostAdapter>(&self, host: &mut H) -> Pass {
        let table = self.state.table.current();
        let fragments = host.list_visible_text(self.settings.include_inactive);
        if self.settings.include_inactive {
            // Every live fragment is listed, so anything else was destroyed.
            let live: HashSet<FragmentId> = fragments.iter().map(|fragment| fragment.id).collect();
            self.state.retain_processed(&live);
        }
        let mut pass = Pass::default();
        pass.report.scanned = fragments.len();

        for fragment in fragments {
            if self.state.is_own_output(fragment.id, &fragment.text) {
                pass.report.already_translated += 1;
                continue;
            }
            if !is_translatable(&fragment.text) {
                continue;
            }
            pass.observed.push(fragment.text.clone());

            let decision = match_text(&fragment.text, &table);
            let Some(translated) = decision.text() else {
                self.state.forget(fragment.id);
                pass.report.unmatched += 1;
                pass.unmatched.push(fragment);
                continue;
            };

            if host.apply_text(fragment.id, translated) {
                self.state.mark_applied(fragment.id, translated);
                match decision {
                    Decision::Direct(_) => pass.report.direct += 1,
                    Decision::Pattern(_) => pass.report.pattern += 1,
                    Decision::NoMatch => {}
                }
            }
        }

        pass
    }

    /// Runs the optional per-cycle export and logs the outcome.
    fn finish(&self, mut pass: Pass) -> CycleReport {
        if self.settings.export_on_cycle {
            pass.report.export =
                self.export_observed(&pass.observed).ok().map(|outcome| ExportSummary::from(&outcome));
        }

        let report = pass.report;
        if report.replaced() > 0 {
            tracing::info!("Replaced {} text elements", report.replaced());
        }
        tracing::debug!(?report, "Cycle finished");
        report
    }
}
