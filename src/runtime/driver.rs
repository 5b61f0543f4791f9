//! Periodic scheduling of scan cycles.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::replacer::{
    ReplacerError,
    TextReplacer,
};
use crate::backend::TranslationBackend;
use crate::host::HostAdapter;

/// Runs a cycle every `scanIntervalMs` until `shutdown` completes.
///
/// Ticks that fall due while a cycle is still running are skipped rather
/// than queued. When `backend` is given, table misses are sent to it.
/// Returns the number of cycles that ran to completion.
pub async fn run_periodic<H, B, F>(
    replacer: &TextReplacer,
    host: &mut H,
    backend: Option<&B>,
    shutdown: F,
) -> usize
where
    H: HostAdapter,
    B: TranslationBackend,
    F: Future<Output = ()>,
{
    let interval = Duration::from_millis(replacer.settings().scan_interval_ms);
    tracing::debug!(?interval, "Starting periodic scan");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut completed = 0;
    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::debug!(completed, "Stopping periodic scan");
                break;
            }
            _ = ticker.tick() => {
                let result = match backend {
                    Some(backend) => replacer.run_cycle_with_backend(host, backend).await,
                    None => replacer.run_cycle(host),
                };
                match result {
                    Ok(_) => completed += 1,
                    Err(ReplacerError::Busy) => {}
                    Err(error) => tracing::warn!("Scan cycle failed: {error}"),
                }
            }
        }
    }

    completed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::Future;

    use tempfile::TempDir;

    use super::*;
    use crate::backend::BackendError;
    use crate::config::ReplacerSettings;
    use crate::host::MemoryHost;
    use crate::test_utils::write_corpus;

    /// Never called; only fixes the backend type parameter.
    struct NoBackend;

    impl TranslationBackend for NoBackend {
        fn translate(
            &self,
            _text: &str,
        ) -> impl Future<Output = Result<String, BackendError>> + Send {
            std::future::ready(Err(BackendError::Status(500)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_until_shutdown() {
        let dir = TempDir::new().unwrap();
        let corpus_path = dir.path().join("translations.json");
        write_corpus(&corpus_path, &[("Start", "Старт")]);
        let settings = ReplacerSettings { scan_interval_ms: 100, ..ReplacerSettings::default() };
        let replacer = TextReplacer::with_paths(
            settings,
            corpus_path,
            dir.path().join("exported.json"),
        );
        let mut host = MemoryHost::new();
        let id = host.push("Start");

        let completed = run_periodic(
            &replacer,
            &mut host,
            None::<&NoBackend>,
            tokio::time::sleep(Duration::from_millis(350)),
        )
        .await;

        assert_eq!(completed, 4);
        assert_eq!(host.text(id), Some("Старт"));
        assert!(!replacer.state().is_busy());
    }
}
