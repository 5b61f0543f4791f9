//! Line-oriented host: each stdin line is one text fragment.
//!
//! Reads every line, runs a single replacement cycle over them and writes
//! the resulting lines to stdout. Usage: `text-replacer [WORKSPACE_ROOT]`.

use std::path::PathBuf;
use std::process::ExitCode;

use text_replacer::backend::HttpTranslationBackend;
use text_replacer::config::ConfigManager;
use text_replacer::{
    MemoryHost,
    ReplacerError,
    TextReplacer,
};
use tokio::io::{
    AsyncBufReadExt,
    AsyncWriteExt,
    BufReader,
};

#[tokio::main]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(writer).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, translates stdin and writes stdout.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let workspace_root = match std::env::args_os().nth(1) {
        Some(root) => PathBuf::from(root),
        None => std::env::current_dir()?,
    };

    let mut config_manager = ConfigManager::new();
    if let Err(error) = config_manager.load_settings(Some(workspace_root)) {
        tracing::error!("{error}; using default settings");
    }
    let replacer = TextReplacer::new(&config_manager);

    let mut host = MemoryHost::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        host.push(line);
    }

    let auto_translate = &replacer.settings().auto_translate;
    let report = if auto_translate.enabled {
        let backend = HttpTranslationBackend::from_config(auto_translate)?;
        replacer.run_cycle_with_backend(&mut host, &backend).await
    } else {
        replacer.run_cycle(&mut host)
    };
    match report {
        Ok(report) => tracing::debug!(?report, "Cycle complete"),
        Err(ReplacerError::Busy) => {}
        Err(error) => return Err(error.into()),
    }

    let mut stdout = tokio::io::stdout();
    for fragment in host.fragments() {
        stdout.write_all(fragment.text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;

    Ok(())
}
