//! `.text-replacer.json` の読み込み
//!
//! 設定ファイルはコーパスと同じく手で編集されるため、コメントと末尾カンマを
//! 許容する。空のファイルは設定なしとして扱う。

use std::path::Path;

use jsonc_parser::ParseOptions;

use super::{
    ConfigError,
    ReplacerSettings,
};

/// 設定ファイル名
pub(super) const CONFIG_FILE_NAME: &str = ".text-replacer.json";

/// ワークスペースルート直下の設定ファイルを読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルを読み込めた
/// - `Ok(None)`: 設定ファイルがない、または中身が空
///
/// # Errors
/// - ファイル読み込みエラー
/// - 構文エラー（[`ConfigError::SyntaxError`]）
/// - 値の型が合わない（[`ConfigError::ParseError`]）
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<ReplacerSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);
    let content = std::fs::read_to_string(&config_path)?;
    parse_settings(&content)
}

/// 設定ファイルの中身を解釈する
fn parse_settings(content: &str) -> Result<Option<ReplacerSettings>, ConfigError> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| ConfigError::SyntaxError(e.to_string()))?;

    match value {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
