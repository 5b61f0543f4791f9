//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    ReplacerSettings,
    loader,
};

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: ReplacerSettings,

    /// ワークスペースのルートパス
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: ReplacerSettings::default(), workspace_root: None }
    }

    /// 設定を読み込む
    ///
    /// ワークスペースルートは設定ファイルの成否に関わらず保持する。
    /// 読み込みやバリデーションに失敗した場合、設定はデフォルトに戻り、
    /// パスは引き続きワークスペースルート基準で解決される。
    ///
    /// # Arguments
    /// * `workspace_root` - ワークスペースのルートパス
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

        self.workspace_root = workspace_root;
        self.current_settings = ReplacerSettings::default();

        // ワークスペースの設定を読み込み
        let Some(root) = &self.workspace_root else {
            return Ok(());
        };
        let Some(settings) = loader::load_from_workspace(root)? else {
            return Ok(());
        };

        // バリデーション
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        tracing::debug!("Settings loaded successfully: {:?}", settings);
        self.current_settings = settings;

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &ReplacerSettings {
        &self.current_settings
    }

    /// 翻訳テーブルの読み込み元
    #[must_use]
    pub fn corpus_path(&self) -> PathBuf {
        self.resolve(&self.current_settings.corpus_path)
    }

    /// エクスポート先
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.resolve(&self.current_settings.export_path)
    }

    /// 相対パスをワークスペースルート基準で解決する
    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    /// new: デフォルト値で作成される
    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert_eq!(manager.get_settings().corpus_path, "translations.json");
        assert_eq!(manager.corpus_path(), PathBuf::from("translations.json"));
    }

    /// load_settings: workspace_root が None の場合
    #[rstest]
    fn test_load_settings_without_workspace() {
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(None);

        assert!(result.is_ok());
        assert_eq!(manager.corpus_path(), PathBuf::from("translations.json"));
        assert_eq!(manager.export_path(), PathBuf::from("exported_texts.json"));
    }

    /// load_settings: 設定ファイルがある場合
    #[rstest]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"exportPath": "out/corpus.json"}"#;
        fs::write(temp_dir.path().join(loader::CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert_eq!(manager.export_path(), temp_dir.path().join("out/corpus.json"));
        assert_eq!(manager.corpus_path(), temp_dir.path().join("translations.json"));
    }

    /// load_settings: 絶対パスはそのまま使う
    #[rstest]
    fn test_absolute_paths_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let absolute = temp_dir.path().join("elsewhere.json");
        let config_content =
            serde_json::json!({ "corpusPath": absolute.to_string_lossy() }).to_string();
        fs::write(temp_dir.path().join(loader::CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings(Some(temp_dir.path().to_path_buf())).unwrap();

        assert_eq!(manager.corpus_path(), absolute);
    }

    /// load_settings: バリデーションエラー
    #[rstest]
    fn test_load_settings_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(loader::CONFIG_FILE_NAME), r#"{"scanIntervalMs": 0}"#)
            .unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert_eq!(manager.get_settings().scan_interval_ms, 1000);
    }

    /// load_settings: 無効な設定でもパスはワークスペースルート基準のまま
    #[rstest]
    fn test_invalid_config_keeps_workspace_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(loader::CONFIG_FILE_NAME),
            r#"{"exportPath": "out.json", "scanIntervalMs": 0}"#,
        )
        .unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_err());
        assert_eq!(manager.corpus_path(), temp_dir.path().join("translations.json"));
        assert_eq!(manager.export_path(), temp_dir.path().join("exported_texts.json"));
    }

    /// load_settings: 再読み込みで以前の設定が残らない
    #[rstest]
    fn test_reload_after_invalid_config_resets_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(loader::CONFIG_FILE_NAME);
        fs::write(&config_path, r#"{"exportOnCycle": true}"#).unwrap();
        let mut manager = ConfigManager::new();
        manager.load_settings(Some(temp_dir.path().to_path_buf())).unwrap();
        fs::write(&config_path, r#"{"exportOnCycle": true, "corpusPath": ""}"#).unwrap();

        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_err());
        assert!(!manager.get_settings().export_on_cycle);
    }
}
