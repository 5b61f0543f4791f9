use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::corpus::CorpusFormat;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "autoTranslate.endpoint")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration syntax: {0}")]
    SyntaxError(String),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplacerSettings {
    /// Corpus the translation table is loaded from.
    /// Relative paths resolve against the workspace root.
    pub corpus_path: String,

    /// Corpus that observed strings are merged into on export.
    pub export_path: String,

    /// Layout used when writing the export corpus.
    pub corpus_format: CorpusFormat,

    /// Also translate and export fragments the host reports as hidden.
    pub include_inactive: bool,

    pub scan_interval_ms: u64,

    /// Merge observed strings into the export corpus after every cycle.
    pub export_on_cycle: bool,

    pub auto_translate: AutoTranslateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoTranslateConfig {
    pub enabled: bool,

    /// Full URL of a LibreTranslate-compatible `translate` endpoint.
    pub endpoint: String,

    pub source_language: String,
    pub target_language: String,

    /// Per-request timeout.
    pub timeout_ms: u64,

    pub api_key: Option<String>,
}

impl Default for AutoTranslateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:5000/translate".to_string(),
            source_language: "en".to_string(),
            target_language: String::new(),
            timeout_ms: 5000,
            api_key: None,
        }
    }
}

impl Default for ReplacerSettings {
    fn default() -> Self {
        Self {
            corpus_path: "translations.json".to_string(),
            export_path: "exported_texts.json".to_string(),
            corpus_format: CorpusFormat::default(),
            include_inactive: true,
            scan_interval_ms: 1000,
            export_on_cycle: false,
            auto_translate: AutoTranslateConfig::default(),
        }
    }
}

impl ReplacerSettings {
    /// # Errors
    /// - Required path is empty
    /// - Interval or timeout is zero
    /// - Auto-translate is enabled with an unusable endpoint or language
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.corpus_path.trim().is_empty() {
            errors.push(ValidationError::new(
                "corpusPath",
                "The path cannot be empty. Example: \"translations.json\"",
            ));
        }

        if self.export_path.trim().is_empty() {
            errors.push(ValidationError::new(
                "exportPath",
                "The path cannot be empty. Example: \"exported_texts.json\"",
            ));
        }

        if self.scan_interval_ms == 0 {
            errors.push(ValidationError::new(
                "scanIntervalMs",
                "The interval must be greater than 0 milliseconds",
            ));
        }

        let auto = &self.auto_translate;
        if auto.enabled {
            if !(auto.endpoint.starts_with("http://") || auto.endpoint.starts_with("https://")) {
                errors.push(ValidationError::new(
                    "autoTranslate.endpoint",
                    format!(
                        "Invalid endpoint '{}': expected an http:// or https:// URL",
                        auto.endpoint
                    ),
                ));
            }

            if auto.source_language.trim().is_empty() {
                errors.push(ValidationError::new(
                    "autoTranslate.sourceLanguage",
                    "The language code cannot be empty. Example: \"en\"",
                ));
            }

            if auto.target_language.trim().is_empty() {
                errors.push(ValidationError::new(
                    "autoTranslate.targetLanguage",
                    "The language code cannot be empty. Example: \"ru\"",
                ));
            }

            if auto.timeout_ms == 0 {
                errors.push(ValidationError::new(
                    "autoTranslate.timeoutMs",
                    "The timeout must be greater than 0 milliseconds",
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    fn enabled_auto_translate() -> AutoTranslateConfig {
        AutoTranslateConfig {
            enabled: true,
            target_language: "ru".to_string(),
            ..AutoTranslateConfig::default()
        }
    }

    #[rstest]
    fn validate_valid_settings() {
        let settings = ReplacerSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn validate_disabled_auto_translate_is_not_checked() {
        let settings = ReplacerSettings {
            auto_translate: AutoTranslateConfig {
                endpoint: String::new(),
                ..AutoTranslateConfig::default()
            },
            ..ReplacerSettings::default()
        };

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"exportOnCycle": true, "corpusFormat": "entries"}"#;

        let settings: ReplacerSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.export_on_cycle, eq(true));
        assert_eq!(settings.corpus_format, CorpusFormat::Entries);
        assert_that!(settings.corpus_path, eq("translations.json"));
        assert_that!(settings.scan_interval_ms, eq(1000));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let json = "{}";

        let settings: ReplacerSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.export_path, eq("exported_texts.json"));
        assert_that!(settings.include_inactive, eq(true));
        assert_that!(settings.auto_translate.enabled, eq(false));
        assert_that!(settings.auto_translate.source_language, eq("en"));
    }

    #[rstest]
    fn deserialize_nested_auto_translate() {
        let json = r#"{"autoTranslate": {"enabled": true, "targetLanguage": "de", "apiKey": "k"}}"#;

        let settings: ReplacerSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.auto_translate.target_language, eq("de"));
        assert_that!(settings.auto_translate.api_key, some(eq("k")));
        assert_that!(settings.auto_translate.timeout_ms, eq(5000));
    }

    #[rstest]
    #[case("corpusPath", ReplacerSettings { corpus_path: "  ".to_string(), ..ReplacerSettings::default() })]
    #[case("exportPath", ReplacerSettings { export_path: String::new(), ..ReplacerSettings::default() })]
    #[case("scanIntervalMs", ReplacerSettings { scan_interval_ms: 0, ..ReplacerSettings::default() })]
    fn validate_reports_field(#[case] field_path: &str, #[case] settings: ReplacerSettings) {
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![field!(ValidationError.field_path, eq(field_path))])
        );
    }

    #[rstest]
    fn validate_invalid_endpoint() {
        let settings = ReplacerSettings {
            auto_translate: AutoTranslateConfig {
                endpoint: "localhost:5000".to_string(),
                ..enabled_auto_translate()
            },
            ..ReplacerSettings::default()
        };

        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("autoTranslate.endpoint")),
                field!(ValidationError.message, contains_substring("localhost:5000"))
            ]])
        );
    }

    #[rstest]
    fn validate_missing_target_language() {
        let settings = ReplacerSettings {
            auto_translate: AutoTranslateConfig {
                target_language: String::new(),
                ..enabled_auto_translate()
            },
            ..ReplacerSettings::default()
        };

        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("autoTranslate.targetLanguage")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = ReplacerSettings {
            corpus_path: String::new(),
            scan_interval_ms: 0,
            ..ReplacerSettings::default()
        };

        let validation_result = settings.validate();
        let errors = validation_result.unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. corpusPath"));
        assert_that!(error_message, contains_substring("cannot be empty"));
        assert_that!(error_message, contains_substring("2. scanIntervalMs"));
        assert_that!(error_message, contains_substring("greater than 0"));
    }
}
