//! Deciding the replacement text for one live string.

use crate::pattern::{
    extract_numbers,
    fill_pattern,
    is_translatable,
    to_pattern,
};
use crate::table::TranslationTable;

/// Outcome of matching one string against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Translation stored under the literal string.
    Direct(String),
    /// Translation stored under the string's numeric pattern, with the
    /// numbers of the live string filled back in.
    Pattern(String),
    NoMatch,
}

impl Decision {
    /// Replacement text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Direct(text) | Self::Pattern(text) => Some(text.as_str()),
            Self::NoMatch => None,
        }
    }

    #[must_use]
    pub const fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Matches `text` against `table`, pattern first.
///
/// - Untranslatable strings never match.
/// - A pattern entry wins over a literal entry, so one pattern covers every
///   numeric variant. Pattern entries whose translation is still the pattern
///   itself are placeholders and are skipped.
/// - If the pattern's translation references more numbers than `text`
///   contains, the string does not match at all.
/// - Strings without digits are their own pattern and yield [`Decision::Direct`].
#[must_use]
pub fn match_text(text: &str, table: &TranslationTable) -> Decision {
    if !is_translatable(text) {
        return Decision::NoMatch;
    }

    let pattern = to_pattern(text);
    if pattern != text
        && let Some(template) = table.lookup(&pattern)
        && template != pattern
    {
        let numbers = extract_numbers(text);
        return match fill_pattern(template, &numbers) {
            Ok(filled) => Decision::Pattern(filled),
            Err(error) => {
                tracing::warn!(text, pattern = %pattern, "Skipping pattern translation: {error}");
                Decision::NoMatch
            }
        };
    }

    table
        .lookup(text)
        .map_or(Decision::NoMatch, |translated| Decision::Direct(translated.to_string()))
}
