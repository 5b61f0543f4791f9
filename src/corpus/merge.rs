//! Folding freshly observed strings into an existing corpus.
//!
//! Observed strings are grouped by their numeric pattern. A group with
//! several members is emitted once under the shared pattern; a single
//! observation is emitted under its pattern too, unless the corpus already
//! holds an entry for the literal string. Everything else in the existing
//! corpus is carried forward so that translations for strings not currently
//! on screen survive.
//!
//! Literal entries whose pattern is now covered by a group entry are
//! absorbed. A hand-written translation of such a literal is lifted onto the
//! pattern when its numbers line up with the original's; a translation that
//! cannot be lifted is kept as its own entry instead of being lost.

use std::collections::{
    HashMap,
    HashSet,
};

use super::{
    Corpus,
    TranslationEntry,
};
use crate::pattern::{
    extract_numbers,
    is_translatable,
    to_pattern,
};

/// Merged corpus together with what the merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub corpus: Corpus,
    /// Entries produced from the observed strings.
    pub emitted: usize,
    /// Emitted entries whose key was not in the existing corpus.
    pub added: usize,
    /// Existing entries kept unchanged.
    pub carried: usize,
    /// Existing literal entries folded into a pattern entry.
    pub absorbed: usize,
    /// Pattern entries whose translation came from a lifted literal.
    pub lifted: usize,
}

/// Observed strings sharing one pattern.
#[derive(Debug)]
struct Group {
    /// Shared pattern.
    pattern: String,
    /// Distinct observed strings in encounter order.
    members: Vec<String>,
}

/// Merges `observed` into `existing`.
///
/// Untranslatable strings are ignored and duplicates collapse. The result
/// lists the emitted entries in the order their groups were first observed,
/// followed by the carried-forward entries in their existing order. Merging
/// the result again with the same observations yields the same corpus.
#[must_use]
pub fn merge_observed<I, S>(observed: I, existing: &Corpus) -> MergeOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let groups = group_by_pattern(observed);
    let lookup: HashMap<&str, &str> = existing
        .iter()
        .map(|entry| (entry.original_text.as_str(), entry.translated_text.as_str()))
        .collect();

    let mut outcome = MergeOutcome::default();
    let mut entries = Vec::new();
    let mut emitted_keys = HashSet::new();
    // Final translation of every multi-member group, by pattern.
    let mut group_translations: HashMap<String, String> = HashMap::new();

    for group in &groups {
        let entry = match group.members.as_slice() {
            [single] => emit_single(single, &group.pattern, &lookup),
            _ => {
                let (entry, lifted) = emit_group(&group.pattern, existing, &lookup);
                if lifted {
                    outcome.lifted += 1;
                }
                group_translations
                    .insert(entry.original_text.clone(), entry.translated_text.clone());
                entry
            }
        };

        if !lookup.contains_key(entry.original_text.as_str()) {
            outcome.added += 1;
        }
        emitted_keys.insert(entry.original_text.clone());
        entries.push(entry);
    }
    outcome.emitted = entries.len();

    let mut seen = HashSet::new();
    for entry in existing {
        let key = entry.original_text.as_str();
        if !seen.insert(key) || emitted_keys.contains(key) {
            continue;
        }
        // Last duplicate wins, at the position of the first.
        let translated = lookup.get(key).copied().unwrap_or(&entry.translated_text);

        let pattern = to_pattern(key);
        if pattern != key
            && let Some(group_translation) = group_translations.get(&pattern)
        {
            let lifted = lift_translation(key, translated);
            if key == translated || lifted.as_deref() == Some(group_translation.as_str()) {
                outcome.absorbed += 1;
                continue;
            }
        }

        entries.push(TranslationEntry::new(key, translated));
        outcome.carried += 1;
    }

    outcome.corpus = Corpus::new(entries);
    outcome
}

/// Groups translatable observations by pattern, in first-seen order.
fn group_by_pattern<I, S>(observed: I) -> Vec<Group>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for text in observed {
        let text = text.as_ref();
        if !is_translatable(text) {
            continue;
        }
        let pattern = to_pattern(text);
        match index.get(&pattern).and_then(|&i| groups.get_mut(i)) {
            Some(group) => {
                if !group.members.iter().any(|member| member == text) {
                    group.members.push(text.to_string());
                }
            }
            None => {
                index.insert(pattern.clone(), groups.len());
                groups.push(Group { pattern, members: vec![text.to_string()] });
            }
        }
    }

    groups
}

/// Entry for a string observed once.
fn emit_single(text: &str, pattern: &str, lookup: &HashMap<&str, &str>) -> TranslationEntry {
    if let Some(translated) = lookup.get(text) {
        return TranslationEntry::new(text, *translated);
    }
    lookup.get(pattern).map_or_else(
        || TranslationEntry::untranslated(pattern),
        |translated| TranslationEntry::new(pattern, *translated),
    )
}

/// Entry for a group of several observations sharing `pattern`.
///
/// Returns the entry and whether its translation was lifted from a literal.
fn emit_group(
    pattern: &str,
    existing: &Corpus,
    lookup: &HashMap<&str, &str>,
) -> (TranslationEntry, bool) {
    let current = lookup.get(pattern).copied();
    if let Some(translated) = current
        && translated != pattern
    {
        return (TranslationEntry::new(pattern, translated), false);
    }

    // Candidates in corpus order, each key once with its current translation.
    let mut seen = HashSet::new();
    let lifted = existing
        .iter()
        .map(|entry| entry.original_text.as_str())
        .filter(|key| seen.insert(*key))
        .filter(|key| *key != pattern && to_pattern(key) == pattern)
        .filter_map(|key| lookup.get(key).map(|translated| (key, *translated)))
        .filter(|(key, translated)| key != translated)
        .find_map(|(key, translated)| lift_translation(key, translated));

    match lifted {
        Some(translated) => {
            tracing::debug!(pattern, translated = %translated, "Lifted literal translation");
            (TranslationEntry::new(pattern, translated), true)
        }
        None => (TranslationEntry::untranslated(pattern), false),
    }
}

/// Rewrites a literal translation into a pattern translation.
///
/// Every digit run in `translated` must correspond to exactly one number of
/// `original` (by position when the sequences are equal, otherwise by unique
/// value), and every number of `original` must be used.
fn lift_translation(original: &str, translated: &str) -> Option<String> {
    let original_numbers = extract_numbers(original);
    let translated_numbers = extract_numbers(translated);
    if original_numbers.is_empty() {
        return None;
    }
    if original_numbers == translated_numbers {
        return Some(to_pattern(translated));
    }

    let mut ordinals = Vec::with_capacity(translated_numbers.len());
    for number in &translated_numbers {
        let mut positions = original_numbers
            .iter()
            .enumerate()
            .filter(|(_, candidate)| *candidate == number)
            .map(|(position, _)| position + 1);
        let ordinal = positions.next()?;
        if positions.next().is_some() {
            return None;
        }
        ordinals.push(ordinal);
    }
    if !(1..=original_numbers.len()).all(|ordinal| ordinals.contains(&ordinal)) {
        return None;
    }

    Some(replace_digit_runs(translated, &ordinals))
}

/// Replaces the k-th digit run of `text` with the placeholder `ordinals[k]`.
fn replace_digit_runs(text: &str, ordinals: &[usize]) -> String {
    let mut output = String::with_capacity(text.len());
    let mut runs = ordinals.iter();
    let mut in_digits = false;

    for c in text.chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                if let Some(ordinal) = runs.next() {
                    output.push_str(&format!("{{n{ordinal}}}"));
                }
                in_digits = true;
            }
        } else {
            in_digits = false;
            output.push(c);
        }
    }

    output
}
