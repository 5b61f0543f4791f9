//! Numeric pattern conversion.
//!
//! A pattern is a string whose maximal runs of ASCII digits are replaced by
//! ordinal placeholders `{n1}`, `{n2}`, ... in encounter order. Patterns are
//! used as translation keys so that one entry covers every numeric variant of
//! the same sentence.

use thiserror::Error;

/// Errors raised while filling a pattern with numbers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern references a placeholder beyond the available numbers.
    #[error("Pattern references {{n{referenced}}} but only {available} number(s) are available")]
    PlaceholderCountMismatch {
        /// Highest placeholder ordinal referenced by the pattern.
        referenced: usize,
        /// Number of values supplied.
        available: usize,
    },
}

/// Returns `true` if `text` is a candidate for translation.
///
/// Empty, whitespace-only and digit-only strings are noise, as is anything
/// without a single alphabetic character (`"4/10"`, `"--"`).
#[must_use]
pub fn is_translatable(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && !trimmed.chars().all(|c| c.is_ascii_digit())
        && trimmed.chars().any(char::is_alphabetic)
}

/// Converts a literal string into its numeric pattern.
///
/// # Examples
/// ```
/// use text_replacer::pattern::to_pattern;
///
/// assert_eq!(to_pattern("You've lost 3 x Echo"), "You've lost {n1} x Echo");
/// assert_eq!(to_pattern("12:30 and 12"), "{n1}:{n2} and {n3}");
/// ```
#[must_use]
pub fn to_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len());
    let mut ordinal = 0usize;
    let mut in_digits = false;

    for c in text.chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                ordinal += 1;
                pattern.push_str(&placeholder(ordinal));
                in_digits = true;
            }
        } else {
            in_digits = false;
            pattern.push(c);
        }
    }

    pattern
}

/// Returns the digit runs of `text` in encounter order.
///
/// The result lines up with the ordinals produced by [`to_pattern`]: the
/// first element fills `{n1}`, the second `{n2}`, and so on.
#[must_use]
pub fn extract_numbers(text: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            numbers.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        numbers.push(current);
    }

    numbers
}

/// Substitutes `{n<k>}` placeholders with `numbers[k - 1]`.
///
/// Placeholders may appear in any order and any number of times, and not
/// every number has to be used. Malformed tokens such as `{n0}` or `{nx}`
/// are copied through unchanged.
///
/// # Errors
/// Returns [`PatternError::PlaceholderCountMismatch`] if a placeholder
/// references an ordinal greater than `numbers.len()`. No partially filled
/// string is returned in that case.
pub fn fill_pattern<S: AsRef<str>>(pattern: &str, numbers: &[S]) -> Result<String, PatternError> {
    let mut output = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find("{n") {
        let (before, candidate) = rest.split_at(start);
        output.push_str(before);

        match parse_placeholder(candidate) {
            Some((ordinal, consumed)) => {
                let value = ordinal
                    .checked_sub(1)
                    .and_then(|index| numbers.get(index))
                    .ok_or_else(|| PatternError::PlaceholderCountMismatch {
                        referenced: max_ordinal(pattern),
                        available: numbers.len(),
                    })?;
                output.push_str(value.as_ref());
                rest = candidate.get(consumed..).unwrap_or_default();
            }
            None => {
                output.push('{');
                rest = candidate.get(1..).unwrap_or_default();
            }
        }
    }
    output.push_str(rest);

    Ok(output)
}

/// Number of distinct placeholder ordinals referenced by `pattern`.
#[must_use]
pub fn placeholder_count(pattern: &str) -> usize {
    let mut seen = Vec::new();
    for_each_placeholder(pattern, |ordinal| {
        if !seen.contains(&ordinal) {
            seen.push(ordinal);
        }
    });
    seen.len()
}

/// Highest placeholder ordinal referenced by `pattern` (0 if none).
fn max_ordinal(pattern: &str) -> usize {
    let mut max = 0;
    for_each_placeholder(pattern, |ordinal| max = max.max(ordinal));
    max
}

/// Calls `f` with the ordinal of every well-formed placeholder in `pattern`.
fn for_each_placeholder(pattern: &str, mut f: impl FnMut(usize)) {
    let mut rest = pattern;
    while let Some(start) = rest.find("{n") {
        let candidate = rest.get(start..).unwrap_or_default();
        if let Some((ordinal, consumed)) = parse_placeholder(candidate) {
            f(ordinal);
            rest = candidate.get(consumed..).unwrap_or_default();
        } else {
            rest = candidate.get(1..).unwrap_or_default();
        }
    }
}

/// Parses a `{n<k>}` token at the start of `text`.
///
/// Returns the ordinal and the byte length of the token. `k` must be a
/// positive decimal number.
fn parse_placeholder(text: &str) -> Option<(usize, usize)> {
    let body = text.strip_prefix("{n")?;
    let digits_len = body.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let (digits, tail) = body.split_at(digits_len);
    if !tail.starts_with('}') {
        return None;
    }
    let ordinal: usize = digits.parse().ok()?;
    if ordinal == 0 {
        return None;
    }
    Some((ordinal, 2 + digits_len + 1))
}

/// Renders the placeholder token for `ordinal`.
fn placeholder(ordinal: usize) -> String {
    format!("{{n{ordinal}}}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Hello", true)]
    #[case("Level 3", true)]
    #[case("Привет", true)]
    #[case("", false)]
    #[case("   ", false)]
    #[case("123", false)]
    #[case("4/10", false)]
    #[case("-- : --", false)]
    #[case("  x  ", true)]
    fn is_translatable_cases(#[case] text: &str, #[case] expected: bool) {
        assert_that!(is_translatable(text), eq(expected));
    }

    #[rstest]
    #[case("You've lost 3 x Echo", "You've lost {n1} x Echo")]
    #[case("No digits here", "No digits here")]
    #[case("7 apples, 7 pears", "{n1} apples, {n2} pears")]
    #[case("12:30 and 12", "{n1}:{n2} and {n3}")]
    #[case("x100", "x{n1}")]
    #[case("Wave 1/10", "Wave {n1}/{n2}")]
    fn to_pattern_cases(#[case] text: &str, #[case] expected: &str) {
        assert_that!(to_pattern(text), eq(expected));
    }

    #[rstest]
    fn extract_numbers_in_encounter_order() {
        assert_that!(
            extract_numbers("Gold 250, gems 12, gold 250"),
            elements_are![eq("250"), eq("12"), eq("250")]
        );
        assert_that!(extract_numbers("none"), is_empty());
        assert_that!(extract_numbers("007"), elements_are![eq("007")]);
    }

    #[rstest]
    #[case("You've lost 3 x Echo")]
    #[case("7 apples, 7 pears")]
    #[case("Wave 1/10 begins in 05 seconds")]
    #[case("Gold: 1000000")]
    #[case("Contains {n2} literally and 5")]
    #[case("Plain text")]
    fn fill_inverts_to_pattern(#[case] text: &str) {
        let filled = fill_pattern(&to_pattern(text), &extract_numbers(text)).unwrap();

        assert_that!(filled, eq(text));
    }

    #[rstest]
    fn fill_pattern_allows_reordering_and_reuse() {
        let result = fill_pattern("{n2} из {n1} ({n2})", &["10", "3"]);

        assert_that!(result, ok(eq("3 из 10 (3)")));
    }

    #[rstest]
    fn fill_pattern_may_leave_numbers_unused() {
        let result = fill_pattern("Done", &["1", "2"]);

        assert_that!(result, ok(eq("Done")));
    }

    #[rstest]
    fn fill_pattern_reports_mismatch() {
        let result = fill_pattern("{n1} of {n3}", &["1", "2"]);

        assert_eq!(
            result,
            Err(PatternError::PlaceholderCountMismatch { referenced: 3, available: 2 })
        );
    }

    #[rstest]
    #[case("{n0} stays", "{n0} stays")]
    #[case("{nx} stays", "{nx} stays")]
    #[case("open {n1", "open {n1")]
    #[case("{n{n1}}", "{n5}")]
    fn fill_pattern_treats_malformed_tokens_as_text(#[case] pattern: &str, #[case] expected: &str) {
        assert_that!(fill_pattern(pattern, &["5"]), ok(eq(expected)));
    }

    #[rstest]
    #[case("Level {n1}", 1)]
    #[case("{n1}:{n2} and {n1}", 2)]
    #[case("nothing", 0)]
    fn placeholder_count_cases(#[case] pattern: &str, #[case] expected: usize) {
        assert_that!(placeholder_count(pattern), eq(expected));
    }
}
