//! Pure text matchers behind the pull request checks.

use regex::Regex;

/// Returns true if `pattern` matches anywhere in `text`.
///
/// The match is unanchored: use `^`/`$` in the pattern to require a full match.
pub fn matches(text: &str, pattern: &Regex) -> bool {
    pattern.is_match(text)
}

/// Returns true if the first capture group of `pattern` holds real content.
///
/// The group is trimmed before inspection. The text is rejected when the pattern
/// does not match, when the trimmed capture is empty, or when it equals
/// `placeholder` (the untouched filler from a pull request template).
///
/// `pattern` is expected to have exactly one capture group; a pattern without
/// one never accepts anything.
pub fn matches_with_extraction(text: &str, pattern: &Regex, placeholder: &str) -> bool {
    let Some(captures) = pattern.captures(text) else {
        return false;
    };
    let Some(section) = captures.get(1) else {
        return false;
    };

    let section = section.as_str().trim();
    !section.is_empty() && section != placeholder
}
