//! Post text normalisation.
//!
//! Strips `@handle` mentions, URLs and every character that is not an ASCII
//! letter, digit or space, then collapses runs of whitespace.  The result is
//! what the sentiment classifier scores and what lands in the `clean_text`
//! column of every batch file.

use std::sync::LazyLock;

use regex::Regex;

/// Mentions, URLs, and anything outside `[0-9A-Za-z \t]`.
///
/// A URL begins with a word character, which the middle branch never
/// matches, so the URL branch claims the whole token at its first letter.
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(@[A-Za-z0-9]+)|([^0-9A-Za-z \t])|(\w+://\S+)").expect("valid noise regex")
});

/// Clean a raw post body.
///
/// Total and pure: empty input yields an empty string, and
/// `clean_text(&clean_text(t)) == clean_text(t)` for every `t`.
pub fn clean_text(text: &str) -> String {
    let stripped = NOISE.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
