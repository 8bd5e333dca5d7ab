//! Removes salutations the model adds on its own, since the caller always
//! prepends its own greeting.
//!
//! This is a text heuristic. A legitimate line that opens with one of the
//! salutation words (for example "Dear family members should...") is removed
//! as well.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_SALUTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:hi|hello|hey)\b(?:\s+there\b)?[^a-zA-Z]*").expect("valid regex")
});

static SALUTATION_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\n)\s*(?:hi|hello|hey|dear)\b[^\n]*\n?").expect("valid regex")
});

pub fn strip_greetings(raw: &str) -> String {
    let text = LEADING_SALUTATION_RE.replace(raw, "");
    let text = text.trim();
    SALUTATION_LINE_RE.replace_all(text, "").trim().to_owned()
}
