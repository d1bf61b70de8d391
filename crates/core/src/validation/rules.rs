//! Character-set rules shared by the storage forms.

use std::sync::LazyLock;

use regex::Regex;

/// Pool, volume and image names: letters, digits, `.`, `_` and `-`.
pub const NAME_PATTERN: &str = r"^[a-zA-Z0-9._-]+$";

/// Pool source devices and paths: letters, digits and `/`.
pub const SOURCE_PATTERN: &str = r"^[a-zA-Z0-9/]+$";

/// Pool target paths. The first character may be anything except `-`; the
/// rest are ASCII letters, digits, `_`, `.`, `/` or `-`, and a `-` never
/// directly follows a `/`.
pub const TARGET_PATTERN: &str = r"^(?:[^-/]-*|/)(?:[0-9A-Za-z_.]-*|/)*$";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAME_PATTERN).expect("valid regex"));

static SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SOURCE_PATTERN).expect("valid regex"));

static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TARGET_PATTERN).expect("valid regex"));

pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

pub fn is_valid_source(source: &str) -> bool {
    SOURCE_RE.is_match(source)
}

pub fn is_valid_target_path(path: &str) -> bool {
    TARGET_RE.is_match(path)
}
