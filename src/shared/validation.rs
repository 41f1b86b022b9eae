use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters that are unsafe in file and archive entry names
    /// - Replaced: "/", "\", ":", "*", "?", "\"", "<", ">", "|" and control characters
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r#"[/\\:*?"<>|\x00-\x1f\x7f]"#).unwrap();

    /// Runs of whitespace collapsed to a single space
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Make a value safe to use as a file name component.
///
/// Unsafe characters become `_`, whitespace runs collapse and the result is
/// trimmed. May return an empty string.
pub fn sanitize_filename(value: &str) -> String {
    let replaced = UNSAFE_FILENAME_CHARS.replace_all(value, "_");
    WHITESPACE_RUN
        .replace_all(&replaced, " ")
        .trim()
        .trim_matches('.')
        .to_string()
}

/// Reduce a client-supplied upload name to its last path component
pub fn base_filename(value: &str) -> String {
    let last = value.rsplit(['/', '\\']).next().unwrap_or_default();
    sanitize_filename(last)
}
