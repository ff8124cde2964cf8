//! Character data sanitization for XML emission.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Characters outside the XML 1.0 `Char` production that can still occur in
/// a Rust string: C0 controls other than tab/LF/CR, and the two
/// permanently-unassigned BMP codepoints. Surrogates cannot appear in
/// `&str` at all.
static ILLEGAL_XML_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[\u{0000}-\u{0008}\u{000B}\u{000C}\u{000E}-\u{001F}\u{FFFE}\u{FFFF}]")
        .expect("illegal-character class compiles")
});

/// Drop characters that XML 1.0 forbids. Not an error; a sanitization step.
pub(crate) fn strip_illegal(text: &str) -> Cow<'_, str> {
    ILLEGAL_XML_CHARS.replace_all(text, "")
}

/// Escape character data for element content: `&`, `<` and `>`, after
/// stripping illegal characters.
pub(crate) fn escape_text(text: &str) -> String {
    html_escape::encode_text(strip_illegal(text).as_ref()).into_owned()
}

/// Escape a generated double-quoted attribute value.
pub(crate) fn escape_attribute(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(strip_illegal(text).as_ref()).into_owned()
}
