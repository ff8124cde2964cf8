//! Element vocabulary of the novx section dialect.
//!
//! The codec only understands a fixed, enumerated set of tags; anything
//! else in the input is passed over by the decoder and rejected by nothing
//! stricter than the XML tokenizer itself.

/// Glyph sequence that opens a list item in the editable text.
pub const BULLET: &str = "* ";

/// Placeholder glyph shown in the editable text where a note is anchored.
pub const NOTE_MARK: &str = "†";

/// Prefix of comment reference tag values (`cmId:<index>`).
pub const COMMENT_PREFIX: &str = "cmId";

/// Prefix of note reference tag values (`ntId:<index>`).
pub const NOTE_PREFIX: &str = "ntId";

pub(crate) const T_COMMENT: &[u8] = b"comment";
pub(crate) const T_CREATOR: &[u8] = b"creator";
pub(crate) const T_DATE: &[u8] = b"date";
pub(crate) const T_NOTE: &[u8] = b"note";
pub(crate) const T_CITATION: &[u8] = b"note-citation";
pub(crate) const T_P: &[u8] = b"p";
pub(crate) const T_EM: &[u8] = b"em";
pub(crate) const T_STRONG: &[u8] = b"strong";
pub(crate) const T_SPAN: &[u8] = b"span";
pub(crate) const T_UL: &[u8] = b"ul";
pub(crate) const T_LI: &[u8] = b"li";

/// Name of the synthetic root element wrapped around a fragment so that a
/// standards-compliant XML parser accepts it.
pub(crate) const SYNTHETIC_ROOT: &str = "content";

/// Wrap a section fragment in the synthetic root element.
pub(crate) fn wrap_fragment(xml: &str) -> String {
    format!("<{SYNTHETIC_ROOT}>{xml}</{SYNTHETIC_ROOT}>")
}

/// Whether `name` is a paragraph-defining element (`p` or a heading).
pub(crate) fn is_paragraph_name(name: &[u8]) -> bool {
    name == T_P || crate::runs::HeadingLevel::from_name(name).is_some()
}

/// Whether `name` opens a nesting that suspends the paragraph rule.
pub(crate) fn is_paragraph_nesting_name(name: &[u8]) -> bool {
    name == T_COMMENT || name == T_NOTE
}
