//! Structural validation of section content before it is persisted.
//!
//! The single rule: every piece of character data must sit inside a
//! paragraph-defining element (`p`, `h5`..`h9`) or inside a `comment` /
//! `note` subtree, whose own templates carry their paragraphs. Anything
//! the encoder emits satisfies this, but content also arrives from other
//! writers, so the check runs on its own parse.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{CodecError, markup_error};
use crate::vocab::{is_paragraph_name, is_paragraph_nesting_name, wrap_fragment};

/// Check that `xml` is well-formed and that no character data floats
/// outside a paragraph, comment, or note.
///
/// Empty content is valid. Well-formedness errors come back as
/// [`CodecError::Markup`] with the offending position; a structural
/// breach is [`CodecError::StructuralViolation`].
pub fn validate_section(xml: &str) -> Result<(), CodecError> {
    if xml.is_empty() {
        return Ok(());
    }
    let wrapped = wrap_fragment(xml);
    let mut reader = Reader::from_str(&wrapped);
    // Depth of open elements that may directly contain text.
    let mut containers = 0usize;
    loop {
        let at = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if contains_text(start.name().as_ref()) {
                    containers += 1;
                }
            }
            Ok(Event::End(end)) => {
                if contains_text(end.name().as_ref()) {
                    containers = containers.saturating_sub(1);
                }
            }
            Ok(Event::Text(_)) => {
                // Whitespace between block elements counts too; the
                // dialect keeps blocks back to back.
                if containers == 0 {
                    return Err(CodecError::StructuralViolation);
                }
            }
            Ok(Event::CData(_)) => {
                if containers == 0 {
                    return Err(CodecError::StructuralViolation);
                }
            }
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(err) => {
                let at = reader.buffer_position().max(at as u64) as usize;
                return Err(markup_error(&wrapped, at, err.to_string()));
            }
        }
    }
}

fn contains_text(name: &[u8]) -> bool {
    is_paragraph_name(name) || is_paragraph_nesting_name(name)
}
