//! Comments and footnotes extracted from section content.
//!
//! These records are the annotation store of one edit session: the decoder
//! fills them, the host carries them unchanged alongside the run sequence,
//! and the encoder replays them by index when it meets a reference tag.
//! Their XML templates are fixed; the editor treats the entities as opaque.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::escape::{escape_attribute, escape_text};

/// A reader/author comment anchored inside a paragraph.
///
/// `body` holds the comment's paragraphs joined with `\n`; the newline is
/// re-expanded to a `</p><p>` boundary on encode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub creator: String,
    pub date: String,
    pub body: String,
}

impl Comment {
    /// Serialize back to the fixed novx comment template.
    pub fn to_xml(&self) -> String {
        let body = escape_text(&self.body).replace('\n', "</p><p>");
        format!(
            "<comment><creator>{}</creator><date>{}</date><p>{}</p></comment>",
            escape_text(&self.creator),
            escape_text(&self.date),
            body,
        )
    }
}

/// The `class` attribute of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteClass {
    Footnote,
    Endnote,
}

impl NoteClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Footnote => "footnote",
            Self::Endnote => "endnote",
        }
    }

    pub(crate) fn parse(value: &str) -> Result<Self, CodecError> {
        match value {
            "footnote" => Ok(Self::Footnote),
            "endnote" => Ok(Self::Endnote),
            other => Err(CodecError::Unsupported(format!(
                "unknown note class \"{other}\""
            ))),
        }
    }
}

/// A footnote (or, once supported, endnote) anchored inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub class: NoteClass,
    pub citation: String,
    pub body: String,
}

impl Note {
    /// Serialize back to the fixed novx note template.
    pub fn to_xml(&self) -> String {
        let body = escape_text(&self.body).replace('\n', "</p><p>");
        format!(
            "<note id=\"{}\" class=\"{}\"><note-citation>{}</note-citation><p>{}</p></note>",
            escape_attribute(&self.id),
            self.class.as_str(),
            escape_text(&self.citation),
            body,
        )
    }
}
