//! The editable run representation.
//!
//! A [`Run`] is the unit exchanged with the host editing surface: one
//! contiguous chunk of character data plus the formatting/structural tags
//! active over it. The surface renders runs, lets the user edit, and later
//! dumps its buffer back as a flat stream of [`EditEvent`] triples, the
//! shape a tag-based text widget naturally exposes.
//!
//! Two markers are carried as plain untagged text inside the run stream:
//! a lone `"\n"` ends the current paragraph, and `"\n* "` (newline plus
//! bullet glyph) opens a list item.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocab::{COMMENT_PREFIX, NOTE_PREFIX};

/// One of the five heading elements of the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingLevel {
    H5,
    H6,
    H7,
    H8,
    H9,
}

impl HeadingLevel {
    pub(crate) fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"h5" => Some(Self::H5),
            b"h6" => Some(Self::H6),
            b"h7" => Some(Self::H7),
            b"h8" => Some(Self::H8),
            b"h9" => Some(Self::H9),
            _ => None,
        }
    }

    pub fn as_name(self) -> &'static str {
        match self {
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::H7 => "h7",
            Self::H8 => "h8",
            Self::H9 => "h9",
        }
    }
}

/// A formatting or structural context applied to a run.
///
/// Attributed variants carry the serialized attribute list exactly as it
/// appeared in the source (`key="value"`, source order, space-joined), so
/// re-encoding reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Em,
    Strong,
    /// A bare heading element, `h5`..`h9`.
    Heading(HeadingLevel),
    /// A `<p>` carrying attributes. Bare paragraphs are untagged so the
    /// user can type new ones without inventing a tag.
    StyledParagraph { attrs: String },
    /// A heading carrying attributes.
    StyledHeading { level: HeadingLevel, attrs: String },
    /// An inline `<span>`; always attributed in this dialect.
    Span { attrs: String },
    /// Reference into the session's comment list.
    CommentRef(usize),
    /// Reference into the session's note list.
    NoteRef(usize),
}

impl Tag {
    /// Whether this tag selects the element a whole paragraph is wrapped
    /// in, rather than an inline range or an annotation reference.
    pub fn is_paragraph_variant(&self) -> bool {
        matches!(
            self,
            Tag::Heading(_) | Tag::StyledParagraph { .. } | Tag::StyledHeading { .. }
        )
    }
}

/// Widget-facing tag name. Reference tags render as `prefix:index` so the
/// surface can address the annotation store positionally.
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Em => f.write_str("em"),
            Tag::Strong => f.write_str("strong"),
            Tag::Heading(level) => f.write_str(level.as_name()),
            Tag::StyledParagraph { attrs } => write!(f, "p {attrs}"),
            Tag::StyledHeading { level, attrs } => write!(f, "{} {attrs}", level.as_name()),
            Tag::Span { attrs } => write!(f, "span {attrs}"),
            Tag::CommentRef(index) => write!(f, "{COMMENT_PREFIX}:{index}"),
            Tag::NoteRef(index) => write!(f, "{NOTE_PREFIX}:{index}"),
        }
    }
}

/// A chunk of character data plus the tags open over it.
///
/// `tags` is ordered by nesting depth, outermost first; the decoder
/// produces this order and the encoder relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub tags: Vec<Tag>,
}

impl Run {
    pub fn new(text: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            text: text.into(),
            tags,
        }
    }

    /// An untagged run, such as a paragraph break or plain text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

/// One entry of an editing surface's buffer dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditEvent {
    Text(String),
    TagOn(Tag),
    TagOff(Tag),
}

/// Flatten a run sequence into the `(text | tagon | tagoff)` triple stream
/// the encoder consumes.
///
/// This is the reference implementation of the dump contract: at each run
/// boundary, tags no longer active close innermost-first, then newly
/// active tags open outermost-first. A widget dumping its own buffer must
/// produce the same ordering.
pub fn edit_events(runs: &[Run]) -> Vec<EditEvent> {
    let mut events = Vec::new();
    let mut active: &[Tag] = &[];

    for run in runs {
        let common = active
            .iter()
            .zip(run.tags.iter())
            .take_while(|(a, b)| a == b)
            .count();
        for tag in active[common..].iter().rev() {
            events.push(EditEvent::TagOff(tag.clone()));
        }
        for tag in &run.tags[common..] {
            events.push(EditEvent::TagOn(tag.clone()));
        }
        events.push(EditEvent::Text(run.text.clone()));
        active = &run.tags;
    }
    for tag in active.iter().rev() {
        events.push(EditEvent::TagOff(tag.clone()));
    }
    events
}
