//! Decoding novx section content into editable runs.
//!
//! The decoder walks the fragment with a pull-based XML reader and builds
//! the run sequence the editing surface renders, extracting comments and
//! notes into the annotation store as it goes.
//!
//! Instead of a drift-prone set of boolean flags, the decoder keeps one
//! tagged-union [`Mode`]: ordinary text, inside a comment, or inside a
//! note. Once a comment or note opens, every character and element event
//! is routed into the newest annotation until the matching end tag,
//! regardless of the ambient tag stack, so an annotation nested in a
//! styled paragraph or heading can never desynchronize the run stream.
//!
//! Every call to [`decode_section`] builds fresh state; nothing survives
//! between invocations.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::annotations::{Comment, Note, NoteClass};
use crate::error::{CodecError, markup_error};
use crate::runs::{HeadingLevel, Run, Tag};
use crate::vocab::{
    BULLET, NOTE_MARK, T_CITATION, T_COMMENT, T_CREATOR, T_DATE, T_EM, T_LI, T_NOTE, T_P, T_SPAN,
    T_STRONG, T_UL, wrap_fragment,
};

/// Everything one decode produces: the run sequence plus the annotation
/// store the host must carry for the lifetime of the edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSection {
    pub runs: Vec<Run>,
    pub comments: Vec<Comment>,
    pub notes: Vec<Note>,
}

/// Decode a section fragment into runs and annotations.
///
/// Empty input decodes to an empty section. Malformed XML yields
/// [`CodecError::Markup`] with the tokenizer's position; an endnote yields
/// [`CodecError::Unsupported`] rather than a mis-rendered result.
pub fn decode_section(xml: &str) -> Result<ParsedSection, CodecError> {
    if xml.is_empty() {
        return Ok(ParsedSection::default());
    }

    let wrapped = wrap_fragment(xml);
    let mut reader = Reader::from_str(&wrapped);
    let mut decoder = Decoder::default();

    loop {
        let at = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => decoder.handle_start(&e, &wrapped, at)?,
            Ok(Event::Empty(e)) => {
                decoder.handle_start(&e, &wrapped, at)?;
                decoder.handle_end(e.name().as_ref());
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|err| markup_error(&wrapped, at, err.to_string()))?;
                decoder.handle_text(&text);
            }
            Ok(Event::CData(t)) => decoder.handle_text(&String::from_utf8_lossy(&t)),
            Ok(Event::End(e)) => decoder.handle_end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                let at = reader.buffer_position() as usize;
                return Err(markup_error(&wrapped, at, err.to_string()));
            }
        }
    }

    Ok(decoder.finish())
}

/// Which child of a comment the decoder is currently filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentField {
    None,
    Creator,
    Date,
    Body,
}

/// Which child of a note the decoder is currently filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteField {
    None,
    Citation,
    Body,
}

/// The decoder's parser mode. `depth` guards nested same-name elements so
/// only the matching end tag leaves the mode; `paragraphs` counts body
/// paragraphs so their breaks survive as `\n` in the editable text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Mode {
    #[default]
    Text,
    InComment {
        field: CommentField,
        depth: usize,
        paragraphs: usize,
    },
    InNote {
        field: NoteField,
        depth: usize,
        paragraphs: usize,
    },
}

#[derive(Default)]
struct Decoder {
    runs: Vec<Run>,
    /// Tags currently open over regular text, outermost first.
    open_tags: Vec<Tag>,
    /// Attributed elements that close by popping the matching entry
    /// (span, attributed paragraph, attributed heading).
    span_stack: Vec<Tag>,
    in_list: bool,
    mode: Mode,
    comments: Vec<Comment>,
    notes: Vec<Note>,
}

impl Decoder {
    fn handle_start(
        &mut self,
        e: &BytesStart<'_>,
        wrapped: &str,
        at: usize,
    ) -> Result<(), CodecError> {
        let name = e.name();
        let name = name.as_ref();

        match &mut self.mode {
            Mode::InComment {
                field,
                depth,
                paragraphs,
            } => {
                if name == T_COMMENT {
                    *depth += 1;
                } else if name == T_CREATOR {
                    *field = CommentField::Creator;
                } else if name == T_DATE {
                    *field = CommentField::Date;
                } else if name == T_P {
                    *field = CommentField::Body;
                    if *paragraphs > 0
                        && let Some(comment) = self.comments.last_mut()
                    {
                        comment.body.push('\n');
                    }
                    *paragraphs += 1;
                }
                // Formatting inside annotation bodies is flattened: any
                // other element leaves the current field in place.
                Ok(())
            }
            Mode::InNote {
                field,
                depth,
                paragraphs,
            } => {
                if name == T_NOTE {
                    *depth += 1;
                } else if name == T_CITATION {
                    *field = NoteField::Citation;
                } else if name == T_P {
                    *field = NoteField::Body;
                    if *paragraphs > 0
                        && let Some(note) = self.notes.last_mut()
                    {
                        note.body.push('\n');
                    }
                    *paragraphs += 1;
                }
                Ok(())
            }
            Mode::Text => self.handle_text_element_start(e, name, wrapped, at),
        }
    }

    fn handle_text_element_start(
        &mut self,
        e: &BytesStart<'_>,
        name: &[u8],
        wrapped: &str,
        at: usize,
    ) -> Result<(), CodecError> {
        if name == T_COMMENT {
            self.comments.push(Comment::default());
            self.mode = Mode::InComment {
                field: CommentField::None,
                depth: 0,
                paragraphs: 0,
            };
            return Ok(());
        }

        if name == T_NOTE {
            let note = Self::note_from_attributes(e, wrapped, at)?;
            self.notes.push(note);
            self.mode = Mode::InNote {
                field: NoteField::None,
                depth: 0,
                paragraphs: 0,
            };
            return Ok(());
        }

        let attrs = serialize_attributes(e, wrapped, at)?;

        // Regular paragraphs and list items are untagged in the editor so
        // the user can add new ones; paragraphs are separated by newline
        // runs and list items start with bullets.
        let mut suffix: Option<String> = None;

        if name == T_P {
            if !self.runs.is_empty() && !self.in_list {
                suffix = Some("\n".into());
            }
            if let Some(attrs) = attrs {
                let tag = Tag::StyledParagraph { attrs };
                self.span_stack.push(tag.clone());
                self.open_tags.push(tag);
            }
        } else if let Some(level) = HeadingLevel::from_name(name) {
            if !self.runs.is_empty() {
                suffix = Some("\n".into());
            }
            match attrs {
                Some(attrs) => {
                    let tag = Tag::StyledHeading { level, attrs };
                    self.span_stack.push(tag.clone());
                    self.open_tags.push(tag);
                }
                None => self.open_tags.push(Tag::Heading(level)),
            }
        } else if name == T_EM {
            self.open_tags.push(Tag::Em);
        } else if name == T_STRONG {
            self.open_tags.push(Tag::Strong);
        } else if name == T_SPAN {
            let tag = Tag::Span {
                attrs: attrs.unwrap_or_default(),
            };
            self.span_stack.push(tag.clone());
            self.open_tags.push(tag);
        } else if name == T_LI {
            suffix = Some(format!("\n{BULLET}"));
        } else if name == T_UL {
            self.in_list = true;
        }

        if let Some(suffix) = suffix {
            self.runs.push(Run::plain(suffix));
        }
        Ok(())
    }

    fn handle_text(&mut self, text: &str) {
        match &mut self.mode {
            Mode::Text => {
                self.runs.push(Run::new(text, self.open_tags.clone()));
            }
            Mode::InComment { field, .. } => {
                let field = *field;
                if let Some(comment) = self.comments.last_mut() {
                    match field {
                        CommentField::Creator => comment.creator.push_str(text),
                        CommentField::Date => comment.date.push_str(text),
                        CommentField::Body => comment.body.push_str(text),
                        CommentField::None => {}
                    }
                }
            }
            Mode::InNote { field, .. } => {
                let field = *field;
                if let Some(note) = self.notes.last_mut() {
                    match field {
                        NoteField::Citation => note.citation.push_str(text),
                        NoteField::Body => note.body.push_str(text),
                        NoteField::None => {}
                    }
                }
            }
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match &mut self.mode {
            Mode::InComment { field, depth, .. } => {
                if name == T_COMMENT {
                    if *depth > 0 {
                        *depth -= 1;
                    } else {
                        // The comment's text stands in the run stream,
                        // tagged with its index in the annotation store.
                        let index = self.comments.len() - 1;
                        let body = self.comments[index].body.clone();
                        self.runs.push(Run::new(body, vec![Tag::CommentRef(index)]));
                        self.mode = Mode::Text;
                    }
                } else if name == T_CREATOR || name == T_DATE || name == T_P {
                    *field = CommentField::None;
                }
            }
            Mode::InNote { field, depth, .. } => {
                if name == T_NOTE {
                    if *depth > 0 {
                        *depth -= 1;
                    } else {
                        let index = self.notes.len() - 1;
                        self.runs
                            .push(Run::new(NOTE_MARK, vec![Tag::NoteRef(index)]));
                        self.mode = Mode::Text;
                    }
                } else if name == T_CITATION || name == T_P {
                    *field = NoteField::None;
                }
            }
            Mode::Text => {
                if name == T_EM {
                    self.remove_open_tag(&Tag::Em);
                } else if name == T_STRONG {
                    self.remove_open_tag(&Tag::Strong);
                } else if name == T_SPAN {
                    if let Some(tag) = self.span_stack.pop() {
                        self.remove_open_tag(&tag);
                    }
                } else if name == T_P || HeadingLevel::from_name(name).is_some() {
                    self.span_stack.clear();
                    self.open_tags.clear();
                } else if name == T_UL {
                    self.in_list = false;
                }
            }
        }
    }

    /// Remove the innermost occurrence of `tag`. Names are not guaranteed
    /// to nest as a pure stack, so this must not assume `tag` is on top.
    fn remove_open_tag(&mut self, tag: &Tag) {
        if let Some(pos) = self.open_tags.iter().rposition(|t| t == tag) {
            self.open_tags.remove(pos);
        }
    }

    fn note_from_attributes(
        e: &BytesStart<'_>,
        wrapped: &str,
        at: usize,
    ) -> Result<Note, CodecError> {
        let mut id = None;
        let mut class = None;
        for attr in e.attributes() {
            let attr = attr.map_err(|err| markup_error(wrapped, at, err.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|err| markup_error(wrapped, at, err.to_string()))?;
            match attr.key.as_ref() {
                b"id" => id = Some(value.into_owned()),
                b"class" => class = Some(value.into_owned()),
                _ => {}
            }
        }
        let id =
            id.ok_or_else(|| markup_error(wrapped, at, "note is missing its id attribute".into()))?;
        let class = class.ok_or_else(|| {
            markup_error(wrapped, at, "note is missing its class attribute".into())
        })?;
        let class = NoteClass::parse(&class)?;
        if class == NoteClass::Endnote {
            return Err(CodecError::Unsupported(
                "endnote decoding is not implemented".into(),
            ));
        }
        Ok(Note {
            id,
            class,
            citation: String::new(),
            body: String::new(),
        })
    }

    fn finish(self) -> ParsedSection {
        ParsedSection {
            runs: self.runs,
            comments: self.comments,
            notes: self.notes,
        }
    }
}

/// Capture an element's attributes exactly as written: source key order,
/// double quoting, values still escaped. The string is echoed verbatim
/// when the element is re-encoded.
fn serialize_attributes(
    e: &BytesStart<'_>,
    wrapped: &str,
    at: usize,
) -> Result<Option<String>, CodecError> {
    let mut parts = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| markup_error(wrapped, at, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let value = String::from_utf8_lossy(&attr.value);
        parts.push(format!("{key}=\"{value}\""));
    }
    Ok(if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    })
}
