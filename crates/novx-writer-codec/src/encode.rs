//! Encoding an edited buffer back to novx section content.
//!
//! The encoder consumes the `(text | tagon | tagoff)` triple stream a
//! tag-based text widget dumps, plus the annotation store captured at
//! decode time, and rebuilds the XML fragment.
//!
//! Its one load-bearing structure is the explicit open-element stack:
//! every emitted open tag is pushed, every close pops the *matching*
//! entry, and `finish()` drains whatever is left. Paragraph elements open
//! lazily, since only the first character (or inline tag) of a line
//! decides which element to emit. Stray breaks and bullet markers
//! produced by the widget thus fold into well-formed paragraphs and
//! lists.

use crate::annotations::{Comment, Note};
use crate::error::CodecError;
use crate::escape::escape_text;
use crate::runs::{EditEvent, HeadingLevel, Tag};
use crate::vocab::BULLET;

/// Encode a dumped edit-event stream back to a section fragment.
///
/// `comments` and `notes` are the annotation store from the decode that
/// opened the session; reference tags index into them. Run the result
/// through [`crate::validate_section`] before persisting it.
pub fn encode_section(
    events: &[EditEvent],
    comments: &[Comment],
    notes: &[Note],
) -> Result<String, CodecError> {
    let mut encoder = Encoder::new(comments, notes);
    for event in events {
        encoder.push_event(event)?;
    }
    Ok(encoder.finish())
}

/// Which element a lazily-opened paragraph will be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum ParaVariant {
    #[default]
    Plain,
    Styled(String),
    Heading(HeadingLevel, Option<String>),
}

/// An element the encoder has emitted an open tag for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum XmlElement {
    Paragraph(ParaVariant),
    Ul,
    Li,
    Em,
    Strong,
    Span(String),
}

impl XmlElement {
    fn open_tag(&self) -> String {
        match self {
            Self::Paragraph(ParaVariant::Plain) => "<p>".into(),
            Self::Paragraph(ParaVariant::Styled(attrs)) => format!("<p {attrs}>"),
            Self::Paragraph(ParaVariant::Heading(level, None)) => {
                format!("<{}>", level.as_name())
            }
            Self::Paragraph(ParaVariant::Heading(level, Some(attrs))) => {
                format!("<{} {attrs}>", level.as_name())
            }
            Self::Ul => "<ul>".into(),
            Self::Li => "<li>".into(),
            Self::Em => "<em>".into(),
            Self::Strong => "<strong>".into(),
            Self::Span(attrs) => format!("<span {attrs}>"),
        }
    }

    fn close_tag(&self) -> String {
        match self {
            Self::Paragraph(ParaVariant::Heading(level, _)) => {
                format!("</{}>", level.as_name())
            }
            Self::Paragraph(_) => "</p>".into(),
            Self::Ul => "</ul>".into(),
            Self::Li => "</li>".into(),
            Self::Em => "</em>".into(),
            Self::Strong => "</strong>".into(),
            Self::Span(_) => "</span>".into(),
        }
    }
}

struct Encoder<'a> {
    comments: &'a [Comment],
    notes: &'a [Note],
    /// Output fragments, joined once by `finish()`.
    fragments: Vec<String>,
    /// Every element with an emitted open tag, outermost first.
    open: Vec<XmlElement>,
    /// Element the next lazily-opened paragraph turns into.
    pending: ParaVariant,
    /// Reference tag currently swallowing the widget's display text.
    swallow: Option<Tag>,
}

impl<'a> Encoder<'a> {
    fn new(comments: &'a [Comment], notes: &'a [Note]) -> Self {
        Self {
            comments,
            notes,
            fragments: Vec::new(),
            open: Vec::new(),
            pending: ParaVariant::default(),
            swallow: None,
        }
    }

    fn push_event(&mut self, event: &EditEvent) -> Result<(), CodecError> {
        match event {
            EditEvent::Text(text) => {
                self.push_text(text);
                Ok(())
            }
            EditEvent::TagOn(tag) => self.tag_on(tag),
            EditEvent::TagOff(tag) => {
                self.tag_off(tag);
                Ok(())
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.swallow.is_some() {
            // Display text of a spliced annotation.
            return;
        }
        let mut rest = text;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('\n') {
                if let Some(after_bullet) = after.strip_prefix(BULLET) {
                    self.close_paragraph();
                    self.open_list_item();
                    rest = after_bullet;
                } else {
                    if self.paragraph_open() {
                        self.close_paragraph();
                    } else {
                        // A break with nothing on the line is an empty
                        // paragraph.
                        self.open_paragraph();
                        self.close_paragraph();
                    }
                    rest = after;
                }
            } else {
                let end = rest.find('\n').unwrap_or(rest.len());
                let (segment, tail) = rest.split_at(end);
                self.write_text(segment);
                rest = tail;
            }
        }
    }

    fn tag_on(&mut self, tag: &Tag) -> Result<(), CodecError> {
        if self.swallow.is_some() {
            return Ok(());
        }
        match tag {
            Tag::Em => self.open_inline(XmlElement::Em),
            Tag::Strong => self.open_inline(XmlElement::Strong),
            Tag::Span { attrs } => self.open_inline(XmlElement::Span(attrs.clone())),
            Tag::StyledParagraph { attrs } => {
                self.pending = ParaVariant::Styled(attrs.clone());
            }
            Tag::Heading(level) => {
                self.pending = ParaVariant::Heading(*level, None);
            }
            Tag::StyledHeading { level, attrs } => {
                self.pending = ParaVariant::Heading(*level, Some(attrs.clone()));
            }
            Tag::CommentRef(index) => {
                let comment = self.comments.get(*index).ok_or(
                    CodecError::DanglingReference {
                        kind: "comment",
                        index: *index,
                    },
                )?;
                let xml = comment.to_xml();
                self.splice(xml, tag.clone());
            }
            Tag::NoteRef(index) => {
                let note = self
                    .notes
                    .get(*index)
                    .ok_or(CodecError::DanglingReference {
                        kind: "note",
                        index: *index,
                    })?;
                let xml = note.to_xml();
                self.splice(xml, tag.clone());
            }
        }
        Ok(())
    }

    fn tag_off(&mut self, tag: &Tag) {
        if let Some(active) = &self.swallow {
            if active == tag {
                self.swallow = None;
            }
            return;
        }
        match tag {
            Tag::Em => self.close_inline(&XmlElement::Em),
            Tag::Strong => self.close_inline(&XmlElement::Strong),
            Tag::Span { attrs } => self.close_inline(&XmlElement::Span(attrs.clone())),
            // Paragraph-variant tags close with the line, not here; the
            // tagoff only stops the variant from reaching the next line.
            Tag::StyledParagraph { .. } | Tag::Heading(_) | Tag::StyledHeading { .. } => {
                self.pending = ParaVariant::Plain;
            }
            Tag::CommentRef(_) | Tag::NoteRef(_) => {}
        }
    }

    /// Emit character data, opening the pending paragraph if none is open.
    fn write_text(&mut self, segment: &str) {
        if segment.is_empty() {
            return;
        }
        if !self.paragraph_open() {
            self.open_paragraph();
        }
        self.fragments.push(escape_text(segment));
    }

    /// Splice an annotation's XML in place of its display text.
    fn splice(&mut self, xml: String, reference: Tag) {
        if !self.paragraph_open() {
            self.open_paragraph();
        }
        self.fragments.push(xml);
        self.swallow = Some(reference);
    }

    fn paragraph_open(&self) -> bool {
        self.open
            .iter()
            .any(|el| matches!(el, XmlElement::Paragraph(_)))
    }

    fn open_paragraph(&mut self) {
        let in_item = self.open.iter().any(|el| matches!(el, XmlElement::Li));
        if !in_item
            && let Some(XmlElement::Ul) = self.open.last()
        {
            // A non-list paragraph terminates the open list.
            self.emit_close_top();
        }
        self.emit_open(XmlElement::Paragraph(self.pending.clone()));
    }

    /// Close everything on the current line: leftover inline elements,
    /// the paragraph, and the list item. An enclosing `<ul>` stays open
    /// until either a non-list paragraph begins or the stream ends.
    fn close_paragraph(&mut self) {
        while self
            .open
            .last()
            .is_some_and(|el| !matches!(el, XmlElement::Ul))
        {
            self.emit_close_top();
        }
    }

    fn open_list_item(&mut self) {
        if !self.open.iter().any(|el| matches!(el, XmlElement::Ul)) {
            self.emit_open(XmlElement::Ul);
        }
        self.emit_open(XmlElement::Li);
    }

    fn open_inline(&mut self, element: XmlElement) {
        if !self.paragraph_open() {
            self.open_paragraph();
        }
        self.emit_open(element);
    }

    /// Close the innermost occurrence of `element`. The stack search is
    /// what keeps a close event aligned with the element it really opened,
    /// instead of trusting the event stream to be perfectly LIFO.
    fn close_inline(&mut self, element: &XmlElement) {
        if let Some(pos) = self.open.iter().rposition(|el| el == element) {
            let el = self.open.remove(pos);
            self.fragments.push(el.close_tag());
        }
    }

    fn emit_open(&mut self, element: XmlElement) {
        self.fragments.push(element.open_tag());
        self.open.push(element);
    }

    fn emit_close_top(&mut self) {
        if let Some(el) = self.open.pop() {
            self.fragments.push(el.close_tag());
        }
    }

    /// Force-close anything still open and join the output.
    fn finish(mut self) -> String {
        self.close_paragraph();
        while !self.open.is_empty() {
            self.emit_close_top();
        }
        self.fragments.concat()
    }
}
