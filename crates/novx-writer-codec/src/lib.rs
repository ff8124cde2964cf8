pub mod annotations;
pub mod decode;
pub mod encode;
pub mod error;
pub mod runs;
pub mod validate;
pub mod vocab;

mod escape;

// Re-export key types for easier usage
pub use annotations::{Comment, Note, NoteClass};
pub use decode::{ParsedSection, decode_section};
pub use encode::encode_section;
pub use error::CodecError;
pub use runs::{EditEvent, HeadingLevel, Run, Tag, edit_events};
pub use validate::validate_section;
pub use vocab::{BULLET, COMMENT_PREFIX, NOTE_MARK, NOTE_PREFIX};
