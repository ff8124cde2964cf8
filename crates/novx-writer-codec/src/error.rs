use crate::vocab::SYNTHETIC_ROOT;

/// Failures surfaced by the codec.
///
/// The codec never prompts or logs; every failure propagates to the host
/// editor, which owns the user-facing dialog. `Markup` and
/// `StructuralViolation` are recoverable (the document stays open);
/// `Unsupported` and `DanglingReference` mean the edit session must be
/// abandoned rather than persist a lossy transformation.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed markup at line {line}, column {column}: {message}")]
    Markup {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("section content validation failed")]
    StructuralViolation,
    #[error("unsupported content: {0}")]
    Unsupported(String),
    #[error("no {kind} with index {index} in the annotation store")]
    DanglingReference { kind: &'static str, index: usize },
}

/// Translate a tokenizer diagnostic into a [`CodecError::Markup`].
///
/// `offset` is a byte offset into `wrapped`, the fragment with the
/// synthetic root element already prepended. Columns on the first line are
/// shifted back so they point into the caller's fragment, not the wrapper.
pub(crate) fn markup_error(wrapped: &str, offset: usize, message: String) -> CodecError {
    let offset = offset.min(wrapped.len());
    let before = &wrapped[..offset];
    let line = 1 + before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let mut column = offset - line_start + 1;
    if line == 1 {
        // "<content>".len() == SYNTHETIC_ROOT.len() + 2
        column = column.saturating_sub(SYNTHETIC_ROOT.len() + 2).max(1);
    }
    CodecError::Markup {
        line,
        column,
        message,
    }
}
