//! Crate-level error types

use thiserror::Error;

use crate::backend::BackendError;

/// Errors raised by malformed scene data.
///
/// All variants are fatal at build time: rendering cannot proceed on
/// malformed geometry, so nothing here survives into the frame loop.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("unsupported primitive type '{0}' in draw call")]
    UnsupportedPrimitiveType(String),
    #[error("unsupported index element size {0}, expected 2 or 4")]
    UnsupportedIndexSize(u32),
    #[error("unknown vertex attribute format '{0}'")]
    UnknownAttributeFormat(String),
    #[error("{context}: missing sequential key \"{index}\"")]
    NonContiguousSequence {
        context: &'static str,
        index: usize,
    },
    #[error("{0}: expected a sequence")]
    NotASequence(&'static str),
    #[error("{context}: missing field '{field}'")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },
    #[error("{context}: field '{field}' has an unexpected type")]
    InvalidField {
        context: &'static str,
        field: &'static str,
    },
    #[error("draw call references {kind} buffer {index}, mesh has {count}")]
    BufferIndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },
    #[error("skin material table has {table} entries, draw call {index} needs one")]
    SkinTableTooShort { table: usize, index: usize },
}

/// Union of everything that can go wrong while turning scene sources into
/// GPU-ready draw state.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
