//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::types::ChunkType;

/// Error type for library
///
/// Every structural failure aborts the whole decode call, no partially decoded
/// table is ever returned alongside an error.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input is not laid out like a resource table
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    /// A field read needs more bytes than remain in the input
    #[error("needed {needed} bytes at offset {offset:#x} but only {available} remain")]
    #[diagnostic(
        code(apkres_arsc::truncated_input),
        help("the file is probably cut short or one of its size fields is wrong")
    )]
    TruncatedInput {
        /// Absolute offset of the read within the buffer handed to the decoder
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes left from `offset`
        available: usize,
    },

    /// UTF-16 string data could not be transcoded
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),
}

/// Structural problems with otherwise readable chunks
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// expected a {expected} chunk but found {found}
    #[error("expected a {expected} chunk but found {found}")]
    #[diagnostic(code(apkres_arsc::wrong_chunk_type))]
    WrongChunkType {
        /// The chunk kind required at this position
        expected: ChunkType,
        /// The chunk kind actually present
        found: ChunkType,
    },

    /// declared size {declared} does not match {actual}
    #[error("declared size {declared} does not match {actual}")]
    #[diagnostic(code(apkres_arsc::size_mismatch))]
    SizeMismatch {
        /// Size written in the chunk header
        declared: u64,
        /// Size the header is checked against
        actual: u64,
    },
}

/// Problems transcoding UTF-16 code units
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// unpaired surrogate {unit:#06x}
    #[error("unpaired surrogate {unit:#06x}")]
    #[diagnostic(code(apkres_arsc::invalid_surrogate))]
    InvalidSurrogate {
        /// The offending code unit
        unit: u16,
    },

    /// UTF-16 data of {length} bytes is not a whole number of code units
    #[error("UTF-16 data of {length} bytes is not a whole number of code units")]
    #[diagnostic(code(apkres_arsc::odd_byte_length))]
    OddByteLength {
        /// Length of the rejected byte sequence
        length: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
