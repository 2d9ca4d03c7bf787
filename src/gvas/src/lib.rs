//! # gvas
//!
//! Lossless codec for GVAS save-game containers.
//!
//! A container is a fixed header (magic, versions, engine build identity and a
//! list of custom-format tags), an optional save-game type string, a sequence
//! of self-describing properties, and a tail of bytes that is kept verbatim.
//!
//! This library provides functionality to:
//! - Decode a container from an in-memory byte buffer
//! - Encode a document back to the exact same bytes
//! - Export a document to JSON for editing, and import it again
//!
//! ## Example
//!
//! ```no_run
//! use gvas::{Document, PropertyBoundary};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("Save_0.sav")?;
//!
//! // The property list is not length-prefixed; the caller picks the boundary
//! let document = Document::decode(&bytes, PropertyBoundary::Count(2))?;
//! for property in document.properties() {
//!     println!("{} ({})", property.name(), property.type_tag());
//! }
//!
//! // Edit through JSON and write back
//! let json = document.to_json(true)?;
//! let edited = Document::from_json(&json)?;
//! assert_eq!(edited.encode()?, bytes);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod document;
pub mod header;
pub mod json;
pub mod object;
pub mod property;

// Re-export commonly used items
#[doc(inline)]
pub use codec::{Reader, Writer};
#[doc(inline)]
pub use document::{decode, encode, Document, PropertyBoundary};
#[doc(inline)]
pub use header::{CustomFormatBlock, CustomFormatEntry, EngineVersion, Header, GVAS_MAGIC};
#[doc(inline)]
pub use object::Serializable;
#[doc(inline)]
pub use property::{
    is_registered, registered_tags, Property, PropertyValue, ARRAY_PROPERTY, BYTE_PROPERTY,
    MAX_ARRAY_DEPTH, UINT32_PROPERTY,
};

/// Errors from decoding, encoding, or converting GVAS documents
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    #[error("Invalid GVAS magic: expected 'GVAS', got {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("Malformed terminator: expected 0x00, got 0x{0:02x}")]
    MalformedTerminator(u8),

    #[error("Unsupported property type: {0}")]
    UnsupportedPropertyType(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Invalid string length: {0}")]
    InvalidStringLength(i32),

    #[error("String is missing its null terminator")]
    UnterminatedString,

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("Required field '{0}' is null")]
    NullField(&'static str),

    #[error("Invalid length: {0}")]
    InvalidLength(i64),

    #[error("Length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch { declared: i64, actual: i64 },

    #[error("Element type mismatch: expected {expected}, found {found}")]
    ElementTypeMismatch { expected: String, found: String },

    #[error("Arrays nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
