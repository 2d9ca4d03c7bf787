//! GVAS document decoding and encoding
//!
//! ## Container Layout
//!
//! - Header (magic, versions, engine version, custom formats)
//! - Save game type (string, may be null)
//! - Properties, back to back, with no count or terminator in the stream
//! - Tail: every remaining byte, kept verbatim
//!
//! Where the property list stops is chosen by the caller through
//! [`PropertyBoundary`]. Anything after it lands in the tail, so properties the
//! registry cannot parse yet still survive a round trip untouched.

use crate::codec::{string_len, Reader, Writer};
use crate::header::Header;
use crate::property::Property;
use crate::{json, Error, Result};

/// Where the property list ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyBoundary {
    /// Decode exactly this many properties
    Count(usize),
    /// Decode properties until the cursor reaches this absolute byte offset
    Offset(usize),
}

/// A decoded GVAS container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    header: Header,
    save_game_type: Option<String>,
    properties: Vec<Property>,
    tail: Vec<u8>,
}

impl Document {
    pub fn new(
        header: Header,
        save_game_type: Option<String>,
        properties: Vec<Property>,
        tail: Vec<u8>,
    ) -> Self {
        Self {
            header,
            save_game_type,
            properties,
            tail,
        }
    }

    /// Decode a container from an in-memory buffer
    ///
    /// Fails on the first error; no partial document is returned.
    pub fn decode(data: &[u8], boundary: PropertyBoundary) -> Result<Self> {
        let mut reader = Reader::new(data);

        let header: Header = reader.read_object()?;
        let save_game_type = reader.read_string()?;
        let properties = read_properties(&mut reader, boundary)?;
        let tail = reader.read_to_end();

        Ok(Self {
            header,
            save_game_type,
            properties,
            tail,
        })
    }

    /// Encode the document back to container bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::with_capacity(self.header.encoded_len() + self.tail.len());

        writer.write_object(&self.header)?;
        writer.write_string(self.save_game_type.as_deref())?;
        for property in &self.properties {
            writer.write_object(property)?;
        }
        writer.write_bytes(&self.tail);

        Ok(writer.into_bytes())
    }

    /// Encoded size of the whole container in bytes
    pub fn encoded_len(&self) -> Result<usize> {
        let mut total = self.header.encoded_len() + string_len(self.save_game_type.as_deref());
        for property in &self.properties {
            total += property.encoded_len()?;
        }
        Ok(total + self.tail.len())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn save_game_type(&self) -> Option<&str> {
        self.save_game_type.as_deref()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Unparsed bytes after the property list
    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    /// First property with the given name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Same document with its property list replaced
    pub fn with_properties(self, properties: Vec<Property>) -> Self {
        Self { properties, ..self }
    }

    /// Same document with its tail replaced
    pub fn with_tail(self, tail: Vec<u8>) -> Self {
        Self { tail, ..self }
    }

    /// Export to JSON text
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        json::to_string(self, pretty)
    }

    /// Import from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        json::from_str(text)
    }
}

fn read_properties(reader: &mut Reader<'_>, boundary: PropertyBoundary) -> Result<Vec<Property>> {
    match boundary {
        PropertyBoundary::Count(count) => {
            let mut properties = Vec::new();
            for _ in 0..count {
                properties.push(reader.read_object()?);
            }
            Ok(properties)
        }
        PropertyBoundary::Offset(end) => {
            if end > reader.buffer_len() {
                return Err(Error::TruncatedInput {
                    needed: end.saturating_sub(reader.position()),
                    available: reader.remaining(),
                });
            }

            let mut properties = Vec::new();
            while reader.position() < end {
                properties.push(reader.read_object()?);
            }

            if reader.position() > end {
                return Err(Error::LengthMismatch {
                    declared: end as i64,
                    actual: reader.position() as i64,
                });
            }
            Ok(properties)
        }
    }
}

/// Decode a container from an in-memory buffer
pub fn decode(data: &[u8], boundary: PropertyBoundary) -> Result<Document> {
    Document::decode(data, boundary)
}

/// Encode a document to container bytes
pub fn encode(document: &Document) -> Result<Vec<u8>> {
    document.encode()
}
