//! Property type registry
//!
//! Properties are self-describing: a name, a type tag, a declared byte length
//! and a payload whose layout depends on the tag. Each supported tag maps to a
//! strategy in a static table; adding a type means adding one entry here.
//!
//! ## Property Layout
//!
//! - Name (string)
//! - Type tag (string)
//! - Declared length (`i64`)
//! - Payload
//!
//! ## Payloads
//!
//! | Tag              | Payload                                                   |
//! |------------------|-----------------------------------------------------------|
//! | `UInt32Property` | terminator, `u32` (always 5 bytes)                        |
//! | `ByteProperty`   | `declared_length` raw bytes (one byte as array element)   |
//! | `ArrayProperty`  | element tag (string), terminator, `i32` count, elements   |
//!
//! Array elements carry no name, tag or length of their own. `MapProperty`
//! and every other tag fail with `UnsupportedPropertyType`: without a
//! strategy the payload length cannot be known.
//!
//! Arrays may hold arrays, up to [`MAX_ARRAY_DEPTH`] levels counting the
//! outermost one. Deeper values fail with `NestingTooDeep` in every
//! direction (decode, encode, JSON export and import).

use phf::phf_map;
use serde_json::{json, Value};

use crate::codec::{string_len, Reader, Writer};
use crate::object::Serializable;
use crate::{Error, Result};

pub const UINT32_PROPERTY: &str = "UInt32Property";
pub const BYTE_PROPERTY: &str = "ByteProperty";
pub const ARRAY_PROPERTY: &str = "ArrayProperty";

/// Deepest array-of-array nesting accepted, keeping the JSON form within
/// `serde_json`'s recursion limit
pub const MAX_ARRAY_DEPTH: usize = 32;

/// Decoded payload of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    UInt32(u32),
    ByteBlob(Vec<u8>),
    Array {
        element_type_tag: String,
        elements: Vec<PropertyValue>,
    },
    /// A tag with no registered strategy; never produced by decoding and
    /// rejected by encoding
    Unsupported(String),
}

impl PropertyValue {
    /// Type tag this value is written under
    pub fn type_tag(&self) -> &str {
        match self {
            Self::UInt32(_) => UINT32_PROPERTY,
            Self::ByteBlob(_) => BYTE_PROPERTY,
            Self::Array { .. } => ARRAY_PROPERTY,
            Self::Unsupported(tag) => tag,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::UInt32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteBlob(blob) => Some(blob),
            _ => None,
        }
    }

    /// Element tag and elements of an array value
    pub fn as_array(&self) -> Option<(&str, &[PropertyValue])> {
        match self {
            Self::Array {
                element_type_tag,
                elements,
            } => Some((element_type_tag, elements)),
            _ => None,
        }
    }

    /// Bytes the payload occupies on disk
    pub fn payload_len(&self) -> Result<usize> {
        (strategy_for(self)?.payload_len)(self, 0)
    }

    pub(crate) fn to_json(&self) -> Result<Value> {
        (strategy_for(self)?.to_json)(self, 0)
    }

    pub(crate) fn from_json(type_tag: &str, value: &Value) -> Result<Self> {
        (json_strategy(type_tag)?.from_json)(value, 0)
    }
}

/// One named, typed entry in a container's property list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    declared_length: i64,
    value: PropertyValue,
}

impl Property {
    /// Build a property with an explicit declared length
    ///
    /// The type tag is taken from the value.
    pub fn new(name: impl Into<String>, declared_length: i64, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            declared_length,
            value,
        }
    }

    /// `UInt32Property` with the engine's declared length of 4
    pub fn uint32(name: impl Into<String>, value: u32) -> Self {
        Self::new(name, 4, PropertyValue::UInt32(value))
    }

    /// `ByteProperty` whose declared length is the blob length
    pub fn bytes(name: impl Into<String>, blob: Vec<u8>) -> Self {
        let declared_length = blob.len() as i64;
        Self::new(name, declared_length, PropertyValue::ByteBlob(blob))
    }

    /// `ArrayProperty` with the declared length covering the count and elements
    pub fn array(
        name: impl Into<String>,
        element_type_tag: impl Into<String>,
        elements: Vec<PropertyValue>,
    ) -> Result<Self> {
        let element_type_tag = element_type_tag.into();
        let element = strategy(&element_type_tag)?;

        let mut declared_length = 4;
        for item in &elements {
            if item.type_tag() != element_type_tag {
                return Err(mismatch(&element_type_tag, item));
            }
            declared_length += (element.payload_len)(item, 1)? as i64;
        }

        Ok(Self::new(
            name,
            declared_length,
            PropertyValue::Array {
                element_type_tag,
                elements,
            },
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        self.value.type_tag()
    }

    pub fn declared_length(&self) -> i64 {
        self.declared_length
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Encoded size of the whole property in bytes
    pub fn encoded_len(&self) -> Result<usize> {
        let header = string_len(Some(&self.name)) + string_len(Some(self.type_tag())) + 8;
        Ok(header + self.value.payload_len()?)
    }
}

impl Serializable for Property {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let name = reader.read_required_string("name")?;
        let type_tag = reader.read_required_string("type_tag")?;
        let declared_length = reader.read_i64()?;

        let strategy = strategy(&type_tag)?;
        let value = (strategy.decode)(reader, PayloadLength::Declared(declared_length))?;

        Ok(Self {
            name,
            declared_length,
            value,
        })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        let strategy = strategy_for(&self.value)?;

        writer.write_string(Some(&self.name))?;
        writer.write_string(Some(self.type_tag()))?;
        writer.write_i64(self.declared_length);
        (strategy.encode)(
            &self.value,
            PayloadLength::Declared(self.declared_length),
            writer,
        )
    }
}

/// How many payload bytes a strategy may assume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadLength {
    /// Top-level property with its declared length
    Declared(i64),
    /// Array element (no length of its own) inside `depth` levels of arrays
    Element { depth: usize },
}

impl PayloadLength {
    fn depth(self) -> usize {
        match self {
            Self::Declared(_) => 0,
            Self::Element { depth } => depth,
        }
    }
}

/// Decode/encode functions for one property type
struct Strategy {
    decode: fn(&mut Reader<'_>, PayloadLength) -> Result<PropertyValue>,
    encode: fn(&PropertyValue, PayloadLength, &mut Writer) -> Result<()>,
    payload_len: fn(&PropertyValue, usize) -> Result<usize>,
    to_json: fn(&PropertyValue, usize) -> Result<Value>,
    from_json: fn(&Value, usize) -> Result<PropertyValue>,
}

static STRATEGIES: phf::Map<&'static str, Strategy> = phf_map! {
    "UInt32Property" => Strategy {
        decode: decode_uint32,
        encode: encode_uint32,
        payload_len: uint32_len,
        to_json: uint32_to_json,
        from_json: uint32_from_json,
    },
    "ByteProperty" => Strategy {
        decode: decode_byte,
        encode: encode_byte,
        payload_len: byte_len,
        to_json: byte_to_json,
        from_json: byte_from_json,
    },
    "ArrayProperty" => Strategy {
        decode: decode_array,
        encode: encode_array,
        payload_len: array_len,
        to_json: array_to_json,
        from_json: array_from_json,
    },
};

/// Check if a type tag has a registered strategy
pub fn is_registered(type_tag: &str) -> bool {
    STRATEGIES.contains_key(type_tag)
}

/// All type tags with a registered strategy
pub fn registered_tags() -> impl Iterator<Item = &'static str> {
    STRATEGIES.keys().copied()
}

fn strategy(type_tag: &str) -> Result<&'static Strategy> {
    STRATEGIES
        .get(type_tag)
        .ok_or_else(|| Error::UnsupportedPropertyType(type_tag.to_string()))
}

fn strategy_for(value: &PropertyValue) -> Result<&'static Strategy> {
    match value {
        PropertyValue::Unsupported(tag) => Err(Error::UnsupportedPropertyType(tag.clone())),
        other => strategy(other.type_tag()),
    }
}

/// Strategy lookup for imported JSON, where an unknown tag is a document error
fn json_strategy(type_tag: &str) -> Result<&'static Strategy> {
    strategy(type_tag)
        .map_err(|_| Error::MalformedDocument(format!("unknown type tag '{}'", type_tag)))
}

fn mismatch(expected: &str, found: &PropertyValue) -> Error {
    Error::ElementTypeMismatch {
        expected: expected.to_string(),
        found: found.type_tag().to_string(),
    }
}

fn malformed(what: impl Into<String>) -> Error {
    Error::MalformedDocument(what.into())
}

/// Depth of an array nested inside `depth` levels of arrays
fn enter_array(depth: usize) -> Result<usize> {
    let depth = depth + 1;
    if depth > MAX_ARRAY_DEPTH {
        return Err(Error::NestingTooDeep(MAX_ARRAY_DEPTH));
    }
    Ok(depth)
}

// UInt32Property

fn decode_uint32(reader: &mut Reader<'_>, _length: PayloadLength) -> Result<PropertyValue> {
    reader.read_terminator()?;
    Ok(PropertyValue::UInt32(reader.read_u32()?))
}

fn encode_uint32(value: &PropertyValue, _length: PayloadLength, writer: &mut Writer) -> Result<()> {
    let PropertyValue::UInt32(number) = value else {
        return Err(mismatch(UINT32_PROPERTY, value));
    };
    writer.write_terminator();
    writer.write_u32(*number);
    Ok(())
}

fn uint32_len(value: &PropertyValue, _depth: usize) -> Result<usize> {
    value
        .as_u32()
        .map(|_| 1 + 4)
        .ok_or_else(|| mismatch(UINT32_PROPERTY, value))
}

fn uint32_to_json(value: &PropertyValue, _depth: usize) -> Result<Value> {
    value
        .as_u32()
        .map(|number| json!(number))
        .ok_or_else(|| mismatch(UINT32_PROPERTY, value))
}

fn uint32_from_json(value: &Value, _depth: usize) -> Result<PropertyValue> {
    value
        .as_u64()
        .and_then(|number| u32::try_from(number).ok())
        .map(PropertyValue::UInt32)
        .ok_or_else(|| malformed(format!("expected a u32 value, got {}", value)))
}

// ByteProperty

fn decode_byte(reader: &mut Reader<'_>, length: PayloadLength) -> Result<PropertyValue> {
    let count = match length {
        PayloadLength::Declared(declared) => {
            usize::try_from(declared).map_err(|_| Error::InvalidLength(declared))?
        }
        PayloadLength::Element { .. } => 1,
    };
    Ok(PropertyValue::ByteBlob(reader.read_bytes(count)?))
}

fn encode_byte(value: &PropertyValue, length: PayloadLength, writer: &mut Writer) -> Result<()> {
    let PropertyValue::ByteBlob(blob) = value else {
        return Err(mismatch(BYTE_PROPERTY, value));
    };

    let expected = match length {
        PayloadLength::Declared(declared) => declared,
        PayloadLength::Element { .. } => 1,
    };
    if expected != blob.len() as i64 {
        return Err(Error::LengthMismatch {
            declared: expected,
            actual: blob.len() as i64,
        });
    }

    writer.write_bytes(blob);
    Ok(())
}

fn byte_len(value: &PropertyValue, _depth: usize) -> Result<usize> {
    value
        .as_bytes()
        .map(<[u8]>::len)
        .ok_or_else(|| mismatch(BYTE_PROPERTY, value))
}

fn byte_to_json(value: &PropertyValue, _depth: usize) -> Result<Value> {
    value
        .as_bytes()
        .map(|blob| Value::String(hex::encode(blob)))
        .ok_or_else(|| mismatch(BYTE_PROPERTY, value))
}

fn byte_from_json(value: &Value, depth: usize) -> Result<PropertyValue> {
    let text = value
        .as_str()
        .ok_or_else(|| malformed(format!("expected a hex string, got {}", value)))?;
    let blob =
        hex::decode(text).map_err(|e| malformed(format!("invalid hex in byte value: {}", e)))?;

    // Array elements are single raw bytes
    if depth > 0 && blob.len() != 1 {
        return Err(malformed(format!(
            "byte array element must be exactly one byte, got {}",
            blob.len()
        )));
    }
    Ok(PropertyValue::ByteBlob(blob))
}

// ArrayProperty

fn decode_array(reader: &mut Reader<'_>, length: PayloadLength) -> Result<PropertyValue> {
    let depth = enter_array(length.depth())?;
    let element_type_tag = reader.read_required_string("element_type_tag")?;
    reader.read_terminator()?;
    let count = reader.read_i32()?;
    let count = usize::try_from(count).map_err(|_| Error::InvalidLength(count.into()))?;

    let element = strategy(&element_type_tag)?;
    let mut elements = Vec::new();
    for _ in 0..count {
        elements.push((element.decode)(reader, PayloadLength::Element { depth })?);
    }

    Ok(PropertyValue::Array {
        element_type_tag,
        elements,
    })
}

fn encode_array(value: &PropertyValue, length: PayloadLength, writer: &mut Writer) -> Result<()> {
    let PropertyValue::Array {
        element_type_tag,
        elements,
    } = value
    else {
        return Err(mismatch(ARRAY_PROPERTY, value));
    };
    let depth = enter_array(length.depth())?;

    let element = strategy(element_type_tag)?;
    let count =
        i32::try_from(elements.len()).map_err(|_| Error::InvalidLength(elements.len() as i64))?;

    writer.write_string(Some(element_type_tag))?;
    writer.write_terminator();
    writer.write_i32(count);
    for item in elements {
        (element.encode)(item, PayloadLength::Element { depth }, writer)?;
    }
    Ok(())
}

fn array_len(value: &PropertyValue, depth: usize) -> Result<usize> {
    let (element_type_tag, elements) = value
        .as_array()
        .ok_or_else(|| mismatch(ARRAY_PROPERTY, value))?;
    let depth = enter_array(depth)?;

    let element = strategy(element_type_tag)?;
    let mut total = string_len(Some(element_type_tag)) + 1 + 4;
    for item in elements {
        total += (element.payload_len)(item, depth)?;
    }
    Ok(total)
}

fn array_to_json(value: &PropertyValue, depth: usize) -> Result<Value> {
    let (element_type_tag, elements) = value
        .as_array()
        .ok_or_else(|| mismatch(ARRAY_PROPERTY, value))?;
    let depth = enter_array(depth)?;

    let element = strategy(element_type_tag)?;
    let elements = elements
        .iter()
        .map(|item| (element.to_json)(item, depth))
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "element_type_tag": element_type_tag,
        "elements": elements,
    }))
}

fn array_from_json(value: &Value, depth: usize) -> Result<PropertyValue> {
    let depth = enter_array(depth)?;
    let element_type_tag = value
        .get("element_type_tag")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("array value is missing 'element_type_tag'"))?;
    let items = value
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("array value is missing 'elements'"))?;

    let element = json_strategy(element_type_tag)?;
    let elements = items
        .iter()
        .map(|item| (element.from_json)(item, depth))
        .collect::<Result<Vec<_>>>()?;

    Ok(PropertyValue::Array {
        element_type_tag: element_type_tag.to_string(),
        elements,
    })
}
