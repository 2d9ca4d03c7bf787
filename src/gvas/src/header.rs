//! Container header records
//!
//! ## Header Layout
//!
//! - Bytes 0-3: "GVAS" magic
//! - Bytes 4-7: Save game version (`i32`)
//! - Bytes 8-11: Package version (`i32`)
//! - Engine version: major/minor/patch (`u16` each), build (`u32`), build id (string)
//! - Custom format block: version (`i32`), entry count (`i32`), entries

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::codec::{Reader, Writer};
use crate::object::Serializable;
use crate::{Error, Result};

/// Magic bytes for GVAS containers: "GVAS"
pub const GVAS_MAGIC: [u8; 4] = *b"GVAS";

/// Engine build identity embedded in the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub build: u32,
    #[serde(deserialize_with = "Option::deserialize")]
    pub build_id: Option<String>,
}

impl Serializable for EngineVersion {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            major: reader.read_u16()?,
            minor: reader.read_u16()?,
            patch: reader.read_u16()?,
            build: reader.read_u32()?,
            build_id: reader.read_string()?,
        })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.write_u16(self.major);
        writer.write_u16(self.minor);
        writer.write_u16(self.patch);
        writer.write_u32(self.build);
        writer.write_string(self.build_id.as_deref())
    }
}

/// One capability/version tag in the custom-format block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFormatEntry {
    pub id: Uuid,
    pub value: i32,
}

impl Serializable for CustomFormatEntry {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            id: reader.read_uuid()?,
            value: reader.read_i32()?,
        })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.write_uuid(&self.id);
        writer.write_i32(self.value);
        Ok(())
    }
}

/// Versioned list of custom-format entries
///
/// The on-disk entry count is always `entries.len()`; it is never stored
/// separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFormatBlock {
    pub version: i32,
    pub entries: Vec<CustomFormatEntry>,
}

impl Serializable for CustomFormatBlock {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            version: reader.read_i32()?,
            entries: reader.read_object_list()?,
        })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.write_i32(self.version);
        writer.write_object_list(&self.entries)
    }
}

/// Fixed container header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(with = "magic")]
    pub magic: [u8; 4],
    pub save_game_version: i32,
    pub package_version: i32,
    pub engine_version: EngineVersion,
    pub custom_format: CustomFormatBlock,
}

impl Header {
    pub fn new(
        save_game_version: i32,
        package_version: i32,
        engine_version: EngineVersion,
        custom_format: CustomFormatBlock,
    ) -> Self {
        Self {
            magic: GVAS_MAGIC,
            save_game_version,
            package_version,
            engine_version,
            custom_format,
        }
    }

    /// Encoded size of the header in bytes
    pub fn encoded_len(&self) -> usize {
        let build_id = self.engine_version.build_id.as_deref();
        let engine = 2 + 2 + 2 + 4 + crate::codec::string_len(build_id);
        let custom = 4 + 4 + self.custom_format.entries.len() * (16 + 4);
        4 + 4 + 4 + engine + custom
    }
}

impl Serializable for Header {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let magic = reader.read_tag()?;
        if magic != GVAS_MAGIC {
            return Err(Error::BadMagic(magic));
        }

        Ok(Self {
            magic,
            save_game_version: reader.read_i32()?,
            package_version: reader.read_i32()?,
            engine_version: reader.read_object()?,
            custom_format: reader.read_object()?,
        })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.write_bytes(&GVAS_MAGIC);
        writer.write_i32(self.save_game_version);
        writer.write_i32(self.package_version);
        writer.write_object(&self.engine_version)?;
        writer.write_object(&self.custom_format)
    }
}

/// Serde adapter writing the magic as its 4-character text
mod magic {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(
        magic: &[u8; 4],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(magic))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<[u8; 4], D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.as_bytes() != GVAS_MAGIC {
            return Err(D::Error::custom(format!(
                "invalid magic '{}', expected 'GVAS'",
                text
            )));
        }
        Ok(GVAS_MAGIC)
    }
}
