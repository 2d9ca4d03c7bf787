//! JSON bridge for editing documents outside the binary format
//!
//! ## Shape
//!
//! ```json
//! {
//!   "header": { "magic": "GVAS", "save_game_version": 3, ... },
//!   "save_game_type": "/Script/Game.SaveGame",
//!   "properties": [
//!     { "name": "Level", "type_tag": "UInt32Property", "declared_length": 4, "value": 12 },
//!     { "name": "Blob", "type_tag": "ByteProperty", "declared_length": 2, "value": "beef" },
//!     { "name": "Ids", "type_tag": "ArrayProperty", "declared_length": 9,
//!       "value": { "element_type_tag": "UInt32Property", "elements": [1] } }
//!   ],
//!   "tail": "aabb"
//! }
//! ```
//!
//! Byte blobs and the tail are lowercase hex, so the JSON reproduces the
//! original container exactly. Every key is required; `null` is allowed only
//! where the binary format has a null string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::header::Header;
use crate::property::{Property, PropertyValue};
use crate::{Error, Result};

#[derive(Serialize, Deserialize)]
struct DocumentJson {
    header: Header,
    #[serde(deserialize_with = "Option::deserialize")]
    save_game_type: Option<String>,
    properties: Vec<PropertyJson>,
    tail: String,
}

#[derive(Serialize, Deserialize)]
struct PropertyJson {
    name: String,
    type_tag: String,
    declared_length: i64,
    value: Value,
}

impl PropertyJson {
    fn from_property(property: &Property) -> Result<Self> {
        Ok(Self {
            name: property.name().to_string(),
            type_tag: property.type_tag().to_string(),
            declared_length: property.declared_length(),
            value: property.value().to_json()?,
        })
    }

    fn into_property(self) -> Result<Property> {
        let value = PropertyValue::from_json(&self.type_tag, &self.value)
            .map_err(|e| in_property(&self.name, e))?;
        Ok(Property::new(self.name, self.declared_length, value))
    }
}

fn in_property(name: &str, error: Error) -> Error {
    match error {
        Error::MalformedDocument(msg) => {
            Error::MalformedDocument(format!("property '{}': {}", name, msg))
        }
        other => other,
    }
}

/// Convert a document to a JSON tree
pub fn to_value(document: &Document) -> Result<Value> {
    let shape = DocumentJson {
        header: document.header().clone(),
        save_game_type: document.save_game_type().map(str::to_string),
        properties: document
            .properties()
            .iter()
            .map(PropertyJson::from_property)
            .collect::<Result<_>>()?,
        tail: hex::encode(document.tail()),
    };
    serde_json::to_value(shape).map_err(|e| Error::MalformedDocument(e.to_string()))
}

/// Rebuild a document from a JSON tree
pub fn from_value(value: Value) -> Result<Document> {
    let shape: DocumentJson =
        serde_json::from_value(value).map_err(|e| Error::MalformedDocument(e.to_string()))?;

    let properties = shape
        .properties
        .into_iter()
        .map(PropertyJson::into_property)
        .collect::<Result<Vec<_>>>()?;
    let tail = hex::decode(&shape.tail)
        .map_err(|e| Error::MalformedDocument(format!("invalid hex in tail: {}", e)))?;

    Ok(Document::new(
        shape.header,
        shape.save_game_type,
        properties,
        tail,
    ))
}

/// Export a document as JSON text
pub fn to_string(document: &Document, pretty: bool) -> Result<String> {
    let value = to_value(document)?;
    let text = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    text.map_err(|e| Error::MalformedDocument(e.to_string()))
}

/// Import a document from JSON text
pub fn from_str(text: &str) -> Result<Document> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::MalformedDocument(e.to_string()))?;
    from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PropertyBoundary;
    use crate::header::{CustomFormatBlock, CustomFormatEntry, EngineVersion};
    use crate::property::{ARRAY_PROPERTY, BYTE_PROPERTY, MAX_ARRAY_DEPTH, UINT32_PROPERTY};
    use serde_json::json;
    use uuid::Uuid;

    fn sample_document() -> Document {
        let header = Header::new(
            2,
            517,
            EngineVersion {
                major: 4,
                minor: 25,
                patch: 0,
                build: 0,
                build_id: None,
            },
            CustomFormatBlock {
                version: 3,
                entries: vec![CustomFormatEntry {
                    id: Uuid::from_u128(0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10),
                    value: 5,
                }],
            },
        );
        let grid = Property::array(
            "Grid",
            ARRAY_PROPERTY,
            vec![
                PropertyValue::Array {
                    element_type_tag: BYTE_PROPERTY.to_string(),
                    elements: vec![
                        PropertyValue::ByteBlob(vec![1]),
                        PropertyValue::ByteBlob(vec![2]),
                    ],
                },
                PropertyValue::Array {
                    element_type_tag: BYTE_PROPERTY.to_string(),
                    elements: Vec::new(),
                },
            ],
        )
        .unwrap();

        Document::new(
            header,
            None,
            vec![
                Property::uint32("Level", 12),
                Property::bytes("Blob", vec![0xbe, 0xef]),
                grid,
            ],
            vec![0xaa, 0xbb],
        )
    }

    #[test]
    fn test_json_shape() {
        let value = to_value(&sample_document()).unwrap();
        assert_eq!(value["header"]["magic"], "GVAS");
        assert_eq!(
            value["header"]["custom_format"]["entries"][0]["id"],
            "01020304-0506-0708-090a-0b0c0d0e0f10"
        );
        assert_eq!(value["save_game_type"], Value::Null);
        assert_eq!(value["properties"][0]["type_tag"], UINT32_PROPERTY);
        assert_eq!(value["properties"][0]["value"], 12);
        assert_eq!(value["properties"][1]["value"], "beef");
        assert_eq!(
            value["properties"][2]["value"]["elements"][0]["element_type_tag"],
            BYTE_PROPERTY
        );
        assert_eq!(value["tail"], "aabb");
    }

    #[test]
    fn test_json_roundtrip_encodes_same_bytes() {
        let document = sample_document();
        let bytes = document.encode().unwrap();

        for pretty in [false, true] {
            let text = to_string(&document, pretty).unwrap();
            let imported = from_str(&text).unwrap();
            assert_eq!(imported, document);
            assert_eq!(imported.encode().unwrap(), bytes);
        }
    }

    #[test]
    fn test_json_roundtrip_from_decoded_bytes() {
        let bytes = sample_document().encode().unwrap();
        let decoded = Document::decode(&bytes, PropertyBoundary::Count(3)).unwrap();

        let imported = Document::from_json(&decoded.to_json(true).unwrap()).unwrap();
        assert_eq!(imported.encode().unwrap(), bytes);
    }

    #[test]
    fn test_missing_field() {
        let mut value = to_value(&sample_document()).unwrap();
        value.as_object_mut().unwrap().remove("tail");
        assert!(matches!(from_value(value), Err(Error::MalformedDocument(_))));

        let mut value = to_value(&sample_document()).unwrap();
        value.as_object_mut().unwrap().remove("save_game_type");
        assert!(matches!(from_value(value), Err(Error::MalformedDocument(_))));

        let mut value = to_value(&sample_document()).unwrap();
        value["properties"][0]
            .as_object_mut()
            .unwrap()
            .remove("declared_length");
        assert!(matches!(from_value(value), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_unknown_type_tag() {
        let mut value = to_value(&sample_document()).unwrap();
        value["properties"][0]["type_tag"] = json!("MapProperty");
        match from_value(value) {
            Err(Error::MalformedDocument(msg)) => {
                assert!(msg.contains("Level"), "{}", msg);
                assert!(msg.contains("MapProperty"), "{}", msg);
            }
            other => panic!("expected MalformedDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_tail_hex() {
        let mut value = to_value(&sample_document()).unwrap();
        value["tail"] = json!("abc");
        assert!(matches!(from_value(value), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_value_does_not_match_tag() {
        let mut value = to_value(&sample_document()).unwrap();
        value["properties"][0]["value"] = json!("beef");
        assert!(matches!(from_value(value), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_edited_value_is_encoded() {
        let mut value = to_value(&sample_document()).unwrap();
        value["properties"][0]["value"] = json!(13);

        let edited = from_value(value).unwrap();
        assert_eq!(
            edited.property("Level").and_then(|p| p.value().as_u32()),
            Some(13)
        );
        let bytes = edited.encode().unwrap();
        let reread = Document::decode(&bytes, PropertyBoundary::Count(3)).unwrap();
        assert_eq!(reread, edited);
    }

    #[test]
    fn test_unsupported_value_cannot_export() {
        let document = sample_document().with_properties(vec![Property::new(
            "Inventory",
            0,
            PropertyValue::Unsupported("MapProperty".to_string()),
        )]);
        assert!(matches!(
            to_value(&document),
            Err(Error::UnsupportedPropertyType(_))
        ));
    }

    #[test]
    fn test_deepest_nesting_roundtrips() {
        let mut value = PropertyValue::Array {
            element_type_tag: BYTE_PROPERTY.to_string(),
            elements: vec![PropertyValue::ByteBlob(vec![0x7f])],
        };
        for _ in 1..MAX_ARRAY_DEPTH - 1 {
            value = PropertyValue::Array {
                element_type_tag: ARRAY_PROPERTY.to_string(),
                elements: vec![value],
            };
        }
        let deep = Property::array("Deep", ARRAY_PROPERTY, vec![value]).unwrap();
        let bytes = sample_document()
            .with_properties(vec![deep])
            .encode()
            .unwrap();

        let decoded = Document::decode(&bytes, PropertyBoundary::Count(1)).unwrap();
        for pretty in [false, true] {
            let text = decoded.to_json(pretty).unwrap();
            let imported = Document::from_json(&text).unwrap();
            assert_eq!(imported, decoded);
            assert_eq!(imported.encode().unwrap(), bytes);
        }
    }

    #[test]
    fn test_malformed_json_text() {
        assert!(matches!(from_str("{"), Err(Error::MalformedDocument(_))));
    }
}
