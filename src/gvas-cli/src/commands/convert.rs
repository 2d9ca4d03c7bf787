//! Decode, encode, verify and info command handlers

use anyhow::{bail, Context, Result};
use gvas::{Document, PropertyBoundary, PropertyValue};
use std::path::Path;

use crate::cli::BoundaryArgs;
use crate::config::Config;
use crate::file_io::{read_json, read_save, write_json, write_save};

/// Pick the property boundary: explicit offset, then explicit count, then config
pub fn resolve_boundary(args: &BoundaryArgs, config: &Config) -> PropertyBoundary {
    if let Some(offset) = args.until_offset {
        return PropertyBoundary::Offset(offset);
    }
    PropertyBoundary::Count(args.property_count.unwrap_or_else(|| config.property_count()))
}

fn load_document(input: &Path, boundary: PropertyBoundary) -> Result<(Vec<u8>, Document)> {
    let data = read_save(input)?;
    let document = Document::decode(&data, boundary)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    tracing::debug!(
        bytes = data.len(),
        properties = document.properties().len(),
        tail = document.tail().len(),
        "decoded container"
    );
    Ok((data, document))
}

/// Handle `decode` command
pub fn decode(
    input: &Path,
    output: Option<&Path>,
    boundary: &BoundaryArgs,
    pretty: bool,
) -> Result<()> {
    let config = Config::load()?;
    decode_with(input, output, boundary, pretty, &config)
}

fn decode_with(
    input: &Path,
    output: Option<&Path>,
    boundary: &BoundaryArgs,
    pretty: bool,
    config: &Config,
) -> Result<()> {
    let (_, document) = load_document(input, resolve_boundary(boundary, config))?;

    let json = document
        .to_json(pretty || config.pretty())
        .context("Failed to export JSON")?;
    write_json(output, &json)?;

    if let Some(path) = output {
        tracing::info!(
            "Decoded {} property(ies) to {}",
            document.properties().len(),
            path.display()
        );
    }
    Ok(())
}

/// Handle `encode` command
pub fn encode(input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let text = read_json(input)?;
    let document = Document::from_json(&text).context("Failed to import JSON")?;
    let bytes = document.encode().context("Failed to encode save file")?;

    write_save(output, &bytes)?;

    if let Some(path) = output {
        tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}

/// Handle `verify` command
pub fn verify(input: &Path, boundary: &BoundaryArgs) -> Result<()> {
    let config = Config::load()?;
    let (data, document) = load_document(input, resolve_boundary(boundary, &config))?;
    check_roundtrip(&data, &document)?;

    println!(
        "OK: {} ({} bytes, {} property(ies), {} tail bytes)",
        input.display(),
        data.len(),
        document.properties().len(),
        document.tail().len()
    );
    Ok(())
}

fn check_roundtrip(data: &[u8], document: &Document) -> Result<()> {
    let encoded = document.encode().context("Failed to re-encode")?;
    if let Some(offset) = first_difference(data, &encoded) {
        bail!("Re-encoded bytes differ from input at offset {:#x}", offset);
    }

    let json = document.to_json(false).context("Failed to export JSON")?;
    let imported = Document::from_json(&json).context("Failed to re-import JSON")?;
    let reencoded = imported.encode().context("Failed to encode imported JSON")?;
    if let Some(offset) = first_difference(data, &reencoded) {
        bail!("JSON round trip differs from input at offset {:#x}", offset);
    }

    tracing::debug!("byte and JSON round trips match");
    Ok(())
}

/// Offset of the first differing byte, counting a length difference as one
pub fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then_some(a.len().min(b.len())))
}

/// Handle `info` command
pub fn info(input: &Path, boundary: &BoundaryArgs) -> Result<()> {
    let config = Config::load()?;
    let (data, document) = load_document(input, resolve_boundary(boundary, &config))?;
    let header = document.header();
    let engine = &header.engine_version;

    println!("File: {} ({} bytes)", input.display(), data.len());
    println!("Save game version: {}", header.save_game_version);
    println!("Package version: {}", header.package_version);
    println!(
        "Engine: {}.{}.{} build {} ({})",
        engine.major,
        engine.minor,
        engine.patch,
        engine.build,
        engine.build_id.as_deref().unwrap_or("null")
    );
    println!(
        "Custom format: version {}, {} entries",
        header.custom_format.version,
        header.custom_format.entries.len()
    );
    println!("Save game type: {}", document.save_game_type().unwrap_or("null"));
    println!();

    println!("Properties ({}):", document.properties().len());
    for property in document.properties() {
        println!(
            "  {:<24} {:<16} len={:<6} {}",
            property.name(),
            property.type_tag(),
            property.declared_length(),
            describe_value(property.value())
        );
    }
    println!();
    println!("Tail: {} bytes", document.tail().len());

    Ok(())
}

/// One-line summary of a property value
fn describe_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::UInt32(v) => v.to_string(),
        PropertyValue::ByteBlob(bytes) if bytes.len() <= 16 => hex::encode(bytes),
        PropertyValue::ByteBlob(bytes) => {
            format!("{}... ({} bytes)", hex::encode(&bytes[..16]), bytes.len())
        }
        PropertyValue::Array {
            element_type_tag,
            elements,
        } => format!("[{}; {}]", element_type_tag, elements.len()),
        PropertyValue::Unsupported(tag) => format!("<unsupported {}>", tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gvas::{CustomFormatBlock, EngineVersion, Header, Property, UINT32_PROPERTY};
    use std::fs;
    use tempfile::tempdir;

    fn sample_document() -> Document {
        let header = Header::new(
            3,
            522,
            EngineVersion {
                major: 4,
                minor: 27,
                patch: 2,
                build: 0,
                build_id: Some("++UE4+Release-4.27".to_string()),
            },
            CustomFormatBlock {
                version: 3,
                entries: Vec::new(),
            },
        );
        Document::new(
            header,
            Some("/Script/Game.SaveGame".to_string()),
            vec![
                Property::uint32("Level", 7),
                Property::bytes("Blob", vec![1, 2, 3]),
            ],
            vec![0xaa, 0xbb],
        )
    }

    #[test]
    fn test_resolve_boundary_precedence() {
        let mut config = Config::default();
        let mut args = BoundaryArgs::default();
        assert_eq!(resolve_boundary(&args, &config), PropertyBoundary::Count(2));

        config.set_property_count(5);
        assert_eq!(resolve_boundary(&args, &config), PropertyBoundary::Count(5));

        args.property_count = Some(1);
        assert_eq!(resolve_boundary(&args, &config), PropertyBoundary::Count(1));

        args.property_count = None;
        args.until_offset = Some(0x40);
        assert_eq!(resolve_boundary(&args, &config), PropertyBoundary::Offset(0x40));
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(b"abc", b"abc"), None);
        assert_eq!(first_difference(b"abc", b"abd"), Some(2));
        assert_eq!(first_difference(b"abc", b"ab"), Some(2));
        assert_eq!(first_difference(b"", b"a"), Some(0));
    }

    #[test]
    fn test_decode_then_encode_files() {
        let dir = tempdir().unwrap();
        let sav = dir.path().join("in.sav");
        let json = dir.path().join("out.json");
        let rebuilt = dir.path().join("rebuilt.sav");

        let bytes = sample_document().encode().unwrap();
        fs::write(&sav, &bytes).unwrap();

        decode_with(
            &sav,
            Some(&json),
            &BoundaryArgs::default(),
            true,
            &Config::default(),
        )
        .unwrap();
        let text = fs::read_to_string(&json).unwrap();
        assert!(text.contains(UINT32_PROPERTY));

        encode(Some(&json), Some(&rebuilt)).unwrap();
        assert_eq!(fs::read(&rebuilt).unwrap(), bytes);
    }

    #[test]
    fn test_decode_reports_bad_magic() {
        let dir = tempdir().unwrap();
        let sav = dir.path().join("bad.sav");
        fs::write(&sav, b"NOPE\x00\x00\x00\x00").unwrap();

        let err = decode_with(
            &sav,
            Some(&dir.path().join("out.json")),
            &BoundaryArgs::default(),
            false,
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to decode"));
    }

    #[test]
    fn test_check_roundtrip() {
        let document = sample_document();
        let bytes = document.encode().unwrap();
        let decoded = Document::decode(&bytes, PropertyBoundary::Count(2)).unwrap();
        assert!(check_roundtrip(&bytes, &decoded).is_ok());

        let mut altered = bytes.clone();
        altered.push(0);
        assert!(check_roundtrip(&altered, &decoded).is_err());
    }

    #[test]
    fn test_describe_value() {
        assert_eq!(describe_value(&PropertyValue::UInt32(9)), "9");
        assert_eq!(describe_value(&PropertyValue::ByteBlob(vec![0xbe, 0xef])), "beef");
        assert!(describe_value(&PropertyValue::ByteBlob(vec![0; 20])).ends_with("(20 bytes)"));
        assert_eq!(
            describe_value(&PropertyValue::Array {
                element_type_tag: UINT32_PROPERTY.to_string(),
                elements: vec![PropertyValue::UInt32(1)],
            }),
            "[UInt32Property; 1]"
        );
    }
}
