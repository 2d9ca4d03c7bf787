//! Reading and writing save files and their JSON form
//!
//! JSON may come from stdin and go to stdout. Save-file bytes go to stdout
//! only when it is redirected; a terminal gets an error instead.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

/// Read a save file from disk
pub fn read_save(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read save file {}", path.display()))
}

/// Write save-file bytes to a file, or to stdout if it is not a terminal
pub fn write_save(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(p) => fs::write(p, data).with_context(|| format!("Failed to write {}", p.display())),
        None => {
            let stdout = io::stdout();
            let is_terminal = stdout.is_terminal();
            write_binary(&mut stdout.lock(), is_terminal, data)
        }
    }
}

fn write_binary(out: &mut impl Write, is_terminal: bool, data: &[u8]) -> Result<()> {
    if is_terminal {
        bail!("Refusing to write binary data to a terminal; use -o FILE or redirect stdout");
    }
    out.write_all(data).context("Failed to write to stdout")?;
    out.flush().context("Failed to flush stdout")
}

/// Read JSON text from a file, or stdin if path is None
pub fn read_json(path: Option<&Path>) -> Result<String> {
    let raw = match path {
        Some(p) => fs::read(p).with_context(|| format!("Failed to read {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    String::from_utf8(raw).context("JSON input is not valid UTF-8")
}

/// Write JSON text with a trailing newline to a file, or stdout if path is None
pub fn write_json(path: Option<&Path>, json: &str) -> Result<()> {
    let mut text = String::with_capacity(json.len() + 1);
    text.push_str(json);
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match path {
        Some(p) => fs::write(p, text).with_context(|| format!("Failed to write {}", p.display())),
        None => io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.sav");

        write_save(Some(&path), b"GVAS\x00\x01").unwrap();
        assert_eq!(read_save(&path).unwrap(), b"GVAS\x00\x01");
    }

    #[test]
    fn test_read_missing_save() {
        let dir = tempdir().unwrap();
        let err = read_save(&dir.path().join("missing.sav")).unwrap_err();
        assert!(err.to_string().contains("Failed to read save file"));
    }

    #[test]
    fn test_binary_refused_on_terminal() {
        let mut out = Vec::new();
        let err = write_binary(&mut out, true, b"GVAS").unwrap_err();
        assert!(err.to_string().contains("terminal"));
        assert!(out.is_empty());

        write_binary(&mut out, false, b"GVAS").unwrap();
        assert_eq!(out, b"GVAS");
    }

    #[test]
    fn test_json_gets_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(Some(&path), "{}").unwrap();
        assert_eq!(read_json(Some(&path)).unwrap(), "{}\n");
    }

    #[test]
    fn test_json_must_be_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, [0xff, 0xfe]).unwrap();

        let err = read_json(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
