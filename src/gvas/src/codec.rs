//! Primitive codec for GVAS containers
//!
//! Fixed-width little-endian integers, length-prefixed strings, GUIDs and
//! single-byte terminators. The reader walks a forward-only cursor over a
//! borrowed buffer; the writer appends to an owned byte vector.
//!
//! ## String layout
//!
//! - Bytes 0-3: `i32` length (0 = null string)
//! - Bytes 4+: `length` bytes of UTF-8 text, the last one being `0x00`

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};
use uuid::Uuid;

use crate::{Error, Result};

/// Forward-only reader over an in-memory container
pub struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current byte offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Total length of the underlying buffer
    pub fn buffer_len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    /// Bytes left between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buffer_len().saturating_sub(self.position())
    }

    /// Check if the cursor has reached the end of the buffer
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail with `TruncatedInput` unless `needed` more bytes are available
    pub fn ensure(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(Error::TruncatedInput { needed, available });
        }
        Ok(())
    }

    fn read_fixed<T>(
        &mut self,
        width: usize,
        read: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
    ) -> Result<T> {
        self.ensure(width)?;
        let available = self.remaining();
        read(&mut self.cursor).map_err(|_| Error::TruncatedInput {
            needed: width,
            available,
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_fixed(1, |c| c.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_fixed(2, |c| c.read_u16::<LittleEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_fixed(4, |c| c.read_u32::<LittleEndian>())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_fixed(8, |c| c.read_u64::<LittleEndian>())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_fixed(4, |c| c.read_i32::<LittleEndian>())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_fixed(8, |c| c.read_i64::<LittleEndian>())
    }

    /// Read exactly `count` raw bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.read_fixed(count, |c| {
            let mut buf = vec![0u8; count];
            c.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    /// Read a 4-byte tag such as the container magic
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        self.read_fixed(4, |c| {
            let mut tag = [0u8; 4];
            c.read_exact(&mut tag)?;
            Ok(tag)
        })
    }

    /// Read a length-prefixed, null-terminated string (`None` for length 0)
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let length = self.read_i32()?;
        if length == 0 {
            return Ok(None);
        }
        if length < 0 {
            return Err(Error::InvalidStringLength(length));
        }

        let mut bytes = self.read_bytes(length as usize)?;
        if bytes.pop() != Some(0) {
            return Err(Error::UnterminatedString);
        }

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| Error::InvalidUtf8)
    }

    /// Read a string that must not be null, naming the field on failure
    pub fn read_required_string(&mut self, field: &'static str) -> Result<String> {
        self.read_string()?.ok_or(Error::NullField(field))
    }

    /// Read a 16-byte GUID in little-endian field order
    pub fn read_uuid(&mut self) -> Result<Uuid> {
        self.read_fixed(16, |c| {
            let mut bytes = [0u8; 16];
            c.read_exact(&mut bytes)?;
            Ok(Uuid::from_bytes_le(bytes))
        })
    }

    /// Read one padding byte that must be `0x00`
    pub fn read_terminator(&mut self) -> Result<()> {
        match self.read_u8()? {
            0 => Ok(()),
            other => Err(Error::MalformedTerminator(other)),
        }
    }

    /// Read everything from the cursor to the end of the buffer
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let start = self.position().min(self.buffer_len());
        let rest = self.cursor.get_ref()[start..].to_vec();
        self.cursor.set_position(self.buffer_len() as u64);
        rest
    }
}

/// Append-only writer producing container bytes
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Write a length-prefixed string with one trailing null byte
    ///
    /// `None` is written as a zero length with no payload.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        let Some(text) = value else {
            self.write_i32(0);
            return Ok(());
        };

        let length = i32::try_from(text.len() + 1)
            .map_err(|_| Error::InvalidLength(text.len() as i64 + 1))?;
        self.write_i32(length);
        self.buf.extend_from_slice(text.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    /// Write a 16-byte GUID in little-endian field order
    pub fn write_uuid(&mut self, value: &Uuid) {
        self.buf.extend_from_slice(&value.to_bytes_le());
    }

    pub fn write_terminator(&mut self) {
        self.buf.push(0);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Number of bytes `Writer::write_string` produces for `value`
pub fn string_len(value: Option<&str>) -> usize {
    match value {
        Some(text) => 4 + text.len() + 1,
        None => 4,
    }
}
