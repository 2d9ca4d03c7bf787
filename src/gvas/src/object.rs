//! Shared calling convention for structured records
//!
//! Every composite record in a container (engine version, custom-format
//! entries, the header, properties) implements [`Serializable`], so records
//! can be nested and read back with one generic call.

use crate::codec::{Reader, Writer};
use crate::{Error, Result};

/// A record with a fixed on-disk layout
pub trait Serializable: Sized {
    /// Build the record from the bytes at the reader's cursor
    fn decode(reader: &mut Reader<'_>) -> Result<Self>;

    /// Append the record's bytes to the writer
    fn encode(&self, writer: &mut Writer) -> Result<()>;
}

impl Reader<'_> {
    /// Read one object of type `T`
    pub fn read_object<T: Serializable>(&mut self) -> Result<T> {
        T::decode(self)
    }

    /// Read an `i32` count followed by that many objects of type `T`
    pub fn read_object_list<T: Serializable>(&mut self) -> Result<Vec<T>> {
        let count = self.read_i32()?;
        let count = usize::try_from(count).map_err(|_| Error::InvalidLength(count.into()))?;

        let mut items = Vec::new();
        for _ in 0..count {
            items.push(self.read_object()?);
        }
        Ok(items)
    }
}

impl Writer {
    /// Write one object
    pub fn write_object<T: Serializable>(&mut self, value: &T) -> Result<()> {
        value.encode(self)
    }

    /// Write an `i32` count followed by each object in order
    pub fn write_object_list<T: Serializable>(&mut self, items: &[T]) -> Result<()> {
        let count =
            i32::try_from(items.len()).map_err(|_| Error::InvalidLength(items.len() as i64))?;
        self.write_i32(count);
        for item in items {
            self.write_object(item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair {
        left: u16,
        right: Option<String>,
    }

    impl Serializable for Pair {
        fn decode(reader: &mut Reader<'_>) -> Result<Self> {
            Ok(Self {
                left: reader.read_u16()?,
                right: reader.read_string()?,
            })
        }

        fn encode(&self, writer: &mut Writer) -> Result<()> {
            writer.write_u16(self.left);
            writer.write_string(self.right.as_deref())
        }
    }

    #[test]
    fn test_object_roundtrip() {
        let pair = Pair {
            left: 7,
            right: Some("seven".to_string()),
        };
        let mut writer = Writer::new();
        writer.write_object(&pair).unwrap();
        let bytes = writer.into_bytes();

        let decoded: Pair = Reader::new(&bytes).read_object().unwrap();
        assert_eq!(decoded, pair);
    }

    #[test]
    fn test_object_list_preserves_order() {
        let pairs = vec![
            Pair {
                left: 2,
                right: None,
            },
            Pair {
                left: 1,
                right: Some("one".to_string()),
            },
        ];
        let mut writer = Writer::new();
        writer.write_object_list(&pairs).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..4], &2i32.to_le_bytes());

        let decoded: Vec<Pair> = Reader::new(&bytes).read_object_list().unwrap();
        assert_eq!(decoded, pairs);
    }

    #[test]
    fn test_object_list_negative_count() {
        let bytes = (-1i32).to_le_bytes();
        let result: Result<Vec<Pair>> = Reader::new(&bytes).read_object_list();
        assert!(matches!(result, Err(Error::InvalidLength(-1))));
    }

    #[test]
    fn test_object_list_truncated() {
        let mut bytes = 3i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[1, 0, 0, 0, 0, 0]);
        let result: Result<Vec<Pair>> = Reader::new(&bytes).read_object_list();
        assert!(matches!(result, Err(Error::TruncatedInput { .. })));
    }
}
