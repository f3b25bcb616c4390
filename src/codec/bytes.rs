//! Little-endian primitive I/O over byte buffers.

use crate::error::{GatesimError, Result};

/// Appends fixed-width little-endian values to a buffer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a count or index. Graph sizes never approach `u32::MAX`.
    pub fn write_len(&mut self, value: usize) {
        self.write_u32(value as u32);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) {
        self.write_len(value.len());
        self.bytes.extend_from_slice(value.as_bytes());
    }

    /// Finish writing and return the bytes.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads fixed-width little-endian values, failing cleanly on truncation.
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(GatesimError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(GatesimError::malformed(format!(
                "invalid boolean {other} at byte {offset}"
            ))),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn read_len(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    /// Read a count of records that each occupy at least `min_record` bytes.
    ///
    /// Rejects counts the remaining input cannot possibly hold, so a corrupt
    /// count never drives a huge allocation.
    pub fn read_count(&mut self, min_record: usize) -> Result<usize> {
        let offset = self.pos;
        let count = self.read_len()?;
        if count.saturating_mul(min_record.max(1)) > self.remaining() {
            return Err(GatesimError::UnexpectedEof {
                offset,
                needed: count.saturating_mul(min_record.max(1)) - self.remaining(),
            });
        }
        Ok(count)
    }

    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.take_array()
    }

    pub fn read_str(&mut self) -> Result<String> {
        let len = self.read_count(1)?;
        let offset = self.pos;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| GatesimError::InvalidUtf8 { offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        let mut w = ByteWriter::new();
        w.write_u8(7);
        w.write_u16(0x1234);
        w.write_u32(0xDEADBEEF);
        w.write_f32(-2.5);
        w.write_bool(true);
        w.write_str("AND");
        let bytes = w.finish();
        assert_eq!(&bytes[1..3], &[0x34, 0x12]);

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(r.read_f32().unwrap(), -2.5);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_str().unwrap(), "AND");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_truncated() {
        let mut r = ByteReader::new(&[1, 2]);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, GatesimError::UnexpectedEof { offset: 0, needed: 2 }));
    }

    #[test]
    fn test_oversized_count() {
        let mut w = ByteWriter::new();
        w.write_u32(1_000_000);
        w.write_u8(0);
        let bytes = w.finish();
        let mut r = ByteReader::new(&bytes);
        assert!(r.read_count(4).is_err());
    }

    #[test]
    fn test_bad_utf8_and_bool() {
        let mut w = ByteWriter::new();
        w.write_u32(2);
        w.write_bytes(&[0xFF, 0xFE]);
        w.write_u8(3);
        let bytes = w.finish();
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(r.read_str(), Err(GatesimError::InvalidUtf8 { offset: 4 })));
        assert!(matches!(r.read_bool(), Err(GatesimError::MalformedRecord { .. })));
    }
}
