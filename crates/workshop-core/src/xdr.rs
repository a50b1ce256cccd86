//! Minimal XDR (RFC 4506) reader/writer for the handful of wire structures
//! the workflows touch. Discriminants are big-endian u32, fixed opaques are
//! written as-is, variable opaques carry a length prefix; both are padded to
//! a 4-byte boundary.

use crate::error::{Result, WorkshopError};

#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Fixed-length opaque: no length prefix, padded to 4 bytes.
    pub fn write_opaque_fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad(bytes.len());
    }

    /// Variable-length opaque: u32 length prefix, padded to 4 bytes.
    pub fn write_opaque_var(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.write_opaque_fixed(bytes);
    }

    /// Optional presence flag. The caller writes the value when `Some`.
    pub fn write_presence(&mut self, present: bool) {
        self.write_u32(if present { 1 } else { 0 });
    }

    fn pad(&mut self, len: usize) {
        let rem = len % 4;
        if rem != 0 {
            self.buf.extend(std::iter::repeat(0u8).take(4 - rem));
        }
    }
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(WorkshopError::Codec(format!(
                "unexpected end of input at offset {} (wanted {} bytes of {})",
                self.pos,
                n,
                self.buf.len()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Read a u32 discriminant without consuming it.
    pub fn peek_u32(&self) -> Result<u32> {
        if self.pos + 4 > self.buf.len() {
            return Err(WorkshopError::Codec(
                "unexpected end of input while peeking discriminant".to_string(),
            ));
        }
        let bytes: [u8; 4] = self.buf[self.pos..self.pos + 4].try_into().unwrap();
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.take(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_opaque_fixed(&mut self, len: usize) -> Result<Vec<u8>> {
        let bytes = self.take(len)?.to_vec();
        self.skip_pad(len)?;
        Ok(bytes)
    }

    pub fn read_opaque_var(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        self.read_opaque_fixed(len)
    }

    pub fn read_presence(&mut self) -> Result<bool> {
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WorkshopError::Codec(format!(
                "invalid optional flag {other}"
            ))),
        }
    }

    fn skip_pad(&mut self, len: usize) -> Result<()> {
        let rem = len % 4;
        if rem != 0 {
            let pad = self.take(4 - rem)?;
            if pad.iter().any(|b| *b != 0) {
                return Err(WorkshopError::Codec("non-zero padding".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_opaques_round_trip() {
        let mut w = Writer::new();
        w.write_opaque_var(b"abcde");
        w.write_u32(7);
        let bytes = w.into_bytes();
        // 4 (len) + 5 (data) + 3 (pad) + 4 (u32)
        assert_eq!(bytes.len(), 16);

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_opaque_var().unwrap(), b"abcde");
        assert_eq!(r.read_u32().unwrap(), 7);
        assert!(r.is_exhausted());
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut w = Writer::new();
        w.write_u64(42);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes[..6]);
        assert!(r.read_u64().is_err());
    }
}
