//! Big-endian primitives and Kafka compact encodings.
//!
//! Compact strings and arrays store `len + 1` as an unsigned varint; 0 means null.
//! Tagged fields are a varint count followed by `(tag, size, bytes)` entries; the
//! empty set is the single byte 0x00.

use crate::error::{Result, StreamletError};
use bytes::{Buf, BufMut, BytesMut};

/// Append-only response builder.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.put_u8(v);
        self
    }

    pub fn put_bool(&mut self, v: bool) -> &mut Self {
        self.buf.put_u8(u8::from(v));
        self
    }

    pub fn put_i16(&mut self, v: i16) -> &mut Self {
        self.buf.put_i16(v);
        self
    }

    pub fn put_u16(&mut self, v: u16) -> &mut Self {
        self.buf.put_u16(v);
        self
    }

    pub fn put_i32(&mut self, v: i32) -> &mut Self {
        self.buf.put_i32(v);
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.put_u32(v);
        self
    }

    pub fn put_uuid(&mut self, id: &[u8; 16]) -> &mut Self {
        self.buf.extend_from_slice(id);
        self
    }

    pub fn put_unsigned_varint(&mut self, mut u: u32) -> &mut Self {
        while u > 0x7f {
            self.buf.put_u8((u as u8) | 0x80);
            u >>= 7;
        }
        self.buf.put_u8(u as u8);
        self
    }

    /// Compact array length; `None` encodes a null array.
    pub fn put_compact_array_len(&mut self, len: Option<usize>) -> &mut Self {
        let encoded = len.map(|n| n as u32 + 1).unwrap_or(0);
        self.put_unsigned_varint(encoded)
    }

    /// Compact string from raw bytes; no encoding check is applied.
    pub fn put_compact_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_unsigned_varint(bytes.len() as u32 + 1);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn put_compact_string(&mut self, s: &str) -> &mut Self {
        self.put_compact_bytes(s.as_bytes())
    }

    /// Empty tagged-field set.
    pub fn put_tagged_fields(&mut self) -> &mut Self {
        self.put_unsigned_varint(0)
    }

    pub fn finish(self) -> BytesMut {
        self.buf
    }
}

/// Bounds-checked cursor over a request payload.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reader positioned at `offset` bytes into `buf`.
    pub fn at(buf: &'a [u8], offset: usize) -> Result<Self> {
        if offset > buf.len() {
            return Err(StreamletError::malformed(format!(
                "offset {} past end of {}-byte payload",
                offset,
                buf.len()
            )));
        }
        Ok(Self { buf, pos: offset })
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(StreamletError::malformed(format!(
                "short {}: need {} bytes at offset {}, have {}",
                what,
                n,
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1, "u8")?[0])
    }

    pub fn get_i16(&mut self) -> Result<i16> {
        Ok(self.take(2, "i16")?.get_i16())
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        Ok(self.take(2, "u16")?.get_u16())
    }

    pub fn get_i32(&mut self) -> Result<i32> {
        Ok(self.take(4, "i32")?.get_i32())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n, "field").map(|_| ())
    }

    pub fn get_unsigned_varint(&mut self) -> Result<u32> {
        let mut v: u32 = 0;
        let mut shift = 0;
        loop {
            let b = self.take(1, "varint")?[0];
            v |= ((b & 0x7f) as u32) << shift;
            if b & 0x80 == 0 {
                return Ok(v);
            }
            shift += 7;
            if shift >= 35 {
                return Err(StreamletError::malformed("varint too long"));
            }
        }
    }

    /// Compact array length; `None` for a null array.
    pub fn get_compact_array_len(&mut self) -> Result<Option<usize>> {
        match self.get_unsigned_varint()? {
            0 => Ok(None),
            n => Ok(Some((n - 1) as usize)),
        }
    }

    /// String with a u16 length prefix; only 0xFFFF means null.
    pub fn get_nullable_bytes_u16(&mut self) -> Result<Option<&'a [u8]>> {
        match self.get_u16()? {
            u16::MAX => Ok(None),
            len => self.take(len as usize, "string").map(Some),
        }
    }

    pub fn get_compact_nullable_bytes(&mut self) -> Result<Option<&'a [u8]>> {
        match self.get_unsigned_varint()? {
            0 => Ok(None),
            n => self.take((n - 1) as usize, "compact string").map(Some),
        }
    }

    /// Non-null compact string as raw bytes.
    pub fn get_compact_bytes(&mut self) -> Result<&'a [u8]> {
        self.get_compact_nullable_bytes()?
            .ok_or_else(|| StreamletError::malformed("null compact string"))
    }

    /// Skip a tagged-field section without interpreting any tag.
    pub fn skip_tagged_fields(&mut self) -> Result<()> {
        let count = self.get_unsigned_varint()?;
        for _ in 0..count {
            let _tag = self.get_unsigned_varint()?;
            let size = self.get_unsigned_varint()?;
            self.skip(size as usize)?;
        }
        Ok(())
    }
}
