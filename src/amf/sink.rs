//! Append-only output buffer
//!
//! All multi-byte integers are big-endian, doubles are IEEE 754 binary64.
//! The sink knows nothing about AMF types beyond the U29 integer layout.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Largest value a U29 can carry
pub const U29_MAX: u32 = 0x1FFF_FFFF;

/// Output buffer for one serialization session
pub struct ByteSink {
    buf: BytesMut,
    limit: Option<usize>,
}

impl ByteSink {
    /// Create a sink with an initial capacity and an optional size limit
    pub fn new(capacity: usize, limit: Option<usize>) -> Self {
        let capacity = limit.map_or(capacity, |limit| capacity.min(limit));
        Self {
            buf: BytesMut::with_capacity(capacity),
            limit,
        }
    }

    /// Get current encoded length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if sink is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the encoded bytes
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Drop everything written so far
    pub fn discard(&mut self) {
        self.buf.clear();
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        if let Some(limit) = self.limit {
            let requested = self.buf.len().saturating_add(additional);
            if requested > limit {
                return Err(Error::AllocationFailure { requested, limit });
            }
        }
        self.buf.reserve(additional);
        Ok(())
    }

    pub fn write_byte(&mut self, b: u8) -> Result<()> {
        self.reserve(1)?;
        self.buf.put_u8(b);
        Ok(())
    }

    pub fn write_u16(&mut self, n: u16) -> Result<()> {
        self.reserve(2)?;
        self.buf.put_u16(n);
        Ok(())
    }

    pub fn write_i16(&mut self, n: i16) -> Result<()> {
        self.reserve(2)?;
        self.buf.put_i16(n);
        Ok(())
    }

    pub fn write_u32(&mut self, n: u32) -> Result<()> {
        self.reserve(4)?;
        self.buf.put_u32(n);
        Ok(())
    }

    pub fn write_double(&mut self, d: f64) -> Result<()> {
        self.reserve(8)?;
        self.buf.put_f64(d);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buf.put_slice(bytes);
        Ok(())
    }

    /// Write an AMF3 variable-length 29-bit unsigned integer
    ///
    /// The first three bytes carry 7 bits each with the high bit flagging a
    /// continuation; a fourth byte, when present, carries a full 8 bits.
    pub fn write_u29(&mut self, n: u32) -> Result<()> {
        if n > U29_MAX {
            return Err(Error::constraint(format!(
                "{} does not fit in a U29 integer",
                n
            )));
        }

        if n < 0x80 {
            self.write_byte(n as u8)
        } else if n < 0x4000 {
            self.reserve(2)?;
            self.buf.put_u8(((n >> 7) & 0x7F) as u8 | 0x80);
            self.buf.put_u8((n & 0x7F) as u8);
            Ok(())
        } else if n < 0x20_0000 {
            self.reserve(3)?;
            self.buf.put_u8(((n >> 14) & 0x7F) as u8 | 0x80);
            self.buf.put_u8(((n >> 7) & 0x7F) as u8 | 0x80);
            self.buf.put_u8((n & 0x7F) as u8);
            Ok(())
        } else {
            self.reserve(4)?;
            self.buf.put_u8(((n >> 22) & 0x7F) as u8 | 0x80);
            self.buf.put_u8(((n >> 15) & 0x7F) as u8 | 0x80);
            self.buf.put_u8(((n >> 8) & 0x7F) as u8 | 0x80);
            self.buf.put_u8((n & 0xFF) as u8);
            Ok(())
        }
    }
}
