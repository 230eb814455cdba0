//! Endian-safe integer/varint/length-prefixed codec shared by the
//! transaction and header serializers.
//!
//! Mirrors the manual little-endian encoding the teacher writes by hand in
//! `btc_header.rs::from_block_header_vec`/`get_block_header_vec`, generalised
//! into reusable read/write primitives instead of being duplicated per type.

use crate::error::CodecError;

/// A forward-only cursor over a byte slice, used to deserialize the wire
/// formats without copying the remaining input on every read.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Truncated(what));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1, "u8")?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        let b = self.take(2, "u16")?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4, "u32")?;
        Ok(u32::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, CodecError> {
        let b = self.take(4, "i32")?;
        Ok(i32::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, CodecError> {
        let b = self.take(8, "u64")?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_i64_le(&mut self) -> Result<i64, CodecError> {
        let b = self.take(8, "i64")?;
        Ok(i64::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let b = self.take(N, "fixed array")?;
        Ok(b.try_into().unwrap())
    }

    /// Bitcoin "CompactSize" varint.
    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        let tag = self.read_u8()?;
        match tag {
            0..=0xfc => Ok(tag as u64),
            0xfd => {
                let v = self.read_u16_le()?;
                if v < 0xfd {
                    return Err(CodecError::NonMinimalVarint);
                }
                Ok(v as u64)
            }
            0xfe => {
                let v = self.read_u32_le()?;
                if v <= u16::MAX as u32 {
                    return Err(CodecError::NonMinimalVarint);
                }
                Ok(v as u64)
            }
            0xff => {
                let v = self.read_u64_le()?;
                if v <= u32::MAX as u64 {
                    return Err(CodecError::NonMinimalVarint);
                }
                Ok(v)
            }
        }
    }

    /// Length-prefixed (varint) byte string, rejecting absurd lengths.
    pub fn read_varbytes(&mut self, max_len: u64) -> Result<Vec<u8>, CodecError> {
        let len = self.read_varint()?;
        if len > max_len {
            return Err(CodecError::LengthOverflow(len, max_len));
        }
        Ok(self.take(len as usize, "varbytes payload")?.to_vec())
    }
}

pub fn write_u16_le(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_u32_le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_i32_le(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_u64_le(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_i64_le(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_varint(out: &mut Vec<u8>, v: u64) {
    if v < 0xfd {
        out.push(v as u8);
    } else if v <= u16::MAX as u64 {
        out.push(0xfd);
        write_u16_le(out, v as u16);
    } else if v <= u32::MAX as u64 {
        out.push(0xfe);
        write_u32_le(out, v as u32);
    } else {
        out.push(0xff);
        write_u64_le(out, v);
    }
}

pub fn write_varbytes(out: &mut Vec<u8>, data: &[u8]) {
    write_varint(out, data.len() as u64);
    out.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_round_trips_boundary_values() {
        for v in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, u32::MAX as u64, u32::MAX as u64 + 1] {
            let mut buf = Vec::new();
            write_varint(&mut buf, v);
            let mut r = Reader::new(&buf);
            assert_eq!(r.read_varint().unwrap(), v);
            assert_eq!(r.remaining(), 0);
        }
    }

    #[test]
    fn varbytes_round_trip() {
        let payload = b"hello dogecoin".to_vec();
        let mut buf = Vec::new();
        write_varbytes(&mut buf, &payload);
        let mut r = Reader::new(&buf);
        assert_eq!(r.read_varbytes(1024).unwrap(), payload);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut r = Reader::new(&[0x01]);
        assert!(r.read_u32_le().is_err());
    }
}
