use std::collections::BTreeMap;

use crate::encode::{
    ARRAY16, ARRAY32, BIN16, BIN32, BIN8, FALSE, FLOAT32, FLOAT64, INT16, INT32, INT64, INT8,
    MAP16, MAP32, NIL, STR16, STR32, STR8, TRUE, UINT16, UINT32, UINT64, UINT8,
};
use crate::error::{Result, ValueError};
use crate::value::Value;

/// The result of reading one tag.
///
/// Scalars come back complete. Containers only report their element count;
/// the caller reads the elements next.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    Scalar(Value),
    Array(usize),
    Map(usize),
}

impl Header {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Header::Scalar(value) => value.kind_name(),
            Header::Array(_) => "array",
            Header::Map(_) => "map",
        }
    }
}

/// Deepest container nesting a reader will descend into.
pub const MAX_DEPTH: usize = 128;

/// Cursor over an encoded buffer.
#[derive(Debug, Clone)]
pub struct ValueReader<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> ValueReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail with [`ValueError::TrailingBytes`] unless the buffer is exhausted.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ValueError::TrailingBytes(n)),
        }
    }

    /// Run `f` over the elements of a container one level deeper.
    ///
    /// Every container read must go through here so hostile input cannot
    /// nest past [`MAX_DEPTH`].
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ValueError::DepthExceeded(MAX_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Read one complete value without any shape information.
    pub fn read_value(&mut self) -> Result<Value> {
        match self.read_header()? {
            Header::Scalar(value) => Ok(value),
            Header::Array(len) => self.nested(|reader| {
                let mut items = Vec::with_capacity(len.min(reader.remaining()));
                for _ in 0..len {
                    items.push(reader.read_value()?);
                }
                Ok(Value::Seq(items))
            }),
            Header::Map(len) => self.nested(|reader| {
                let mut entries = BTreeMap::new();
                for _ in 0..len {
                    let key = reader.read_key()?;
                    let value = reader.read_value()?;
                    entries.insert(key, value);
                }
                Ok(Value::Map(entries))
            }),
        }
    }

    /// Read a mapping key, which must be a string.
    pub fn read_key(&mut self) -> Result<String> {
        match self.read_header()? {
            Header::Scalar(Value::Str(key)) => Ok(key),
            other => Err(ValueError::InvalidKey(other.kind_name())),
        }
    }

    /// Read a tag and, for scalars, its payload.
    pub fn read_header(&mut self) -> Result<Header> {
        let tag = self.take_u8()?;
        let scalar = match tag {
            0x00..=0x7f => Value::U8(tag),
            0x80..=0x8f => return Ok(Header::Map(usize::from(tag & 0x0f))),
            0x90..=0x9f => return Ok(Header::Array(usize::from(tag & 0x0f))),
            0xa0..=0xbf => self.take_str(usize::from(tag & 0x1f))?,
            NIL => Value::Nil,
            FALSE => Value::Bool(false),
            TRUE => Value::Bool(true),
            BIN8 => {
                let len = usize::from(self.take_u8()?);
                Value::Bytes(self.take(len)?.to_vec())
            }
            BIN16 => {
                let len = usize::from(self.take_u16()?);
                Value::Bytes(self.take(len)?.to_vec())
            }
            BIN32 => {
                let len = self.take_u32()? as usize;
                Value::Bytes(self.take(len)?.to_vec())
            }
            FLOAT32 => Value::F32(f32::from_bits(self.take_u32()?)),
            FLOAT64 => Value::F64(f64::from_bits(self.take_u64()?)),
            UINT8 => Value::U8(self.take_u8()?),
            UINT16 => Value::U16(self.take_u16()?),
            UINT32 => Value::U32(self.take_u32()?),
            UINT64 => Value::U64(self.take_u64()?),
            INT8 => Value::I8(self.take_u8()? as i8),
            INT16 => Value::I16(self.take_u16()? as i16),
            INT32 => Value::I32(self.take_u32()? as i32),
            INT64 => Value::I64(self.take_u64()? as i64),
            STR8 => {
                let len = usize::from(self.take_u8()?);
                self.take_str(len)?
            }
            STR16 => {
                let len = usize::from(self.take_u16()?);
                self.take_str(len)?
            }
            STR32 => {
                let len = self.take_u32()? as usize;
                self.take_str(len)?
            }
            ARRAY16 => return Ok(Header::Array(usize::from(self.take_u16()?))),
            ARRAY32 => return Ok(Header::Array(self.take_u32()? as usize)),
            MAP16 => return Ok(Header::Map(usize::from(self.take_u16()?))),
            MAP32 => return Ok(Header::Map(self.take_u32()? as usize)),
            0xe0..=0xff => Value::I8(tag as i8),
            _ => return Err(ValueError::UnknownTag(tag)),
        };
        Ok(Header::Scalar(scalar))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(ValueError::Truncated {
                needed: len,
                remaining,
            });
        }
        let buf = self.buf;
        let bytes = &buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn take_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn take_u16(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_be_bytes)
    }

    fn take_u32(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_be_bytes)
    }

    fn take_u64(&mut self) -> Result<u64> {
        self.take_array().map(u64::from_be_bytes)
    }

    fn take_str(&mut self, len: usize) -> Result<Value> {
        let bytes = self.take(len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| ValueError::InvalidEncoding)?;
        Ok(Value::Str(text.to_string()))
    }
}

/// Decode one value from the front of `buf`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_value(buf: &[u8]) -> Result<(Value, usize)> {
    let mut reader = ValueReader::new(buf);
    let value = reader.read_value()?;
    Ok((value, reader.position()))
}

/// Decode a buffer that must hold exactly one value.
pub fn decode_exact(buf: &[u8]) -> Result<Value> {
    let mut reader = ValueReader::new(buf);
    let value = reader.read_value()?;
    reader.finish()?;
    Ok(value)
}
