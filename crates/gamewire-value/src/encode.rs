use bytes::{BufMut, Bytes, BytesMut};

use crate::value::Value;

pub(crate) const NIL: u8 = 0xc0;
pub(crate) const FALSE: u8 = 0xc2;
pub(crate) const TRUE: u8 = 0xc3;
pub(crate) const BIN8: u8 = 0xc4;
pub(crate) const BIN16: u8 = 0xc5;
pub(crate) const BIN32: u8 = 0xc6;
pub(crate) const FLOAT32: u8 = 0xca;
pub(crate) const FLOAT64: u8 = 0xcb;
pub(crate) const UINT8: u8 = 0xcc;
pub(crate) const UINT16: u8 = 0xcd;
pub(crate) const UINT32: u8 = 0xce;
pub(crate) const UINT64: u8 = 0xcf;
pub(crate) const INT8: u8 = 0xd0;
pub(crate) const INT16: u8 = 0xd1;
pub(crate) const INT32: u8 = 0xd2;
pub(crate) const INT64: u8 = 0xd3;
pub(crate) const STR8: u8 = 0xd9;
pub(crate) const STR16: u8 = 0xda;
pub(crate) const STR32: u8 = 0xdb;
pub(crate) const ARRAY16: u8 = 0xdc;
pub(crate) const ARRAY32: u8 = 0xdd;
pub(crate) const MAP16: u8 = 0xde;
pub(crate) const MAP32: u8 = 0xdf;

pub(crate) const FIXMAP: u8 = 0x80;
pub(crate) const FIXARRAY: u8 = 0x90;
pub(crate) const FIXSTR: u8 = 0xa0;

/// Append the encoding of `value` to `dst`.
///
/// Integers always use the narrowest tag that holds the number, whatever
/// width the variant carries. Records are written as a string-keyed map in
/// field order.
pub fn encode_value(value: &Value, dst: &mut BytesMut) {
    match value {
        Value::Nil => dst.put_u8(NIL),
        Value::Bool(false) => dst.put_u8(FALSE),
        Value::Bool(true) => dst.put_u8(TRUE),
        Value::I8(v) => put_int(i64::from(*v), dst),
        Value::I16(v) => put_int(i64::from(*v), dst),
        Value::I32(v) => put_int(i64::from(*v), dst),
        Value::I64(v) => put_int(*v, dst),
        Value::U8(v) => put_uint(u64::from(*v), dst),
        Value::U16(v) => put_uint(u64::from(*v), dst),
        Value::U32(v) => put_uint(u64::from(*v), dst),
        Value::U64(v) => put_uint(*v, dst),
        Value::F32(v) => {
            dst.put_u8(FLOAT32);
            dst.put_f32(*v);
        }
        Value::F64(v) => {
            dst.put_u8(FLOAT64);
            dst.put_f64(*v);
        }
        Value::Str(s) => put_str(s, dst),
        Value::Bytes(data) => put_bin(data, dst),
        Value::Seq(items) => {
            put_array_header(items.len(), dst);
            for item in items {
                encode_value(item, dst);
            }
        }
        Value::Map(entries) => {
            put_map_header(entries.len(), dst);
            for (key, item) in entries {
                put_str(key, dst);
                encode_value(item, dst);
            }
        }
        Value::Record(record) => {
            put_map_header(record.len(), dst);
            for (name, item) in record.fields() {
                put_str(name, dst);
                encode_value(item, dst);
            }
        }
    }
}

/// Encode a value into a fresh buffer.
pub fn to_bytes(value: &Value) -> Bytes {
    let mut buf = BytesMut::new();
    encode_value(value, &mut buf);
    buf.freeze()
}

fn put_uint(v: u64, dst: &mut BytesMut) {
    if v <= 0x7f {
        dst.put_u8(v as u8);
    } else if v <= u64::from(u8::MAX) {
        dst.put_u8(UINT8);
        dst.put_u8(v as u8);
    } else if v <= u64::from(u16::MAX) {
        dst.put_u8(UINT16);
        dst.put_u16(v as u16);
    } else if v <= u64::from(u32::MAX) {
        dst.put_u8(UINT32);
        dst.put_u32(v as u32);
    } else {
        dst.put_u8(UINT64);
        dst.put_u64(v);
    }
}

fn put_int(v: i64, dst: &mut BytesMut) {
    if v >= 0 {
        put_uint(v as u64, dst);
    } else if v >= -32 {
        // negative fixint: 0xe0..=0xff
        dst.put_i8(v as i8);
    } else if v >= i64::from(i8::MIN) {
        dst.put_u8(INT8);
        dst.put_i8(v as i8);
    } else if v >= i64::from(i16::MIN) {
        dst.put_u8(INT16);
        dst.put_i16(v as i16);
    } else if v >= i64::from(i32::MIN) {
        dst.put_u8(INT32);
        dst.put_i32(v as i32);
    } else {
        dst.put_u8(INT64);
        dst.put_i64(v);
    }
}

fn put_str(s: &str, dst: &mut BytesMut) {
    let len = s.len();
    if len <= 31 {
        dst.put_u8(FIXSTR | len as u8);
    } else if len <= usize::from(u8::MAX) {
        dst.put_u8(STR8);
        dst.put_u8(len as u8);
    } else if len <= usize::from(u16::MAX) {
        dst.put_u8(STR16);
        dst.put_u16(len as u16);
    } else {
        dst.put_u8(STR32);
        dst.put_u32(len as u32);
    }
    dst.put_slice(s.as_bytes());
}

fn put_bin(data: &[u8], dst: &mut BytesMut) {
    let len = data.len();
    if len <= usize::from(u8::MAX) {
        dst.put_u8(BIN8);
        dst.put_u8(len as u8);
    } else if len <= usize::from(u16::MAX) {
        dst.put_u8(BIN16);
        dst.put_u16(len as u16);
    } else {
        dst.put_u8(BIN32);
        dst.put_u32(len as u32);
    }
    dst.put_slice(data);
}

fn put_array_header(len: usize, dst: &mut BytesMut) {
    if len <= 15 {
        dst.put_u8(FIXARRAY | len as u8);
    } else if len <= usize::from(u16::MAX) {
        dst.put_u8(ARRAY16);
        dst.put_u16(len as u16);
    } else {
        dst.put_u8(ARRAY32);
        dst.put_u32(len as u32);
    }
}

fn put_map_header(len: usize, dst: &mut BytesMut) {
    if len <= 15 {
        dst.put_u8(FIXMAP | len as u8);
    } else if len <= usize::from(u16::MAX) {
        dst.put_u8(MAP16);
        dst.put_u16(len as u16);
    } else {
        dst.put_u8(MAP32);
        dst.put_u32(len as u32);
    }
}
