use std::collections::BTreeMap;

use gamewire_value::{Header, Record, Value, ValueError, ValueReader};
use serde::{Deserialize, Serialize};

use crate::error::ShapeMismatch;

/// Scalar kinds a [`Shape::Primitive`] can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Nil,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Bytes,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Str => "str",
            Kind::Bytes => "bytes",
        }
    }

    /// Inclusive range for integer kinds.
    pub fn int_range(self) -> Option<(i128, i128)> {
        let range = match self {
            Kind::I8 => (i8::MIN.into(), i8::MAX.into()),
            Kind::I16 => (i16::MIN.into(), i16::MAX.into()),
            Kind::I32 => (i32::MIN.into(), i32::MAX.into()),
            Kind::I64 => (i64::MIN.into(), i64::MAX.into()),
            Kind::U8 => (0, u8::MAX.into()),
            Kind::U16 => (0, u16::MAX.into()),
            Kind::U32 => (0, u32::MAX.into()),
            Kind::U64 => (0, u64::MAX.into()),
            _ => return None,
        };
        Some(range)
    }

    /// Convert an in-range integer into this kind's variant.
    fn int_value(self, v: i128) -> Option<Value> {
        let value = match self {
            Kind::I8 => Value::I8(i8::try_from(v).ok()?),
            Kind::I16 => Value::I16(i16::try_from(v).ok()?),
            Kind::I32 => Value::I32(i32::try_from(v).ok()?),
            Kind::I64 => Value::I64(i64::try_from(v).ok()?),
            Kind::U8 => Value::U8(u8::try_from(v).ok()?),
            Kind::U16 => Value::U16(u16::try_from(v).ok()?),
            Kind::U32 => Value::U32(u32::try_from(v).ok()?),
            Kind::U64 => Value::U64(u64::try_from(v).ok()?),
            _ => return None,
        };
        Some(value)
    }

    fn zero_value(self) -> Value {
        match self {
            Kind::Nil => Value::Nil,
            Kind::Bool => Value::Bool(false),
            Kind::F32 => Value::F32(0.0),
            Kind::F64 => Value::F64(0.0),
            Kind::Str => Value::Str(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            int => int.int_value(0).unwrap_or(Value::Nil),
        }
    }

    /// Coerce a decoded scalar into this kind.
    pub(crate) fn coerce(self, value: Value) -> Result<Value, ValueError> {
        match (self, value) {
            (Kind::Nil, Value::Nil) => Ok(Value::Nil),
            (Kind::Bool, v @ Value::Bool(_)) => Ok(v),
            (Kind::F32, v @ Value::F32(_)) => Ok(v),
            (Kind::F32, Value::F64(x)) if x.is_nan() || f64::from(x as f32) == x => {
                Ok(Value::F32(x as f32))
            }
            (Kind::F64, Value::F32(x)) => Ok(Value::F64(x.into())),
            (Kind::F64, v @ Value::F64(_)) => Ok(v),
            (Kind::Str, v @ Value::Str(_)) => Ok(v),
            (Kind::Bytes, v @ Value::Bytes(_)) => Ok(v),
            (Kind::Bytes, Value::Str(s)) => Ok(Value::Bytes(s.into_bytes())),
            (kind, value) => match (kind.int_range(), value.as_i128()) {
                (Some(_), Some(v)) => kind.int_value(v).ok_or(ValueError::Overflow {
                    value: v,
                    target: kind.name(),
                }),
                _ => Err(mismatch(kind.name(), value.kind_name())),
            },
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Nil, Value::Nil)
            | (Kind::Bool, Value::Bool(_))
            | (Kind::F32, Value::F32(_))
            | (Kind::F64, Value::F64(_))
            | (Kind::Str, Value::Str(_))
            | (Kind::Bytes, Value::Bytes(_)) => true,
            (kind, value) => match (kind.int_range(), value.as_i128()) {
                (Some((min, max)), Some(v)) => (min..=max).contains(&v),
                _ => false,
            },
        }
    }
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
}

/// A named record with ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordShape {
    pub name: String,
    pub fields: Vec<Field>,
}

impl RecordShape {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// Expected structure of a packet payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Decode whatever the tags say.
    Any,
    Primitive(Kind),
    /// Exactly `len` elements of one shape.
    Array { len: usize, element: Box<Shape> },
    /// Any number of elements of one shape.
    Sequence(Box<Shape>),
    /// String-keyed mapping with values of one shape.
    Mapping(Box<Shape>),
    Record(RecordShape),
}

impl Shape {
    pub fn primitive(kind: Kind) -> Self {
        Shape::Primitive(kind)
    }

    pub fn array(len: usize, element: Shape) -> Self {
        Shape::Array {
            len,
            element: Box::new(element),
        }
    }

    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence(Box::new(element))
    }

    pub fn mapping(value: Shape) -> Self {
        Shape::Mapping(Box::new(value))
    }

    pub fn record<N, I>(name: impl Into<String>, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Shape)>,
    {
        Shape::Record(RecordShape {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, shape)| Field {
                    name: name.into(),
                    shape,
                })
                .collect(),
        })
    }

    /// Record name, if this is a record shape.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            Shape::Record(record) => Some(&record.name),
            _ => None,
        }
    }

    /// Compact rendering such as `[3]i64` or `Login{username: str}`.
    pub fn describe(&self) -> String {
        match self {
            Shape::Any => "any".to_string(),
            Shape::Primitive(kind) => kind.name().to_string(),
            Shape::Array { len, element } => format!("[{len}]{}", element.describe()),
            Shape::Sequence(element) => format!("[]{}", element.describe()),
            Shape::Mapping(value) => format!("map<str, {}>", value.describe()),
            Shape::Record(record) => {
                let fields: Vec<String> = record
                    .fields
                    .iter()
                    .map(|field| format!("{}: {}", field.name, field.shape.describe()))
                    .collect();
                format!("{}{{{}}}", record.name, fields.join(", "))
            }
        }
    }

    /// The default value of this shape.
    pub fn zero_value(&self) -> Value {
        match self {
            Shape::Any => Value::Nil,
            Shape::Primitive(kind) => kind.zero_value(),
            Shape::Array { len, element } => {
                Value::Seq((0..*len).map(|_| element.zero_value()).collect())
            }
            Shape::Sequence(_) => Value::Seq(Vec::new()),
            Shape::Mapping(_) => Value::Map(BTreeMap::new()),
            Shape::Record(shape) => {
                let mut record = Record::new(shape.name.clone());
                for field in &shape.fields {
                    record.push(field.name.clone(), field.shape.zero_value());
                }
                Value::Record(record)
            }
        }
    }

    /// Check that `value` structurally matches this shape.
    ///
    /// Integers of any width pass as long as they fit the declared kind.
    /// Record fields must appear in declared order.
    pub fn check(&self, value: &Value) -> Result<(), ShapeMismatch> {
        self.check_at(value, "$")
    }

    fn check_at(&self, value: &Value, path: &str) -> Result<(), ShapeMismatch> {
        let fail = |found: String| ShapeMismatch {
            path: path.to_string(),
            expected: self.describe(),
            found,
        };

        match (self, value) {
            (Shape::Any, _) => Ok(()),
            (Shape::Primitive(kind), value) => {
                if kind.accepts(value) {
                    Ok(())
                } else {
                    Err(fail(describe_value(value)))
                }
            }
            (Shape::Array { len, element }, Value::Seq(items)) => {
                if items.len() != *len {
                    return Err(fail(format!("{} elements", items.len())));
                }
                check_elements(element, items, path)
            }
            (Shape::Sequence(element), Value::Seq(items)) => check_elements(element, items, path),
            (Shape::Mapping(shape), Value::Map(entries)) => {
                for (key, item) in entries {
                    shape.check_at(item, &format!("{path}.{key}"))?;
                }
                Ok(())
            }
            (Shape::Record(shape), Value::Record(record)) => {
                if record.name() != shape.name {
                    return Err(fail(format!("record {}", record.name())));
                }
                let names: Vec<&str> = record.fields().iter().map(|(n, _)| n.as_str()).collect();
                let expected: Vec<&str> = shape.fields.iter().map(|f| f.name.as_str()).collect();
                if names != expected {
                    return Err(fail(format!("fields [{}]", names.join(", "))));
                }
                for (field, (name, item)) in shape.fields.iter().zip(record.fields()) {
                    field.shape.check_at(item, &format!("{path}.{name}"))?;
                }
                Ok(())
            }
            (_, value) => Err(fail(describe_value(value))),
        }
    }

    /// Decode one value against this shape. Unknown record keys are skipped.
    pub fn decode(&self, reader: &mut ValueReader<'_>) -> Result<Value, ValueError> {
        self.decode_with(reader, false)
    }

    /// Like [`Shape::decode`], but unknown record keys are an error.
    pub fn decode_strict(&self, reader: &mut ValueReader<'_>) -> Result<Value, ValueError> {
        self.decode_with(reader, true)
    }

    pub(crate) fn decode_with(
        &self,
        reader: &mut ValueReader<'_>,
        strict: bool,
    ) -> Result<Value, ValueError> {
        if let Shape::Any = self {
            return reader.read_value();
        }

        match (self, reader.read_header()?) {
            (Shape::Primitive(kind), Header::Scalar(value)) => kind.coerce(value),
            (Shape::Array { len, element }, Header::Array(count)) => {
                if count != *len {
                    return Err(mismatch(self.describe(), format!("array of {count}")));
                }
                reader.nested(|r| decode_elements(element, r, count, strict))
            }
            (Shape::Sequence(element), Header::Array(count)) => {
                reader.nested(|r| decode_elements(element, r, count, strict))
            }
            (Shape::Mapping(shape), Header::Map(count)) => reader.nested(|r| {
                let mut entries = BTreeMap::new();
                for _ in 0..count {
                    let key = r.read_key()?;
                    let value = shape.decode_with(r, strict)?;
                    entries.insert(key, value);
                }
                Ok(Value::Map(entries))
            }),
            (Shape::Record(shape), Header::Map(count)) => {
                reader.nested(|r| bind_named(shape, r, count, strict))
            }
            (Shape::Record(shape), Header::Array(count)) => {
                reader.nested(|r| bind_positional(shape, r, count, strict))
            }
            (_, header) => Err(mismatch(self.describe(), header.kind_name())),
        }
    }
}

fn check_elements(element: &Shape, items: &[Value], path: &str) -> Result<(), ShapeMismatch> {
    for (index, item) in items.iter().enumerate() {
        element.check_at(item, &format!("{path}[{index}]"))?;
    }
    Ok(())
}

fn decode_elements(
    element: &Shape,
    reader: &mut ValueReader<'_>,
    count: usize,
    strict: bool,
) -> Result<Value, ValueError> {
    let mut items = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        items.push(element.decode_with(reader, strict)?);
    }
    Ok(Value::Seq(items))
}

fn bind_named(
    shape: &RecordShape,
    reader: &mut ValueReader<'_>,
    count: usize,
    strict: bool,
) -> Result<Value, ValueError> {
    let mut slots: Vec<Option<Value>> = vec![None; shape.fields.len()];
    for _ in 0..count {
        let key = reader.read_key()?;
        match shape.position(&key) {
            Some(index) => {
                slots[index] = Some(shape.fields[index].shape.decode_with(reader, strict)?);
            }
            None if strict => {
                return Err(ValueError::UnknownField {
                    record: shape.name.clone(),
                    field: key,
                });
            }
            None => {
                reader.read_value()?;
            }
        }
    }
    fill_record(shape, slots)
}

fn bind_positional(
    shape: &RecordShape,
    reader: &mut ValueReader<'_>,
    count: usize,
    strict: bool,
) -> Result<Value, ValueError> {
    let mut slots: Vec<Option<Value>> = vec![None; shape.fields.len()];
    for index in 0..count {
        match shape.fields.get(index) {
            Some(field) => slots[index] = Some(field.shape.decode_with(reader, strict)?),
            None if strict => {
                return Err(ValueError::UnknownField {
                    record: shape.name.clone(),
                    field: format!("#{index}"),
                });
            }
            None => {
                reader.read_value()?;
            }
        }
    }
    fill_record(shape, slots)
}

fn fill_record(shape: &RecordShape, slots: Vec<Option<Value>>) -> Result<Value, ValueError> {
    let mut record = Record::new(shape.name.clone());
    for (field, slot) in shape.fields.iter().zip(slots) {
        let value = slot.ok_or_else(|| ValueError::MissingField {
            record: shape.name.clone(),
            field: field.name.clone(),
        })?;
        record.push(field.name.clone(), value);
    }
    Ok(Value::Record(record))
}

fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> ValueError {
    ValueError::TypeMismatch {
        expected: expected.into(),
        found: found.into(),
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Record(record) => format!("record {}", record.name()),
        Value::Seq(items) => format!("sequence of {}", items.len()),
        other => other.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use gamewire_value::to_bytes;

    use super::*;

    fn login_shape() -> Shape {
        Shape::record(
            "Login",
            [
                ("username", Shape::primitive(Kind::Str)),
                ("password", Shape::primitive(Kind::Str)),
            ],
        )
    }

    fn login(username: &str, password: &str) -> Value {
        Value::Record(
            Record::new("Login")
                .with_field("username", username)
                .with_field("password", password),
        )
    }

    fn decode(shape: &Shape, value: &Value) -> Result<Value, ValueError> {
        let bytes = to_bytes(value);
        let mut reader = ValueReader::new(&bytes);
        let decoded = shape.decode(&mut reader)?;
        reader.finish()?;
        Ok(decoded)
    }

    #[test]
    fn primitive_decode_restores_declared_width() {
        let cases = [
            (Kind::I64, Value::I64(8)),
            (Kind::I64, Value::I64(-1)),
            (Kind::U8, Value::U8(3)),
            (Kind::I32, Value::I32(43)),
            (Kind::I64, Value::I64(1_435_435_345)),
            (Kind::F32, Value::F32(32.342)),
            (Kind::F64, Value::F64(-3321.34)),
            (Kind::U64, Value::U64(u64::MAX)),
            (Kind::I64, Value::I64(i64::MIN)),
        ];
        for (kind, value) in cases {
            let shape = Shape::primitive(kind);
            assert_eq!(decode(&shape, &value).unwrap(), value, "{kind:?}");
        }
    }

    #[test]
    fn primitive_overflow() {
        let shape = Shape::primitive(Kind::U8);
        assert_eq!(
            decode(&shape, &Value::I64(300)),
            Err(ValueError::Overflow {
                value: 300,
                target: "u8"
            })
        );
        assert!(matches!(
            decode(&Shape::primitive(Kind::U32), &Value::I8(-1)),
            Err(ValueError::Overflow { value: -1, .. })
        ));
    }

    #[test]
    fn primitive_kind_mismatch() {
        let err = decode(&Shape::primitive(Kind::I32), &Value::from("nope")).unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                expected: "i32".into(),
                found: "str".into()
            }
        );
        let err = decode(&Shape::primitive(Kind::Str), &Value::Seq(vec![])).unwrap_err();
        assert!(matches!(err, ValueError::TypeMismatch { .. }));
    }

    #[test]
    fn float_widening_and_exact_narrowing() {
        assert_eq!(
            decode(&Shape::primitive(Kind::F64), &Value::F32(0.5)).unwrap(),
            Value::F64(0.5)
        );
        assert_eq!(
            decode(&Shape::primitive(Kind::F32), &Value::F64(0.25)).unwrap(),
            Value::F32(0.25)
        );
        assert!(decode(&Shape::primitive(Kind::F32), &Value::F64(0.1)).is_err());
    }

    #[test]
    fn bytes_accept_str_tags() {
        assert_eq!(
            decode(&Shape::primitive(Kind::Bytes), &Value::from("ab")).unwrap(),
            Value::Bytes(b"ab".to_vec())
        );
    }

    #[test]
    fn fixed_array_roundtrip_and_length_check() {
        let shape = Shape::array(3, Shape::primitive(Kind::I64));
        let value = Value::Seq(vec![Value::I64(2), Value::I64(3), Value::I64(1)]);
        assert_eq!(decode(&shape, &value).unwrap(), value);

        let short = Value::Seq(vec![Value::I64(2)]);
        assert!(matches!(
            decode(&shape, &short),
            Err(ValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn mapping_values_take_declared_kind() {
        let shape = Shape::mapping(Shape::primitive(Kind::I64));
        let mut map = BTreeMap::new();
        map.insert("test".to_string(), Value::I64(234));
        let value = Value::Map(map);
        assert_eq!(decode(&shape, &value).unwrap(), value);
    }

    #[test]
    fn record_binds_by_name_in_declared_order() {
        let mut wire = BTreeMap::new();
        wire.insert("password".to_string(), Value::from("0101001"));
        wire.insert("username".to_string(), Value::from("genius"));
        wire.insert("extra".to_string(), Value::U8(1));

        let decoded = decode(&login_shape(), &Value::Map(wire)).unwrap();
        assert_eq!(decoded, login("genius", "0101001"));
    }

    #[test]
    fn record_binds_positionally_from_array() {
        let wire = Value::Seq(vec![Value::from("genius"), Value::from("0101001")]);
        assert_eq!(
            decode(&login_shape(), &wire).unwrap(),
            login("genius", "0101001")
        );
    }

    #[test]
    fn record_missing_field() {
        let mut wire = BTreeMap::new();
        wire.insert("username".to_string(), Value::from("genius"));
        assert_eq!(
            decode(&login_shape(), &Value::Map(wire)),
            Err(ValueError::MissingField {
                record: "Login".into(),
                field: "password".into()
            })
        );

        let short = Value::Seq(vec![Value::from("genius")]);
        assert!(matches!(
            decode(&login_shape(), &short),
            Err(ValueError::MissingField { .. })
        ));
    }

    #[test]
    fn strict_record_rejects_unknown_keys() {
        let mut wire = BTreeMap::new();
        wire.insert("username".to_string(), Value::from("a"));
        wire.insert("password".to_string(), Value::from("b"));
        wire.insert("token".to_string(), Value::Nil);
        let bytes = to_bytes(&Value::Map(wire));

        let mut reader = ValueReader::new(&bytes);
        assert_eq!(
            login_shape().decode_strict(&mut reader),
            Err(ValueError::UnknownField {
                record: "Login".into(),
                field: "token".into()
            })
        );
    }

    #[test]
    fn check_accepts_matching_values() {
        assert!(login_shape().check(&login("a", "b")).is_ok());
        assert!(Shape::primitive(Kind::I64).check(&Value::U8(8)).is_ok());
        assert!(Shape::Any.check(&Value::Bytes(vec![1])).is_ok());
        assert!(Shape::sequence(Shape::primitive(Kind::Str))
            .check(&Value::Seq(vec!["a".into(), "b".into()]))
            .is_ok());
    }

    #[test]
    fn check_only_accepts_values_that_decode_unchanged() {
        let f64_shape = Shape::primitive(Kind::F64);
        assert!(f64_shape.check(&Value::F32(0.5)).is_err());
        assert!(f64_shape.check(&Value::F64(0.5)).is_ok());

        let bytes_shape = Shape::primitive(Kind::Bytes);
        assert!(bytes_shape.check(&Value::from("ab")).is_err());
        assert!(bytes_shape.check(&Value::Bytes(b"ab".to_vec())).is_ok());

        let samples = [
            (f64_shape, Value::F64(0.5)),
            (bytes_shape, Value::Bytes(b"ab".to_vec())),
            (Shape::primitive(Kind::F32), Value::F32(0.5)),
            (Shape::primitive(Kind::Str), Value::from("ab")),
        ];
        for (shape, value) in samples {
            assert!(shape.check(&value).is_ok());
            assert_eq!(
                decode(&shape, &value).unwrap(),
                value,
                "{}",
                shape.describe()
            );
        }
    }

    #[test]
    fn nested_shapes_stop_at_max_depth() {
        let mut shape = Shape::primitive(Kind::Nil);
        for _ in 0..gamewire_value::MAX_DEPTH + 1 {
            shape = Shape::sequence(shape);
        }
        let mut bytes = vec![0x91u8; gamewire_value::MAX_DEPTH + 1];
        bytes.push(0xc0);
        let mut reader = ValueReader::new(&bytes);
        assert_eq!(
            shape.decode(&mut reader),
            Err(ValueError::DepthExceeded(gamewire_value::MAX_DEPTH))
        );

        let mut record = Shape::record("Leaf", [("v", Shape::Any)]);
        for _ in 0..gamewire_value::MAX_DEPTH {
            record = Shape::record("Node", [("next", record)]);
        }
        let mut bytes = Vec::new();
        for _ in 0..=gamewire_value::MAX_DEPTH {
            bytes.extend_from_slice(&[0x81, 0xa4]);
            bytes.extend_from_slice(b"next");
        }
        bytes.push(0xc0);
        let mut reader = ValueReader::new(&bytes);
        assert_eq!(
            record.decode(&mut reader),
            Err(ValueError::DepthExceeded(gamewire_value::MAX_DEPTH))
        );
    }

    #[test]
    fn check_reports_path_of_first_mismatch() {
        let shape = Shape::record(
            "Player",
            [("pos", Shape::array(2, Shape::primitive(Kind::F32)))],
        );
        let value = Value::Record(
            Record::new("Player").with_field("pos", Value::Seq(vec![1.0f32.into(), "x".into()])),
        );
        let err = shape.check(&value).unwrap_err();
        assert_eq!(err.path, "$.pos[1]");
        assert_eq!(err.expected, "f32");
        assert_eq!(err.found, "str");
    }

    #[test]
    fn check_rejects_structural_differences() {
        assert!(login_shape()
            .check(&Value::Record(Record::new("Login").with_field("username", "a")))
            .is_err());
        assert!(login_shape()
            .check(&Value::Record(
                Record::new("Other")
                    .with_field("username", "a")
                    .with_field("password", "b")
            ))
            .is_err());
        assert!(Shape::array(2, Shape::Any)
            .check(&Value::Seq(vec![Value::Nil]))
            .is_err());
        assert!(Shape::primitive(Kind::U8).check(&Value::I64(256)).is_err());
        assert!(Shape::mapping(Shape::Any).check(&Value::Nil).is_err());
    }

    #[test]
    fn zero_values_conform_and_roundtrip() {
        let shapes = [
            Shape::Any,
            Shape::primitive(Kind::I16),
            Shape::primitive(Kind::Bytes),
            Shape::array(3, Shape::primitive(Kind::F64)),
            Shape::sequence(Shape::primitive(Kind::Str)),
            Shape::mapping(Shape::Any),
            login_shape(),
        ];
        for shape in shapes {
            let zero = shape.zero_value();
            assert!(shape.check(&zero).is_ok(), "{}", shape.describe());
            assert_eq!(decode(&shape, &zero).unwrap(), zero, "{}", shape.describe());
        }
    }

    #[test]
    fn describe_renders_nested_shapes() {
        let shape = Shape::record(
            "Player",
            [
                ("name", Shape::primitive(Kind::Str)),
                ("pos", Shape::array(2, Shape::primitive(Kind::F32))),
                ("tags", Shape::mapping(Shape::sequence(Shape::Any))),
            ],
        );
        assert_eq!(
            shape.describe(),
            "Player{name: str, pos: [2]f32, tags: map<str, []any>}"
        );
    }

    #[test]
    fn shapes_serialize_externally_tagged() {
        let json = serde_json::to_value(Shape::array(2, Shape::primitive(Kind::U8))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "array": { "len": 2, "element": { "primitive": "u8" } } })
        );
        let back: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(back, Shape::array(2, Shape::primitive(Kind::U8)));
    }
}
