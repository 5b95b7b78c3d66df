//! Conversion between JSON documents and shaped values.
//!
//! JSON has one number type, so the shape decides which width an integer
//! takes. Bytes are written as an array of numbers and read from either an
//! array or a string.

use std::collections::BTreeMap;

use gamewire_value::{Record, Value, ValueError};
use serde_json::{Map, Number, Value as Json};

use crate::shape::{Kind, Shape};

impl Shape {
    /// Build a value of this shape from a JSON document.
    pub fn value_from_json(&self, json: &Json) -> Result<Value, ValueError> {
        match self {
            Shape::Any => Ok(infer(json)),
            Shape::Primitive(kind) => primitive_from_json(*kind, json),
            Shape::Array { len, element } => {
                let items = expect_array(self, json)?;
                if items.len() != *len {
                    return Err(mismatch(self, format!("array of {}", items.len())));
                }
                items
                    .iter()
                    .map(|item| element.value_from_json(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Seq)
            }
            Shape::Sequence(element) => expect_array(self, json)?
                .iter()
                .map(|item| element.value_from_json(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq),
            Shape::Mapping(shape) => {
                let object = json
                    .as_object()
                    .ok_or_else(|| mismatch(self, json_kind(json)))?;
                let mut entries = BTreeMap::new();
                for (key, item) in object {
                    entries.insert(key.clone(), shape.value_from_json(item)?);
                }
                Ok(Value::Map(entries))
            }
            Shape::Record(shape) => {
                let mut record = Record::new(shape.name.clone());
                match json {
                    Json::Object(object) => {
                        for field in &shape.fields {
                            let item =
                                object
                                    .get(&field.name)
                                    .ok_or_else(|| ValueError::MissingField {
                                        record: shape.name.clone(),
                                        field: field.name.clone(),
                                    })?;
                            record.push(field.name.clone(), field.shape.value_from_json(item)?);
                        }
                    }
                    Json::Array(items) => {
                        for (index, field) in shape.fields.iter().enumerate() {
                            let item =
                                items
                                    .get(index)
                                    .ok_or_else(|| ValueError::MissingField {
                                        record: shape.name.clone(),
                                        field: field.name.clone(),
                                    })?;
                            record.push(field.name.clone(), field.shape.value_from_json(item)?);
                        }
                    }
                    other => return Err(mismatch(self, json_kind(other))),
                }
                Ok(Value::Record(record))
            }
        }
    }
}

/// Render a value as JSON. Non-finite floats become `null`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::I8(v) => Json::from(*v),
        Value::I16(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::U8(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::F32(v) => float(f64::from(*v)),
        Value::F64(v) => float(*v),
        Value::Str(v) => Json::String(v.clone()),
        Value::Bytes(v) => Json::Array(v.iter().map(|b| Json::from(*b)).collect()),
        Value::Seq(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), value_to_json(item)))
                .collect::<Map<_, _>>(),
        ),
        Value::Record(record) => Json::Object(
            record
                .fields()
                .iter()
                .map(|(key, item)| (key.clone(), value_to_json(item)))
                .collect::<Map<_, _>>(),
        ),
    }
}

fn float(v: f64) -> Json {
    Number::from_f64(v).map_or(Json::Null, Json::Number)
}

fn primitive_from_json(kind: Kind, json: &Json) -> Result<Value, ValueError> {
    let found = || ValueError::TypeMismatch {
        expected: kind.name().to_string(),
        found: json_kind(json).to_string(),
    };

    match (kind, json) {
        (Kind::Nil, Json::Null) => Ok(Value::Nil),
        (Kind::Bool, Json::Bool(v)) => Ok(Value::Bool(*v)),
        (Kind::F32, Json::Number(n)) => n
            .as_f64()
            .map(|v| Value::F32(v as f32))
            .ok_or_else(found),
        (Kind::F64, Json::Number(n)) => n.as_f64().map(Value::F64).ok_or_else(found),
        (Kind::Str, Json::String(s)) => Ok(Value::Str(s.clone())),
        (Kind::Bytes, Json::String(s)) => Ok(Value::Bytes(s.as_bytes().to_vec())),
        (Kind::Bytes, Json::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(found)
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(Value::Bytes),
        (kind, Json::Number(n)) if kind.int_range().is_some() => {
            let raw = match (n.as_i64(), n.as_u64()) {
                (Some(v), _) => Value::I64(v),
                (None, Some(v)) => Value::U64(v),
                _ => return Err(found()),
            };
            kind.coerce(raw)
        }
        _ => Err(found()),
    }
}

fn infer(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(v) => Value::Bool(*v),
        Json::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(v), _) => Value::I64(v),
            (None, Some(v)) => Value::U64(v),
            _ => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => Value::Seq(items.iter().map(infer).collect()),
        Json::Object(object) => Value::Map(
            object
                .iter()
                .map(|(key, item)| (key.clone(), infer(item)))
                .collect(),
        ),
    }
}

fn expect_array<'a>(shape: &Shape, json: &'a Json) -> Result<&'a Vec<Json>, ValueError> {
    json.as_array()
        .ok_or_else(|| mismatch(shape, json_kind(json)))
}

fn mismatch(shape: &Shape, found: impl Into<String>) -> ValueError {
    ValueError::TypeMismatch {
        expected: shape.describe(),
        found: found.into(),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
