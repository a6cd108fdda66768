//! Structural type descriptors attached in-band to fetched data.
//!
//! Descriptors are plain values built through the associated constructors on
//! [`TypeDescriptor`]; they serialize with the same `kind`/`type` tags that
//! downstream consumers of the envelope expect.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Scalar kinds known to the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Id,
    String,
    Boolean,
    Date,
}

impl ScalarKind {
    /// Name of the scalar kind
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Id => "ID",
            ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Date => "Date",
        }
    }

    /// Underlying value type written to the `type` tag. IDs travel as strings.
    pub fn type_tag(self) -> &'static str {
        match self {
            ScalarKind::Id | ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Date => "Date",
        }
    }
}

/// A minimal structural type tag for a value in the response.
///
/// Record fields keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    Record(Vec<(String, TypeDescriptor)>),
    RecordSet(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn id() -> Self {
        Self::Scalar(ScalarKind::Id)
    }

    pub fn string() -> Self {
        Self::Scalar(ScalarKind::String)
    }

    pub fn boolean() -> Self {
        Self::Scalar(ScalarKind::Boolean)
    }

    pub fn date() -> Self {
        Self::Scalar(ScalarKind::Date)
    }

    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeDescriptor)>,
        K: Into<String>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn record_set(item: TypeDescriptor) -> Self {
        Self::RecordSet(Box::new(item))
    }

    /// Look up a field of a record descriptor
    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> {
        match self {
            Self::Record(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(kind) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "SCALAR")?;
                map.serialize_entry("type", kind.type_tag())?;
                map.end()
            }
            Self::Record(fields) => {
                let mut item = Map::new();
                for (name, descriptor) in fields {
                    let value = serde_json::to_value(descriptor).map_err(serde::ser::Error::custom)?;
                    item.insert(name.clone(), value);
                }
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("kind", "QUERYRESULT")?;
                map.serialize_entry("type", "Record")?;
                map.serialize_entry("item", &item)?;
                map.end()
            }
            Self::RecordSet(item) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("kind", "QUERYRESULT")?;
                map.serialize_entry("type", "Recordset")?;
                map.serialize_entry("items", item.as_ref())?;
                map.end()
            }
        }
    }
}

/// Schema of a response: top-level data key to its descriptor, in key order.
pub type Schema = Vec<(String, TypeDescriptor)>;

/// Record descriptor used for every query result.
///
/// The field set is fixed and does not look at the actual result shape.
pub fn query_result_record() -> TypeDescriptor {
    TypeDescriptor::record([
        ("id", TypeDescriptor::id()),
        ("description", TypeDescriptor::string()),
        ("isPrivate", TypeDescriptor::boolean()),
        ("license", TypeDescriptor::string()),
        ("pushedAt", TypeDescriptor::date()),
    ])
}

/// Derive the schema for a response's `data` value.
///
/// Only the first key of `data` gets an entry. Returns `None` when `data` is
/// not an object or has no keys.
pub fn make_schema_for_data(data: &Value) -> Option<Schema> {
    let first_key = data.as_object()?.keys().next()?;
    Some(vec![(first_key.clone(), query_result_record())])
}
