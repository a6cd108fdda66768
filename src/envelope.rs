use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::schema::{Schema, TypeDescriptor};

/// Where and when an envelope's payload was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    fetched_from: String,
    fetched_at: DateTime<Utc>,
}

impl Meta {
    pub fn new(fetched_from: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self { fetched_from: fetched_from.into(), fetched_at }
    }

    pub fn fetched_from(&self) -> &str {
        &self.fetched_from
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Normalized, read-only result of one fetch.
///
/// An envelope is built once and never changed afterwards: a re-fetch yields
/// a new envelope, so holders of an older one can compare the two with `==`
/// to detect a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    data: Option<Value>,
    errors: Option<Vec<Value>>,
    extensions: Option<Value>,
    #[serde(serialize_with = "serialize_schema")]
    schema: Option<Schema>,
    meta: Meta,
}

impl ResponseEnvelope {
    pub(crate) fn new(
        data: Option<Value>,
        errors: Option<Vec<Value>>,
        extensions: Option<Value>,
        schema: Option<Schema>,
        meta: Meta,
    ) -> Self {
        Self { data, errors, extensions, schema, meta }
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn errors(&self) -> Option<&[Value]> {
        self.errors.as_deref()
    }

    pub fn extensions(&self) -> Option<&Value> {
        self.extensions.as_ref()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Descriptor for a top-level data key, if the schema has one
    pub fn schema_for(&self, key: &str) -> Option<&TypeDescriptor> {
        self.schema.as_ref()?.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// True when the server reported at least one error
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().map_or(false, |e| !e.is_empty())
    }

    /// Consume the envelope and take its data
    pub fn into_data(self) -> Option<Value> {
        self.data
    }
}

fn serialize_schema<S: Serializer>(schema: &Option<Schema>, serializer: S) -> Result<S::Ok, S::Error> {
    match schema {
        None => serializer.serialize_none(),
        Some(entries) => {
            let mut map = serializer.serialize_map(Some(entries.len()))?;
            for (key, descriptor) in entries {
                map.serialize_entry(key, descriptor)?;
            }
            map.end()
        }
    }
}
