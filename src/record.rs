//! JSON codec for persisted run records.
//!
//! A record is a JSON object with a string `pretty_name`. Every other field is
//! opaque: it is kept in its original order and written back untouched.
//! Numbers keep their source text (`1e2` stays `1e2`, big integers stay exact).

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Key of the display-name field inside a run record.
pub const PRETTY_NAME_FIELD: &str = "pretty_name";

#[derive(Error, Debug)]
pub enum RecordFormatError {
    #[error("not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("missing string field `pretty_name`")]
    MissingPrettyName,

    #[error("duplicate object key `{0}`")]
    DuplicateKey(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RunRecord {
    fields: Map<String, Value>,
}

impl RunRecord {
    /// Build a record with only a display name. Mostly useful for seeding stores.
    pub fn new(pretty_name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            PRETTY_NAME_FIELD.to_string(),
            Value::String(pretty_name.into()),
        );
        Self { fields }
    }

    /// Parse a stored record.
    ///
    /// Objects with a repeated key are refused anywhere in the document:
    /// keeping only one of the values would silently change the record.
    pub fn parse(bytes: &[u8]) -> Result<Self, RecordFormatError> {
        let value: Value = serde_json::from_slice(bytes)?;
        if let FirstDuplicateKey(Some(key)) = serde_json::from_slice(bytes)? {
            return Err(RecordFormatError::DuplicateKey(key));
        }
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, RecordFormatError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(RecordFormatError::NotAnObject(json_kind(&other))),
        };
        if !matches!(fields.get(PRETTY_NAME_FIELD), Some(Value::String(_))) {
            return Err(RecordFormatError::MissingPrettyName);
        }
        Ok(Self { fields })
    }

    pub fn pretty_name(&self) -> &str {
        self.fields
            .get(PRETTY_NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Replace the display name, returning the previous one.
    pub fn set_pretty_name(&mut self, name: impl Into<String>) -> String {
        let previous = self.pretty_name().to_string();
        // insert() on an existing key keeps its position with preserve_order
        self.fields
            .insert(PRETTY_NAME_FIELD.to_string(), Value::String(name.into()));
        previous
    }

    /// Builder-style setter for an opaque field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.fields)
    }
}

/// First object key that appears twice in the same object, searched depth-first.
struct FirstDuplicateKey(Option<String>);

impl<'de> Deserialize<'de> for FirstDuplicateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DuplicateKeyVisitor)
    }
}

struct DuplicateKeyVisitor;

impl<'de> Visitor<'de> for DuplicateKeyVisitor {
    type Value = FirstDuplicateKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(FirstDuplicateKey(None))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(FirstDuplicateKey(None))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(FirstDuplicateKey(None))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(FirstDuplicateKey(None))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(FirstDuplicateKey(None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FirstDuplicateKey(None))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut first = None;
        while let Some(FirstDuplicateKey(nested)) = seq.next_element()? {
            first = first.or(nested);
        }
        Ok(FirstDuplicateKey(first))
    }

    // Also sees serde_json's single-entry wrapper map for exact numbers,
    // which can never hold a duplicate.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seen = HashSet::new();
        let mut first = None;
        while let Some(key) = map.next_key::<String>()? {
            let FirstDuplicateKey(nested) = map.next_value()?;
            let repeated = !seen.insert(key.clone());
            first = first.or(repeated.then_some(key)).or(nested);
        }
        Ok(FirstDuplicateKey(first))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
