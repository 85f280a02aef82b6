//! Extracted records

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Name of the provenance field appended to every record
pub const SOURCE_PAGE: &str = "source_page";

/// A typed field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer(n) => serializer.serialize_i64(*n),
        }
    }
}

/// One extracted listing entry
///
/// Fields keep their declaration order. Records are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
    source_page: u32,
}

impl Record {
    pub(crate) fn new(fields: Vec<(String, FieldValue)>, source_page: u32) -> Self {
        Self {
            fields,
            source_page,
        }
    }

    /// Page index the record was extracted from
    pub fn source_page(&self) -> u32 {
        self.source_page
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Values rendered as strings, in the order of `columns`
    ///
    /// `source_page` is available as a column; unknown columns render empty.
    pub fn row(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|column| {
                if column == SOURCE_PAGE {
                    self.source_page.to_string()
                } else {
                    self.get(column).map(|v| v.to_string()).unwrap_or_default()
                }
            })
            .collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(SOURCE_PAGE, &self.source_page)?;
        map.end()
    }
}
