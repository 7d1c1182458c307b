//! Content model: projects, front matter values, articles and render pages.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use thiserror::Error;

/// A website project known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
}

/// Why a YAML metadata block could not be turned into [`FrontMatter`]
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported mapping key: {0}")]
    ComplexKey(String),

    #[error("Expected a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// A single front matter value
#[derive(Debug, Clone, PartialEq)]
pub enum FrontMatterValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<FixedOffset>),
    List(Vec<FrontMatterValue>),
    Map(FrontMatter),
}

impl FrontMatterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontMatterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FrontMatterValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FrontMatterValue::Null => "null",
            FrontMatterValue::Bool(_) => "bool",
            FrontMatterValue::Integer(_) => "integer",
            FrontMatterValue::Float(_) => "float",
            FrontMatterValue::String(_) => "string",
            FrontMatterValue::Timestamp(_) => "timestamp",
            FrontMatterValue::List(_) => "list",
            FrontMatterValue::Map(_) => "mapping",
        }
    }

    /// Convert a parsed YAML value
    ///
    /// Strings stay strings even when they look like dates; schemas that
    /// want a timestamp parse it themselves with [`parse_timestamp`].
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, MetadataError> {
        use serde_yaml::Value;

        Ok(match value {
            Value::Null => FrontMatterValue::Null,
            Value::Bool(b) => FrontMatterValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FrontMatterValue::Integer(i)
                } else {
                    FrontMatterValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => FrontMatterValue::String(s),
            Value::Sequence(items) => FrontMatterValue::List(
                items
                    .into_iter()
                    .map(FrontMatterValue::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(mapping) => {
                FrontMatterValue::Map(FrontMatter::from_yaml(Value::Mapping(mapping))?)
            }
            Value::Tagged(tagged) => FrontMatterValue::from_yaml(tagged.value)?,
        })
    }
}

/// Parse the timestamp spellings YAML authors commonly use
///
/// Date-only values are taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

impl From<&str> for FrontMatterValue {
    fn from(value: &str) -> Self {
        FrontMatterValue::String(value.to_string())
    }
}

impl From<String> for FrontMatterValue {
    fn from(value: String) -> Self {
        FrontMatterValue::String(value)
    }
}

impl From<bool> for FrontMatterValue {
    fn from(value: bool) -> Self {
        FrontMatterValue::Bool(value)
    }
}

impl From<i64> for FrontMatterValue {
    fn from(value: i64) -> Self {
        FrontMatterValue::Integer(value)
    }
}

impl From<f64> for FrontMatterValue {
    fn from(value: f64) -> Self {
        FrontMatterValue::Float(value)
    }
}

impl From<DateTime<FixedOffset>> for FrontMatterValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FrontMatterValue::Timestamp(value)
    }
}

impl Serialize for FrontMatterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FrontMatterValue::Null => serializer.serialize_unit(),
            FrontMatterValue::Bool(b) => serializer.serialize_bool(*b),
            FrontMatterValue::Integer(i) => serializer.serialize_i64(*i),
            FrontMatterValue::Float(f) => serializer.serialize_f64(*f),
            FrontMatterValue::String(s) => serializer.serialize_str(s),
            FrontMatterValue::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            FrontMatterValue::List(items) => items.serialize(serializer),
            FrontMatterValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FrontMatterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        FrontMatterValue::from_yaml(value).map_err(D::Error::custom)
    }
}

/// Insertion-ordered front matter mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    entries: Vec<(String, FrontMatterValue)>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from a YAML document; `null` is an empty mapping
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, MetadataError> {
        use serde_yaml::Value;

        let mapping = match value {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(mapping) => mapping,
            Value::Tagged(tagged) => return Self::from_yaml(tagged.value),
            Value::Bool(_) => return Err(MetadataError::NotAMapping("a boolean")),
            Value::Number(_) => return Err(MetadataError::NotAMapping("a number")),
            Value::String(_) => return Err(MetadataError::NotAMapping("a string")),
            Value::Sequence(_) => return Err(MetadataError::NotAMapping("a sequence")),
        };

        let mut front_matter = Self::new();
        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => return Err(MetadataError::ComplexKey(format!("{other:?}"))),
            };
            front_matter.insert(key, FrontMatterValue::from_yaml(value)?);
        }
        Ok(front_matter)
    }

    pub fn get(&self, key: &str) -> Option<&FrontMatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert a value; an existing key keeps its position
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FrontMatterValue>,
    ) -> Option<FrontMatterValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FrontMatterValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontMatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FrontMatterValue>> FromIterator<(K, V)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut front_matter = FrontMatter::new();
        for (k, v) in iter {
            front_matter.insert(k, v);
        }
        front_matter
    }
}

impl IntoIterator for FrontMatter {
    type Item = (String, FrontMatterValue);
    type IntoIter = std::vec::IntoIter<(String, FrontMatterValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for FrontMatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FrontMatter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        FrontMatter::from_yaml(value).map_err(D::Error::custom)
    }
}

/// A blog article: a document with a fixed `title`/`date` schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,

    #[serde(alias = "date")]
    pub publish_date: DateTime<FixedOffset>,

    #[serde(default)]
    pub body: String,

    /// Logical path below the project's content directory, `/`-separated
    #[serde(default)]
    pub relative_path: String,

    /// User-defined front matter fields beyond `title` and `date`
    #[serde(default)]
    pub extra: FrontMatter,
}

impl Article {
    pub fn new(title: impl Into<String>, publish_date: DateTime<FixedOffset>) -> Self {
        Self {
            title: title.into(),
            publish_date,
            body: String::new(),
            relative_path: String::new(),
            extra: FrontMatter::new(),
        }
    }

    /// Full front matter: `title`, `date`, then the extra fields in order
    pub fn front_matter(&self) -> FrontMatter {
        let mut fm = FrontMatter::new();
        fm.insert("title", self.title.as_str());
        fm.insert("date", self.publish_date);
        for (key, value) in self.extra.iter() {
            if key != "title" && key != "date" {
                fm.insert(key, value.clone());
            }
        }
        fm
    }
}

/// Build-time render context handed to the page template
#[derive(Debug, Clone)]
pub struct Page {
    pub front_matter: FrontMatter,
    pub html_content: String,
}
