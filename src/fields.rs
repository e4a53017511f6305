use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A decoded header field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    UInt(u64),
    Int(i64),
    Fixed(f64),
    Text(String),
    /// Zero-copy view into the backing buffer.
    Bytes(&'a [u8]),
}

impl FieldValue<'_> {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::UInt(v) => Some(*v),
            FieldValue::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::UInt(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Fixed(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Bytes(b) => write!(f, "{} bytes", b.len()),
        }
    }
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::UInt(v) => s.serialize_u64(*v),
            FieldValue::Int(v) => s.serialize_i64(*v),
            FieldValue::Fixed(v) => s.serialize_f64(*v),
            FieldValue::Text(v) => s.serialize_str(v),
            FieldValue::Bytes(b) => s.serialize_str(&hex::encode(b)),
        }
    }
}

/// Field name to value mapping, kept in decode order.
///
/// Boxes carry only a handful of fields, so a vector beats a hash map here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields<'a> {
    entries: Vec<(&'static str, FieldValue<'a>)>,
}

impl<'a> Fields<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: &'static str, value: FieldValue<'a>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue<'a>> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(FieldValue::as_u64)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue<'a>)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }
}

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
