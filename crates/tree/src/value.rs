//! The structured value produced by converting an XML document.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;

/// A nested mapping / sequence / text representation of an XML document.
///
/// Sibling elements sharing a name are grouped under one key; whether a
/// single occurrence is wrapped in a [`XmlValue::Sequence`] depends on the
/// `explicit_array` shaping option. Map keys are ordered deterministically.
///
/// The type implements [`serde::Serialize`], so a parsed body can be handed
/// to any serde backend (for example echoed back to a client as JSON).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    Text(String),
    Sequence(Vec<XmlValue>),
    Map(BTreeMap<String, XmlValue>),
}

impl XmlValue {
    /// An empty mapping, the value attached for tolerated empty bodies.
    pub fn empty_map() -> Self {
        Self::Map(BTreeMap::new())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[XmlValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, XmlValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up an entry by key when the value is a map.
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<&str> for XmlValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for XmlValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl FromIterator<(String, XmlValue)> for XmlValue {
    fn from_iter<I: IntoIterator<Item = (String, XmlValue)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}

impl Serialize for XmlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut entries = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    entries.serialize_entry(key, value)?;
                }
                entries.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::XmlValue;
    use serde_json::json;

    #[test]
    fn accessors() {
        let value: XmlValue = [("name".to_string(), XmlValue::from("Bob"))].into_iter().collect();

        assert_eq!(value.get("name").and_then(XmlValue::as_text), Some("Bob"));
        assert!(value.get("missing").is_none());
        assert!(value.as_text().is_none());
        assert!(XmlValue::from("Bob").get("name").is_none());
    }

    #[test]
    fn serializes_to_json_shape() {
        let value: XmlValue = [(
            "customer".to_string(),
            [("name".to_string(), XmlValue::Sequence(vec![XmlValue::from("Bob")]))].into_iter().collect(),
        )]
        .into_iter()
        .collect();

        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"customer": {"name": ["Bob"]}}));
    }

    #[test]
    fn empty_map_serializes_to_empty_object() {
        assert_eq!(serde_json::to_value(XmlValue::empty_map()).unwrap(), json!({}));
    }
}
