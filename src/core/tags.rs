//! Tag sets and tag patterns.
//!
//! Entity tags are plain key/value strings kept in a [`BTreeMap`], so every
//! pass over an entity's tags visits keys in ascending order. Preset tag
//! declarations keep their source order instead: the first declared key is
//! the preset's primary key.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Tags carried by a mapped entity
pub type Tags = BTreeMap<String, String>;

/// Value used in tag declarations to mean "any value"
pub const WILDCARD: &str = "*";

/// Build a [`Tags`] map from string pairs
pub fn tags_from<K, V, I>(pairs: I) -> Tags
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Required value for one key of a preset's `tags`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPattern {
    /// Any value, written `*`
    Any,
    /// Exactly this value
    Exact(String),
    /// One of several values
    OneOf(Vec<String>),
}

/// How a tag value satisfied a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch {
    Exact,
    Wildcard,
}

impl TagPattern {
    /// Test a present value against this pattern
    #[must_use]
    pub fn matches(&self, value: &str) -> Option<PatternMatch> {
        match self {
            Self::Any => Some(PatternMatch::Wildcard),
            Self::Exact(v) if v == value => Some(PatternMatch::Exact),
            Self::OneOf(vs) if vs.iter().any(|v| v == value) => Some(PatternMatch::Exact),
            _ => None,
        }
    }

    /// Every concrete value this pattern names (`*` for a wildcard)
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Any => vec![WILDCARD],
            Self::Exact(v) => vec![v.as_str()],
            Self::OneOf(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Value written to an entity when this pattern is used as an add tag
    #[must_use]
    pub fn primary_value(&self) -> &str {
        match self {
            Self::Any => WILDCARD,
            Self::Exact(v) => v,
            Self::OneOf(vs) => vs.first().map_or(WILDCARD, String::as_str),
        }
    }
}

impl From<&str> for TagPattern {
    fn from(s: &str) -> Self {
        if s == WILDCARD {
            Self::Any
        } else {
            Self::Exact(s.to_string())
        }
    }
}

impl Serialize for TagPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Any => serializer.serialize_str(WILDCARD),
            Self::Exact(v) => serializer.serialize_str(v),
            Self::OneOf(vs) => vs.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TagPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(s) => TagPattern::from(s.as_str()),
            Raw::Many(vs) if vs.iter().any(|v| v == WILDCARD) => TagPattern::Any,
            Raw::Many(mut vs) if vs.len() == 1 => TagPattern::Exact(vs.remove(0)),
            Raw::Many(vs) => TagPattern::OneOf(vs),
        })
    }
}

/// A key/value mapping that remembers declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedTags<V> {
    entries: Vec<(String, V)>,
}

/// A preset's required tags
pub type TagPatterns = OrderedTags<TagPattern>;

/// Tags written when a preset is applied
pub type AddTags = OrderedTags<String>;

impl<V> OrderedTags<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The first declared entry
    #[must_use]
    pub fn first(&self) -> Option<(&str, &V)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedTags<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedTags<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (k, v) in iter {
            tags.insert(k, v);
        }
        tags
    }
}

impl TagPatterns {
    /// Add tags implied by these patterns
    #[must_use]
    pub fn to_add_tags(&self) -> AddTags {
        self.iter()
            .map(|(k, p)| (k, p.primary_value().to_string()))
            .collect()
    }
}

impl<V: Serialize> Serialize for OrderedTags<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedTagsVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedTagsVisitor<V> {
    type Value = OrderedTags<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of tag keys to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut tags = OrderedTags::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            tags.insert(key, value);
        }
        Ok(tags)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedTags<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedTagsVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_keep_declaration_order() {
        let patterns: TagPatterns =
            serde_json::from_str(r#"{"shop": "bakery", "craft": "*", "amenity": ["cafe", "bar"]}"#)
                .unwrap();
        let keys: Vec<_> = patterns.keys().collect();
        assert_eq!(keys, vec!["shop", "craft", "amenity"]);
        assert_eq!(patterns.first().map(|(k, _)| k), Some("shop"));
        assert_eq!(patterns.get("craft"), Some(&TagPattern::Any));
        assert_eq!(
            patterns.get("amenity"),
            Some(&TagPattern::OneOf(vec!["cafe".into(), "bar".into()]))
        );
    }

    #[test]
    fn test_pattern_matching() {
        assert_eq!(TagPattern::Any.matches("x"), Some(PatternMatch::Wildcard));
        assert_eq!(
            TagPattern::from("bakery").matches("bakery"),
            Some(PatternMatch::Exact)
        );
        assert_eq!(TagPattern::from("bakery").matches("butcher"), None);
        let multi = TagPattern::OneOf(vec!["a".into(), "b".into()]);
        assert_eq!(multi.matches("b"), Some(PatternMatch::Exact));
        assert_eq!(multi.matches("c"), None);
    }

    #[test]
    fn test_add_tags_from_patterns() {
        let patterns: TagPatterns = [
            ("leisure", TagPattern::from("park")),
            ("addr:*", TagPattern::Any),
        ]
        .into_iter()
        .collect();
        let add = patterns.to_add_tags();
        assert_eq!(add.get("leisure").map(String::as_str), Some("park"));
        assert_eq!(add.get("addr:*").map(String::as_str), Some("*"));
    }

    #[test]
    fn test_serialize_preserves_order() {
        let tags: AddTags = [("b", "1".to_string()), ("a", "2".to_string())]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"{"b":"1","a":"2"}"#);
    }
}
