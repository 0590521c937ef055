//! Answers for requests that carry no shape.
//!
//! `deserialize_any` is how serde reads self-describing data: flattened structs buffer the
//! keys they do not declare, internally tagged and untagged enums capture the raw content
//! before choosing a variant. Nothing tells the engine which value such a visitor accepts,
//! so every request site is offered a candidate value. When a walk fails, the error it
//! reported refines the candidates and the root is walked again.

use crate::error::{Error, Result};
use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{Deserializer, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Keys of a coding path; the root is empty
pub(crate) type SiteKey = Vec<String>;

/// Answers tried in turn at a site nothing has been learned about
fn candidate(index: usize) -> Option<Value> {
    match index {
        0 => Some(Value::Null),
        1 => Some(Value::String(String::new())),
        2 => Some(Value::from(0u64)),
        3 => Some(Value::Bool(false)),
        4 => Some(Value::Array(Vec::new())),
        5 => Some(Value::Object(Map::new())),
        _ => None,
    }
}

/// Where a failure surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SiteKind {
    /// A `deserialize_any` request
    Any,
    /// A map whose keys are chosen by the visitor
    OpenMap,
}

#[derive(Debug, Default)]
struct Hint {
    candidate: usize,
    /// Keys learned from missing-field errors, in the order they were asked for
    keys: Vec<String>,
    /// Variant name learned for a tag
    variant: Option<&'static str>,
}

impl Hint {
    fn is_learned(&self) -> bool {
        self.variant.is_some() || !self.keys.is_empty()
    }
}

/// Candidate answers of one root type, kept across its walks
#[derive(Debug, Default)]
pub(crate) struct Hints {
    sites: HashMap<SiteKey, Hint>,
}

impl Hints {
    /// Keys learned for the map at `site`
    pub(crate) fn keys(&self, site: &[String]) -> Option<Vec<String>> {
        self.sites
            .get(site)
            .filter(|hint| !hint.keys.is_empty())
            .map(|hint| hint.keys.clone())
    }

    /// The value offered at `site`
    pub(crate) fn value(&self, site: &[String]) -> Value {
        let Some(hint) = self.sites.get(site) else {
            return Value::Null;
        };
        if let Some(variant) = hint.variant {
            return Value::String(variant.to_string());
        }
        if hint.keys.is_empty() {
            return candidate(hint.candidate).unwrap_or(Value::Null);
        }

        let mut child = site.to_vec();
        let mut entries = Map::new();
        for key in &hint.keys {
            child.push(key.clone());
            entries.insert(key.clone(), self.value(&child));
            child.pop();
        }
        Value::Object(entries)
    }

    /// Refine the answers after `error` surfaced at `site`.
    ///
    /// Returns `false` when there is nothing left to try for that error.
    pub(crate) fn revise(&mut self, site: &[String], kind: SiteKind, error: &Error) -> bool {
        match error {
            Error::MissingField(field) => {
                let hint = self.sites.entry(site.to_vec()).or_default();
                if hint.keys.iter().any(|key| key == field) {
                    return false;
                }
                hint.keys.push(field.to_string());
                true
            }
            // The key learned last holds the rejected name
            Error::UnknownVariant { expected, .. } => match (self.last_key_site(site), expected.first()) {
                (Some(tag), Some(variant)) => {
                    let hint = self.sites.entry(tag).or_default();
                    if hint.variant.is_some() {
                        return false;
                    }
                    hint.variant = Some(*variant);
                    true
                }
                _ => false,
            },
            _ => match self.last_key_site(site) {
                Some(key_site) => self.advance(key_site),
                None if kind == SiteKind::Any => self.advance(site.to_vec()),
                None => false,
            },
        }
    }

    fn last_key_site(&self, site: &[String]) -> Option<SiteKey> {
        let key = self.sites.get(site)?.keys.last()?;
        let mut key_site = site.to_vec();
        key_site.push(key.clone());
        Some(key_site)
    }

    fn advance(&mut self, site: SiteKey) -> bool {
        let hint = self.sites.entry(site).or_default();
        if hint.is_learned() {
            return false;
        }
        hint.candidate += 1;
        candidate(hint.candidate).is_some()
    }
}

/// Replays a hint value, reporting failures with the engine's own error type so that
/// missing fields and unknown variants stay recognisable.
pub(crate) struct HintDeserializer {
    value: Value,
}

impl HintDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }
}

impl<'de> IntoDeserializer<'de, Error> for HintDeserializer {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> Deserializer<'de> for HintDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(value) => visitor.visit_bool(value),
            Value::Number(number) => {
                if let Some(value) = number.as_u64() {
                    visitor.visit_u64(value)
                } else if let Some(value) = number.as_i64() {
                    visitor.visit_i64(value)
                } else {
                    visitor.visit_f64(number.as_f64().unwrap_or_default())
                }
            }
            Value::String(value) => visitor.visit_string(value),
            Value::Array(items) => {
                visitor.visit_seq(SeqDeserializer::new(items.into_iter().map(HintDeserializer::new)))
            }
            Value::Object(entries) => visitor.visit_map(MapDeserializer::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, HintDeserializer::new(value))),
            )),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    fn site(keys: &[&str]) -> SiteKey {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn test_candidates_advance_until_exhausted() {
        let mut hints = Hints::default();
        let error = Error::Decode("rejected".to_string());

        let mut offered = vec![hints.value(&[])];
        while hints.revise(&[], SiteKind::Any, &error) {
            offered.push(hints.value(&[]));
        }
        assert_eq!(offered, vec![json!(null), json!(""), json!(0), json!(false), json!([]), json!({})]);
    }

    #[test]
    fn test_open_maps_do_not_cycle_candidates() {
        let mut hints = Hints::default();
        assert!(!hints.revise(&[], SiteKind::OpenMap, &Error::Decode("rejected".to_string())));
    }

    #[test]
    fn test_missing_fields_and_variants_build_an_object() {
        let mut hints = Hints::default();
        assert!(hints.revise(&[], SiteKind::Any, &Error::MissingField("type")));
        assert!(!hints.revise(&[], SiteKind::Any, &Error::MissingField("type")));
        assert_eq!(hints.value(&[]), json!({ "type": null }));

        let unknown = Error::UnknownVariant {
            variant: String::new(),
            expected: &["Created", "Deleted"],
        };
        assert!(hints.revise(&[], SiteKind::Any, &unknown));
        assert!(hints.revise(&[], SiteKind::Any, &Error::MissingField("id")));
        assert!(hints.revise(&[], SiteKind::Any, &Error::Decode("rejected".to_string())));

        assert_eq!(hints.value(&[]), json!({ "type": "Created", "id": "" }));
        assert_eq!(hints.keys(&[]), Some(vec!["type".to_string(), "id".to_string()]));
        assert_eq!(hints.value(&site(&["id"])), json!(""));
    }

    #[test]
    fn test_hint_deserializer_reports_missing_fields() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Point {
            x: i64,
            label: Option<String>,
        }

        let point = Point::deserialize(HintDeserializer::new(json!({ "x": 3 }))).unwrap();
        assert_eq!(point.x, 3);
        assert_eq!(point.label, None);

        let error = Point::deserialize(HintDeserializer::new(json!({}))).unwrap_err();
        assert!(matches!(error, Error::MissingField("x")));
    }
}
