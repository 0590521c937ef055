use super::cache::{self, CacheEntry};
use super::hint::{HintDeserializer, Hints, SiteKey, SiteKind};
use super::{custom_documentation, DocumentationObject, EnumCase, ReflectOptions, TypeHandle, ANY_KEY};
use crate::error::{Error, Result};
use log::debug;
use serde::de::value::{BorrowedStrDeserializer, StringDeserializer};
use serde::de::{
    DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Walks of one root type before its self-describing answers are given up on
const MAX_WALKS: usize = 64;

/// One step of the coding path
#[derive(Debug, Clone)]
pub(crate) struct PathSegment {
    key: String,
    ty: TypeHandle,
}

/// Positions of a sequence share their answers with every position holding the same type
fn site_of(path: &[PathSegment]) -> SiteKey {
    path.iter()
        .map(|segment| match segment.key.parse::<usize>() {
            Ok(_) => format!("[{}]", segment.ty),
            Err(_) => segment.key.clone(),
        })
        .collect()
}

fn display_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    path.iter()
        .map(|segment| segment.key.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

/// State of one decode of a root type
pub(crate) struct Session {
    root: DocumentationObject,
    options: ReflectOptions,
    occurrences: HashMap<(String, TypeHandle), usize>,
    /// Placeholder value produced by the most recent decode step
    sample: Value,
    hints: Hints,
    /// Sites that issued a `deserialize_any` request during this walk
    any_sites: HashSet<SiteKey>,
    any_requests: usize,
    /// Whether a failure of this walk taught the hints something new
    revised: bool,
}

impl Session {
    pub(crate) fn new(root: TypeHandle, options: ReflectOptions, hints: Hints) -> Self {
        Self {
            root: DocumentationObject::new(root),
            options,
            occurrences: HashMap::new(),
            sample: Value::Null,
            hints,
            any_sites: HashSet::new(),
            any_requests: 0,
            revised: false,
        }
    }

    pub(crate) fn finish(self) -> (DocumentationObject, Value) {
        (self.root, self.sample)
    }

    /// The node at `path`.
    ///
    /// Every step of a coding path is recorded before it is descended into, so a missing
    /// node is a bug in the engine.
    fn node_mut(&mut self, path: &[PathSegment]) -> &mut DocumentationObject {
        let mut node = &mut self.root;
        for segment in path {
            node = match node.field_mut(&segment.key) {
                Some(child) => child,
                None => panic!(
                    "no documentation object was recorded at '{}'",
                    display_path(path)
                ),
            };
        }
        node
    }

    fn enter(&mut self, segment: &PathSegment) -> usize {
        let count = self
            .occurrences
            .entry((segment.key.clone(), segment.ty))
            .or_insert(0);
        *count += 1;
        *count
    }

    fn leave(&mut self, segment: &PathSegment) {
        let key = (segment.key.clone(), segment.ty);
        if let Some(count) = self.occurrences.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.occurrences.remove(&key);
            }
        }
    }

    fn occurrences_of(&self, path: &[PathSegment]) -> usize {
        match path.last() {
            Some(segment) => self
                .occurrences
                .get(&(segment.key.clone(), segment.ty))
                .copied()
                .unwrap_or(0),
            None => 0,
        }
    }

    fn in_cycle(&self, path: &[PathSegment]) -> bool {
        self.occurrences_of(path) > self.options.cycle_threshold
    }

    /// Learn from a failure surfacing at `site`; the innermost site that learns wins
    fn revise(&mut self, site: SiteKey, kind: SiteKind, error: &Error) {
        if self.revised || kind == SiteKind::Any && !self.any_sites.contains(&site) {
            return;
        }
        if self.hints.revise(&site, kind, error) {
            debug!("Revising answers at '{}' after: {}", site.join("."), error);
            self.revised = true;
        }
    }

    /// Repetitions past this point mean no optional, sequence, map or enum sits on the
    /// recursion, so the type has no finite value.
    fn runaway_limit(&self) -> usize {
        2 * self.options.cycle_threshold + 1
    }
}

pub(crate) fn decode_root<'de, T: Deserialize<'de>>(session: &mut Session, muted: bool) -> Result<T> {
    let result = T::deserialize(ShapeDeserializer {
        session: &mut *session,
        path: Vec::new(),
        muted,
    });
    if let Err(e) = &result {
        session.revise(SiteKey::new(), SiteKind::Any, e);
    }
    result
}

/// Walk `T` from the root, again and again while failures refine the answers given to
/// self-describing requests.
///
/// Returns the recorded tree and the placeholder sample `T` accepted.
pub(crate) fn walk<T: DeserializeOwned>(
    ty: TypeHandle,
    options: ReflectOptions,
    muted: bool,
) -> Result<(DocumentationObject, Value)> {
    let mut hints = Hints::default();
    for attempt in 1..=MAX_WALKS {
        let mut session = Session::new(ty, options, hints);
        match decode_root::<T>(&mut session, muted) {
            Ok(_) => return Ok(session.finish()),
            Err(e) if session.revised => {
                debug!("Walk {} of {} failed, retrying: {}", attempt, ty, e);
                hints = session.hints;
            }
            Err(e) => return Err(e),
        }
    }
    Err(Error::Decode(format!(
        "no placeholder data satisfied {} within {} walks",
        ty, MAX_WALKS
    )))
}

/// Decode the value under `key` of the container at `parent`.
///
/// Muted decodes walk the value without recording it, as needed for enum payloads.
fn decode_child<'de, S: DeserializeSeed<'de>>(
    session: &mut Session,
    parent: &[PathSegment],
    muted: bool,
    key: String,
    seed: S,
) -> Result<S::Value> {
    let ty = TypeHandle::of::<S::Value>();
    let options = session.options;

    if let Some(entry) = cache::lookup(ty, &options) {
        if !muted {
            session.node_mut(parent).set_field(key, entry.documentation);
        }
        let value = replay(seed, entry.sample.clone(), ty)?;
        session.sample = entry.sample;
        return Ok(value);
    }

    if let Some(custom) = custom_documentation(ty) {
        let documentation = DocumentationObject::with_body(ty, custom.body);
        if !muted {
            session.node_mut(parent).set_field(key.clone(), documentation.clone());
        }
        let any_requests = session.any_requests;
        let value = match custom.placeholder {
            Some(placeholder) => {
                let value = replay(seed, placeholder.clone(), ty)?;
                session.sample = placeholder;
                value
            }
            None => descend(session, parent, true, key, ty, seed)?,
        };
        if !muted && session.any_requests == any_requests {
            cache::insert(
                ty,
                options,
                CacheEntry {
                    sample: session.sample.clone(),
                    documentation,
                },
            );
        }
        return Ok(value);
    }

    let muted = muted
        || !session
            .node_mut(parent)
            .set_field(key.clone(), DocumentationObject::new(ty));
    descend(session, parent, muted, key, ty, seed)
}

fn descend<'de, S: DeserializeSeed<'de>>(
    session: &mut Session,
    parent: &[PathSegment],
    muted: bool,
    key: String,
    ty: TypeHandle,
    seed: S,
) -> Result<S::Value> {
    let mut path = parent.to_vec();
    path.push(PathSegment { key, ty });
    let segment = &path[path.len() - 1];

    let count = session.enter(segment);
    if count > session.runaway_limit() {
        session.leave(segment);
        return Err(Error::Decode(format!(
            "{} recurses at '{}' without an optional, sequence, map or enum in between",
            ty,
            display_path(&path)
        )));
    }

    let any_requests = session.any_requests;
    let result = seed.deserialize(ShapeDeserializer {
        session: &mut *session,
        path: path.clone(),
        muted,
    });
    session.leave(&path[path.len() - 1]);
    let value = match result {
        Ok(value) => value,
        Err(e) => {
            session.revise(site_of(&path), SiteKind::Any, &e);
            return Err(e);
        }
    };

    // Answers to self-describing requests are only known to hold once the root accepts them
    if !muted && session.any_requests == any_requests {
        let documentation = session.node_mut(&path).clone();
        cache::insert(
            ty,
            session.options,
            CacheEntry {
                sample: session.sample.clone(),
                documentation,
            },
        );
    }
    Ok(value)
}

/// Produce a value from a recorded placeholder instead of walking the shape again
fn replay<'de, S: DeserializeSeed<'de>>(seed: S, sample: Value, ty: TypeHandle) -> Result<S::Value> {
    seed.deserialize(sample)
        .map_err(|e| Error::Decode(format!("placeholder of {} was rejected: {}", ty, e)))
}

/// Object keys must be strings; scalars keep their textual form
fn sample_key(sample: Value) -> String {
    match sample {
        Value::String(key) => key,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The synthetic data source handed to `Deserialize` implementations.
pub(crate) struct ShapeDeserializer<'s> {
    session: &'s mut Session,
    path: Vec<PathSegment>,
    muted: bool,
}

macro_rules! deserialize_zero {
    ($method:ident, $visit:ident, $zero:expr) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            self.session.sample = Value::from($zero);
            visitor.$visit($zero)
        }
    };
}

impl<'s> ShapeDeserializer<'s> {
    fn in_cycle(&self) -> bool {
        let in_cycle = self.session.in_cycle(&self.path);
        if in_cycle {
            debug!("Cycle detected at '{}'", display_path(&self.path));
        }
        in_cycle
    }

    fn visit_indexed<'de, V: Visitor<'de>>(self, limit: usize, visitor: V) -> Result<V::Value> {
        let ShapeDeserializer {
            session,
            path,
            muted,
        } = self;
        let mut access = IndexedAccess {
            session: &mut *session,
            path: &path,
            muted,
            limit,
            index: 0,
            samples: Vec::new(),
        };
        let value = visitor.visit_seq(&mut access)?;
        let IndexedAccess {
            index: produced,
            samples,
            ..
        } = access;

        if !muted && produced > 0 && produced >= session.options.max_sequence_len {
            session.node_mut(&path).compress_elements(produced);
        }
        session.sample = Value::Array(samples);
        Ok(value)
    }

    fn visit_keyed<'de, V: Visitor<'de>>(self, keys: Keys, visitor: V) -> Result<V::Value> {
        let ShapeDeserializer {
            session,
            path,
            muted,
        } = self;
        let open = !matches!(keys, Keys::Fields(_));
        let mut access = KeyedAccess {
            session: &mut *session,
            path: &path,
            muted,
            keys,
            pending: None,
            samples: Map::new(),
        };
        let result = visitor.visit_map(&mut access);
        let samples = access.samples;
        let value = match result {
            Ok(value) => value,
            Err(e) => {
                if open {
                    session.revise(site_of(&path), SiteKind::OpenMap, &e);
                }
                return Err(e);
            }
        };

        session.sample = Value::Object(samples);
        Ok(value)
    }
}

impl<'de, 's> Deserializer<'de> for ShapeDeserializer<'s> {
    type Error = Error;

    /// Self-describing requests carry no shape; they are answered from the hints
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let site = site_of(&self.path);
        let answer = self.session.hints.value(&site);
        debug!(
            "Answering self-describing request at '{}' with {}",
            display_path(&self.path),
            answer
        );
        self.session.any_sites.insert(site);
        self.session.any_requests += 1;
        self.session.sample = answer.clone();
        HintDeserializer::new(answer).deserialize_any(visitor)
    }

    deserialize_zero!(deserialize_bool, visit_bool, false);
    deserialize_zero!(deserialize_i8, visit_i8, 0i8);
    deserialize_zero!(deserialize_i16, visit_i16, 0i16);
    deserialize_zero!(deserialize_i32, visit_i32, 0i32);
    deserialize_zero!(deserialize_i64, visit_i64, 0i64);
    deserialize_zero!(deserialize_u8, visit_u8, 0u8);
    deserialize_zero!(deserialize_u16, visit_u16, 0u16);
    deserialize_zero!(deserialize_u32, visit_u32, 0u32);
    deserialize_zero!(deserialize_u64, visit_u64, 0u64);
    deserialize_zero!(deserialize_f32, visit_f32, 0f32);
    deserialize_zero!(deserialize_f64, visit_f64, 0f64);

    fn deserialize_i128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::from(0i64);
        visitor.visit_i128(0)
    }

    fn deserialize_u128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::from(0u64);
        visitor.visit_u128(0)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::String('\0'.to_string());
        visitor.visit_char('\0')
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::String(String::new());
        visitor.visit_borrowed_str("")
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::String(String::new());
        visitor.visit_string(String::new())
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::Array(Vec::new());
        visitor.visit_borrowed_bytes(&[])
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::Array(Vec::new());
        visitor.visit_byte_buf(Vec::new())
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.in_cycle() {
            self.session.sample = Value::Null;
            return visitor.visit_none();
        }
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.session.sample = Value::Null;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let limit = if self.in_cycle() {
            0
        } else {
            self.session.options.max_sequence_len
        };
        self.visit_indexed(limit, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        self.visit_indexed(len, visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.visit_indexed(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let keys = if self.in_cycle() {
            Keys::Fields(NO_FIELDS.iter())
        } else if let Some(learned) = self.session.hints.keys(&site_of(&self.path)) {
            Keys::Learned(learned.into_iter())
        } else {
            Keys::Open { yielded: false }
        };
        self.visit_keyed(keys, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.visit_keyed(Keys::Fields(fields.iter()), visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let ShapeDeserializer {
            session,
            path,
            muted,
        } = self;
        if variants.is_empty() {
            return Err(Error::Decode(format!("enum {} has no variants", name)));
        }
        if !muted {
            let cases = variants
                .iter()
                .map(|variant| EnumCase::new(None, *variant))
                .collect();
            session.node_mut(&path).set_cases(cases);
        }

        // Rotate through the variants once the path starts repeating so that
        // recursive enums reach a variant that ends the recursion
        let occurrences = session.occurrences_of(&path);
        let threshold = session.options.cycle_threshold;
        let index = if occurrences > threshold {
            (occurrences - threshold) % variants.len()
        } else {
            0
        };

        visitor.visit_enum(VariantChoice {
            session,
            path,
            variant: variants[index],
        })
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }
}

/// Integer-keyed container access
struct IndexedAccess<'a> {
    session: &'a mut Session,
    path: &'a [PathSegment],
    muted: bool,
    limit: usize,
    index: usize,
    samples: Vec<Value>,
}

impl<'de, 'a> SeqAccess<'de> for IndexedAccess<'a> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.index >= self.limit {
            return Ok(None);
        }
        let value = decode_child(
            &mut *self.session,
            self.path,
            self.muted,
            self.index.to_string(),
            seed,
        )?;
        self.samples
            .push(std::mem::take(&mut self.session.sample));
        self.index += 1;
        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.limit - self.index)
    }
}

const NO_FIELDS: &[&str] = &[];

/// Where the keys of a keyed container come from
enum Keys {
    /// Declared field names of a struct
    Fields(std::slice::Iter<'static, &'static str>),
    /// A map: one synthetic key standing for any key
    Open { yielded: bool },
    /// A map whose visitor was found to require these keys
    Learned(std::vec::IntoIter<String>),
}

/// String-keyed container access
struct KeyedAccess<'a> {
    session: &'a mut Session,
    path: &'a [PathSegment],
    muted: bool,
    keys: Keys,
    /// Recorded key and sample key of the entry whose value comes next
    pending: Option<(String, String)>,
    samples: Map<String, Value>,
}

impl<'de, 'a> MapAccess<'de> for KeyedAccess<'a> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match &mut self.keys {
            Keys::Fields(fields) => {
                let Some(field) = fields.next() else {
                    return Ok(None);
                };
                self.pending = Some((field.to_string(), field.to_string()));
                seed.deserialize(BorrowedStrDeserializer::<Error>::new(*field))
                    .map(Some)
            }
            Keys::Open { yielded } => {
                if *yielded {
                    return Ok(None);
                }
                *yielded = true;
                let key = seed.deserialize(ShapeDeserializer {
                    session: &mut *self.session,
                    path: self.path.to_vec(),
                    muted: true,
                })?;
                let sample = std::mem::take(&mut self.session.sample);
                self.pending = Some((ANY_KEY.to_string(), sample_key(sample)));
                Ok(Some(key))
            }
            Keys::Learned(keys) => {
                let Some(key) = keys.next() else {
                    return Ok(None);
                };
                self.pending = Some((key.clone(), key.clone()));
                seed.deserialize(StringDeserializer::<Error>::new(key))
                    .map(Some)
            }
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let (key, sample_key) = self
            .pending
            .take()
            .ok_or_else(|| Error::Decode("map value requested before its key".to_string()))?;
        let value = decode_child(&mut *self.session, self.path, self.muted, key, seed)?;
        self.samples
            .insert(sample_key, std::mem::take(&mut self.session.sample));
        Ok(value)
    }

    fn size_hint(&self) -> Option<usize> {
        match &self.keys {
            Keys::Fields(fields) => Some(fields.len()),
            Keys::Open { yielded } => Some(usize::from(!*yielded)),
            Keys::Learned(keys) => Some(keys.len()),
        }
    }
}

/// Chooses one variant of an enum and walks its payload without recording it
struct VariantChoice<'a> {
    session: &'a mut Session,
    path: Vec<PathSegment>,
    variant: &'static str,
}

impl<'a> VariantChoice<'a> {
    fn wrap_sample(&mut self) {
        let content = std::mem::take(&mut self.session.sample);
        let mut sample = Map::new();
        sample.insert(self.variant.to_string(), content);
        self.session.sample = Value::Object(sample);
    }

    fn muted_deserializer(&mut self) -> ShapeDeserializer<'_> {
        ShapeDeserializer {
            session: &mut *self.session,
            path: self.path.clone(),
            muted: true,
        }
    }
}

impl<'de, 'a> EnumAccess<'de> for VariantChoice<'a> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))?;
        Ok((variant, self))
    }
}

impl<'de, 'a> VariantAccess<'de> for VariantChoice<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        self.session.sample = Value::String(self.variant.to_string());
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(mut self, seed: T) -> Result<T::Value> {
        let value = decode_child(
            &mut *self.session,
            &self.path,
            true,
            self.variant.to_string(),
            seed,
        )?;
        self.wrap_sample();
        Ok(value)
    }

    fn tuple_variant<V: Visitor<'de>>(mut self, len: usize, visitor: V) -> Result<V::Value> {
        let value = self.muted_deserializer().visit_indexed(len, visitor)?;
        self.wrap_sample();
        Ok(value)
    }

    fn struct_variant<V: Visitor<'de>>(
        mut self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let value = self
            .muted_deserializer()
            .visit_keyed(Keys::Fields(fields.iter()), visitor)?;
        self.wrap_sample();
        Ok(value)
    }
}
