//! Naming-aware deserialization of response subtrees.
//!
//! [`Projector`] wraps a `serde_json::Value` and hands it to a target type.
//! Wire keys are mapped through [`NamingPolicy::from_wire`] only where the
//! target asks for a struct and the wire key is not already one of its
//! fields. Maps, `Value` and `Document` targets see the keys exactly as the
//! server sent them.
//!
//! Struct fields nested inside enum variants, untagged enums and
//! `#[serde(flatten)]` are read verbatim, since serde buffers those without
//! naming the fields it expects.

use std::collections::HashMap;

use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeSeed, Deserializer, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};

use crate::naming::NamingPolicy;

pub(crate) struct Projector<'a> {
    value: Value,
    naming: &'a dyn NamingPolicy,
}

impl<'a> Projector<'a> {
    pub(crate) fn new(value: Value, naming: &'a dyn NamingPolicy) -> Self {
        Self { value, naming }
    }
}

impl<'de> Deserializer<'de> for Projector<'_> {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Array(items) => visitor.visit_seq(ProjectedSeq::new(items, self.naming)),
            Value::Object(object) => {
                visitor.visit_map(ProjectedMap::verbatim(object, self.naming))
            }
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Object(object) => {
                visitor.visit_map(ProjectedMap::for_struct(object, fields, self.naming)?)
            }
            Value::Array(items) => visitor.visit_seq(ProjectedSeq::new(items, self.naming)),
            other => other.deserialize_struct(name, fields, visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value.deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
        ignored_any
    }
}

struct ProjectedSeq<'a> {
    items: std::vec::IntoIter<Value>,
    naming: &'a dyn NamingPolicy,
}

impl<'a> ProjectedSeq<'a> {
    fn new(items: Vec<Value>, naming: &'a dyn NamingPolicy) -> Self {
        Self {
            items: items.into_iter(),
            naming,
        }
    }
}

impl<'de> SeqAccess<'de> for ProjectedSeq<'_> {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.items.next() {
            Some(value) => seed.deserialize(Projector::new(value, self.naming)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct ProjectedMap<'a> {
    entries: std::vec::IntoIter<(String, Value)>,
    pending: Option<Value>,
    naming: &'a dyn NamingPolicy,
}

impl<'a> ProjectedMap<'a> {
    fn verbatim(object: Map<String, Value>, naming: &'a dyn NamingPolicy) -> Self {
        Self::from_entries(object.into_iter().collect(), naming)
    }

    /// Map wire keys onto `fields`. Two wire keys landing on the same field
    /// is an error rather than a silent overwrite.
    fn for_struct(
        object: Map<String, Value>,
        fields: &'static [&'static str],
        naming: &'a dyn NamingPolicy,
    ) -> Result<Self, serde_json::Error> {
        let mut sources: HashMap<String, String> = HashMap::with_capacity(object.len());
        let mut entries = Vec::with_capacity(object.len());

        for (wire_key, value) in object {
            let key = if fields.contains(&wire_key.as_str()) {
                wire_key.clone()
            } else {
                let local = naming.from_wire(&wire_key);
                if fields.contains(&local.as_str()) {
                    local
                } else {
                    wire_key.clone()
                }
            };

            if let Some(previous) = sources.insert(key.clone(), wire_key.clone()) {
                return Err(de::Error::custom(format!(
                    "wire keys `{previous}` and `{wire_key}` both map to field `{key}`"
                )));
            }
            entries.push((key, value));
        }

        Ok(Self::from_entries(entries, naming))
    }

    fn from_entries(entries: Vec<(String, Value)>, naming: &'a dyn NamingPolicy) -> Self {
        Self {
            entries: entries.into_iter(),
            pending: None,
            naming,
        }
    }
}

impl<'de> MapAccess<'de> for ProjectedMap<'_> {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                let key: StringDeserializer<serde_json::Error> = key.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, Self::Error> {
        let value = self.pending.take().ok_or_else(|| {
            <serde_json::Error as de::Error>::custom("map value requested before its key")
        })?;
        seed.deserialize(Projector::new(value, self.naming))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}
