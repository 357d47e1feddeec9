//! Untyped response document.
//!
//! [`Document`] is a faithful structural copy of a JSON payload: objects keep
//! the key order the endpoint sent, numbers keep their integer/float
//! distinction, and nothing is validated against a schema. Accessors check the
//! shape of the node they are called on and fail with
//! [`Error::WrongShape`] instead of panicking or guessing.
//!
//! # Example
//!
//! ```
//! use horizon_graphql::Document;
//!
//! let doc: Document = serde_json::from_str(
//!     r#"{"hero": {"name": "R2-D2", "friends": [{"name": "Luke Skywalker"}]}}"#,
//! ).unwrap();
//!
//! let hero = doc.field("hero").unwrap();
//! assert_eq!(hero.field("name").unwrap().as_str().unwrap(), "R2-D2");
//! assert_eq!(
//!     doc.pointer("/hero/friends/0/name").and_then(|d| d.as_str().ok()),
//!     Some("Luke Skywalker"),
//! );
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::error::{Error, Result};

/// Ordered mapping used for document objects.
pub type DocumentMap = IndexMap<String, Document>;

/// The shape of a [`Document`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// JSON `null`.
    Null,
    /// JSON `true` / `false`.
    Bool,
    /// Any JSON number.
    Number,
    /// A JSON string.
    String,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// A dynamically shaped JSON document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    /// JSON `null`.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number, integer or floating point.
    Number(Number),
    /// A string.
    String(String),
    /// An ordered sequence.
    Array(Vec<Document>),
    /// A mapping keyed by field name, in wire order.
    Object(DocumentMap),
}

impl Document {
    /// The shape of this node.
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Null => DocumentKind::Null,
            Self::Bool(_) => DocumentKind::Bool,
            Self::Number(_) => DocumentKind::Number,
            Self::String(_) => DocumentKind::String,
            Self::Array(_) => DocumentKind::Array,
            Self::Object(_) => DocumentKind::Object,
        }
    }

    /// Check whether this node is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow this node as an object.
    pub fn as_object(&self) -> Result<&DocumentMap> {
        match self {
            Self::Object(map) => Ok(map),
            other => Err(Error::wrong_shape(DocumentKind::Object, other.kind())),
        }
    }

    /// Borrow this node as an array.
    pub fn as_array(&self) -> Result<&[Document]> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(Error::wrong_shape(DocumentKind::Array, other.kind())),
        }
    }

    /// Borrow this node as a string.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(Error::wrong_shape(DocumentKind::String, other.kind())),
        }
    }

    /// Read this node as a boolean.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(Error::wrong_shape(DocumentKind::Bool, other.kind())),
        }
    }

    /// Read this node as a signed integer.
    ///
    /// Floats and integers outside the `i64` range are reported as
    /// [`Error::NumberRange`].
    pub fn as_i64(&self) -> Result<i64> {
        self.number()?
            .as_i64()
            .ok_or(Error::NumberRange { target: "i64" })
    }

    /// Read this node as an unsigned integer.
    pub fn as_u64(&self) -> Result<u64> {
        self.number()?
            .as_u64()
            .ok_or(Error::NumberRange { target: "u64" })
    }

    /// Read this node as a float. Integers are widened.
    pub fn as_f64(&self) -> Result<f64> {
        self.number()?
            .as_f64()
            .ok_or(Error::NumberRange { target: "f64" })
    }

    fn number(&self) -> Result<&Number> {
        match self {
            Self::Number(n) => Ok(n),
            other => Err(Error::wrong_shape(DocumentKind::Number, other.kind())),
        }
    }

    /// Look up a key without failing. Returns `None` for missing keys and for
    /// nodes that are not objects.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Look up a required key of an object.
    pub fn field(&self, key: &str) -> Result<&Document> {
        self.as_object()?
            .get(key)
            .ok_or_else(|| Error::FieldNotFound(key.to_string()))
    }

    /// Index into an array.
    pub fn at(&self, index: usize) -> Result<&Document> {
        let items = self.as_array()?;
        items.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: items.len(),
        })
    }

    /// Resolve a JSON Pointer (RFC 6901) such as `/hero/friends/0/name`.
    ///
    /// The empty pointer resolves to `self`.
    pub fn pointer(&self, pointer: &str) -> Option<&Document> {
        if pointer.is_empty() {
            return Some(self);
        }
        let rest = pointer.strip_prefix('/')?;
        rest.split('/')
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .try_fold(self, |node, token| match node {
                Self::Object(map) => map.get(&token),
                Self::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Convert into a `serde_json::Value`, preserving key order.
    pub fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        match doc {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(b),
            Document::Number(n) => Value::Number(n),
            Document::String(s) => Value::String(s),
            Document::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Document::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Document, E> {
        Ok(Document::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Document, E> {
        Ok(Document::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Document, E> {
        Ok(Document::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Document, E> {
        Ok(Number::from_f64(v).map_or(Document::Null, Document::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Document, E> {
        Ok(Document::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Document, E> {
        Ok(Document::String(v))
    }

    fn visit_none<E>(self) -> std::result::Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_unit<E>(self) -> std::result::Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Document, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Document, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Document::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Document, A::Error> {
        let mut map = DocumentMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Document>()? {
            map.insert(key, value);
        }
        Ok(Document::Object(map))
    }
}
