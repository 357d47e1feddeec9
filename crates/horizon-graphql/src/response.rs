//! GraphQL response types.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::naming::{default_naming, SharedNaming};
use crate::projection::Projector;
use crate::targets;

/// A GraphQL error returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in the document where the error occurred.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub locations: Vec<GraphQLLocation>,

    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    /// Additional error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Document>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            write!(f, " (at ")?;
            for (i, segment) in path.iter().enumerate() {
                match segment {
                    PathSegment::Field(name) if i > 0 => write!(f, ".{name}")?,
                    PathSegment::Field(name) => write!(f, "{name}")?,
                    PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLError {}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A location in a GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// A segment in an error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// An array index.
    Index(usize),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Document>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
    #[serde(default)]
    extensions: Option<Document>,
}

impl From<Envelope> for GraphQLResponse {
    fn from(envelope: Envelope) -> Self {
        Self {
            data: envelope.data,
            errors: envelope.errors,
            extensions: envelope.extensions,
            naming: default_naming(),
        }
    }
}

/// A GraphQL response from the server.
///
/// `data` and `errors` may both be present: GraphQL allows partial results.
/// The naming policy the response was parsed with travels with it and is
/// used by every projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Envelope")]
pub struct GraphQLResponse {
    /// The data returned by the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Document>,

    /// Errors that occurred during execution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLError>>,

    /// Additional response metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Document>,

    #[serde(skip_serializing)]
    naming: SharedNaming,
}

impl Default for GraphQLResponse {
    fn default() -> Self {
        Self {
            data: None,
            errors: None,
            extensions: None,
            naming: default_naming(),
        }
    }
}

impl GraphQLResponse {
    /// Decode a response body, attaching `naming` for later projections.
    ///
    /// The bytes are decoded straight into the response shape. The
    /// `serde_json` error is returned untouched so callers can inspect its
    /// category.
    pub fn from_slice_with(bytes: &[u8], naming: SharedNaming) -> serde_json::Result<Self> {
        let envelope: Envelope = serde_json::from_slice(bytes)?;
        Ok(Self::from(envelope).with_naming(naming))
    }

    /// Decode a response body with the default naming policy.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        Self::from_slice_with(bytes, default_naming())
    }

    /// Replace the naming policy used by projections.
    pub fn with_naming(mut self, naming: SharedNaming) -> Self {
        self.naming = naming;
        self
    }

    /// The naming policy used by projections.
    pub fn naming(&self) -> &SharedNaming {
        &self.naming
    }

    /// Check if the response contains errors.
    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Check if the response was successful (has data and no errors).
    pub fn is_success(&self) -> bool {
        self.data.is_some() && !self.has_errors()
    }

    /// The reported errors; empty when the server sent none.
    pub fn errors(&self) -> &[GraphQLError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Get the first error, if any.
    pub fn first_error(&self) -> Option<&GraphQLError> {
        self.errors().first()
    }

    /// Get all error messages joined with `"; "`.
    pub fn error_message(&self) -> Option<String> {
        let errors = self.errors();
        if errors.is_empty() {
            return None;
        }
        Some(
            errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Deserialize one top-level field of `data` into `T`.
    ///
    /// `field` is given in Rust-side naming; it is mapped to the wire key
    /// with the response's naming policy (the name as given is tried too).
    ///
    /// Inside the subtree, a wire key is mapped back through the policy only
    /// when a struct is being filled and the key does not already name one
    /// of its fields, so `#[serde(rename_all = "camelCase")]` structs work
    /// under any policy. Map targets (`HashMap`, `Value`, [`Document`])
    /// receive the keys verbatim. Two wire keys that resolve to the same
    /// struct field fail with [`Error::Projection`].
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_graphql::GraphQLResponse;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Droid {
    ///     name: String,
    ///     primary_function: String,
    /// }
    ///
    /// let response = GraphQLResponse::from_slice(
    ///     br#"{"data": {"hero": {"name": "R2-D2", "primaryFunction": "Astromech"}}}"#,
    /// )?;
    /// let hero: Droid = response.data_field_as("hero")?;
    /// assert_eq!(hero.primary_function, "Astromech");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn data_field_as<T: DeserializeOwned>(&self, field: &str) -> Result<T> {
        let object = self.data.as_ref().ok_or(Error::NoData)?.as_object()?;
        let wire_key = self.naming.to_wire(field);
        let node = object
            .get(&wire_key)
            .or_else(|| object.get(field))
            .ok_or_else(|| Error::FieldNotFound(field.to_string()))?;

        tracing::trace!(
            target: targets::RESPONSE,
            field,
            wire_key = %wire_key,
            "Projecting data field"
        );
        self.project(field, node)
    }

    /// Deserialize the whole `data` object into `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.data.as_ref().ok_or(Error::NoData)?;
        tracing::trace!(target: targets::RESPONSE, "Projecting data");
        self.project("data", data)
    }

    fn project<T: DeserializeOwned>(&self, field: &str, node: &Document) -> Result<T> {
        let projector = Projector::new(Value::from(node.clone()), self.naming.as_ref());
        T::deserialize(projector).map_err(|source| Error::Projection {
            field: field.to_string(),
            source,
        })
    }

    /// Convert errors to a Result.
    ///
    /// Returns `Ok(self)` if no errors, or [`Error::GraphQL`] with all
    /// messages otherwise.
    pub fn into_result(self) -> Result<Self> {
        match self.error_message() {
            Some(msg) => Err(Error::GraphQL(msg)),
            None => Ok(self),
        }
    }
}
