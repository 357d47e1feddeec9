//! Error types for the GraphQL data model.

use crate::document::DocumentKind;

/// A specialized Result type for GraphQL data model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building requests or reading responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required value was missing or malformed at the call boundary.
    #[error("Invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument.
        argument: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// A document node did not have the requested shape.
    #[error("Expected {expected} but found {found}")]
    WrongShape {
        /// The shape the accessor required.
        expected: DocumentKind,
        /// The shape actually present.
        found: DocumentKind,
    },

    /// A number node could not be represented in the requested type.
    #[error("Number does not fit in {target}")]
    NumberRange {
        /// The requested numeric type.
        target: &'static str,
    },

    /// An object did not contain the requested field.
    #[error("Field '{0}' not found")]
    FieldNotFound(String),

    /// An array index was past the end of the array.
    #[error("Index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The array length.
        len: usize,
    },

    /// The response carried no `data` member.
    #[error("No data in GraphQL response")]
    NoData,

    /// A subtree could not be deserialized into the requested type.
    #[error("Failed to deserialize field '{field}': {source}")]
    Projection {
        /// The projected field (`"data"` for whole-document projection).
        field: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint reported GraphQL errors and the caller asked for them
    /// to be treated as a failure.
    #[error("GraphQL error: {0}")]
    GraphQL(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-argument error.
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Create a wrong-shape error.
    pub fn wrong_shape(expected: DocumentKind, found: DocumentKind) -> Self {
        Self::WrongShape { expected, found }
    }

    /// Check whether this error came from an accessor or projection on the
    /// response document rather than from request construction.
    pub fn is_projection_error(&self) -> bool {
        matches!(
            self,
            Self::WrongShape { .. }
                | Self::NumberRange { .. }
                | Self::FieldNotFound(_)
                | Self::IndexOutOfBounds { .. }
                | Self::NoData
                | Self::Projection { .. }
        )
    }
}
