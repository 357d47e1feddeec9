//! JSON codec settings shared by request encoding and response parsing.

use std::sync::Arc;

use crate::naming::{default_naming, NamingPolicy, SharedNaming};

/// JSON codec configuration.
///
/// Cheap to clone; clones share the same naming policy.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    naming: SharedNaming,
    omit_null_fields: bool,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            naming: default_naming(),
            omit_null_fields: true,
        }
    }
}

impl JsonSettings {
    /// Create settings with the default naming policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the naming policy.
    pub fn naming(mut self, naming: impl NamingPolicy + 'static) -> Self {
        self.naming = Arc::new(naming);
        self
    }

    /// Replace the naming policy with an already shared instance.
    pub fn shared_naming(mut self, naming: SharedNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Control whether absent optional request members are left out of the
    /// POST body (`true`, the default) or written as JSON `null`.
    pub fn omit_null_fields(mut self, omit: bool) -> Self {
        self.omit_null_fields = omit;
        self
    }

    /// The configured naming policy.
    pub fn naming_policy(&self) -> &SharedNaming {
        &self.naming
    }

    /// Whether absent optional members are omitted from encoded bodies.
    pub fn omits_null_fields(&self) -> bool {
        self.omit_null_fields
    }
}
