//! # Templates
//!
//! A template is the blueprint every instance of one pool is created from.

use std::fmt;

use oroboros_shared::Transform;
use serde::{Deserialize, Serialize};

/// Stable handle naming an entity blueprint. The pooling key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub u32);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Blueprint for pooled instances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier.
    pub id: TemplateId,
    /// Display name, used to label containers and log lines.
    pub name: String,
    /// Transform new and reset instances start from.
    #[serde(default)]
    pub transform: Transform,
}

impl Template {
    /// Creates a template with an identity transform.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: TemplateId(id),
            name: name.into(),
            transform: Transform::IDENTITY,
        }
    }

    /// Sets the default transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}
