//! Normalization seam.
//!
//! The middleware only decides *whether* to normalize a success body and how
//! to merge the output into the lifecycle message; the flattening itself is
//! delegated to a [`Normalizer`] implementation injected at construction,
//! the same way other external effects sit behind trait seams.
//!
//! Normalization is only ever applied to success bodies; failure payloads
//! are forwarded as classified.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque, declarative normalization schema.
///
/// Core and runtime never look inside a schema; it is carried on the call
/// descriptor and handed verbatim to the [`Normalizer`]. The only structural
/// requirement, enforced at construction, is that a schema is a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(Map<String, Value>);

impl Schema {
    /// Wrap a schema object.
    #[must_use]
    pub const fn from_object(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The underlying schema object.
    #[must_use]
    pub const fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Output of normalizing one success body.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Reference skeleton: the body with records replaced by their ids,
    /// or the body itself when no schema was applied.
    pub result: Value,
    /// Flattened entity map (entity type → id → record); `None` when no
    /// schema was applied.
    pub entities: Option<Map<String, Value>>,
}

impl Normalized {
    /// A pass-through result for bodies processed without a schema.
    #[must_use]
    pub fn raw(body: &Value) -> Self {
        Self {
            result: body.clone(),
            entities: None,
        }
    }
}

/// Flattens nested payloads into a reference skeleton plus an entity map.
pub trait Normalizer: Send + Sync {
    /// Flatten `body` according to `schema`.
    fn normalize(&self, body: &Value, schema: &Schema) -> Normalized;
}

/// A normalizer that never flattens anything.
///
/// For deployments whose descriptors never set a schema. If a schema does
/// show up, the body is passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNormalizer;

impl Normalizer for NoopNormalizer {
    fn normalize(&self, body: &Value, _schema: &Schema) -> Normalized {
        Normalized::raw(body)
    }
}
