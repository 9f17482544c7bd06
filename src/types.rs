//! Result types reported by a convergence pass.

use serde::{Deserialize, Serialize};

use crate::resource::PropertyTarget;

/// A change to a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The attribute that changed (`type` or `value`).
    pub path: String,
    /// The value before the change, `None` if it was unset.
    pub before: Option<serde_json::Value>,
    /// The value after the change.
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a modified attribute.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// The `setprop` a pass issued, or would have issued in dry-run mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// Effective property type written.
    #[serde(rename = "type")]
    pub property_type: String,
    /// Value as passed to `setprop`.
    pub value: String,
    /// Whether the command actually ran.
    pub applied: bool,
}

/// Outcome of converging one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergeReport {
    /// The property that was converged.
    pub target: PropertyTarget,
    /// Attributes that differed from the current state.
    pub changes: Vec<AttributeChange>,
    /// The mutation, if one was needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutation: Option<Mutation>,
}

impl ConvergeReport {
    /// A pass that found nothing to change.
    pub fn unchanged(target: PropertyTarget) -> Self {
        Self {
            target,
            changes: Vec::new(),
            mutation: None,
        }
    }

    /// A pass that changed (or would change) the property.
    pub fn updated(target: PropertyTarget, changes: Vec<AttributeChange>, mutation: Mutation) -> Self {
        Self {
            target,
            changes,
            mutation: Some(mutation),
        }
    }

    /// Whether the resource was updated. Dry-run passes count as updated.
    pub fn is_updated(&self) -> bool {
        self.mutation.is_some()
    }

    /// Human-readable description of the convergence event.
    pub fn description(&self) -> Option<String> {
        self.mutation.as_ref().map(|m| {
            format!(
                "setting service property {} to {}: {}",
                self.target, m.property_type, m.value
            )
        })
    }
}
