//! Schema types for describing the resource configuration surface.
//!
//! A schema lists the attributes a resource document may carry, their types
//! and whether they are required. It drives validation of caller input and
//! is printed by `smf-property --schema`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string value.
    String,
    /// A boolean value.
    Bool,
    /// A list of values of a single type.
    List(Box<AttributeType>),
    /// A value matching any one of several types.
    OneOf(Vec<AttributeType>),
}

impl AttributeType {
    /// Create a list type.
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    /// Create a union type.
    pub fn one_of(types: impl IntoIterator<Item = AttributeType>) -> Self {
        Self::OneOf(types.into_iter().collect())
    }

    /// Human-readable type name used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Bool => "bool".to_string(),
            Self::List(element) => format!("list of {}", element.describe()),
            Self::OneOf(types) => types
                .iter()
                .map(AttributeType::describe)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// Describes how an attribute can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// The attribute is required in configuration.
    pub required: bool,
    /// The attribute is optional in configuration.
    pub optional: bool,
}

impl AttributeFlags {
    /// Create flags for a required attribute.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional attribute.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }
}

/// Describes a single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The type of the attribute.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Human-readable description of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attribute {
    /// Create a new attribute with the given type and flags.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
        }
    }

    /// Create a required string attribute.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Create an optional string attribute.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Set the description for this attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schema for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// The version of this schema.
    #[serde(default)]
    pub version: u64,
    /// Attributes keyed by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    /// Human-readable description of the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// Create a schema at version 0.
    pub fn v0() -> Self {
        Self::default()
    }

    /// Add an attribute to the schema.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Set the description for this schema.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A problem found while checking a resource document.
///
/// Every diagnostic rejects the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute the diagnostic applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add a detailed description.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the diagnostic to an attribute path.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(attr) = &self.attribute {
            write!(f, "{}: ", attr)?;
        }
        write!(f, "{}", self.summary)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_constructors() {
        let attr = Attribute::required_string();
        assert_eq!(attr.attr_type, AttributeType::String);
        assert!(attr.flags.required);
        assert!(!attr.flags.optional);

        let attr = Attribute::optional_string().with_description("Service FMRI");
        assert!(attr.flags.optional);
        assert_eq!(attr.description.as_deref(), Some("Service FMRI"));
    }

    #[test]
    fn test_describe_types() {
        assert_eq!(AttributeType::String.describe(), "string");
        assert_eq!(
            AttributeType::list(AttributeType::String).describe(),
            "list of string"
        );
        assert_eq!(
            AttributeType::one_of([AttributeType::String, AttributeType::Bool]).describe(),
            "string or bool"
        );
    }

    #[test]
    fn test_schema_serialization() {
        let schema = Schema::v0()
            .with_description("test")
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "value",
                Attribute::new(
                    AttributeType::one_of([
                        AttributeType::String,
                        AttributeType::list(AttributeType::String),
                    ]),
                    AttributeFlags::required(),
                ),
            );

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["version"], 0);
        assert_eq!(json["attributes"]["name"]["type"], "string");
        assert_eq!(json["attributes"]["name"]["required"], true);
        assert_eq!(
            json["attributes"]["value"]["type"],
            serde_json::json!({"one_of": ["string", {"list": "string"}]})
        );

        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("Missing required attribute 'value'")
            .with_attribute("value")
            .with_detail("This attribute is required and must be provided");
        assert_eq!(
            diag.to_string(),
            "value: Missing required attribute 'value' (This attribute is required and must be provided)"
        );

        assert_eq!(Diagnostic::error("Expected object").to_string(), "Expected object");
    }
}
