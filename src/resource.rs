//! The `smf_property` resource model.
//!
//! Caller input arrives as an [`SmfPropertyConfig`] (or a JSON document of
//! the same shape) and is turned into an immutable [`SmfProperty`] in one
//! step: the compound name is parsed, defaults are filled in and required
//! fields are checked before any command runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::SmfError;
use crate::identifier::parse_name;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostic, Schema};
use crate::validation::validate_result;

/// The service and property a resource manages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyTarget {
    /// Service FMRI.
    pub fmri: String,
    /// Property path, `group/key`.
    pub property: String,
}

impl PropertyTarget {
    /// Create a new target.
    pub fn new(fmri: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            fmri: fmri.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.fmri, self.property)
    }
}

/// A desired property value.
///
/// The shape matters on the wire: a one-element `List` is written as
/// `(value)` while a `Scalar` is written bare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A single value.
    Scalar(String),
    /// An ordered list of values.
    List(Vec<String>),
}

impl PropertyValue {
    /// The values as an ordered sequence.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::List(values) => values,
        }
    }

    /// Whether the value was given in list form.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

/// The state of a property as read back from the service store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyState {
    /// Property type, e.g. `astring` or `net_address`.
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    /// Ordered property values.
    pub values: Vec<String>,
}

impl PropertyState {
    /// Create a new state.
    pub fn new<S: Into<String>>(property_type: Option<S>, values: Vec<String>) -> Self {
        Self {
            property_type: property_type.map(Into::into),
            values,
        }
    }
}

/// The `type` attribute as written by callers: a type name, or `false` to
/// inherit the current type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSetting {
    /// An explicit type name.
    Name(String),
    /// `false` means inherit; `true` is rejected.
    Flag(bool),
}

/// Caller-facing configuration of an `smf_property` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmfPropertyConfig {
    /// Resource name, usually `<fmri>#<property>`.
    pub name: String,
    /// Explicit service FMRI; derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmri: Option<String>,
    /// Explicit property path; derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Property type; the current type is kept when absent.
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub property_type: Option<TypeSetting>,
    /// Desired value.
    pub value: PropertyValue,
}

impl SmfPropertyConfig {
    /// Create a configuration from a compound name and a value.
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            fmri: None,
            property: None,
            property_type: None,
            value: value.into(),
        }
    }

    /// Set the service FMRI explicitly.
    pub fn with_fmri(mut self, fmri: impl Into<String>) -> Self {
        self.fmri = Some(fmri.into());
        self
    }

    /// Set the property path explicitly.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Set the property type explicitly.
    pub fn with_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(TypeSetting::Name(property_type.into()));
        self
    }
}

/// A fully resolved `smf_property` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmfProperty {
    target: PropertyTarget,
    #[serde(rename = "type")]
    property_type: Option<String>,
    value: PropertyValue,
}

impl SmfProperty {
    /// Resource type name.
    pub const RESOURCE_TYPE: &'static str = "smf_property";

    /// Schema of the configuration document.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("A single property of an SMF service")
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_description("Resource name, `<fmri>#<group>/<key>`"),
            )
            .with_attribute(
                "fmri",
                Attribute::optional_string()
                    .with_description("Service FMRI. Derived from the name by default."),
            )
            .with_attribute(
                "property",
                Attribute::optional_string()
                    .with_description("Property to manage. Derived from the name by default."),
            )
            .with_attribute(
                "type",
                Attribute::new(
                    AttributeType::one_of([AttributeType::String, AttributeType::Bool]),
                    AttributeFlags::optional(),
                )
                .with_description("Property value type. The current type is kept by default."),
            )
            .with_attribute(
                "value",
                Attribute::new(
                    AttributeType::one_of([
                        AttributeType::String,
                        AttributeType::list(AttributeType::String),
                    ]),
                    AttributeFlags::required(),
                )
                .with_description("Value to set, a string or a list of strings"),
            )
    }

    /// Resolve a configuration into a resource.
    pub fn new(config: SmfPropertyConfig) -> Result<Self, SmfError> {
        let parsed = parse_name(&config.name);

        let fmri = config.fmri.unwrap_or(parsed.service_id);
        if fmri.is_empty() {
            return Err(SmfError::Validation(format!(
                "fmri is required for {}",
                config.name
            )));
        }

        let property = config.property.or(parsed.property_name).ok_or_else(|| {
            SmfError::Validation(format!(
                "property is required for {}: set it or name the resource `<fmri>#<property>`",
                config.name
            ))
        })?;
        if !is_property_path(&property) {
            return Err(SmfError::Validation(format!(
                "property {:?} must be a `group/key` path",
                property
            )));
        }

        let property_type = match config.property_type {
            None | Some(TypeSetting::Flag(false)) => None,
            Some(TypeSetting::Flag(true)) => {
                return Err(SmfError::Validation(
                    "type must be a type name or false".to_string(),
                ));
            },
            Some(TypeSetting::Name(name)) if name.is_empty() => None,
            Some(TypeSetting::Name(name)) => Some(name),
        };

        if let PropertyValue::List(values) = &config.value {
            if values.is_empty() {
                return Err(SmfError::Validation(format!(
                    "value for {}#{} must not be an empty list",
                    fmri, property
                )));
            }
        }

        Ok(Self {
            target: PropertyTarget { fmri, property },
            property_type,
            value: config.value,
        })
    }

    /// Validate a JSON document against [`SmfProperty::schema`] and resolve it.
    pub fn from_json(document: &Value) -> Result<Self, SmfError> {
        if let Err(diagnostics) = validate_result(&Self::schema(), document) {
            return Err(SmfError::Validation(
                diagnostics
                    .iter()
                    .map(Diagnostic::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }
        let config: SmfPropertyConfig = serde_json::from_value(document.clone())?;
        Self::new(config)
    }

    /// The managed service and property.
    pub fn target(&self) -> &PropertyTarget {
        &self.target
    }

    /// Service FMRI.
    pub fn fmri(&self) -> &str {
        &self.target.fmri
    }

    /// Property path.
    pub fn property(&self) -> &str {
        &self.target.property
    }

    /// Explicit property type, if one was given.
    pub fn property_type(&self) -> Option<&str> {
        self.property_type.as_deref()
    }

    /// Desired value.
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }
}

fn is_property_path(property: &str) -> bool {
    matches!(property.split_once('/'), Some((group, key)) if !group.is_empty() && !key.is_empty())
}
