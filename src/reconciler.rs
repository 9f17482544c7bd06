//! Property reconciliation.
//!
//! A pass has two steps, always run in order against the same target:
//!
//! 1. [`PropertyReconciler::load_current`] runs `svccfg listprop` and parses
//!    the record for the property into a [`PropertyState`].
//! 2. [`PropertyReconciler::reconcile`] resolves the effective type, compares
//!    desired and current state and runs `svccfg setprop` only when they
//!    differ.
//!
//! [`PropertyReconciler::converge`] does both.
//!
//! # Listing format
//!
//! Each line of `listprop` output is
//!
//! ```text
//! <group>/<key> <type> <shell-quoted values...>
//! ```
//!
//! e.g. `config/nameserver net_address 8.8.8.8 8.8.4.4`. A property with no
//! values prints just the name and type.

use serde_json::json;
use tracing::{debug, info, instrument};

use crate::command::CommandRunner;
use crate::config::ReconcilerConfig;
use crate::error::SmfError;
use crate::resource::{PropertyState, PropertyTarget, PropertyValue, SmfProperty};
use crate::shellwords::{self, is_blank};
use crate::svccfg::Svccfg;
use crate::types::{AttributeChange, ConvergeReport, Mutation};

/// Loads and converges SMF properties through `svccfg`.
#[derive(Debug, Clone)]
pub struct PropertyReconciler<R> {
    svccfg: Svccfg<R>,
    dry_run: bool,
}

impl<R: CommandRunner> PropertyReconciler<R> {
    /// Create a reconciler with the default configuration.
    pub fn new(runner: R) -> Self {
        Self::with_config(runner, ReconcilerConfig::default())
    }

    /// Create a reconciler with the given configuration.
    pub fn with_config(runner: R, config: ReconcilerConfig) -> Self {
        Self {
            svccfg: Svccfg::with_program(runner, config.svccfg),
            dry_run: config.dry_run,
        }
    }

    /// Whether mutations are only reported, not run.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Read the current state of a property.
    ///
    /// Fails with [`SmfError::PropertyNotFound`] if the listing has no record
    /// for the property.
    #[instrument(skip_all, fields(fmri = %target.fmri, property = %target.property))]
    pub async fn load_current(&self, target: &PropertyTarget) -> Result<PropertyState, SmfError> {
        let listing = self.svccfg.listprop(target).await?;
        let state = parse_listing(&listing, &target.property)?.ok_or_else(|| {
            SmfError::PropertyNotFound {
                fmri: target.fmri.clone(),
                property: target.property.clone(),
            }
        })?;
        debug!(property_type = ?state.property_type, values = ?state.values, "Loaded current state");
        Ok(state)
    }

    /// Bring a property from `current` to the state `resource` describes.
    #[instrument(skip_all, fields(fmri = %resource.fmri(), property = %resource.property()))]
    pub async fn reconcile(
        &self,
        resource: &SmfProperty,
        current: &PropertyState,
    ) -> Result<ConvergeReport, SmfError> {
        let property_type = effective_type(resource, current)?;
        let changes = diff(&property_type, resource.value(), current);
        if changes.is_empty() {
            debug!("Property already up to date");
            return Ok(ConvergeReport::unchanged(resource.target().clone()));
        }

        let value = render_value(resource.value());
        let mut report = ConvergeReport::updated(
            resource.target().clone(),
            changes,
            Mutation {
                property_type,
                value,
                applied: false,
            },
        );
        let description = report.description().unwrap_or_default();

        if self.dry_run {
            info!("Would run: {}", description);
            return Ok(report);
        }

        info!("{}", description);
        if let Some(mutation) = report.mutation.as_mut() {
            self.svccfg
                .setprop(resource.target(), &mutation.property_type, &mutation.value)
                .await?;
            mutation.applied = true;
        }
        Ok(report)
    }

    /// Load the current state and reconcile it in one pass.
    pub async fn converge(&self, resource: &SmfProperty) -> Result<ConvergeReport, SmfError> {
        let current = self.load_current(resource.target()).await?;
        self.reconcile(resource, &current).await
    }
}

/// Find the record for `property` in `listprop` output.
///
/// Returns `Ok(None)` when no line names the property exactly. A record
/// with only a name has no type; a record with no value text has no values.
pub fn parse_listing(listing: &str, property: &str) -> Result<Option<PropertyState>, SmfError> {
    let Some((property_type, value_text)) = listing
        .split('\n')
        .map(split_record)
        .find(|(name, _, _)| *name == property)
        .map(|(_, property_type, value_text)| (property_type, value_text))
    else {
        return Ok(None);
    };

    let values = shellwords::split(value_text.unwrap_or("")).map_err(|err| {
        SmfError::MalformedListing {
            property: property.to_string(),
            reason: err.to_string(),
        }
    })?;

    Ok(Some(PropertyState {
        property_type: property_type
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        values,
    }))
}

/// Split a line into name, type and the unsplit remainder.
fn split_record(line: &str) -> (&str, Option<&str>, Option<&str>) {
    let (name, rest) = split_token(line);
    match rest {
        Some(rest) => {
            let (property_type, value_text) = split_token(rest);
            (name, Some(property_type), value_text)
        },
        None => (name, None, None),
    }
}

fn split_token(text: &str) -> (&str, Option<&str>) {
    match text.find(is_blank) {
        Some(end) => (&text[..end], Some(text[end..].trim_start_matches(is_blank))),
        None => (text, None),
    }
}

/// The explicit type if the resource has one, otherwise the current type.
pub fn effective_type(resource: &SmfProperty, current: &PropertyState) -> Result<String, SmfError> {
    resource
        .property_type()
        .or(current.property_type.as_deref())
        .map(str::to_string)
        .ok_or_else(|| {
            SmfError::Validation(format!(
                "type is required for {}: the property has no current type to inherit",
                resource.target()
            ))
        })
}

fn diff(property_type: &str, desired: &PropertyValue, current: &PropertyState) -> Vec<AttributeChange> {
    let mut changes = Vec::new();
    if current.property_type.as_deref() != Some(property_type) {
        changes.push(AttributeChange::new(
            "type",
            current.property_type.as_ref().map(|t| json!(t)),
            Some(json!(property_type)),
        ));
    }
    if desired.values() != current.values.as_slice() {
        changes.push(AttributeChange::modified(
            "value",
            json!(current.values),
            json!(desired.values()),
        ));
    }
    changes
}

/// Render a value the way `setprop` expects it.
///
/// A scalar is a single escaped word; a list is escaped words in
/// parentheses, even when it has only one element.
pub fn render_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Scalar(value) => shellwords::escape(value),
        PropertyValue::List(values) => format!("({})", shellwords::join(values)),
    }
}
