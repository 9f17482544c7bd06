//! SMF property reconciliation
//!
//! This crate converges a single property of a Solaris/illumos SMF service
//! to a desired value, idempotently. It reads the current value with
//! `svccfg listprop`, compares it with the desired state and runs
//! `svccfg setprop` only when something differs.
//!
//! # Overview
//!
//! - **Resource model**: [`SmfProperty`] built from an [`SmfPropertyConfig`]
//!   or a JSON document, with the FMRI and property derived from a compound
//!   `<fmri>#<group>/<key>` name
//! - **Reconciler**: [`PropertyReconciler`] with `load_current`, `reconcile`
//!   and `converge`
//! - **Command execution**: the [`CommandRunner`] trait, [`SystemRunner`] for
//!   real processes and [`testing::MockRunner`] for tests
//! - **Error types**: [`SmfError`]
//! - **Logging**: integration with `tracing`
//!
//! # Quick Start
//!
//! ```ignore
//! use smf_property::{PropertyReconciler, SmfProperty, SmfPropertyConfig, SystemRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     smf_property::init_logging();
//!
//!     let resource = SmfProperty::new(SmfPropertyConfig::new(
//!         "network/dns/client#config/nameserver",
//!         vec!["8.8.8.8", "8.8.4.4"],
//!     ))?;
//!
//!     let report = PropertyReconciler::new(SystemRunner::new())
//!         .converge(&resource)
//!         .await?;
//!     println!("updated: {}", report.is_updated());
//!     Ok(())
//! }
//! ```
//!
//! # Value shapes
//!
//! A scalar value is written as one escaped word, a list as escaped words
//! in parentheses:
//!
//! ```text
//! svccfg -s network/dhcp/server:ipv4 setprop config/listen_ifnames = astring: vnic0
//! svccfg -s network/dns/client setprop config/nameserver = net_address: (8.8.8.8 8.8.4.4)
//! ```
//!
//! When no type is given the property keeps its current type.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod reconciler;
pub mod resource;
pub mod schema;
pub mod shellwords;
pub mod svccfg;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use config::ReconcilerConfig;
pub use error::SmfError;
pub use identifier::{parse_name, ParsedName};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use reconciler::{render_value, PropertyReconciler};
pub use resource::{
    PropertyState, PropertyTarget, PropertyValue, SmfProperty, SmfPropertyConfig, TypeSetting,
};
pub use types::{AttributeChange, ConvergeReport, Mutation};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
