//! Testing utilities for reconciler users.
//!
//! [`MockRunner`] stands in for the real command runner: it returns scripted
//! output for known command lines and records every call, so tests can check
//! exactly which `svccfg` invocations a pass made.
//!
//! # Example
//!
//! ```
//! use smf_property::testing::{assert_ran, assert_updated, MockRunner};
//! use smf_property::{PropertyReconciler, SmfProperty, SmfPropertyConfig};
//!
//! # tokio_test::block_on(async {
//! let runner = MockRunner::new()
//!     .on_listprop("network/dns/client", "config/nameserver", "config/nameserver net_address\n")
//!     .on_setprop("network/dns/client", "config/nameserver", "net_address", "(8.8.8.8 8.8.4.4)");
//!
//! let resource = SmfProperty::new(SmfPropertyConfig::new(
//!     "network/dns/client#config/nameserver",
//!     vec!["8.8.8.8", "8.8.4.4"],
//! ))
//! .unwrap();
//!
//! let report = PropertyReconciler::new(runner.clone()).converge(&resource).await.unwrap();
//! assert_updated(&report);
//! assert_ran(
//!     &runner,
//!     &["svccfg", "-s", "network/dns/client", "setprop", "config/nameserver", "=", "net_address:", "(8.8.8.8 8.8.4.4)"],
//! );
//! # });
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use crate::command::{CommandOutput, CommandRunner};
use crate::config::DEFAULT_SVCCFG;
use crate::error::SmfError;
use crate::schema::Diagnostic;
use crate::types::ConvergeReport;

#[derive(Debug, Default)]
struct MockState {
    responses: Vec<(Vec<String>, CommandOutput)>,
    calls: Vec<Vec<String>>,
}

/// A [`CommandRunner`] with scripted responses.
///
/// Clones share state, so keep one clone to inspect calls after handing
/// the other to a reconciler. A command line with no scripted response
/// fails as if the program did not exist.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    /// Create a runner with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output for an exact command line.
    pub fn on(self, argv: &[&str], output: CommandOutput) -> Self {
        self.lock()
            .responses
            .push((argv.iter().map(|s| s.to_string()).collect(), output));
        self
    }

    /// Script a successful `svccfg listprop`.
    pub fn on_listprop(self, fmri: &str, property: &str, stdout: &str) -> Self {
        self.on(
            &[DEFAULT_SVCCFG, "-s", fmri, "listprop", property],
            CommandOutput::success(stdout),
        )
    }

    /// Script a successful `svccfg setprop`.
    pub fn on_setprop(self, fmri: &str, property: &str, property_type: &str, value: &str) -> Self {
        let type_arg = format!("{}:", property_type);
        self.on(
            &[DEFAULT_SVCCFG, "-s", fmri, "setprop", property, "=", type_arg.as_str(), value],
            CommandOutput::success(""),
        )
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.lock().calls.clone()
    }

    /// Number of commands run so far.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, SmfError> {
        let mut state = self.lock();
        state.calls.push(argv.to_vec());
        state
            .responses
            .iter()
            .find(|(expected, _)| expected.as_slice() == argv)
            .map(|(_, output)| output.clone())
            .ok_or_else(|| SmfError::Spawn {
                command: argv.join(" "),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no scripted response for command",
                ),
            })
    }
}

/// Assert that a pass updated the resource.
///
/// # Panics
///
/// Panics if the report carries no mutation.
pub fn assert_updated(report: &ConvergeReport) {
    assert!(
        report.is_updated(),
        "Expected {} to be updated, but it was already up to date",
        report.target
    );
}

/// Assert that a pass left the resource alone.
///
/// # Panics
///
/// Panics if the report carries a mutation.
pub fn assert_unchanged(report: &ConvergeReport) {
    assert!(
        !report.is_updated(),
        "Expected {} to be unchanged, but got: {}",
        report.target,
        report.description().unwrap_or_default()
    );
}

/// Assert that a report lists a change for the given attribute.
///
/// # Panics
///
/// Panics if no change has the given path.
pub fn assert_changes_attribute(report: &ConvergeReport, path: &str) {
    let has_change = report.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected change to attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        report.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that the runner saw this exact command line.
///
/// # Panics
///
/// Panics if the command was never run.
pub fn assert_ran(runner: &MockRunner, argv: &[&str]) {
    let calls = runner.calls();
    assert!(
        calls.iter().any(|call| call == argv),
        "Expected command {:?} to run. Commands run: {:?}",
        argv,
        calls
    );
}

/// Assert that no command line containing the given `svccfg` subcommand
/// was run.
///
/// # Panics
///
/// Panics if a matching command was run.
pub fn assert_not_ran(runner: &MockRunner, subcommand: &str) {
    let calls = runner.calls();
    assert!(
        !calls.iter().any(|call| call.iter().any(|arg| arg == subcommand)),
        "Expected no `{}` command, but got: {:?}",
        subcommand,
        calls
    );
}

/// Assert that validation produced no diagnostics.
///
/// # Panics
///
/// Panics if there are any diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        diagnostics.len(),
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no diagnostic summary contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics.iter().any(|d| d.summary.contains(substring));
    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::PropertyTarget;
    use crate::types::{AttributeChange, Mutation};
    use serde_json::json;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mock_runner_scripted_and_recorded() {
        let runner = MockRunner::new().on_listprop("svc", "pg/p", "pg/p astring v\n");
        let shared = runner.clone();

        let out = runner
            .run(&argv(&["svccfg", "-s", "svc", "listprop", "pg/p"]))
            .await
            .unwrap();
        assert_eq!(out.stdout, "pg/p astring v\n");
        assert_eq!(shared.call_count(), 1);
        assert_ran(&shared, &["svccfg", "-s", "svc", "listprop", "pg/p"]);
        assert_not_ran(&shared, "setprop");
    }

    #[tokio::test]
    async fn test_mock_runner_unscripted_command() {
        let runner = MockRunner::new();
        let err = runner.run(&argv(&["svccfg", "-s", "svc", "delprop", "pg/p"])).await.unwrap_err();
        assert!(matches!(err, SmfError::Spawn { .. }));
        assert_eq!(runner.calls(), vec![argv(&["svccfg", "-s", "svc", "delprop", "pg/p"])]);
    }

    #[test]
    #[should_panic(expected = "Expected no `setprop` command")]
    fn test_assert_not_ran_fails() {
        let runner = MockRunner::new();
        runner.lock().calls.push(argv(&["svccfg", "-s", "svc", "setprop", "pg/p"]));
        assert_not_ran(&runner, "setprop");
    }

    #[test]
    #[should_panic(expected = "Expected no `setprop` command")]
    fn test_assert_not_ran_with_custom_program_path() {
        let runner = MockRunner::new();
        runner.lock().calls.push(argv(&[
            "/usr/bin/pfexec",
            "/usr/sbin/svccfg",
            "-s",
            "svc",
            "setprop",
            "pg/p",
        ]));
        assert_not_ran(&runner, "setprop");
    }

    #[test]
    fn test_report_assertions() {
        let target = PropertyTarget::new("svc", "pg/p");
        assert_unchanged(&ConvergeReport::unchanged(target.clone()));

        let report = ConvergeReport::updated(
            target,
            vec![AttributeChange::modified("value", json!(["a"]), json!(["b"]))],
            Mutation {
                property_type: "astring".to_string(),
                value: "b".to_string(),
                applied: true,
            },
        );
        assert_updated(&report);
        assert_changes_attribute(&report, "value");
    }

    #[test]
    #[should_panic(expected = "to be unchanged")]
    fn test_assert_unchanged_fails() {
        let report = ConvergeReport::updated(
            PropertyTarget::new("svc", "pg/p"),
            vec![],
            Mutation {
                property_type: "astring".to_string(),
                value: "b".to_string(),
                applied: false,
            },
        );
        assert_unchanged(&report);
    }

    #[test]
    fn test_diagnostic_assertions() {
        assert_no_errors(&[]);
        assert_error_contains(
            &[Diagnostic::error("Invalid type for 'value'")],
            "Invalid type",
        );
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        assert_no_errors(&[Diagnostic::error("An error")]);
    }
}
