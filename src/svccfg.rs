//! Thin client for the `svccfg` command line.
//!
//! Only the two subcommands the reconciler needs are exposed:
//!
//! ```text
//! svccfg -s <fmri> listprop <property>
//! svccfg -s <fmri> setprop <property> = <type>: <value>
//! ```

use tracing::{debug, warn};

use crate::command::{CommandOutput, CommandRunner};
use crate::config::DEFAULT_SVCCFG;
use crate::error::SmfError;
use crate::resource::PropertyTarget;

/// `svccfg` invoked through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct Svccfg<R> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> Svccfg<R> {
    /// Use `svccfg` from `PATH`.
    pub fn new(runner: R) -> Self {
        Self::with_program(runner, DEFAULT_SVCCFG)
    }

    /// Use a specific `svccfg` binary.
    pub fn with_program(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Argument vector for `listprop`.
    pub fn listprop_argv(&self, target: &PropertyTarget) -> Vec<String> {
        vec![
            self.program.clone(),
            "-s".to_string(),
            target.fmri.clone(),
            "listprop".to_string(),
            target.property.clone(),
        ]
    }

    /// Argument vector for `setprop`. `value` must already be rendered.
    pub fn setprop_argv(
        &self,
        target: &PropertyTarget,
        property_type: &str,
        value: &str,
    ) -> Vec<String> {
        vec![
            self.program.clone(),
            "-s".to_string(),
            target.fmri.clone(),
            "setprop".to_string(),
            target.property.clone(),
            "=".to_string(),
            format!("{}:", property_type),
            value.to_string(),
        ]
    }

    /// List a property and return the raw listing.
    pub async fn listprop(&self, target: &PropertyTarget) -> Result<String, SmfError> {
        let output = self.run_checked(self.listprop_argv(target)).await?;
        Ok(output.stdout)
    }

    /// Set a property to an already rendered value.
    pub async fn setprop(
        &self,
        target: &PropertyTarget,
        property_type: &str,
        value: &str,
    ) -> Result<(), SmfError> {
        self.run_checked(self.setprop_argv(target, property_type, value))
            .await?;
        Ok(())
    }

    async fn run_checked(&self, argv: Vec<String>) -> Result<CommandOutput, SmfError> {
        debug!(argv = ?argv, "svccfg");
        let output = self.runner.run(&argv).await?;
        if output.is_success() {
            return Ok(output);
        }

        let command = argv.join(" ");
        warn!(command = %command, status = ?output.status, stderr = %output.stderr.trim_end(), "svccfg failed");
        Err(SmfError::CommandFailed {
            command,
            status: output.status,
            stderr: output.stderr,
        })
    }
}
