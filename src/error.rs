//! Error types for SMF property reconciliation.

use thiserror::Error;

/// Errors that can occur while reconciling a service property.
#[derive(Debug, Error)]
pub enum SmfError {
    /// Caller input was missing or had the wrong shape.
    #[error("Validation error: {0}")]
    Validation(String),

    /// `listprop` succeeded but returned no record for the property.
    #[error("Unable to find property {property} for service {fmri}")]
    PropertyNotFound {
        /// Service FMRI that was queried.
        fmri: String,
        /// Property that was requested.
        property: String,
    },

    /// An external command exited unsuccessfully.
    #[error("Command `{command}` failed ({}): {stderr}", exit_description(.status))]
    CommandFailed {
        /// The command line, space-joined.
        command: String,
        /// Exit status, if the process exited normally.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// An external command could not be started.
    #[error("Unable to run `{command}`: {source}")]
    Spawn {
        /// The command line, space-joined.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The `listprop` output could not be parsed.
    #[error("Malformed listing for property {property}: {reason}")]
    MalformedListing {
        /// Property whose record was being parsed.
        property: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn exit_description(status: &Option<i32>) -> String {
    match *status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl SmfError {
    /// Get the error message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::PropertyNotFound { fmri, property } => {
                format!("property {} not found on {}", property, fmri)
            },
            Self::CommandFailed { stderr, .. } => stderr.trim_end().to_string(),
            Self::Spawn { source, .. } => source.to_string(),
            Self::MalformedListing { reason, .. } => reason.clone(),
            Self::Serialization(err) => err.to_string(),
        }
    }

    /// Whether this error came from running an external command.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::CommandFailed { .. } | Self::Spawn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SmfError::Validation("missing value".to_string());
        assert_eq!(format!("{}", err), "Validation error: missing value");

        let err = SmfError::PropertyNotFound {
            fmri: "network/dns/client".to_string(),
            property: "config/nameserver".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Unable to find property config/nameserver for service network/dns/client"
        );
    }

    #[test]
    fn test_command_failed_display() {
        let err = SmfError::CommandFailed {
            command: "svccfg -s foo listprop a/b".to_string(),
            status: Some(1),
            stderr: "svccfg: Pattern 'foo' doesn't match any instances or services\n"
                .to_string(),
        };
        let display = format!("{}", err);
        assert!(display.starts_with("Command `svccfg -s foo listprop a/b` failed (exit status 1)"));
        assert!(display.contains("doesn't match"));

        let err = SmfError::CommandFailed {
            command: "svccfg".to_string(),
            status: None,
            stderr: String::new(),
        };
        assert!(format!("{}", err).contains("terminated by signal"));
    }

    #[test]
    fn test_message_method() {
        let err = SmfError::Validation("bad type".to_string());
        assert_eq!(err.message(), "bad type");

        let err = SmfError::CommandFailed {
            command: "svccfg".to_string(),
            status: Some(1),
            stderr: "no such property\n".to_string(),
        };
        assert_eq!(err.message(), "no such property");
    }

    #[test]
    fn test_is_external() {
        let err = SmfError::Spawn {
            command: "svccfg".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.is_external());
        assert!(!SmfError::Validation("x".to_string()).is_external());
        assert!(!SmfError::PropertyNotFound {
            fmri: "a".to_string(),
            property: "b/c".to_string(),
        }
        .is_external());
    }
}
