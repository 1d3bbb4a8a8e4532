use camino::Utf8PathBuf;
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum ManagerError {
    #[error(transparent)]
    OperationFailed(#[from] AggregateFailure),

    #[error("Service manager '{name}' is not available on the system or elevated permissions have not been granted.")]
    ServiceManagerUnavailable { name: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(Utf8PathBuf),

    #[error("Failed to read the config file {path}")]
    ReadFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid syntax in the config file: {reason}")]
    InvalidSyntax { reason: String },

    #[error("Empty {kind} name in the config file")]
    EmptyName { kind: &'static str },
}

/// The batch operations that can partially fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Install,
    Uninstall,
    Enable,
    Disable,
    Start,
    Stop,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Install => "install",
            Operation::Uninstall => "uninstall",
            Operation::Enable => "enable",
            Operation::Disable => "disable",
            Operation::Start => "start",
            Operation::Stop => "stop",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or more items of a batch operation failed.
///
/// Only raised once every item of the batch has been attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFailure {
    /// Name of the backend that ran the operation, e.g. `systemd` or `apt`.
    pub backend: String,

    pub operation: Operation,

    /// The identifiers of the items that failed, in configuration order.
    pub failed_items: Vec<String>,

    /// Set when the platform tool failed without telling which item caused it,
    /// e.g. when an apt transaction fails at commit time.
    pub unattributed: bool,
}

impl std::error::Error for AggregateFailure {}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) failed to {}", self.backend, self.operation)?;
        match (self.failed_items.is_empty(), self.unattributed) {
            (true, _) => write!(f, ": unattributed tool failure"),
            (false, unattributed) => {
                write!(
                    f,
                    " {} item(s) [{}]",
                    self.failed_items.len(),
                    self.failed_items.join(", ")
                )?;
                if unattributed {
                    write!(f, " and hit an unattributed tool failure")?;
                }
                Ok(())
            }
        }
    }
}

/// Accumulates the failures of a batch operation while it visits every item.
#[derive(Debug, Default)]
pub(crate) struct Failures {
    failed_items: Vec<String>,
    unattributed: bool,
}

impl Failures {
    pub fn item(&mut self, id: impl Into<String>) {
        self.failed_items.push(id.into());
    }

    pub fn items(&mut self, ids: impl IntoIterator<Item = String>) {
        self.failed_items.extend(ids);
    }

    pub fn unattributed(&mut self) {
        self.unattributed = true;
    }

    pub fn into_result(self, backend: &str, operation: Operation) -> Result<(), ManagerError> {
        if self.failed_items.is_empty() && !self.unattributed {
            return Ok(());
        }

        Err(AggregateFailure {
            backend: backend.to_string(),
            operation,
            failed_items: self.failed_items,
            unattributed: self.unattributed,
        }
        .into())
    }
}
