#[derive(Debug, thiserror::Error)]
pub enum SystemCommandError {
    #[error("Failed to execute command <{command}>: {source}")]
    CommandExecutionFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl SystemCommandError {
    pub fn execution_failed(command: impl ToString, source: std::io::Error) -> Self {
        SystemCommandError::CommandExecutionFailed {
            command: command.to_string(),
            source,
        }
    }
}
