use crate::*;
use mockall::automock;

/// Executes `SystemCommand`s on behalf of the lifecycle backends.
#[automock]
pub trait SystemCommandRunner {
    /// Runs the command to completion.
    ///
    /// A command that ran but failed is an `Ok` outcome with a non-zero exit code.
    /// An `Err` is returned only when the command could not be executed at all.
    fn run(
        &self,
        command: &SystemCommand,
        mode: OutputMode,
    ) -> Result<CommandOutcome, SystemCommandError>;
}
