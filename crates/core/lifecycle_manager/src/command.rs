use log::debug;
use log::warn;
use system_command::CommandOutcome;
use system_command::OutputMode;
use system_command::SystemCommand;
use system_command::SystemCommandRunner;

/// Run a command and tell if it succeeded.
///
/// A command that cannot be executed at all counts as a failed one.
pub(crate) fn succeeds(
    runner: &dyn SystemCommandRunner,
    command: &SystemCommand,
    mode: OutputMode,
) -> bool {
    run(runner, command, mode).is_some_and(|outcome| outcome.is_success())
}

/// Run a command, returning `None` when it cannot be executed.
pub(crate) fn run(
    runner: &dyn SystemCommandRunner,
    command: &SystemCommand,
    mode: OutputMode,
) -> Option<CommandOutcome> {
    match runner.run(command, mode) {
        Ok(outcome) => {
            if !outcome.is_success() {
                debug!("<{command}> failed with exit code {:?}", outcome.exit_code);
            }
            Some(outcome)
        }
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}
