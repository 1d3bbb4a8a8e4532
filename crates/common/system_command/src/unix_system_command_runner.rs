use crate::*;
use log::debug;
use std::process::Command;
use std::process::Stdio;

/// Runs the commands on the local host, synchronously and without any timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixSystemCommandRunner;

impl SystemCommandRunner for UnixSystemCommandRunner {
    fn run(
        &self,
        system_command: &SystemCommand,
        mode: OutputMode,
    ) -> Result<CommandOutcome, SystemCommandError> {
        let mut command = into_command(system_command);

        let outcome = match mode {
            OutputMode::Silent => {
                command.stdout(Stdio::null()).stderr(Stdio::null());
                command.status().map(|status| CommandOutcome {
                    exit_code: status.code(),
                    captured_output: None,
                })
            }
            OutputMode::Decorated => {
                let _decoration = Decoration::begin(std::io::stdout(), system_command);
                command.status().map(|status| CommandOutcome {
                    exit_code: status.code(),
                    captured_output: None,
                })
            }
            OutputMode::Captured => command.output().map(|output| CommandOutcome {
                exit_code: output.status.code(),
                captured_output: Some(CapturedOutput {
                    stdout: output.stdout,
                    stderr: output.stderr,
                }),
            }),
        };

        match outcome {
            Ok(outcome) => {
                debug!(
                    "<{system_command}> exited with code {:?}",
                    outcome.exit_code
                );
                Ok(outcome)
            }
            Err(err) => Err(SystemCommandError::execution_failed(system_command, err)),
        }
    }
}

fn into_command(system_command: &SystemCommand) -> Command {
    let mut command = Command::new(&system_command.program);
    command.args(&system_command.args).stdin(Stdio::null());
    command
}
