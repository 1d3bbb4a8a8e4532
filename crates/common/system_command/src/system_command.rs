use std::fmt;

/// Representation of a system command to be run by a `SystemCommandRunner`.
///
/// The `SystemCommand` does not allow for pipeline constructions by purpose.
///
/// Note: We are using `String`s here and not `OsString`. We want the `SystemCommand` to be easily
/// inspectable, so test doubles can match on the program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCommand {
    /// The binary to be executed.
    pub program: String,

    /// The arguments to the binary.
    pub args: Vec<String>,
}

impl SystemCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program followed by its arguments, separated by single spaces and unquoted.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for SystemCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            // The arguments are displayed as debug, to be properly quoted and distinguished from each other.
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

/// How the standard streams of a command are handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Discard stdout and stderr; only the exit status is of interest.
    Silent,

    /// Let the command write to the operator's terminal, between begin/end markers.
    Decorated,

    /// Buffer stdout and stderr and return them to the caller.
    Captured,
}

impl OutputMode {
    /// The mode used for commands an operator may want to watch: decorated when verbose.
    pub fn visible(verbose: bool) -> Self {
        if verbose {
            OutputMode::Decorated
        } else {
            OutputMode::Silent
        }
    }
}

/// Output of a command run in [`OutputMode::Captured`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// What came out of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process has been terminated by a signal.
    pub exit_code: Option<i32>,

    /// Only set for commands run in [`OutputMode::Captured`].
    pub captured_output: Option<CapturedOutput>,
}

impl CommandOutcome {
    pub fn with_code(exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            captured_output: None,
        }
    }

    pub fn success() -> Self {
        Self::with_code(0)
    }

    pub fn failure() -> Self {
        Self::with_code(1)
    }

    pub fn captured(exit_code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code: Some(exit_code),
            captured_output: Some(CapturedOutput {
                stdout: stdout.into(),
                stderr: stderr.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout(&self) -> Option<String> {
        self.captured_output
            .as_ref()
            .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn stderr(&self) -> Option<String> {
        self.captured_output
            .as_ref()
            .map(|output| String::from_utf8_lossy(&output.stderr).into_owned())
    }
}
