//! Service backends: drive the configured system services through the init manager.

use crate::command::succeeds;
use crate::error::Failures;
use crate::ManagerError;
use crate::Operation;
use log::info;
use log::warn;
use std::fmt;
use std::sync::Arc;
use system_command::OutputMode;
use system_command::SystemCommand;
use system_command::SystemCommandRunner;

const SYSTEMCTL_BIN: &str = "systemctl";

/// The init-manager facility that enables, disables, starts and stops the configured services.
///
/// Mutating operations are attempted on every service before failing.
/// Status queries return `false` as soon as one service does not match.
pub trait ServiceBackend {
    /// Returns the name of the service manager facility (e.g. "systemd").
    fn name(&self) -> &str;

    /// Checks whether the service manager facility is available and operational.
    fn check_operational(&self) -> Result<(), ManagerError>;

    fn enable(&self) -> Result<(), ManagerError>;

    fn disable(&self) -> Result<(), ManagerError>;

    fn start(&self) -> Result<(), ManagerError>;

    fn stop(&self) -> Result<(), ManagerError>;

    /// True if all the services are enabled.
    fn is_enabled(&self) -> bool;

    /// True if all the services are running. "Running" here means the same as "active".
    fn is_running(&self) -> bool;
}

pub struct SystemdServiceBackend {
    systemctl_bin: String,
    services: Vec<String>,
    runner: Arc<dyn SystemCommandRunner>,
}

// We need this as `SystemCommandRunner` is not `Debug`
impl fmt::Debug for SystemdServiceBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemdServiceBackend")
            .field("services", &self.services)
            .finish()
    }
}

impl SystemdServiceBackend {
    pub fn new(services: Vec<String>, runner: Arc<dyn SystemCommandRunner>) -> Self {
        Self {
            systemctl_bin: SYSTEMCTL_BIN.into(),
            services,
            runner,
        }
    }

    fn systemctl(&self, cmd: SystemCtlCmd, service: &str) -> SystemCommand {
        SystemCommand::new(&self.systemctl_bin)
            .arg(cmd.as_str())
            .arg(service)
    }

    fn run_on_all_services(
        &self,
        cmd: SystemCtlCmd,
        operation: Operation,
    ) -> Result<(), ManagerError> {
        let mut failures = Failures::default();

        for service in &self.services {
            let command = self.systemctl(cmd, service);
            if succeeds(self.runner.as_ref(), &command, OutputMode::Silent) {
                info!("Service {service}: {operation} done");
            } else {
                warn!("Service {service}: failed to {operation}");
                failures.item(service);
            }
        }

        failures.into_result(self.name(), operation)
    }

    fn all_services_pass(&self, cmd: SystemCtlCmd) -> bool {
        self.services.iter().all(|service| {
            succeeds(
                self.runner.as_ref(),
                &self.systemctl(cmd, service),
                OutputMode::Silent,
            )
        })
    }
}

impl ServiceBackend for SystemdServiceBackend {
    fn name(&self) -> &str {
        "systemd"
    }

    fn check_operational(&self) -> Result<(), ManagerError> {
        let command = SystemCommand::new(&self.systemctl_bin).arg(SystemCtlParam::Version.as_str());
        if succeeds(self.runner.as_ref(), &command, OutputMode::Silent) {
            Ok(())
        } else {
            Err(ManagerError::ServiceManagerUnavailable {
                name: self.name().to_string(),
            })
        }
    }

    fn enable(&self) -> Result<(), ManagerError> {
        self.run_on_all_services(SystemCtlCmd::Enable, Operation::Enable)
    }

    fn disable(&self) -> Result<(), ManagerError> {
        self.run_on_all_services(SystemCtlCmd::Disable, Operation::Disable)
    }

    fn start(&self) -> Result<(), ManagerError> {
        self.run_on_all_services(SystemCtlCmd::Start, Operation::Start)
    }

    fn stop(&self) -> Result<(), ManagerError> {
        self.run_on_all_services(SystemCtlCmd::Stop, Operation::Stop)
    }

    fn is_enabled(&self) -> bool {
        self.all_services_pass(SystemCtlCmd::IsEnabled)
    }

    fn is_running(&self) -> bool {
        self.all_services_pass(SystemCtlCmd::IsActive)
    }
}

/// A service backend for hosts, or managers, without services to drive.
#[derive(Debug, Default)]
pub struct NullServiceBackend;

impl ServiceBackend for NullServiceBackend {
    fn name(&self) -> &str {
        "none"
    }

    fn check_operational(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn enable(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn disable(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn start(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn stop(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn is_running(&self) -> bool {
        false
    }
}

#[derive(Debug, Copy, Clone)]
enum SystemCtlCmd {
    Enable,
    Disable,
    Start,
    Stop,
    IsEnabled,
    IsActive,
}

impl SystemCtlCmd {
    fn as_str(&self) -> &'static str {
        match self {
            SystemCtlCmd::Enable => "enable",
            SystemCtlCmd::Disable => "disable",
            SystemCtlCmd::Start => "start",
            SystemCtlCmd::Stop => "stop",
            SystemCtlCmd::IsEnabled => "is-enabled",
            SystemCtlCmd::IsActive => "is-active",
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum SystemCtlParam {
    Version,
}

impl SystemCtlParam {
    fn as_str(&self) -> &'static str {
        match self {
            SystemCtlParam::Version => "--version",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use system_command::CommandOutcome;
    use system_command::MockSystemCommandRunner;
    use system_command::SystemCommandError;
    use test_case::test_case;

    fn backend(services: &[&str], runner: MockSystemCommandRunner) -> SystemdServiceBackend {
        SystemdServiceBackend::new(
            services.iter().map(|s| s.to_string()).collect(),
            Arc::new(runner),
        )
    }

    fn expect_command(runner: &mut MockSystemCommandRunner, line: &'static str, exit_code: i32) {
        runner
            .expect_run()
            .withf(move |command, mode| {
                command.command_line() == line && *mode == OutputMode::Silent
            })
            .times(1)
            .returning(move |_, _| Ok(CommandOutcome::with_code(exit_code)));
    }

    #[test_case(Operation::Enable, "enable")]
    #[test_case(Operation::Disable, "disable")]
    #[test_case(Operation::Start, "start")]
    #[test_case(Operation::Stop, "stop")]
    fn operation_runs_systemctl_on_every_service(operation: Operation, verb: &str) {
        let mut runner = MockSystemCommandRunner::new();
        let verb = verb.to_string();
        runner
            .expect_run()
            .withf(move |command, mode| {
                command.program == "systemctl"
                    && command.args.first() == Some(&verb)
                    && *mode == OutputMode::Silent
            })
            .times(2)
            .returning(|_, _| Ok(CommandOutcome::success()));
        let backend = backend(&["slurmd", "munge"], runner);

        let result = match operation {
            Operation::Enable => backend.enable(),
            Operation::Disable => backend.disable(),
            Operation::Start => backend.start(),
            Operation::Stop => backend.stop(),
            _ => unreachable!(),
        };

        assert!(result.is_ok());
    }

    #[test]
    fn start_attempts_every_service_before_failing() {
        let mut runner = MockSystemCommandRunner::new();
        expect_command(&mut runner, "systemctl start slurmd", 1);
        expect_command(&mut runner, "systemctl start munge", 0);
        expect_command(&mut runner, "systemctl start slurmctld", 5);
        let backend = backend(&["slurmd", "munge", "slurmctld"], runner);

        let err = backend.start().unwrap_err();

        assert_matches!(err, ManagerError::OperationFailed(failure) => {
            assert_eq!(failure.backend, "systemd");
            assert_eq!(failure.operation, Operation::Start);
            assert_eq!(failure.failed_items, vec!["slurmd", "slurmctld"]);
            assert!(!failure.unattributed);
        });
    }

    #[test]
    fn execution_error_counts_as_a_failed_service() {
        let mut runner = MockSystemCommandRunner::new();
        runner
            .expect_run()
            .withf(|command, _| command.command_line() == "systemctl stop nginx")
            .times(1)
            .returning(|command, _| {
                Err(SystemCommandError::execution_failed(
                    command,
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                ))
            });
        expect_command(&mut runner, "systemctl stop munge", 0);
        let backend = backend(&["nginx", "munge"], runner);

        let err = backend.stop().unwrap_err();

        assert_matches!(err, ManagerError::OperationFailed(failure) => {
            assert_eq!(failure.failed_items, vec!["nginx"]);
        });
    }

    #[test]
    fn is_enabled_stops_at_the_first_disabled_service() {
        let mut runner = MockSystemCommandRunner::new();
        expect_command(&mut runner, "systemctl is-enabled a", 1);
        let backend = backend(&["a", "b", "c"], runner);

        assert!(!backend.is_enabled());
    }

    #[test]
    fn is_running_when_all_services_are_active() {
        let mut runner = MockSystemCommandRunner::new();
        expect_command(&mut runner, "systemctl is-active a", 0);
        expect_command(&mut runner, "systemctl is-active b", 0);
        let backend = backend(&["a", "b"], runner);

        assert!(backend.is_running());
    }

    #[test]
    fn is_running_stops_at_the_first_inactive_service() {
        let mut runner = MockSystemCommandRunner::new();
        expect_command(&mut runner, "systemctl is-active a", 0);
        expect_command(&mut runner, "systemctl is-active b", 3);
        let backend = backend(&["a", "b", "c"], runner);

        assert!(!backend.is_running());
    }

    #[test]
    fn status_of_no_service_is_vacuously_true() {
        let backend = backend(&[], MockSystemCommandRunner::new());

        assert!(backend.is_enabled());
        assert!(backend.is_running());
        assert!(backend.start().is_ok());
    }

    #[test]
    fn check_operational() {
        let mut runner = MockSystemCommandRunner::new();
        expect_command(&mut runner, "systemctl --version", 0);
        assert!(backend(&[], runner).check_operational().is_ok());

        let mut runner = MockSystemCommandRunner::new();
        runner.expect_run().returning(|command, _| {
            Err(SystemCommandError::execution_failed(
                command,
                std::io::Error::new(std::io::ErrorKind::NotFound, "systemctl"),
            ))
        });
        assert_matches!(
            backend(&[], runner).check_operational(),
            Err(ManagerError::ServiceManagerUnavailable { name }) if name == "systemd"
        );
    }

    #[test]
    fn null_backend_is_inert() {
        let backend = NullServiceBackend;

        assert!(backend.check_operational().is_ok());
        assert!(backend.enable().is_ok());
        assert!(backend.disable().is_ok());
        assert!(backend.start().is_ok());
        assert!(backend.stop().is_ok());
        assert!(!backend.is_enabled());
        assert!(!backend.is_running());
    }
}
