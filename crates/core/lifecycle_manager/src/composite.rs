use crate::packages::DebianPackageBackend;
use crate::packages::NullPackageBackend;
use crate::packages::PackageBackend;
use crate::packages::RedHatPackageBackend;
use crate::services::NullServiceBackend;
use crate::services::ServiceBackend;
use crate::services::SystemdServiceBackend;
use crate::Manager;
use crate::ManagerConfig;
use crate::ManagerError;
use log::info;
use std::fmt;
use std::sync::Arc;
use system_command::SystemCommandRunner;

/// The package tool of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageTool {
    Apt,
    Yum,
    /// Nothing to install: the packages and snaps of the configuration are ignored.
    None,
}

/// The init manager of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitSystem {
    Systemd,
    /// No service to drive: the services of the configuration are ignored.
    None,
}

/// A manager combining a package backend with a service backend.
pub struct CompositeManager {
    name: String,
    packages: Box<dyn PackageBackend>,
    services: Box<dyn ServiceBackend>,
}

impl fmt::Debug for CompositeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeManager")
            .field("name", &self.name)
            .field("packages", &self.packages.name())
            .field("services", &self.services.name())
            .finish()
    }
}

impl CompositeManager {
    pub fn new(
        config: &ManagerConfig,
        package_tool: PackageTool,
        init_system: InitSystem,
        runner: Arc<dyn SystemCommandRunner>,
    ) -> Self {
        let packages: Box<dyn PackageBackend> = match package_tool {
            PackageTool::Apt => Box::new(DebianPackageBackend::new(config, runner.clone())),
            PackageTool::Yum => Box::new(RedHatPackageBackend::new(config, runner.clone())),
            PackageTool::None => Box::new(NullPackageBackend),
        };
        let services: Box<dyn ServiceBackend> = match init_system {
            InitSystem::Systemd => Box::new(SystemdServiceBackend::new(
                config.services().to_vec(),
                runner,
            )),
            InitSystem::None => Box::new(NullServiceBackend),
        };

        Self::from_backends(packages, services)
    }

    pub fn from_backends(
        packages: Box<dyn PackageBackend>,
        services: Box<dyn ServiceBackend>,
    ) -> Self {
        let name = format!("{}+{}", packages.name(), services.name());
        Self {
            name,
            packages,
            services,
        }
    }

    /// Checks that the init manager of the host can be used.
    pub fn check_operational(&self) -> Result<(), ManagerError> {
        self.services.check_operational()
    }
}

impl Manager for CompositeManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn install(&self) -> Result<(), ManagerError> {
        info!("{}: install", self.name);
        self.packages.install()
    }

    fn uninstall(&self) -> Result<(), ManagerError> {
        info!("{}: uninstall", self.name);
        self.packages.uninstall()
    }

    fn enable(&self) -> Result<(), ManagerError> {
        info!("{}: enable", self.name);
        self.services.enable()
    }

    fn disable(&self) -> Result<(), ManagerError> {
        info!("{}: disable", self.name);
        self.services.disable()
    }

    fn start(&self) -> Result<(), ManagerError> {
        info!("{}: start", self.name);
        self.services.start()
    }

    fn stop(&self) -> Result<(), ManagerError> {
        info!("{}: stop", self.name);
        self.services.stop()
    }

    fn is_installed(&self) -> bool {
        self.packages.is_installed()
    }

    fn is_enabled(&self) -> bool {
        self.services.is_enabled()
    }

    fn is_running(&self) -> bool {
        self.services.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManagerExt;
    use crate::ManagerStatus;
    use assert_matches::assert_matches;
    use mockall::Sequence;
    use system_command::CommandOutcome;
    use system_command::MockSystemCommandRunner;
    use system_command::OutputMode;

    fn expect_command(
        runner: &mut MockSystemCommandRunner,
        seq: &mut Sequence,
        line: &'static str,
        exit_code: i32,
    ) {
        runner
            .expect_run()
            .withf(move |command, _| command.command_line() == line)
            .times(1)
            .in_sequence(seq)
            .returning(move |_, _| Ok(CommandOutcome::with_code(exit_code)));
    }

    #[test]
    fn restart_stops_every_service_before_starting_any() {
        let mut runner = MockSystemCommandRunner::new();
        let mut seq = Sequence::new();
        expect_command(&mut runner, &mut seq, "systemctl stop munge", 0);
        expect_command(&mut runner, &mut seq, "systemctl stop slurmd", 0);
        expect_command(&mut runner, &mut seq, "systemctl start munge", 0);
        expect_command(&mut runner, &mut seq, "systemctl start slurmd", 0);
        let config = ManagerConfig::default().with_services(["munge", "slurmd"]);
        let manager = CompositeManager::new(
            &config,
            PackageTool::None,
            InitSystem::Systemd,
            Arc::new(runner),
        );

        assert!(manager.restart().is_ok());
    }

    #[test]
    fn restart_does_not_start_when_stop_fails() {
        let mut runner = MockSystemCommandRunner::new();
        let mut seq = Sequence::new();
        expect_command(&mut runner, &mut seq, "systemctl stop munge", 1);
        expect_command(&mut runner, &mut seq, "systemctl stop slurmd", 0);
        let config = ManagerConfig::default().with_services(["munge", "slurmd"]);
        let manager = CompositeManager::new(
            &config,
            PackageTool::None,
            InitSystem::Systemd,
            Arc::new(runner),
        );

        let err = manager.restart().unwrap_err();

        assert_matches!(err, ManagerError::OperationFailed(failure) => {
            assert_eq!(failure.failed_items, vec!["munge"]);
        });
    }

    #[test]
    fn packages_go_to_the_selected_tool() {
        let mut runner = MockSystemCommandRunner::new();
        runner
            .expect_run()
            .withf(|command, mode| {
                command.command_line() == "rpm -qa nginx" && *mode == OutputMode::Captured
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutcome::captured(0, "nginx-1.20.1-1.el9.x86_64\n", "")));
        let config = ManagerConfig::default()
            .with_packages(["nginx"])
            .with_services(["nginx"]);
        let manager = CompositeManager::new(
            &config,
            PackageTool::Yum,
            InitSystem::None,
            Arc::new(runner),
        );

        assert_eq!(manager.name(), "yum+none");
        assert_eq!(
            manager.status(),
            ManagerStatus {
                installed: true,
                enabled: false,
                running: false,
            }
        );
    }

    #[test]
    fn null_backends_issue_no_command() {
        let config = ManagerConfig::default()
            .with_packages(["nginx"])
            .with_services(["nginx"]);
        let manager = CompositeManager::new(
            &config,
            PackageTool::None,
            InitSystem::None,
            Arc::new(MockSystemCommandRunner::new()),
        );

        assert!(manager.check_operational().is_ok());
        assert!(manager.install().is_ok());
        assert!(manager.enable().is_ok());
        assert!(manager.restart().is_ok());
        assert!(!manager.is_installed());
        assert!(!manager.is_running());
    }

    #[test]
    fn custom_backends() {
        struct Installed;

        impl PackageBackend for Installed {
            fn name(&self) -> &str {
                "pip"
            }

            fn install(&self) -> Result<(), ManagerError> {
                Ok(())
            }

            fn uninstall(&self) -> Result<(), ManagerError> {
                Ok(())
            }

            fn is_installed(&self) -> bool {
                true
            }
        }

        let manager =
            CompositeManager::from_backends(Box::new(Installed), Box::new(NullServiceBackend));

        assert_eq!(manager.name(), "pip+none");
        assert!(manager.is_installed());
    }
}
