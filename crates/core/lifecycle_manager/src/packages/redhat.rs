use super::PackageBackend;
use super::SnapInstaller;
use crate::command::run;
use crate::command::succeeds;
use crate::error::Failures;
use crate::ManagerConfig;
use crate::ManagerError;
use crate::Operation;
use log::debug;
use log::info;
use log::warn;
use std::fmt;
use std::sync::Arc;
use system_command::CommandOutcome;
use system_command::OutputMode;
use system_command::SystemCommand;
use system_command::SystemCommandRunner;

const RPM_BIN: &str = "rpm";
const YUM_BIN: &str = "yum";

/// Installs rpm packages with yum, one package at a time.
pub struct RedHatPackageBackend {
    packages: Vec<String>,
    snaps: SnapInstaller,
    verbose: bool,
    runner: Arc<dyn SystemCommandRunner>,
}

// We need this as `SystemCommandRunner` is not `Debug`
impl fmt::Debug for RedHatPackageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedHatPackageBackend")
            .field("packages", &self.packages)
            .field("snaps", &self.snaps)
            .finish()
    }
}

impl RedHatPackageBackend {
    pub fn new(config: &ManagerConfig, runner: Arc<dyn SystemCommandRunner>) -> Self {
        Self {
            packages: config.packages().to_vec(),
            snaps: SnapInstaller::new(config.snaps().to_vec(), config.verbose(), runner.clone()),
            verbose: config.verbose(),
            runner,
        }
    }

    fn is_rpm_installed(&self, name: &str) -> bool {
        let command = SystemCommand::new(RPM_BIN).arg("-qa").arg(name);
        run(self.runner.as_ref(), &command, OutputMode::Captured)
            .is_some_and(|outcome| lists_package(&outcome, name))
    }

    fn yum(&self, action: &str, name: &str, operation: Operation, failures: &mut Failures) {
        let command = SystemCommand::new(YUM_BIN).arg(action).arg("-y").arg(name);
        if succeeds(
            self.runner.as_ref(),
            &command,
            OutputMode::visible(self.verbose),
        ) {
            info!("Package {name}: {operation} done");
        } else {
            warn!("Package {name}: failed to {operation}");
            failures.item(name);
        }
    }
}

/// `rpm -qa` exits with 0 even when nothing matches,
/// so the package is only deemed installed when it is actually listed.
fn lists_package(outcome: &CommandOutcome, name: &str) -> bool {
    if !outcome.is_success() {
        return false;
    }
    let stderr = outcome.stderr().unwrap_or_default();
    if !stderr.is_empty() {
        debug!("rpm -qa {name}: {}", stderr.trim());
        return false;
    }
    outcome
        .stdout()
        .unwrap_or_default()
        .lines()
        .filter_map(package_name)
        .any(|listed| listed == name)
}

/// The name part of a `name-version-release.arch` rpm label.
fn package_name(label: &str) -> Option<&str> {
    let mut fields = label.trim().rsplitn(3, '-');
    let _release = fields.next()?;
    let _version = fields.next()?;
    fields.next().filter(|name| !name.is_empty())
}

impl PackageBackend for RedHatPackageBackend {
    fn name(&self) -> &str {
        "yum"
    }

    fn install(&self) -> Result<(), ManagerError> {
        let mut failures = Failures::default();
        for name in &self.packages {
            if !self.is_rpm_installed(name) {
                self.yum("install", name, Operation::Install, &mut failures);
            }
        }
        failures.items(self.snaps.install());
        failures.into_result(self.name(), Operation::Install)
    }

    fn uninstall(&self) -> Result<(), ManagerError> {
        let mut failures = Failures::default();
        for name in &self.packages {
            if self.is_rpm_installed(name) {
                self.yum("remove", name, Operation::Uninstall, &mut failures);
            }
        }
        failures.items(self.snaps.uninstall());
        failures.into_result(self.name(), Operation::Uninstall)
    }

    fn is_installed(&self) -> bool {
        self.packages.iter().all(|name| self.is_rpm_installed(name)) && self.snaps.is_installed()
    }
}
