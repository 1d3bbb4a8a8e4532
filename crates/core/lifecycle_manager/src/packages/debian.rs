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

const DPKG_QUERY_BIN: &str = "dpkg-query";
const DPKG_STATUS_FORMAT: &str = "-f=${db:Status-Status}";
const APT_GET_BIN: &str = "apt-get";
const APT_CACHE_BIN: &str = "apt-cache";

/// Installs deb packages with apt, in a single transaction.
///
/// The missing packages are marked one by one, then committed all at once:
/// a failed commit cannot be attributed to a given package.
pub struct DebianPackageBackend {
    packages: Vec<String>,
    snaps: SnapInstaller,
    verbose: bool,
    runner: Arc<dyn SystemCommandRunner>,
}

// We need this as `SystemCommandRunner` is not `Debug`
impl fmt::Debug for DebianPackageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebianPackageBackend")
            .field("packages", &self.packages)
            .field("snaps", &self.snaps)
            .finish()
    }
}

impl DebianPackageBackend {
    pub fn new(config: &ManagerConfig, runner: Arc<dyn SystemCommandRunner>) -> Self {
        Self {
            packages: config.packages().to_vec(),
            snaps: SnapInstaller::new(config.snaps().to_vec(), config.verbose(), runner.clone()),
            verbose: config.verbose(),
            runner,
        }
    }

    /// A removed package whose conffiles are kept is still known to dpkg,
    /// in the `config-files` state: only `installed` counts as present.
    fn is_deb_installed(&self, name: &str) -> bool {
        let command = SystemCommand::new(DPKG_QUERY_BIN)
            .arg("-W")
            .arg(DPKG_STATUS_FORMAT)
            .arg(name);
        run(self.runner.as_ref(), &command, OutputMode::Captured)
            .is_some_and(|outcome| outcome.is_success() && is_installed_status(&outcome))
    }

    fn apt_get(&self, action: &str) -> SystemCommand {
        SystemCommand::new(APT_GET_BIN).args([action, "--quiet", "--yes"])
    }

    fn run_visible(&self, command: &SystemCommand) -> bool {
        succeeds(
            self.runner.as_ref(),
            command,
            OutputMode::visible(self.verbose),
        )
    }

    fn install_debs(&self, failures: &mut Failures) {
        let missing: Vec<&str> = self
            .packages
            .iter()
            .map(String::as_str)
            .filter(|name| !self.is_deb_installed(name))
            .collect();
        if missing.is_empty() {
            debug!("All the deb packages are installed");
            return;
        }

        if !self.run_visible(&self.apt_get("update")) {
            warn!("Failed to update the apt package index");
            failures.unattributed();
            return;
        }

        let mut marked = Vec::with_capacity(missing.len());
        for name in missing {
            let command = SystemCommand::new(APT_CACHE_BIN).arg("show").arg(name);
            if succeeds(self.runner.as_ref(), &command, OutputMode::Silent) {
                marked.push(name);
            } else {
                warn!("Package {name}: not found in the apt package index");
                failures.item(name);
            }
        }
        if marked.is_empty() {
            return;
        }

        if self.run_visible(&self.apt_get("install").args(marked.iter().copied())) {
            info!("Packages installed: {}", marked.join(", "));
        } else {
            warn!("Failed to install packages: {}", marked.join(", "));
            failures.unattributed();
        }
    }

    fn uninstall_debs(&self, failures: &mut Failures) {
        let present: Vec<&str> = self
            .packages
            .iter()
            .map(String::as_str)
            .filter(|name| self.is_deb_installed(name))
            .collect();
        if present.is_empty() {
            debug!("None of the deb packages is installed");
            return;
        }

        if self.run_visible(&self.apt_get("remove").args(present.iter().copied())) {
            info!("Packages removed: {}", present.join(", "));
        } else {
            warn!("Failed to remove packages: {}", present.join(", "));
            failures.unattributed();
        }
    }
}

fn is_installed_status(outcome: &CommandOutcome) -> bool {
    outcome.stdout().unwrap_or_default().trim() == "installed"
}

impl PackageBackend for DebianPackageBackend {
    fn name(&self) -> &str {
        "apt"
    }

    fn install(&self) -> Result<(), ManagerError> {
        let mut failures = Failures::default();
        self.install_debs(&mut failures);
        failures.items(self.snaps.install());
        failures.into_result(self.name(), Operation::Install)
    }

    fn uninstall(&self) -> Result<(), ManagerError> {
        let mut failures = Failures::default();
        self.uninstall_debs(&mut failures);
        failures.items(self.snaps.uninstall());
        failures.into_result(self.name(), Operation::Uninstall)
    }

    fn is_installed(&self) -> bool {
        self.packages.iter().all(|name| self.is_deb_installed(name)) && self.snaps.is_installed()
    }
}
