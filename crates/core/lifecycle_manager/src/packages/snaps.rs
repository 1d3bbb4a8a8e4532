use crate::command::succeeds;
use crate::ManagedSnap;
use log::info;
use log::warn;
use std::fmt;
use std::sync::Arc;
use system_command::OutputMode;
use system_command::SystemCommand;
use system_command::SystemCommandRunner;

const SNAP_BIN: &str = "snap";

/// Installs the configured snaps, whatever the native package tool of the host.
///
/// A snap that is already installed is left untouched: neither refreshed,
/// nor moved to the configured channel.
pub struct SnapInstaller {
    snap_bin: String,
    snaps: Vec<ManagedSnap>,
    verbose: bool,
    runner: Arc<dyn SystemCommandRunner>,
}

// We need this as `SystemCommandRunner` is not `Debug`
impl fmt::Debug for SnapInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapInstaller")
            .field("snaps", &self.snaps)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl SnapInstaller {
    pub fn new(
        snaps: Vec<ManagedSnap>,
        verbose: bool,
        runner: Arc<dyn SystemCommandRunner>,
    ) -> Self {
        Self {
            snap_bin: SNAP_BIN.into(),
            snaps,
            verbose,
            runner,
        }
    }

    /// Install the missing snaps, returning the names of those that failed.
    pub fn install(&self) -> Vec<String> {
        let mut failed = Vec::new();

        for snap in &self.snaps {
            if self.is_present(snap) {
                continue;
            }

            let command = self.install_command(snap);
            if succeeds(
                self.runner.as_ref(),
                &command,
                OutputMode::visible(self.verbose),
            ) {
                info!("Snap {}: installed", snap.name());
            } else {
                warn!("Snap {}: failed to install", snap.name());
                failed.push(snap.name().to_string());
            }
        }

        failed
    }

    /// Remove the installed snaps, returning the names of those that failed.
    pub fn uninstall(&self) -> Vec<String> {
        let mut failed = Vec::new();

        for snap in &self.snaps {
            if !self.is_present(snap) {
                continue;
            }

            let command = SystemCommand::new(&self.snap_bin)
                .arg("remove")
                .arg(snap.name());
            if succeeds(
                self.runner.as_ref(),
                &command,
                OutputMode::visible(self.verbose),
            ) {
                info!("Snap {}: removed", snap.name());
            } else {
                warn!("Snap {}: failed to remove", snap.name());
                failed.push(snap.name().to_string());
            }
        }

        failed
    }

    /// True if all the snaps are installed, whatever their channel.
    pub fn is_installed(&self) -> bool {
        self.snaps.iter().all(|snap| self.is_present(snap))
    }

    fn is_present(&self, snap: &ManagedSnap) -> bool {
        let command = SystemCommand::new(&self.snap_bin)
            .arg("list")
            .arg(snap.name());
        succeeds(self.runner.as_ref(), &command, OutputMode::Silent)
    }

    fn install_command(&self, snap: &ManagedSnap) -> SystemCommand {
        let mut command = SystemCommand::new(&self.snap_bin)
            .arg("install")
            .arg(snap.name());
        if let Some(channel) = snap.channel() {
            command = command.arg(format!("--channel={channel}"));
        }
        command.args(snap.extra_args().iter().cloned())
    }
}
