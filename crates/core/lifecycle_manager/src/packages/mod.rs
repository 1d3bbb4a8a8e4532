//! Package backends: install the configured packages with the platform package tool,
//! and the configured snaps with the `snap` tool.

mod debian;
mod redhat;
mod snaps;

pub use self::debian::DebianPackageBackend;
pub use self::redhat::RedHatPackageBackend;
pub use self::snaps::SnapInstaller;

use crate::ManagerError;

/// The platform-specific facility that installs packages and snaps.
///
/// `install` and `uninstall` attempt every configured package then every configured snap,
/// before reporting one failure for all the items that could not be processed.
pub trait PackageBackend {
    /// Returns the name of the package tool (e.g. "apt" or "yum").
    fn name(&self) -> &str;

    fn install(&self) -> Result<(), ManagerError>;

    fn uninstall(&self) -> Result<(), ManagerError>;

    /// True if all the packages and snaps are installed.
    fn is_installed(&self) -> bool;
}

/// A package backend for managers that have no package to install.
#[derive(Debug, Default)]
pub struct NullPackageBackend;

impl PackageBackend for NullPackageBackend {
    fn name(&self) -> &str {
        "none"
    }

    fn install(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn is_installed(&self) -> bool {
        false
    }
}
