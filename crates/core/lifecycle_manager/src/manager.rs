use crate::ManagerError;

/// The lifecycle of the resources handled by a manager, from install to start.
///
/// High-level operations that either succeed or fail as a whole.
/// All the operations are inert by default: the mutating ones do nothing
/// and the status queries report `false`, i.e. "unknown" reads as "not present".
pub trait Manager {
    /// Name used to identify the manager in logs and errors.
    fn name(&self) -> &str;

    /// Reserved for rendering configuration files.
    fn configure(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn install(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    /// Start the resources on boot. This does not start them now.
    fn enable(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    /// Do not start the resources on boot. This does not stop them.
    fn disable(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn start(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn stop(&self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn is_installed(&self) -> bool {
        false
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn is_running(&self) -> bool {
        false
    }
}

/// A snapshot of the status queries of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerStatus {
    pub installed: bool,
    pub enabled: bool,
    pub running: bool,
}

/// Operations composed from the [`Manager`] ones.
///
/// Implemented for every manager, and not overridable,
/// so all the managers restart the same way.
pub trait ManagerExt: Manager {
    /// Stop then start.
    ///
    /// `start()` is only attempted once `stop()` has completed,
    /// and not at all if `stop()` failed.
    fn restart(&self) -> Result<(), ManagerError> {
        self.stop()?;
        self.start()
    }

    fn status(&self) -> ManagerStatus {
        ManagerStatus {
            installed: self.is_installed(),
            enabled: self.is_enabled(),
            running: self.is_running(),
        }
    }
}

impl<M: Manager + ?Sized> ManagerExt for M {}
