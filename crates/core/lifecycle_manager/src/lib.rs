//! Lifecycle management of host resources: installed packages, installed snaps
//! and system services, driven through one uniform set of operations.
//!
//! A [`CompositeManager`] combines a [`PackageBackend`] (apt or yum, plus snaps)
//! with a [`ServiceBackend`] (systemd) and exposes them as a single [`Manager`].
//!
//! Batch operations (install, uninstall, enable, disable, start, stop) attempt every
//! configured item and only then report an [`AggregateFailure`] listing what failed.
//! Status queries stop at the first item that is missing.

mod command;
mod composite;
mod config;
mod error;
mod manager;
pub mod packages;
pub mod services;

pub use self::composite::*;
pub use self::config::*;
pub use self::error::*;
pub use self::manager::*;
pub use self::packages::PackageBackend;
pub use self::services::ServiceBackend;
