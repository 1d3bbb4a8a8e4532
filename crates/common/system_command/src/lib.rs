//! System command runner facility.
//!
//! All the lifecycle backends talk to the host through a [`SystemCommandRunner`],
//! which makes it possible to replace the host with a fake in tests.

mod decoration;
mod error;
mod system_command;
mod system_command_runner;

#[cfg(target_family = "unix")]
mod unix_system_command_runner;

pub use self::{decoration::*, error::*, system_command::*, system_command_runner::*};

#[cfg(target_family = "unix")]
pub use self::unix_system_command_runner::*;
