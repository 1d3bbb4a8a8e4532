pub mod file;
pub mod platform;

#[cfg(feature = "logging")]
pub mod logging;
