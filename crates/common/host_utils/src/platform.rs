//! Identification of the host platform from the `os-release` metadata files.

use log::debug;
use std::path::Path;

/// The files looked up, in order, to identify the platform.
pub const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Lower-case identifier of the distribution, e.g. `ubuntu` or `rocky`.
    pub name: String,

    /// Version of the distribution, absent on rolling releases.
    pub version: Option<String>,

    /// Identifiers of the distributions this one is derived from (`ID_LIKE`).
    pub like: Vec<String>,
}

impl Platform {
    /// True if this platform is `family` or is derived from it.
    pub fn is_like(&self, family: &str) -> bool {
        self.name == family || self.like.iter().any(|like| like == family)
    }
}

/// Identify the local platform.
///
/// Returns `None` when the platform is unknown.
pub fn detect() -> Option<Platform> {
    OS_RELEASE_PATHS
        .iter()
        .find_map(|path| detect_from(Path::new(path)))
}

/// Identify the platform described by a given `os-release` file.
pub fn detect_from(path: &Path) -> Option<Platform> {
    let contents = std::fs::read_to_string(path).ok()?;
    debug!("Reading platform identification from {}", path.display());
    parse_os_release(&contents)
}

pub fn parse_os_release(contents: &str) -> Option<Platform> {
    let mut id = None;
    let mut name = None;
    let mut version_id = None;
    let mut version = None;
    let mut like = Vec::new();

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value);
        match key {
            "ID" => id = Some(value.to_lowercase()),
            "NAME" => name = Some(value.to_lowercase()),
            "VERSION_ID" => version_id = Some(value.to_string()),
            "VERSION" => version = Some(value.to_string()),
            "ID_LIKE" => like = value.split_whitespace().map(str::to_lowercase).collect(),
            _ => {}
        }
    }

    let name = id.or(name).filter(|name| !name.is_empty())?;
    Some(Platform {
        name,
        version: version_id.or(version),
        like,
    })
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}
