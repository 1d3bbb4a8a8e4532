use crate::ConfigError;
use camino::Utf8Path;
use log::warn;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;

/// A snap to be installed with the universal `snap` tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedSnap {
    name: String,
    channel: Option<String>,
    extra_args: Vec<String>,
}

impl ManagedSnap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channel: None,
            extra_args: Vec::new(),
        }
    }

    pub fn with_channel(self, channel: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            ..self
        }
    }

    pub fn with_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra_args: args.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }
}

/// The packages, snaps and services managed by one manager.
///
/// Each list keeps the configuration order and holds no duplicates:
/// a repeated identifier is dropped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerConfig {
    packages: Vec<String>,
    snaps: Vec<ManagedSnap>,
    services: Vec<String>,
    verbose: bool,
}

impl ManagerConfig {
    pub fn with_packages<I, S>(self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: without_duplicates("package", packages.into_iter().map(Into::into), |p| {
                p.as_str()
            }),
            ..self
        }
    }

    pub fn with_snaps(self, snaps: impl IntoIterator<Item = ManagedSnap>) -> Self {
        Self {
            snaps: without_duplicates("snap", snaps, ManagedSnap::name),
            ..self
        }
    }

    pub fn with_services<I, S>(self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            services: without_duplicates("service", services.into_iter().map(Into::into), |s| {
                s.as_str()
            }),
            ..self
        }
    }

    pub fn with_verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn snaps(&self) -> &[ManagedSnap] {
        &self.snaps
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Read the configuration from a TOML file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_owned()),
            _ => ConfigError::ReadFailed {
                path: path.to_owned(),
                source: err,
            },
        })?;

        Self::from_toml_str(&contents).map_err(|err| match err {
            ConfigError::InvalidSyntax { reason } => ConfigError::InvalidSyntax {
                reason: format!("{path}: {reason}"),
            },
            err => err,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawManagerConfig =
            toml::from_str(contents).map_err(|e| ConfigError::InvalidSyntax {
                reason: e.to_string(),
            })?;
        raw.try_into()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct RawManagerConfig {
    #[serde(default)]
    install_packages: Vec<String>,

    #[serde(default)]
    install_snaps: Vec<RawSnap>,

    #[serde(default)]
    systemd_services: Vec<String>,

    #[serde(default)]
    verbose: bool,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawSnap {
    name: String,

    #[serde(default)]
    channel: Option<String>,

    #[serde(default)]
    args: Vec<String>,
}

impl TryFrom<RawManagerConfig> for ManagerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawManagerConfig) -> Result<Self, Self::Error> {
        reject_empty("package", &raw.install_packages)?;
        reject_empty("service", &raw.systemd_services)?;

        let mut snaps = Vec::with_capacity(raw.install_snaps.len());
        for raw_snap in raw.install_snaps {
            if raw_snap.name.trim().is_empty() {
                return Err(ConfigError::EmptyName { kind: "snap" });
            }
            let mut snap = ManagedSnap::new(raw_snap.name).with_args(raw_snap.args);
            // An empty channel stands for the default one
            if let Some(channel) = raw_snap.channel.filter(|c| !c.is_empty()) {
                snap = snap.with_channel(channel);
            }
            snaps.push(snap);
        }

        Ok(ManagerConfig::default()
            .with_packages(raw.install_packages)
            .with_snaps(snaps)
            .with_services(raw.systemd_services)
            .with_verbose(raw.verbose))
    }
}

fn reject_empty(kind: &'static str, names: &[String]) -> Result<(), ConfigError> {
    if names.iter().any(|name| name.trim().is_empty()) {
        return Err(ConfigError::EmptyName { kind });
    }
    Ok(())
}

fn without_duplicates<T>(
    kind: &str,
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        if seen.insert(key(&item).to_string()) {
            unique.push(item);
        } else {
            warn!("Ignoring duplicate {kind} '{}' in the configuration", key(&item));
        }
    }
    unique
}
