use anyhow::anyhow;
use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use host_utils::platform::Platform;
use lifecycle_manager::CompositeManager;
use lifecycle_manager::InitSystem;
use lifecycle_manager::Manager;
use lifecycle_manager::ManagerConfig;
use lifecycle_manager::ManagerExt;
use lifecycle_manager::PackageTool;
use std::sync::Arc;
use system_command::UnixSystemCommandRunner;
use tracing::error;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/lifecycle-manager/manager.toml";

/// Install, enable and start the packages, snaps and services of a host.
#[derive(Debug, Parser)]
#[command(name = "lifecycle-manager", about, version, long_about = None)]
pub struct Args {
    /// Path to the TOML file listing the packages, snaps and services to manage.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: Utf8PathBuf,

    /// Platform of the host, which selects the package tool.
    #[arg(long, value_enum, default_value_t = PlatformArg::Auto)]
    pub platform: PlatformArg,

    /// Init manager of the host.
    #[arg(long, value_enum, default_value_t = InitArg::Systemd)]
    pub init: InitArg,

    /// Show the output of the package tools.
    #[arg(long)]
    pub verbose: bool,

    /// Turn-on the debug log level.
    ///
    /// If off only reports ERROR, WARN, and INFO
    /// If on also reports DEBUG
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: LifecycleCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    /// Read the platform from the os-release file
    Auto,
    /// Debian and derivatives, with apt
    Debian,
    /// Red Hat and derivatives, with yum
    Redhat,
    /// Do not manage packages
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InitArg {
    Systemd,
    /// Do not manage services
    None,
}

impl From<InitArg> for InitSystem {
    fn from(value: InitArg) -> Self {
        match value {
            InitArg::Systemd => InitSystem::Systemd,
            InitArg::None => InitSystem::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum LifecycleCommand {
    /// Render the configuration files of the managed resources
    Configure,
    /// Install the missing packages and snaps
    Install,
    /// Remove the installed packages and snaps
    Uninstall,
    /// Start the services on boot
    Enable,
    /// Do not start the services on boot
    Disable,
    /// Start the services
    Start,
    /// Stop the services
    Stop,
    /// Stop then start the services
    Restart,
    /// Print whether everything is installed, enabled and running
    Status,
}

impl LifecycleCommand {
    fn as_str(&self) -> &'static str {
        match self {
            LifecycleCommand::Configure => "configure",
            LifecycleCommand::Install => "install",
            LifecycleCommand::Uninstall => "uninstall",
            LifecycleCommand::Enable => "enable",
            LifecycleCommand::Disable => "disable",
            LifecycleCommand::Start => "start",
            LifecycleCommand::Stop => "stop",
            LifecycleCommand::Restart => "restart",
            LifecycleCommand::Status => "status",
        }
    }

    fn uses_services(&self) -> bool {
        matches!(
            self,
            LifecycleCommand::Enable
                | LifecycleCommand::Disable
                | LifecycleCommand::Start
                | LifecycleCommand::Stop
                | LifecycleCommand::Restart
                | LifecycleCommand::Status
        )
    }
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut config = ManagerConfig::load(&args.config)
        .with_context(|| format!("Failed to load the configuration from {}", args.config))?;
    if args.verbose {
        config = config.with_verbose(true);
    }

    let package_tool = select_package_tool(args.platform, host_utils::platform::detect)?;
    let init_system = InitSystem::from(args.init);
    let manager = CompositeManager::new(
        &config,
        package_tool,
        init_system,
        Arc::new(UnixSystemCommandRunner),
    );

    if args.command.uses_services() {
        manager.check_operational()?;
    }

    execute(&manager, args.command).map_err(|err| {
        error!("{}: {err}", manager.name());
        err.context(format!("Failed to {}", args.command.as_str()))
    })
}

fn execute(manager: &CompositeManager, command: LifecycleCommand) -> anyhow::Result<()> {
    match command {
        LifecycleCommand::Configure => manager.configure()?,
        LifecycleCommand::Install => manager.install()?,
        LifecycleCommand::Uninstall => manager.uninstall()?,
        LifecycleCommand::Enable => manager.enable()?,
        LifecycleCommand::Disable => manager.disable()?,
        LifecycleCommand::Start => manager.start()?,
        LifecycleCommand::Stop => manager.stop()?,
        LifecycleCommand::Restart => manager.restart()?,
        LifecycleCommand::Status => {
            let status = manager.status();
            println!("installed: {}", status.installed);
            println!("enabled: {}", status.enabled);
            println!("running: {}", status.running);
        }
    }
    Ok(())
}

/// Select the package tool, detecting the platform only when asked to.
fn select_package_tool(
    platform: PlatformArg,
    detect: impl FnOnce() -> Option<Platform>,
) -> anyhow::Result<PackageTool> {
    match platform {
        PlatformArg::Debian => Ok(PackageTool::Apt),
        PlatformArg::Redhat => Ok(PackageTool::Yum),
        PlatformArg::None => Ok(PackageTool::None),
        PlatformArg::Auto => {
            let platform =
                detect().ok_or_else(|| anyhow!("Unknown platform: no os-release file"))?;
            let tool = package_tool_for(&platform)
                .ok_or_else(|| anyhow!("Unsupported platform: {}", platform.name))?;
            info!("Detected platform {} using {tool:?}", platform.name);
            Ok(tool)
        }
    }
}

fn package_tool_for(platform: &Platform) -> Option<PackageTool> {
    const DEBIAN_FAMILY: [&str; 2] = ["debian", "ubuntu"];
    const REDHAT_FAMILY: [&str; 5] = ["rhel", "centos", "fedora", "rocky", "almalinux"];

    if DEBIAN_FAMILY.iter().any(|family| platform.is_like(family)) {
        Some(PackageTool::Apt)
    } else if REDHAT_FAMILY.iter().any(|family| platform.is_like(family)) {
        Some(PackageTool::Yum)
    } else {
        None
    }
}
