//! tether: debug-bridge host client.
//!
//! ```text
//! tether devices                  List attached devices
//! tether version                  Print the host server's protocol version
//! tether features                 Print the selected device's features
//! tether open shell:              Pipe stdin/stdout through a device service
//! tether --config <path> ...      Use custom config TOML
//! tether --gen-config             Dump default config and exit
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tether_cli::config::CliConfig;
use tether_cli::launcher::ProcessLauncher;
use tether_cli::pipe::pipe;
use tether_core::{
    AssumeRunning, BoundClient, DeviceState, ServerLauncher, list_devices, server_version,
};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tether", about = "Debug-bridge host server client")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "tether.toml")]
    config: PathBuf,

    /// Server host (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config).
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Device selector (overrides config). Example: host:transport-usb
    #[arg(short, long)]
    selector: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List attached devices.
    Devices,
    /// Print the host server's protocol version.
    Version,
    /// Print the features advertised by the selected device.
    Features,
    /// Open a raw stream to a device service and pipe stdio through it.
    Open {
        /// Destination service, e.g. `shell:` or `shell:ls /`.
        destination: String,
    },
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&CliConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = CliConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(selector) = cli.selector {
        config.device.selector = selector;
    }

    // Init tracing. stdout carries device data, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("tether v{}", env!("CARGO_PKG_VERSION"));

    let launcher: Box<dyn ServerLauncher> = if config.launcher.start_server {
        Box::new(ProcessLauncher::new(&config.launcher.program))
    } else {
        Box::new(AssumeRunning)
    };
    launcher.ensure_running(&config.server).await?;

    match cli.command.unwrap_or(Action::Devices) {
        Action::Devices => {
            for device in list_devices(&config.server).await? {
                let state = match &device.state {
                    Some(DeviceState::Device) => "device",
                    Some(DeviceState::Offline) => "offline",
                    Some(DeviceState::Unauthorized) => "unauthorized",
                    Some(DeviceState::Other(s)) => s.as_str(),
                    None => "-",
                };
                println!(
                    "{}\t{}\ttransport_id:{}\t{}",
                    device.serial,
                    state,
                    device.transport_id,
                    device.model.as_deref().unwrap_or("-"),
                );
            }
        }
        Action::Version => {
            println!("{}", server_version(&config.server).await?);
        }
        Action::Features => {
            let client = connect(&config).await?;
            for feature in client.features().iter() {
                println!("{feature}");
            }
        }
        Action::Open { destination } => {
            let client = connect(&config).await?;
            let stream = client.open(&destination).await?;
            info!(
                device = client.display_name(),
                %destination,
                read_timeout = ?stream.read_timeout(),
                "stream open"
            );
            pipe(stream, tokio::io::stdin(), tokio::io::stdout()).await?;
        }
    }

    Ok(())
}

async fn connect(config: &CliConfig) -> tether_core::Result<BoundClient> {
    BoundClient::connect(
        config.server.clone(),
        config.selector()?,
        config.device.serial.clone(),
    )
    .await
}
