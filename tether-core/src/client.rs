//! A handle bound to one device selector.
//!
//! Construction negotiates the device's features once; every
//! [`open`](BoundClient::open) afterwards runs its own handshake on its
//! own socket. Nothing is pooled, so clients and the streams they open
//! can be used from independent tasks without coordination.

use tokio::net::TcpStream;
use tracing::info;

use crate::devices;
use crate::error::Result;
use crate::features::{self, FeatureSet};
use crate::selector::Selector;
use crate::server::{ServerConfig, ServerLauncher};
use crate::stream::HostStream;
use crate::transport;

#[derive(Debug, Clone)]
pub struct BoundClient {
    config: ServerConfig,
    selector: Selector,
    display_name: String,
    features: FeatureSet,
}

impl BoundClient {
    /// Bind to `selector`, negotiating its features eagerly.
    ///
    /// `serial` is used as the display name when given; otherwise the
    /// name is derived from the selector. Fails if the features
    /// handshake fails.
    pub async fn connect(
        config: ServerConfig,
        selector: Selector,
        serial: Option<String>,
    ) -> Result<Self> {
        let display_name = serial.unwrap_or_else(|| selector.display_name());
        let features = features::negotiate(&config, &selector).await?;
        info!(device = %display_name, features = features.len(), "bound client");

        Ok(Self {
            config,
            selector,
            display_name,
            features,
        })
    }

    /// Open a raw stream to `destination` (e.g. `shell:`) on this device.
    pub async fn open(&self, destination: &str) -> Result<HostStream<TcpStream>> {
        transport::handshake(&self.config, &self.selector.to_string(), destination).await
    }

    /// Whether the device advertised `name`. Never queries the server.
    pub fn supports_feature(&self, name: &str) -> bool {
        self.features.contains(name)
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Bind one client per attached device.
///
/// The server is brought up through `launcher` first. Devices are
/// addressed by transport id and named by serial.
pub async fn connect_all(
    config: &ServerConfig,
    launcher: &dyn ServerLauncher,
) -> Result<Vec<BoundClient>> {
    launcher.ensure_running(config).await?;

    let mut clients = Vec::new();
    for record in devices::list_devices(config).await? {
        let client = BoundClient::connect(
            config.clone(),
            Selector::TransportId(record.transport_id),
            Some(record.serial),
        )
        .await?;
        clients.push(client);
    }
    Ok(clients)
}
