//! Capability negotiation for a selected device.
//!
//! The features query goes through the normal two-step handshake with
//! a synthesized destination (`<selector>:features`, with the
//! `host:transport` prefix moved into the `host-transport` namespace).
//! The server answers with one frame holding a comma-separated list.

use std::collections::BTreeSet;

use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::debug;

use crate::error::Result;
use crate::selector::Selector;
use crate::server::ServerConfig;
use crate::session;
use crate::transport;

/// Immutable set of capability tokens reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet(BTreeSet<String>);

impl FeatureSet {
    /// Split a comma-separated features body.
    ///
    /// Empty components are kept as empty tokens.
    pub fn parse(body: &str) -> Self {
        Self(body.split(',').map(str::to_string).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

/// Query the features of the device picked by `selector`.
pub async fn negotiate(config: &ServerConfig, selector: &Selector) -> Result<FeatureSet> {
    let query = selector.to_string();
    let destination = selector.features_destination();

    let mut stream = transport::handshake(config, &query, &destination).await?;
    let result = read_features(&mut stream).await;
    let _ = stream.shutdown().await;

    let features = result?;
    debug!(selector = %query, %features, "negotiated features");
    Ok(features)
}

/// Read the features frame from a bound stream.
pub async fn read_features<S>(stream: &mut S) -> Result<FeatureSet>
where
    S: AsyncRead + Unpin,
{
    let body = session::read_response_payload(stream).await?;
    Ok(FeatureSet::parse(&body))
}

// ── Tests ────────────────────────────────────────────────────────
