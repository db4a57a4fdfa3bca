//! # tether-core
//!
//! Client for the debug-bridge host server's control protocol.
//!
//! This crate contains:
//! - **Codec**: hex length-prefixed frames and `OKAY`/`FAIL` status tokens
//! - **Session**: one request → status exchange on a connected socket
//! - **Devices**: `host:devices-l` enumeration and listing parser
//! - **Transport**: connect + selector/destination handshake
//! - **Features**: per-device capability negotiation
//! - **Client**: `BoundClient`, a handle bound to one device selector
//! - **Stream**: `HostStream`, the raw duplex stream handed to callers
//! - **Server**: `ServerConfig`, the `ServerLauncher` capability, `host:version`
//! - **Error**: `TetherError`, a typed, `thiserror`-based error hierarchy
//!
//! Bytes exchanged on a stream after its handshake are never inspected.

pub mod client;
pub mod codec;
pub mod devices;
pub mod error;
pub mod features;
pub mod selector;
pub mod server;
pub mod session;
pub mod stream;
pub mod transport;

#[cfg(test)]
mod testing;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use client::{BoundClient, connect_all};
pub use codec::{HostCodec, MAX_FRAME_LEN, Status};
pub use devices::{DeviceRecord, DeviceState, list_devices};
pub use error::{ErrorKind, Result, TetherError};
pub use features::FeatureSet;
pub use selector::Selector;
pub use server::{AssumeRunning, DEFAULT_PORT, ServerConfig, ServerLauncher, server_version};
pub use stream::HostStream;
