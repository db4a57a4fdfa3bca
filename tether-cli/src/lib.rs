//! # tether-cli: command-line client
//!
//! Lists devices, reports features and versions, and pipes stdin/stdout
//! through a raw stream opened on a device service.

pub mod config;
pub mod launcher;
pub mod pipe;
