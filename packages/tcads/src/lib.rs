//! # TwinCAT ADS for Rust
//!
//! A rust-native implementation of the TwinCAT ADS protocol.
//!
//! This crate aims to provide a robust way to communicate with TwinCAT devices (PLCs, NC, etc.),
//! without relying on the official Beckhoff `TcAdsDll.dll` or requiring a local TwinCAT
//! installation on the client machine.
//!
//! This crate is composed of the following sub-crates:
//!
//! - [`core`] - Protocol primitives, serialization, and frame I/O
//! - [`client`] - High-level connection, symbol resolution, and notification
//!   handling for talking to a running TwinCAT device.

pub use tcads_client as client;
pub use tcads_core as core;
