//! # rdpview-client
//!
//! Headless viewer around `rdpview-core`: configuration loading and
//! framebuffer snapshots. The `rdpview` binary wires them to a TCP link.

pub mod config;
pub mod snapshot;
