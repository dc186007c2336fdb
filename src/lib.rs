//! gluetun-webui - Dashboard and control proxy for Gluetun VPN containers
//!
//! This library provides the HTTP proxy in front of up to two Gluetun
//! control APIs, the embedded browser UI, and the polling client used by
//! the terminal commands.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod upstream;
