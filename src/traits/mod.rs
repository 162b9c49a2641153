//! Trait definitions for hardware abstraction and networking.
//!
//! This module defines the seams that allow rover-dispatch to:
//! - Run against different motor drivers (hardware shield, desktop logger, mock)
//! - Take commands from different transports
//!
//! # Submodules
//!
//! - `hardware`: Per-side motor actuator and clock
//! - `network`: MQTT client trait
//!
//! # Hardware Abstraction
//!
//! - [`Actuator`]: `drive(side, direction, speed)` / `stop(side)`
//! - [`Clock`]: Time source for `no_std` environments

pub mod hardware;
pub mod network;

pub use hardware::*;
pub use network::*;
