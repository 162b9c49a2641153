//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `system`: `std` clock and a logging actuator for hosts without motors (requires `std`)

pub mod mock;

#[cfg(feature = "std")]
pub mod system;

pub use mock::*;

#[cfg(feature = "std")]
pub use system::*;
