//! # rover-dispatch
//!
//! A remote command dispatcher for a two-motor wheeled rover. Short text
//! commands such as `forward-2-50` arrive from a network transport, are
//! queued or run at once, and are turned into per-side motor commands with
//! a duration timer.
//!
//! ## Features
//!
//! - **Hardware abstraction**: A per-side [`Actuator`] trait, with mocks for testing
//! - **Command grammar**: `<direction>[-<duration>[-<speed>]]` plus `!` (run now) and `*` (admin)
//! - **Bounded queue**: Fixed 20-slot ring buffer, no allocator required
//! - **Cooperative timing**: The host calls [`Dispatcher::tick`]; nothing blocks
//! - **Transports**: HTTP (`web` feature) and MQTT (`mqtt` feature) front-ends
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and network abstractions
//! - `commands` - Directive, admin and status types
//! - `parsing` - Raw string classification and directive parsing
//! - `queue` - Circular command queue
//! - `executor` - Applies a directive to the motors
//! - `dispatcher` - State machine that ties everything together
//! - `hal` - Concrete implementations (mock for testing, logging actuator for desktop)
//!
//! ## Example
//!
//! ```rust
//! use rover_dispatch::{Dispatcher, SubmitStatus, TickOutcome};
//! use rover_dispatch::hal::MockActuator;
//!
//! let mut dispatcher: Dispatcher<MockActuator> = Dispatcher::new(MockActuator::new());
//!
//! // Idle: runs straight away
//! assert_eq!(dispatcher.submit("forward-1-50", 0).unwrap(), SubmitStatus::Ran);
//! // Running: waits its turn
//! assert_eq!(dispatcher.submit("left", 0).unwrap(), SubmitStatus::Queued);
//! // Preempts without touching the queue
//! assert_eq!(dispatcher.submit("!stop", 10).unwrap(), SubmitStatus::Ran);
//! assert_eq!(dispatcher.queue_len(), 1);
//!
//! // Update in your main loop
//! assert_eq!(dispatcher.tick(1010).unwrap(), TickOutcome::Advanced);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Directive, admin command and status code types.
pub mod commands;
/// Shared configuration for the dispatcher and its transports.
pub mod config;
/// Command scheduler state machine.
pub mod dispatcher;
/// Applies motion directives to the actuator.
pub mod executor;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Raw command classification and directive parsing.
pub mod parsing;
/// Fixed-capacity circular command queue.
pub mod queue;
/// Core traits for hardware and network abstraction.
pub mod traits;

/// Network services for HTTP API and MQTT (feature-gated).
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use commands::{AdminCommand, Direction, MotionDirective, SubmitStatus};
pub use dispatcher::{Dispatcher, DispatcherState, TickOutcome};
pub use executor::{DriveState, ExecutionOutcome};
pub use parsing::{CommandDefaults, ParseError, Submission};
pub use queue::{CommandQueue, QueueError, RawCommand};
pub use traits::{
    // Hardware
    Actuator,
    Clock,
    MotorDirection,
    MotorSide,
    // Network
    MqttClient,
    MqttMessage,
};

// Config re-exports
pub use config::{Config, DeviceConfig, DispatcherConfig, MqttConfig, WebConfig};
