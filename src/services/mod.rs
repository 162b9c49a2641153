//! Host services: shared state, HTTP API and MQTT integration.
//!
//! This module provides optional network connectivity for the dispatcher:
//! - `web` feature: Axum-based HTTP API server with JSON endpoints
//! - `mqtt` feature: MQTT client for pub/sub messaging
//!
//! Every transport talks to the core [`Dispatcher`](crate::Dispatcher)
//! through one `SharedDispatcher<A>` wrapped in `Arc`, so submissions from
//! the console, HTTP and MQTT are serialized against the tick loop.
//!
//! # Shared State Pattern
//!
//! ```ignore
//! use std::sync::Arc;
//! use rover_dispatch::services::SharedDispatcher;
//!
//! // Create single shared state
//! let state = Arc::new(SharedDispatcher::new(dispatcher));
//!
//! // Web and MQTT both use the same state
//! let web_router = build_router(Arc::clone(&state), &web_config);
//! let mqtt_handler = MqttHandler::with_shared_state(Arc::clone(&state), mqtt_config);
//! ```

pub mod shared;

// API types are shared between web and mqtt
#[cfg(any(feature = "web", feature = "mqtt"))]
pub mod api;

#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Sync MQTT runner for any `MqttClient`
#[cfg(any(feature = "web", feature = "mqtt"))]
pub mod mqtt_runner;

// Re-exports
pub use shared::*;

#[cfg(any(feature = "web", feature = "mqtt"))]
pub use api::*;

#[cfg(feature = "web")]
pub use web::*;

#[cfg(feature = "mqtt")]
pub use mqtt::*;

#[cfg(any(feature = "web", feature = "mqtt"))]
pub use mqtt_runner::*;
