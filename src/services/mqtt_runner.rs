//! MQTT service runner for sync polling loops.
//!
//! Provides a transport-agnostic MQTT handler that works with any
//! implementation of the `MqttClient` trait.
//!
//! # Example
//!
//! ```ignore
//! use rover_dispatch::services::{MqttServiceRunner, SharedDispatcher};
//!
//! let state = Arc::new(SharedDispatcher::new(dispatcher));
//! let mut runner = MqttServiceRunner::new(state, mqtt_client, config);
//! runner.subscribe_control_topics()?;
//!
//! // In main loop:
//! runner.poll()?;                    // Submit incoming commands
//! runner.publish_if_changed()?;      // Publish state changes
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::MqttConfig;
use crate::traits::{Actuator, MqttClient, MqttMessage};
use crate::{DispatcherState, SubmitStatus};

use super::api::state_to_json;
use super::shared::{ChangeDetection, SharedDispatcher};

// ============================================================================
// MQTT Service Runner
// ============================================================================

/// Sync MQTT service runner.
///
/// Wraps any `MqttClient` implementation and provides:
/// - Command polling, answering each command with its status code
/// - State change publishing
/// - Heartbeat publishing
pub struct MqttServiceRunner<A, C>
where
    A: Actuator,
    C: MqttClient,
{
    state: Arc<SharedDispatcher<A>>,
    client: C,
    config: MqttConfig,
    published: ChangeDetection,
}

impl<A, C> MqttServiceRunner<A, C>
where
    A: Actuator,
    A::Error: Debug,
    C: MqttClient,
{
    /// Create a new MQTT service runner.
    pub fn new(state: Arc<SharedDispatcher<A>>, client: C, config: MqttConfig) -> Self {
        Self {
            state,
            client,
            config,
            published: ChangeDetection::default(),
        }
    }

    /// Get a reference to the MQTT client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Get a mutable reference to the MQTT client.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Poll for incoming MQTT messages and submit commands.
    ///
    /// Processes every pending message. Each one on the command topic is
    /// submitted and its status code published to `<prefix>/status`.
    /// Returns the number of commands submitted.
    pub fn poll(&mut self) -> Result<usize, C::Error> {
        let mut handled = 0;
        while let Some(msg) = self.client.try_recv() {
            if let Some(status) = self.handle_message(&msg) {
                let topic = self.topic("status");
                self.client
                    .publish(&topic, status.code().to_string().as_bytes(), false)?;
                handled += 1;
            }
        }
        Ok(handled)
    }

    /// Publish current state if it has changed since last publish.
    ///
    /// Returns `true` if state was published, `false` if unchanged.
    pub fn publish_if_changed(&mut self) -> Result<bool, C::Error> {
        let current = self.state.state();
        let mut detection = self.published.clone();
        if detection.update(&current) {
            self.publish_state_internal(&current)?;
            self.published = detection;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Force publish current state (for heartbeat).
    pub fn publish_state(&mut self) -> Result<(), C::Error> {
        let current = self.state.state();
        self.publish_state_internal(&current)?;
        self.published.update(&current);
        Ok(())
    }

    fn publish_state_internal(&mut self, state: &DispatcherState) -> Result<(), C::Error> {
        let json = state_to_json(state);
        let state_topic = self.topic("state");
        self.client.publish(&state_topic, json.as_bytes(), false)?;

        // Retained so late subscribers see whether the rover is moving
        let driving = if state.driving { "true" } else { "false" };
        let driving_topic = self.topic("driving");
        self.client
            .publish(&driving_topic, driving.as_bytes(), true)?;

        Ok(())
    }

    /// Subscribe to control topics.
    pub fn subscribe_control_topics(&mut self) -> Result<(), C::Error> {
        let topic = self.topic("command");
        self.client.subscribe(&topic)
    }

    /// Build a full topic path.
    fn topic(&self, suffix: &str) -> String {
        format!("{}/{}", self.config.topic_prefix, suffix)
    }

    fn handle_message(&self, msg: &MqttMessage) -> Option<SubmitStatus> {
        let prefix = self.config.topic_prefix.as_str();
        let suffix = msg.topic.strip_prefix(prefix)?.strip_prefix('/')?;
        if suffix != "command" {
            return None;
        }
        Some(match msg.payload_str() {
            Some(raw) => self.state.submit(raw),
            None => {
                tracing::warn!(topic = %msg.topic, "non UTF-8 command payload");
                SubmitStatus::BadCommand
            }
        })
    }
}
