//! Network abstraction traits for command transports.
//!
//! The dispatcher itself never touches the network. Transports deliver raw
//! command strings and carry the integer status code back. This module
//! defines the sync MQTT seam used by
//! [`MqttServiceRunner`](crate::services::MqttServiceRunner), so the same
//! polling logic runs against a real broker or [`MockMqtt`](crate::hal::MockMqtt).
//!
//! # MQTT Topics
//!
//! ```text
//! rover/command  - Raw command string, e.g. "forward-2-50" or "*x"
//! rover/status   - Status code of the last submission ("1", "2", "-2", ...)
//! rover/state    - Dispatcher state JSON (on change + heartbeat)
//! ```

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

/// MQTT client trait for pub/sub messaging.
///
/// This trait uses a **sync-first design** that works on embedded targets
/// (blocking I/O) and on desktop.
///
/// # Implementation Notes
///
/// - `publish` and `subscribe` are synchronous
/// - `try_recv` is non-blocking for polling patterns
/// - The client should handle reconnection internally
pub trait MqttClient {
    /// Error type for MQTT operations.
    type Error;

    /// Publish a message to a topic (blocking).
    ///
    /// # Arguments
    /// - `topic`: MQTT topic path
    /// - `payload`: Message bytes
    /// - `retain`: If true, broker keeps message for new subscribers
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;

    /// Subscribe to a topic (blocking).
    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;

    /// Try to receive the next message (non-blocking).
    ///
    /// Returns `None` if no message is available. This should never block.
    fn try_recv(&mut self) -> Option<MqttMessage>;

    /// Check if connected to broker.
    fn is_connected(&self) -> bool;
}

/// An MQTT message received from a subscription.
#[derive(Clone, Debug)]
pub struct MqttMessage {
    /// Topic the message was published to.
    pub topic: String,
    /// Message payload as raw bytes.
    pub payload: Vec<u8>,
}

impl MqttMessage {
    /// Create a new MQTT message.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Returns the payload as a UTF-8 string, if valid.
    pub fn payload_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_str_valid_utf8() {
        let msg = MqttMessage::new("rover/command", b"forward-2".to_vec());
        assert_eq!(msg.payload_str(), Some("forward-2"));
    }

    #[test]
    fn payload_str_invalid_utf8() {
        let msg = MqttMessage::new("rover/command", vec![0xff, 0xfe]);
        assert_eq!(msg.payload_str(), None);
    }
}
