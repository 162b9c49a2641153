//! Shared configuration for the dispatcher and its transports.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rover_dispatch::config::{Config, DispatcherConfig, MqttConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.dispatcher.default_speed, 25);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_dispatcher(DispatcherConfig::default().with_default_speed(40))
//!     .with_mqtt(MqttConfig::default().with_host("192.168.1.100"))
//!     .with_web(WebConfig::default().with_port(3000));
//! assert_eq!(config.dispatcher.defaults().speed, 40);
//! ```

use heapless::String as HString;

use crate::commands::{DEFAULT_DURATION_S, DEFAULT_SPEED, MAX_FIELD_VALUE};
use crate::parsing::CommandDefaults;

/// Maximum length for short config strings (hostnames, client IDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (topic prefixes, paths)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Take only what fits
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    let take = s.len().min(MAX_LONG_STRING);
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Command defaults and host loop timing
    pub dispatcher: DispatcherConfig,
    /// MQTT client configuration
    pub mqtt: MqttConfig,
    /// Web server configuration
    pub web: WebConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set dispatcher configuration
    pub fn with_dispatcher(mut self, dispatcher: DispatcherConfig) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Set MQTT configuration
    pub fn with_mqtt(mut self, mqtt: MqttConfig) -> Self {
        self.mqtt = mqtt;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Dispatcher Config
// ============================================================================

/// Dispatcher configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatcherConfig {
    /// Duration in seconds for commands that omit it
    pub default_duration_s: u8,
    /// Speed percentage for commands that omit it
    pub default_speed: u8,
    /// How often the host loop calls `tick`, in milliseconds
    pub tick_interval_ms: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_duration_s: DEFAULT_DURATION_S,
            default_speed: DEFAULT_SPEED,
            tick_interval_ms: 20,
        }
    }
}

impl DispatcherConfig {
    /// Set the default duration (clamped to 100)
    pub fn with_default_duration_s(mut self, seconds: u8) -> Self {
        self.default_duration_s = seconds.min(MAX_FIELD_VALUE);
        self
    }

    /// Set the default speed (clamped to 100)
    pub fn with_default_speed(mut self, speed: u8) -> Self {
        self.default_speed = speed.min(MAX_FIELD_VALUE);
        self
    }

    /// Set the tick interval
    pub fn with_tick_interval_ms(mut self, ms: u32) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Parser defaults derived from this configuration
    pub fn defaults(&self) -> CommandDefaults {
        CommandDefaults {
            duration_s: self.default_duration_s,
            speed: self.default_speed,
        }
    }
}

// ============================================================================
// MQTT Config
// ============================================================================

/// MQTT client configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MqttConfig {
    /// Broker hostname or IP
    pub host: ShortString,
    /// Broker port
    pub port: u16,
    /// Client ID (should be unique per device)
    pub client_id: ShortString,
    /// Topic prefix for all pub/sub (e.g., "rover" -> "rover/command")
    pub topic_prefix: ShortString,
    /// Username for authentication (empty = no auth)
    pub username: ShortString,
    /// Password for authentication
    pub password: ShortString,
    /// Heartbeat/state publish interval in milliseconds
    pub heartbeat_ms: u32,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
    /// Whether MQTT is enabled
    pub enabled: bool,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: short_string("localhost"),
            port: 1883,
            client_id: short_string("rover-dispatch"),
            topic_prefix: short_string("rover"),
            username: ShortString::new(),
            password: ShortString::new(),
            heartbeat_ms: 5000,
            keep_alive_secs: 30,
            enabled: true,
        }
    }
}

impl MqttConfig {
    /// Set the broker host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the broker port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Self {
        self.client_id = short_string(id);
        self
    }

    /// Set the topic prefix
    pub fn with_topic_prefix(mut self, prefix: &str) -> Self {
        self.topic_prefix = short_string(prefix);
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = short_string(username);
        self.password = short_string(password);
        self
    }

    /// Set the heartbeat interval
    pub fn with_heartbeat_ms(mut self, ms: u32) -> Self {
        self.heartbeat_ms = ms;
        self
    }

    /// Enable or disable MQTT
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build a topic string with the configured prefix
    pub fn topic(&self, suffix: &str) -> LongString {
        let mut topic = LongString::new();
        let _ = topic.push_str(self.topic_prefix.as_str());
        let _ = topic.push('/');
        let _ = topic.push_str(suffix);
        topic
    }

    /// Check if authentication is configured
    pub fn has_auth(&self) -> bool {
        !self.username.is_empty()
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Whether web server is enabled
    pub enabled: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: true,
            enabled: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Enable or disable web server
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Device ID (for fleets sharing one broker)
    pub id: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("rover"),
            id: short_string("rover1"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the device ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = short_string(id);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.dispatcher.default_duration_s, 1);
        assert_eq!(config.dispatcher.default_speed, 25);
        assert_eq!(config.dispatcher.tick_interval_ms, 20);
    }

    #[test]
    fn mqtt_topic_building() {
        let mqtt = MqttConfig::default().with_topic_prefix("fleet/rover7");
        let topic = mqtt.topic("command");
        assert_eq!(topic.as_str(), "fleet/rover7/command");
    }

    #[test]
    fn mqtt_default_topics() {
        let mqtt = MqttConfig::default();
        assert_eq!(mqtt.topic("command").as_str(), "rover/command");
        assert_eq!(mqtt.topic("status").as_str(), "rover/status");
    }

    #[test]
    fn mqtt_auth_detection() {
        let no_auth = MqttConfig::default();
        assert!(!no_auth.has_auth());

        let with_auth = MqttConfig::default().with_auth("user", "pass");
        assert!(with_auth.has_auth());
    }

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert!(s.len() <= MAX_SHORT_STRING);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_mqtt(
                MqttConfig::default()
                    .with_host("broker.local")
                    .with_port(8883),
            )
            .with_web(WebConfig::default().with_port(3000))
            .with_device(DeviceConfig::default().with_name("Desk Rover"));

        assert_eq!(config.mqtt.host.as_str(), "broker.local");
        assert_eq!(config.mqtt.port, 8883);
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.device.name.as_str(), "Desk Rover");
    }

    // =========================================================================
    // DispatcherConfig Tests
    // =========================================================================

    #[test]
    fn dispatcher_config_defaults_match_parser() {
        assert_eq!(
            DispatcherConfig::default().defaults(),
            CommandDefaults::default()
        );
    }

    #[test]
    fn dispatcher_config_builder() {
        let config = DispatcherConfig::default()
            .with_default_duration_s(3)
            .with_default_speed(60)
            .with_tick_interval_ms(50);

        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(
            config.defaults(),
            CommandDefaults {
                duration_s: 3,
                speed: 60
            }
        );
    }

    #[test]
    fn dispatcher_config_clamps_fields() {
        let config = DispatcherConfig::default()
            .with_default_duration_s(200)
            .with_default_speed(255);
        assert_eq!(config.default_duration_s, 100);
        assert_eq!(config.default_speed, 100);
    }

    // =========================================================================
    // DeviceConfig Tests
    // =========================================================================

    #[test]
    fn device_config_default() {
        let device = DeviceConfig::default();
        assert_eq!(device.name.as_str(), "rover");
        assert_eq!(device.id.as_str(), "rover1");
    }

    #[test]
    fn device_config_builder() {
        let device = DeviceConfig::default()
            .with_name("Porch Rover")
            .with_id("rover-42");

        assert_eq!(device.name.as_str(), "Porch Rover");
        assert_eq!(device.id.as_str(), "rover-42");
    }

    // =========================================================================
    // WebConfig Tests
    // =========================================================================

    #[test]
    fn web_config_default() {
        let web = WebConfig::default();
        assert_eq!(web.port, 8080);
        assert!(web.cors_permissive);
        assert!(web.enabled);
    }

    #[test]
    fn web_config_builder() {
        let web = WebConfig::default()
            .with_port(3000)
            .with_cors(false)
            .with_enabled(false);

        assert_eq!(web.port, 3000);
        assert!(!web.cors_permissive);
        assert!(!web.enabled);
    }

    // =========================================================================
    // MqttConfig Additional Tests
    // =========================================================================

    #[test]
    fn mqtt_config_default() {
        let mqtt = MqttConfig::default();
        assert_eq!(mqtt.host.as_str(), "localhost");
        assert_eq!(mqtt.port, 1883);
        assert_eq!(mqtt.client_id.as_str(), "rover-dispatch");
        assert_eq!(mqtt.topic_prefix.as_str(), "rover");
        assert!(mqtt.username.is_empty());
        assert!(mqtt.password.is_empty());
        assert_eq!(mqtt.heartbeat_ms, 5000);
        assert_eq!(mqtt.keep_alive_secs, 30);
        assert!(mqtt.enabled);
    }

    #[test]
    fn mqtt_config_full_builder() {
        let mqtt = MqttConfig::default()
            .with_host("broker.example.com")
            .with_port(8883)
            .with_client_id("my-rover")
            .with_topic_prefix("fleet/rover1")
            .with_auth("user", "pass")
            .with_heartbeat_ms(10000)
            .with_enabled(false);

        assert_eq!(mqtt.host.as_str(), "broker.example.com");
        assert_eq!(mqtt.port, 8883);
        assert_eq!(mqtt.client_id.as_str(), "my-rover");
        assert_eq!(mqtt.topic_prefix.as_str(), "fleet/rover1");
        assert_eq!(mqtt.username.as_str(), "user");
        assert_eq!(mqtt.password.as_str(), "pass");
        assert_eq!(mqtt.heartbeat_ms, 10000);
        assert!(!mqtt.enabled);
        assert!(mqtt.has_auth());
    }

    // =========================================================================
    // String Helper Tests
    // =========================================================================

    #[test]
    fn long_string_truncation() {
        let long_input = "b".repeat(200);
        let s = long_string(&long_input);
        assert!(s.len() <= MAX_LONG_STRING);
    }

    #[test]
    fn string_helpers_utf8_boundary() {
        // Each 'é' is 2 bytes; 40 of them overflow a ShortString
        let input = "é".repeat(40);
        let s = short_string(&input);
        assert!(s.len() <= MAX_SHORT_STRING);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());
    }
}
