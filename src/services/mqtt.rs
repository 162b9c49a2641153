//! MQTT client handler for the dispatcher.
//!
//! Subscribes to the command topic and publishes results and state:
//!
//! **Subscribe Topics:**
//! - `rover/command` - Raw command string, e.g. `forward-2-50`, `!stop`, `*x`
//!
//! **Publish Topics:**
//! - `rover/status` - Integer status code for each command received
//! - `rover/state` - Full state JSON (on change + heartbeat)
//!
//! State changes are picked up from every source: MQTT commands publish at
//! once, while tick expiry and web or console submissions are noticed by a
//! watcher polling every `change_poll_ms`.
//!
//! The event loop only `try_send`s into the bounded outbound channel. When
//! it is full the message is dropped and logged.
//!
//! # Shared State
//!
//! Use `MqttHandler::with_shared_state()` to share the dispatcher with the
//! tick loop and the web server:
//!
//! ```ignore
//! let state = Arc::new(SharedDispatcher::new(dispatcher));
//! let handler = MqttHandler::with_shared_state(Arc::clone(&state), mqtt_config);
//! ```

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;

use crate::config::MqttConfig as SharedMqttConfig;
use crate::traits::{Actuator, Clock};
use crate::{Dispatcher, DispatcherState, SubmitStatus};

use super::api::StateResponse;
use super::shared::SharedDispatcher;

// ============================================================================
// Configuration
// ============================================================================

/// How often the change watcher compares dispatcher state.
pub const DEFAULT_CHANGE_POLL_MS: u64 = 100;

/// Outbound channel depth between the event loop and the publisher task.
const OUTBOUND_CAPACITY: usize = 32;

/// Runtime MQTT client configuration for `rumqttc`.
///
/// This struct uses `String` for runtime compatibility with the `rumqttc` library.
/// For no-alloc contexts, use [`crate::config::MqttConfig`] which uses
/// fixed-size `ShortString` types and convert with [`MqttRuntimeConfig::from_config`].
#[derive(Debug, Clone)]
pub struct MqttRuntimeConfig {
    /// MQTT broker hostname
    pub host: String,
    /// MQTT broker port
    pub port: u16,
    /// Client ID
    pub client_id: String,
    /// Topic prefix (default: "rover")
    pub topic_prefix: String,
    /// Heartbeat interval in milliseconds
    pub heartbeat_ms: u64,
    /// State change poll interval in milliseconds
    pub change_poll_ms: u64,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
    /// Broker credentials, if any
    pub credentials: Option<(String, String)>,
}

impl Default for MqttRuntimeConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "rover-dispatch".to_string(),
            topic_prefix: "rover".to_string(),
            heartbeat_ms: 5000,
            change_poll_ms: DEFAULT_CHANGE_POLL_MS,
            keep_alive_secs: 30,
            credentials: None,
        }
    }
}

impl MqttRuntimeConfig {
    /// Create a new config with the given broker address
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Create from shared MqttConfig
    pub fn from_config(config: &SharedMqttConfig) -> Self {
        Self {
            host: config.host.as_str().to_string(),
            port: config.port,
            client_id: config.client_id.as_str().to_string(),
            topic_prefix: config.topic_prefix.as_str().to_string(),
            heartbeat_ms: u64::from(config.heartbeat_ms),
            change_poll_ms: DEFAULT_CHANGE_POLL_MS,
            keep_alive_secs: config.keep_alive_secs,
            credentials: config.has_auth().then(|| {
                (
                    config.username.as_str().to_string(),
                    config.password.as_str().to_string(),
                )
            }),
        }
    }

    /// Set the client ID
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = id.into();
        self
    }

    /// Set the topic prefix
    pub fn topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    /// Set the heartbeat interval
    pub fn heartbeat_ms(mut self, ms: u64) -> Self {
        self.heartbeat_ms = ms;
        self
    }

    /// Set the state change poll interval
    pub fn change_poll_ms(mut self, ms: u64) -> Self {
        self.change_poll_ms = ms;
        self
    }

    fn topic(&self, suffix: &str) -> String {
        format!("{}/{}", self.topic_prefix, suffix)
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        if let Some((username, password)) = &self.credentials {
            options.set_credentials(username, password);
        }
        options
    }
}

// ============================================================================
// MQTT Handler
// ============================================================================

/// Outbound messages queued for the publisher task.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outbound {
    Status(i8),
    State(String),
}

/// MQTT handler that bridges MQTT messages to the dispatcher
pub struct MqttHandler<A: Actuator + Send + 'static> {
    state: Arc<SharedDispatcher<A>>,
    config: MqttRuntimeConfig,
}

impl<A> MqttHandler<A>
where
    A: Actuator + Send + 'static,
    A::Error: Debug,
{
    /// Create a new MQTT handler with its own state.
    ///
    /// Nothing ticks a dispatcher created this way; use `with_shared_state()`
    /// and drive `tick()` from the host loop.
    pub fn new(dispatcher: Dispatcher<A>, config: MqttRuntimeConfig) -> Self {
        Self {
            state: Arc::new(SharedDispatcher::new(dispatcher)),
            config,
        }
    }

    /// Create a new MQTT handler with shared state.
    pub fn with_shared_state(state: Arc<SharedDispatcher<A>>, config: MqttRuntimeConfig) -> Self {
        Self { state, config }
    }

    /// Get a reference to the shared state.
    pub fn state(&self) -> Arc<SharedDispatcher<A>> {
        Arc::clone(&self.state)
    }

    /// Run the MQTT handler
    ///
    /// This function blocks and handles MQTT messages until shutdown.
    pub async fn run(self) -> Result<(), MqttError> {
        let (client, mut eventloop) = AsyncClient::new(self.config.options(), 10);

        let command_topic = self.config.topic("command");
        client
            .subscribe(&command_topic, QoS::AtLeastOnce)
            .await
            .map_err(|e| MqttError::Subscribe(e.to_string()))?;

        tracing::info!(
            host = %self.config.host,
            port = self.config.port,
            topic = %command_topic,
            "MQTT subscribed"
        );

        let (tx, mut rx) = mpsc::channel::<Outbound>(OUTBOUND_CAPACITY);

        // Heartbeat task
        let heartbeat_tx = tx.clone();
        let heartbeat_interval = self.config.heartbeat_ms.max(1);
        let state_for_heartbeat = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(heartbeat_interval));
            loop {
                interval.tick().await;
                let json = state_json(&state_for_heartbeat, &state_for_heartbeat.state());
                if heartbeat_tx.send(Outbound::State(json)).await.is_err() {
                    break;
                }
            }
        });

        // Change watcher task
        let watcher_tx = tx.clone();
        let watch_interval = self.config.change_poll_ms.max(1);
        let state_for_watcher = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(watch_interval));
            while !watcher_tx.is_closed() {
                interval.tick().await;
                publish_changes(&state_for_watcher, &watcher_tx);
            }
        });

        // Publisher task
        let client_for_publish = client.clone();
        let config_for_publish = self.config.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let (topic, payload) = match message {
                    Outbound::Status(code) => {
                        (config_for_publish.topic("status"), code.to_string())
                    }
                    Outbound::State(json) => (config_for_publish.topic("state"), json),
                };
                if let Err(err) = client_for_publish
                    .publish(&topic, QoS::AtLeastOnce, false, payload.into_bytes())
                    .await
                {
                    tracing::warn!(%topic, %err, "MQTT publish failed");
                }
            }
        });

        // Main event loop
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.handle_message(&publish.topic, &publish.payload, &tx);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "MQTT connection error, retrying in 5s");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    fn handle_message(&self, topic: &str, payload: &[u8], tx: &mpsc::Sender<Outbound>) {
        let Some(suffix) = topic
            .strip_prefix(self.config.topic_prefix.as_str())
            .and_then(|s| s.strip_prefix('/'))
        else {
            return;
        };
        if suffix != "command" {
            return;
        }

        let status = match std::str::from_utf8(payload) {
            Ok(raw) => self.state.submit(raw),
            Err(_) => {
                tracing::warn!(topic, "non UTF-8 command payload");
                SubmitStatus::BadCommand
            }
        };

        offer(tx, Outbound::Status(status.code()));
        publish_changes(&self.state, tx);
    }
}

/// Queue the state for publishing if it changed since the last check.
fn publish_changes<A, C>(shared: &SharedDispatcher<A, C>, tx: &mpsc::Sender<Outbound>)
where
    A: Actuator,
    A::Error: Debug,
    C: Clock,
{
    if let Some(state) = shared.check_changes() {
        offer(tx, Outbound::State(state_json(shared, &state)));
    }
}

/// Hand a message to the publisher task without waiting for room.
fn offer(tx: &mpsc::Sender<Outbound>, message: Outbound) {
    match tx.try_send(message) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            tracing::warn!(?dropped, "MQTT outbound queue full, dropping message");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!("MQTT publisher gone");
        }
    }
}

fn state_json<A, C>(shared: &SharedDispatcher<A, C>, state: &DispatcherState) -> String
where
    A: Actuator,
    A::Error: Debug,
    C: Clock,
{
    serde_json::to_string(&StateResponse::new(state, shared.pending())).unwrap_or_default()
}

/// MQTT-related errors
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// Failed to subscribe to topic
    #[error("MQTT subscribe error: {0}")]
    Subscribe(String),
}
