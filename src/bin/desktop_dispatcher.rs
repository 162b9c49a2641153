//! Desktop dispatcher: type commands on stdin, optionally serve them over
//! HTTP and MQTT as well.
//!
//! Motor calls are logged instead of driving hardware, so the whole command
//! flow can be exercised on a laptop.
//!
//! # Usage
//!
//! Console only:
//! ```sh
//! cargo run --bin desktop_dispatcher --features console
//! ```
//!
//! Console + web server + MQTT:
//! ```sh
//! RUST_LOG=info cargo run --bin desktop_dispatcher --features console,web,mqtt
//! ```
//!
//! Each line read from stdin is submitted as a raw command and answered with
//! its status code. `quit` or end of input stops the rover and exits.
//!
//! # Configuration
//!
//! Edit the `Config::default()` call in `main()` to customize settings:
//!
//! ```ignore
//! let config = Config::default()
//!     .with_dispatcher(DispatcherConfig::default().with_default_speed(40))
//!     .with_mqtt(MqttConfig::default().with_host("192.168.1.100"))
//!     .with_web(WebConfig::default().with_port(3000));
//! ```

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rover_dispatch::hal::{LogActuator, SystemClock};
use rover_dispatch::services::SharedDispatcher;
use rover_dispatch::{Config, Dispatcher, TickOutcome};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::default();

    let dispatcher = Dispatcher::from_config(
        LogActuator::new(config.device.name.as_str()),
        &config.dispatcher,
    );
    let state = Arc::new(SharedDispatcher::with_clock(dispatcher, SystemClock::new()));
    let running = Arc::new(AtomicBool::new(true));

    tracing::info!(
        device = config.device.id.as_str(),
        default_speed = config.dispatcher.default_speed,
        default_duration_s = config.dispatcher.default_duration_s,
        "dispatcher started"
    );

    let ticker = spawn_tick_loop(
        Arc::clone(&state),
        Arc::clone(&running),
        u64::from(config.dispatcher.tick_interval_ms),
    );

    #[cfg(any(feature = "web", feature = "mqtt"))]
    spawn_network(Arc::clone(&state), &config)?;

    run_console(&state)?;

    running.store(false, Ordering::Relaxed);
    if ticker.join().is_err() {
        tracing::warn!("tick loop panicked");
    }
    state.reset();
    tracing::info!("dispatcher stopped");
    Ok(())
}

/// Read commands line by line until `quit` or end of input.
fn run_console(state: &SharedDispatcher<LogActuator>) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let raw = line.trim();
        match raw {
            "" => continue,
            "quit" | "exit" => break,
            "state" => println!("{:?}", state.state()),
            _ => {
                let status = state.submit(raw);
                println!("{} ({})", status.code(), status.as_str());
            }
        }
    }
    Ok(())
}

/// Spawn the single tick loop shared by every front-end.
fn spawn_tick_loop(
    state: Arc<SharedDispatcher<LogActuator>>,
    running: Arc<AtomicBool>,
    interval_ms: u64,
) -> thread::JoinHandle<()> {
    let interval = Duration::from_millis(interval_ms.max(1));
    thread::spawn(move || {
        while running.load(Ordering::Relaxed) {
            match state.tick() {
                Ok(TickOutcome::Advanced) => tracing::debug!("advanced to next command"),
                Ok(TickOutcome::Completed) => tracing::info!("queue drained, rover idle"),
                Ok(_) => {}
                Err(never) => match never {},
            }
            thread::sleep(interval);
        }
    })
}

/// Run the enabled network services on their own tokio runtime.
#[cfg(any(feature = "web", feature = "mqtt"))]
fn spawn_network(state: Arc<SharedDispatcher<LogActuator>>, config: &Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    #[cfg(feature = "web")]
    {
        if config.web.enabled {
            let web_config = rover_dispatch::services::WebServerConfig::from_config(&config.web);
            let state = Arc::clone(&state);
            runtime.spawn(async move {
                if let Err(err) =
                    rover_dispatch::services::run_server_with_state(state, web_config).await
                {
                    tracing::error!(%err, "web server stopped");
                }
            });
        }
    }

    #[cfg(feature = "mqtt")]
    {
        if config.mqtt.enabled {
            let mqtt_config =
                rover_dispatch::services::MqttRuntimeConfig::from_config(&config.mqtt);
            let handler = rover_dispatch::services::MqttHandler::with_shared_state(
                Arc::clone(&state),
                mqtt_config,
            );
            runtime.spawn(async move {
                if let Err(err) = handler.run().await {
                    tracing::error!(%err, "MQTT handler stopped");
                }
            });
        }
    }

    // The runtime lives until the process exits
    thread::spawn(move || runtime.block_on(std::future::pending::<()>()));
    Ok(())
}
