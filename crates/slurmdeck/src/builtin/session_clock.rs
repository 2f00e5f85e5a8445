// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `session-clock`: publishes how long the dashboard session has been up.
//!
//! A data provider with one feed, `uptime`. While running, a background task
//! pushes the current uptime to every subscriber once per `tick_secs`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use slurmdeck_core::types::{DataFeedInfo, SubscriptionId};
use slurmdeck_core::{
    ConfigField, ConfigSchema, Configurable, DataCallback, DataProvider, FieldType, HealthStatus,
    LifecycleAware, Plugin, PluginConfig, PluginContext, PluginInfo, SlurmdeckError,
    ValidationRule,
};

pub const NAME: &str = "session-clock";
pub const UPTIME_FEED: &str = "uptime";

#[derive(Debug, Clone, PartialEq)]
struct ClockSettings {
    tick: Duration,
    label: String,
}

impl ClockSettings {
    fn from_config(config: &PluginConfig) -> Self {
        let config = schema().apply_defaults(config);
        Self {
            tick: Duration::from_secs(
                config
                    .get("tick_secs")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(1)
                    .max(1),
            ),
            label: config
                .get("label")
                .and_then(|v| v.as_str())
                .unwrap_or(UPTIME_FEED)
                .to_string(),
        }
    }

    fn to_config(&self) -> PluginConfig {
        PluginConfig::from([
            ("tick_secs".to_string(), json!(self.tick.as_secs())),
            ("label".to_string(), json!(self.label)),
        ])
    }
}

fn schema() -> ConfigSchema {
    ConfigSchema::new()
        .field(
            "tick_secs",
            ConfigField::new(FieldType::Int, "seconds between uptime updates")
                .with_default(json!(1))
                .with_rule(ValidationRule::Range {
                    min: 1.0,
                    max: 3600.0,
                }),
        )
        .field(
            "label",
            ConfigField::new(FieldType::String, "label attached to each update")
                .with_default(json!(UPTIME_FEED))
                .with_rule(ValidationRule::NonEmpty),
        )
}

fn uptime_payload(started: Instant, label: &str) -> serde_json::Value {
    json!({
        "label": label,
        "uptime_secs": started.elapsed().as_secs(),
    })
}

type Subscribers = DashMap<u64, (String, DataCallback)>;

/// Session uptime data provider.
pub struct SessionClock {
    settings: Mutex<ClockSettings>,
    started: Mutex<Option<Instant>>,
    /// Cancels the running publisher task.
    publisher: Mutex<Option<CancellationToken>>,
    subscribers: Arc<Subscribers>,
    next_subscription: AtomicU64,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            settings: Mutex::new(ClockSettings::from_config(&PluginConfig::new())),
            started: Mutex::new(None),
            publisher: Mutex::new(None),
            subscribers: Arc::new(DashMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Time since the last successful `start`, or `None` while stopped.
    pub fn uptime(&self) -> Option<Duration> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|started| started.elapsed())
    }

    fn settings(&self) -> ClockSettings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn spawn_publisher(&self, ctx: &PluginContext, started: Instant) {
        let token = ctx.token().child_token();
        let settings = self.settings();
        let subscribers = Arc::clone(&self.subscribers);
        let task_token = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(settings.tick);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let payload = uptime_payload(started, &settings.label);
                        let callbacks: Vec<(String, DataCallback)> =
                            subscribers.iter().map(|e| e.value().clone()).collect();
                        for (feed, callback) in callbacks {
                            callback(&feed, &payload);
                        }
                    }
                }
            }
            debug!(plugin = NAME, "uptime publisher exited");
        });

        let previous = self
            .publisher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn stop_publisher(&self) {
        if let Some(token) = self
            .publisher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

#[async_trait]
impl Plugin for SessionClock {
    fn info(&self) -> PluginInfo {
        PluginInfo::new(NAME, semver::Version::new(0, 1, 0))
            .with_description("Publishes dashboard session uptime")
            .with_author("Slurmdeck Contributors")
            .with_license("MIT OR Apache-2.0")
            .with_provides(["data:uptime"])
            .with_config_schema(schema())
    }

    async fn init(&self, _ctx: &PluginContext, config: &PluginConfig) -> Result<(), SlurmdeckError> {
        schema().validate(config)?;
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) =
            ClockSettings::from_config(config);
        Ok(())
    }

    async fn start(&self, ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        let started = Instant::now();
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(started);
        self.spawn_publisher(ctx, started);
        Ok(())
    }

    async fn stop(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        self.stop_publisher();
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, SlurmdeckError> {
        Ok(match self.uptime() {
            Some(uptime) => HealthStatus::healthy("clock running")
                .with_detail("uptime_secs", json!(uptime.as_secs()))
                .with_detail("subscribers", json!(self.subscribers.len())),
            None => HealthStatus::unhealthy("clock not started"),
        })
    }

    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        Some(self)
    }

    fn as_lifecycle_aware(&self) -> Option<&dyn LifecycleAware> {
        Some(self)
    }
}

#[async_trait]
impl DataProvider for SessionClock {
    fn data_feeds(&self) -> Vec<DataFeedInfo> {
        vec![DataFeedInfo {
            id: UPTIME_FEED.to_string(),
            name: "Session uptime".to_string(),
            description: "Seconds since the session clock started".to_string(),
            refresh_interval: Some(self.settings().tick),
        }]
    }

    async fn query(
        &self,
        feed: &str,
        _params: &PluginConfig,
    ) -> Result<serde_json::Value, SlurmdeckError> {
        if feed != UPTIME_FEED {
            return Err(SlurmdeckError::plugin(format!("unknown feed `{feed}`")));
        }
        let started = (*self.started.lock().unwrap_or_else(PoisonError::into_inner))
            .ok_or_else(|| SlurmdeckError::plugin("session clock is not running"))?;
        Ok(uptime_payload(started, &self.settings().label))
    }

    fn subscribe(
        &self,
        feed: &str,
        callback: DataCallback,
    ) -> Result<SubscriptionId, SlurmdeckError> {
        if feed != UPTIME_FEED {
            return Err(SlurmdeckError::plugin(format!("unknown feed `{feed}`")));
        }
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, (feed.to_string(), callback));
        Ok(SubscriptionId(id))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SlurmdeckError> {
        self.subscribers
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| SlurmdeckError::plugin(format!("no subscription {}", id.0)))
    }
}

impl Configurable for SessionClock {
    fn get_config(&self) -> PluginConfig {
        self.settings().to_config()
    }

    fn set_config(&self, config: &PluginConfig) -> Result<(), SlurmdeckError> {
        schema().validate(config)?;
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) =
            ClockSettings::from_config(config);
        Ok(())
    }

    fn validate_config(&self, config: &PluginConfig) -> Result<(), SlurmdeckError> {
        schema().validate(config)
    }
}

#[async_trait]
impl LifecycleAware for SessionClock {
    async fn on_enable(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        debug!(plugin = NAME, "session clock enabled");
        Ok(())
    }

    async fn on_disable(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        debug!(plugin = NAME, subscribers = self.subscribers.len(), "session clock disabled");
        Ok(())
    }

    /// Restarts the publisher so a new `tick_secs` takes effect immediately.
    async fn on_config_change(
        &self,
        ctx: &PluginContext,
        old: &PluginConfig,
        new: &PluginConfig,
    ) -> Result<(), SlurmdeckError> {
        let (old, new) = (ClockSettings::from_config(old), ClockSettings::from_config(new));
        let started = *self.started.lock().unwrap_or_else(PoisonError::into_inner);
        if old.tick != new.tick
            && let Some(started) = started
        {
            self.spawn_publisher(ctx, started);
            info!(plugin = NAME, tick_secs = new.tick.as_secs(), "uptime publisher retimed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn config(tick: serde_json::Value) -> PluginConfig {
        PluginConfig::from([("tick_secs".to_string(), tick)])
    }

    #[tokio::test]
    async fn init_rejects_bad_tick() {
        let clock = SessionClock::new();
        let ctx = PluginContext::background();
        assert!(clock.init(&ctx, &config(json!(0))).await.is_err());
        assert!(clock.init(&ctx, &config(json!("fast"))).await.is_err());
        assert!(clock.init(&ctx, &config(json!(5))).await.is_ok());
        assert_eq!(clock.get_config().get("tick_secs"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn health_follows_start_and_stop() {
        let clock = SessionClock::new();
        let ctx = PluginContext::background();
        assert!(!clock.health().await.unwrap().healthy);

        clock.start(&ctx).await.unwrap();
        let health = clock.health().await.unwrap();
        assert!(health.healthy);
        assert!(health.details.contains_key("uptime_secs"));

        clock.stop(&ctx).await.unwrap();
        assert!(clock.uptime().is_none());
        assert!(clock.query(UPTIME_FEED, &PluginConfig::new()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_receive_ticks() {
        let clock = SessionClock::new();
        let ctx = PluginContext::background();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let callback: DataCallback = Arc::new(move |feed: &str, payload: &serde_json::Value| {
            assert_eq!(feed, UPTIME_FEED);
            assert!(payload.get("uptime_secs").is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let id = clock.subscribe(UPTIME_FEED, callback).unwrap();

        clock.start(&ctx).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(seen.load(Ordering::SeqCst) >= 2);

        clock.unsubscribe(id).unwrap();
        assert!(clock.unsubscribe(id).is_err());
        clock.stop(&ctx).await.unwrap();
    }

    #[test]
    fn unknown_feed_is_rejected() {
        let clock = SessionClock::new();
        let noop: DataCallback = Arc::new(|_: &str, _: &serde_json::Value| {});
        assert!(clock.subscribe("load", noop).is_err());
        assert_eq!(clock.data_feeds()[0].id, UPTIME_FEED);
    }
}
