// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin lifecycle manager.
//!
//! `PluginManager` owns the registry, the per-plugin runtime state and the
//! per-plugin configuration map behind a single `RwLock`. Every mutating
//! operation (register, enable, disable, reconfigure, health sweep, stop)
//! takes the write lock and runs to completion, plugin calls included, so
//! no plugin ever sees two lifecycle calls at once.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use slurmdeck_core::{
    HealthStatus, HookCallback, Plugin, PluginConfig, PluginContext, PluginInfo, PluginState,
    SlurmdeckError,
};

use crate::capability::{Capabilities, Capability};
use crate::ordering::dependency_order;
use crate::registry::{PluginRegistry, RegisteredPlugin};

/// Tunables for the health supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Delay between health sweeps.
    pub health_check_interval: Duration,
    /// Supervised restarts allowed before an unhealthy plugin is disabled.
    pub max_restarts: u32,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(30),
            max_restarts: 3,
        }
    }
}

/// Merged view of one registered plugin.
#[derive(Debug, Clone)]
pub struct PluginSummary {
    pub info: PluginInfo,
    pub state: PluginState,
    pub capabilities: Capabilities,
}

/// Plugin counts for status displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerSummary {
    pub registered: usize,
    pub enabled: usize,
    pub running: usize,
    /// Enabled plugins whose last health report was unhealthy.
    pub unhealthy: usize,
}

/// Outcome of [`PluginManager::enable_all`].
#[derive(Debug, Default)]
pub struct EnableReport {
    /// Plugins enabled by this call, in the order they were enabled.
    pub enabled: Vec<String>,
    pub failed: Vec<(String, SlurmdeckError)>,
}

impl EnableReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ManagerState {
    pub(crate) registry: PluginRegistry,
    pub(crate) states: HashMap<String, PluginState>,
    pub(crate) configs: HashMap<String, PluginConfig>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) state: RwLock<ManagerState>,
    /// Cancelled exactly once, by `stop`.
    pub(crate) lifetime: CancellationToken,
    pub(crate) options: ManagerOptions,
    pub(crate) supervisor: Mutex<Option<JoinHandle<()>>>,
}

/// Registers, enables, disables, reconfigures and supervises plugins.
///
/// Cheap to clone; clones share the same state. Independent managers never
/// share anything, so tests can run many side by side.
#[derive(Debug, Clone)]
pub struct PluginManager {
    pub(crate) shared: Arc<Shared>,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self::with_options(ManagerOptions::default())
    }

    pub fn with_options(options: ManagerOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(ManagerState::default()),
                lifetime: CancellationToken::new(),
                options,
                supervisor: Mutex::new(None),
            }),
        }
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.shared.options
    }

    /// True once [`stop`](Self::stop) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shared.lifetime.is_cancelled()
    }

    /// Context carrying the manager's lifetime token.
    pub(crate) fn lifetime_context(&self) -> PluginContext {
        PluginContext::new(self.shared.lifetime.clone())
    }

    /// Registers `plugin` and seeds its state as registered, not enabled.
    pub async fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<(), SlurmdeckError> {
        let mut guard = self.shared.state.write().await;
        let entry = guard.registry.register(plugin)?;
        guard
            .states
            .insert(entry.info.name.clone(), PluginState::registered());
        info!(
            plugin = %entry.info.name,
            version = %entry.info.version,
            capabilities = %entry.capabilities,
            "plugin registered"
        );
        Ok(())
    }

    /// Initializes and starts `name` with `config`.
    ///
    /// Every plugin named in its `requires` must already be running. On an
    /// `init` or `start` failure the plugin stays disabled and the error is
    /// kept in `last_error`; calling enable again re-runs `init`.
    pub async fn enable_plugin(
        &self,
        name: &str,
        config: PluginConfig,
    ) -> Result<(), SlurmdeckError> {
        let mut guard = self.shared.state.write().await;
        let st = &mut *guard;

        let entry = st.registry.get(name).ok_or_else(|| SlurmdeckError::NotFound {
            name: name.to_string(),
        })?;
        if st.states.get(name).is_some_and(|s| s.enabled) {
            return Err(SlurmdeckError::AlreadyEnabled {
                name: name.to_string(),
            });
        }
        for dependency in &entry.info.requires {
            if !st.states.get(dependency).is_some_and(|s| s.running) {
                return Err(SlurmdeckError::MissingDependency {
                    plugin: name.to_string(),
                    dependency: dependency.clone(),
                });
            }
        }

        st.configs.insert(name.to_string(), config.clone());
        let ctx = self.lifetime_context();

        if let Err(e) = entry.plugin.init(&ctx, &config).await {
            warn!(plugin = %name, error = %e, "plugin init failed");
            st.states.entry(name.to_string()).or_default().last_error = Some(e.to_string());
            return Err(SlurmdeckError::InitializationFailure {
                name: name.to_string(),
                source: Box::new(e),
            });
        }
        if let Err(e) = entry.plugin.start(&ctx).await {
            warn!(plugin = %name, error = %e, "plugin start failed");
            st.states.entry(name.to_string()).or_default().last_error = Some(e.to_string());
            return Err(SlurmdeckError::StartFailure {
                name: name.to_string(),
                source: Box::new(e),
            });
        }

        let health = probe_health(entry.plugin.as_ref()).await;
        let state = st.states.entry(name.to_string()).or_default();
        state.enabled = true;
        state.running = true;
        state.start_time = Some(Utc::now());
        state.health = health;
        info!(plugin = %name, healthy = state.health.healthy, "plugin enabled");

        if entry.capabilities.contains(Capability::LifecycleAware)
            && let Some(hooks) = entry.plugin.as_lifecycle_aware()
            && let Err(e) = hooks.on_enable(&ctx).await
        {
            log_hook_failure(name, "on_enable", e);
        }
        Ok(())
    }

    /// Stops `name` and marks it disabled.
    ///
    /// Refused while another enabled plugin requires it. Once that check
    /// passes the plugin always ends up disabled, even if its `stop` fails.
    pub async fn disable_plugin(&self, name: &str) -> Result<(), SlurmdeckError> {
        let mut guard = self.shared.state.write().await;
        let st = &mut *guard;

        let entry = st.registry.get(name).ok_or_else(|| SlurmdeckError::NotFound {
            name: name.to_string(),
        })?;
        if !st.states.get(name).is_some_and(|s| s.enabled) {
            return Err(SlurmdeckError::NotEnabled {
                name: name.to_string(),
            });
        }
        if let Some(dependent) = st.registry.list_sorted().into_iter().find(|other| {
            other.name() != name
                && other.info.depends_on(name)
                && st.states.get(other.name()).is_some_and(|s| s.enabled)
        }) {
            return Err(SlurmdeckError::DependencyInUse {
                plugin: name.to_string(),
                dependent: dependent.info.name,
            });
        }

        let ctx = self.lifetime_context();
        if entry.capabilities.contains(Capability::LifecycleAware)
            && let Some(hooks) = entry.plugin.as_lifecycle_aware()
            && let Err(e) = hooks.on_disable(&ctx).await
        {
            log_hook_failure(name, "on_disable", e);
        }

        let stop_result = entry.plugin.stop(&ctx).await;
        let state = st.states.entry(name.to_string()).or_default();
        if let Err(e) = stop_result {
            warn!(plugin = %name, error = %e, "plugin stop failed during disable");
            state.last_error = Some(e.to_string());
        }
        state.enabled = false;
        state.running = false;
        info!(plugin = %name, "plugin disabled");
        Ok(())
    }

    pub async fn get_plugin(&self, name: &str) -> Result<Arc<dyn Plugin>, SlurmdeckError> {
        let guard = self.shared.state.read().await;
        guard
            .registry
            .get(name)
            .map(|entry| entry.plugin)
            .ok_or_else(|| SlurmdeckError::NotFound {
                name: name.to_string(),
            })
    }

    pub async fn get_plugin_state(&self, name: &str) -> Result<PluginState, SlurmdeckError> {
        let guard = self.shared.state.read().await;
        guard
            .states
            .get(name)
            .cloned()
            .ok_or_else(|| SlurmdeckError::NotFound {
                name: name.to_string(),
            })
    }

    /// The configuration last stored for `name`, or `None` if nothing has
    /// been submitted yet.
    pub async fn get_plugin_config(
        &self,
        name: &str,
    ) -> Result<Option<PluginConfig>, SlurmdeckError> {
        let guard = self.shared.state.read().await;
        if !guard.registry.contains(name) {
            return Err(SlurmdeckError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(guard.configs.get(name).cloned())
    }

    /// Info, state and capabilities of every registered plugin, unordered.
    pub async fn list_plugins(&self) -> Vec<PluginSummary> {
        let guard = self.shared.state.read().await;
        guard
            .registry
            .list()
            .into_iter()
            .map(|entry| PluginSummary {
                state: guard.states.get(entry.name()).cloned().unwrap_or_default(),
                capabilities: entry.capabilities,
                info: entry.info,
            })
            .collect()
    }

    pub async fn summary(&self) -> ManagerSummary {
        let guard = self.shared.state.read().await;
        let mut summary = ManagerSummary {
            registered: guard.registry.len(),
            ..ManagerSummary::default()
        };
        for state in guard.states.values() {
            if state.enabled {
                summary.enabled += 1;
                if !state.health.healthy {
                    summary.unhealthy += 1;
                }
            }
            if state.running {
                summary.running += 1;
            }
        }
        summary
    }

    /// Running plugins that expose `capability`, sorted by name.
    pub async fn plugins_with(&self, capability: Capability) -> Vec<Arc<dyn Plugin>> {
        let guard = self.shared.state.read().await;
        guard
            .registry
            .list_sorted()
            .into_iter()
            .filter(|entry| {
                entry.capabilities.contains(capability)
                    && guard.states.get(entry.name()).is_some_and(|s| s.running)
            })
            .map(|entry| entry.plugin)
            .collect()
    }

    pub async fn get_view_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins_with(Capability::ViewProvider).await
    }

    pub async fn get_overlay_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins_with(Capability::OverlayProvider).await
    }

    /// Submits a new configuration for `name`.
    ///
    /// Configurable plugins validate and apply it; lifecycle-aware ones are
    /// then told about the change, and if that fails the previous config is
    /// re-applied and `ConfigApplyFailure` returned. On success the config is
    /// stored by the manager whether or not the plugin is configurable.
    pub async fn update_plugin_config(
        &self,
        name: &str,
        config: PluginConfig,
    ) -> Result<(), SlurmdeckError> {
        let mut guard = self.shared.state.write().await;
        let st = &mut *guard;

        let entry = st.registry.get(name).ok_or_else(|| SlurmdeckError::NotFound {
            name: name.to_string(),
        })?;

        if entry.capabilities.contains(Capability::Configurable)
            && let Some(configurable) = entry.plugin.as_configurable()
        {
            configurable.validate_config(&config).map_err(|e| {
                SlurmdeckError::ConfigValidationFailure {
                    name: name.to_string(),
                    source: Box::new(e),
                }
            })?;

            let previous = configurable.get_config();
            configurable.set_config(&config).map_err(|e| {
                SlurmdeckError::ConfigApplyFailure {
                    name: name.to_string(),
                    source: Box::new(e),
                }
            })?;

            if entry.capabilities.contains(Capability::LifecycleAware)
                && let Some(hooks) = entry.plugin.as_lifecycle_aware()
            {
                let ctx = self.lifetime_context();
                if let Err(e) = hooks.on_config_change(&ctx, &previous, &config).await {
                    warn!(plugin = %name, error = %e, "config change rejected; rolling back");
                    if let Err(rollback) = configurable.set_config(&previous) {
                        warn!(plugin = %name, error = %rollback, "config rollback failed");
                    }
                    return Err(SlurmdeckError::ConfigApplyFailure {
                        name: name.to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        st.configs.insert(name.to_string(), config);
        info!(plugin = %name, "plugin configuration updated");
        Ok(())
    }

    /// Registers `callback` for `hook` on a hookable plugin.
    pub async fn register_hook(
        &self,
        name: &str,
        hook: &str,
        callback: HookCallback,
    ) -> Result<(), SlurmdeckError> {
        let guard = self.shared.state.read().await;
        let entry = guard.registry.get(name).ok_or_else(|| SlurmdeckError::NotFound {
            name: name.to_string(),
        })?;
        let hookable = entry
            .capabilities
            .contains(Capability::Hookable)
            .then(|| entry.plugin.as_hookable())
            .flatten()
            .ok_or_else(|| SlurmdeckError::plugin(format!("plugin `{name}` exposes no hooks")))?;
        hookable.register_hook(hook, callback)?;
        debug!(plugin = %name, hook, "hook callback registered");
        Ok(())
    }

    /// Enables `names` in dependency order.
    ///
    /// Each plugin gets its entry from `configs` (or an empty config). A
    /// failure is recorded and the remaining plugins are still attempted;
    /// plugins caught in a dependency cycle are tried last and fail with
    /// `MissingDependency`.
    pub async fn enable_all<I, S>(
        &self,
        names: I,
        configs: &HashMap<String, PluginConfig>,
    ) -> EnableReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let requested: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| seen.insert(name.clone()))
            .collect();

        let mut report = EnableReport::default();
        let mut graph = Vec::with_capacity(requested.len());
        {
            let guard = self.shared.state.read().await;
            for name in requested {
                match guard.registry.get(&name) {
                    Some(entry) => graph.push((name, entry.info.requires)),
                    None => report.failed.push((name.clone(), SlurmdeckError::NotFound { name })),
                }
            }
        }

        let order = dependency_order(&graph);
        if !order.cyclic.is_empty() {
            warn!(plugins = ?order.cyclic, "dependency cycle among requested plugins");
        }
        for name in order.ordered.into_iter().chain(order.cyclic) {
            let config = configs.get(&name).cloned().unwrap_or_default();
            match self.enable_plugin(&name, config).await {
                Ok(()) => report.enabled.push(name),
                Err(e) => report.failed.push((name, e)),
            }
        }
        report
    }
}

/// Current health of `plugin`; a failing probe counts as unhealthy.
pub(crate) async fn probe_health(plugin: &dyn Plugin) -> HealthStatus {
    match plugin.health().await {
        Ok(status) => status,
        Err(e) => HealthStatus::unhealthy(e.to_string()),
    }
}

pub(crate) fn log_hook_failure(name: &str, hook: &'static str, error: SlurmdeckError) {
    let failure = SlurmdeckError::HookFailure {
        name: name.to_string(),
        hook,
        source: Box::new(error),
    };
    warn!(plugin = %name, hook, error = %failure, "lifecycle hook failed");
}

/// Registered entries whose state says they are running, sorted by name.
pub(crate) fn running_entries(st: &ManagerState) -> Vec<RegisteredPlugin> {
    st.registry
        .list_sorted()
        .into_iter()
        .filter(|entry| st.states.get(entry.name()).is_some_and(|s| s.running))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slurmdeck_test_utils::{Call, MockPlugin, noop_hook};
    use tracing_test::traced_test;

    fn config(pairs: &[(&str, serde_json::Value)]) -> PluginConfig {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn default_options() {
        let options = ManagerOptions::default();
        assert_eq!(options.health_check_interval, Duration::from_secs(30));
        assert_eq!(options.max_restarts, 3);
    }

    #[tokio::test]
    async fn register_seeds_initial_state() {
        let manager = PluginManager::new();
        manager.register_plugin(MockPlugin::new("jobs")).await.unwrap();

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(!state.enabled);
        assert!(!state.running);
        assert_eq!(state.health.status, slurmdeck_core::HealthState::Initialized);
        assert_eq!(state.restart_count, 0);
        assert!(manager.get_plugin_config("jobs").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_names_are_not_found() {
        let manager = PluginManager::new();
        assert!(matches!(
            manager.enable_plugin("ghost", PluginConfig::new()).await,
            Err(SlurmdeckError::NotFound { .. })
        ));
        assert!(matches!(
            manager.disable_plugin("ghost").await,
            Err(SlurmdeckError::NotFound { .. })
        ));
        assert!(manager.get_plugin("ghost").await.is_err());
        assert!(manager.get_plugin_state("ghost").await.is_err());
        assert!(manager.get_plugin_config("ghost").await.is_err());
        assert!(matches!(
            manager.update_plugin_config("ghost", PluginConfig::new()).await,
            Err(SlurmdeckError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn enable_twice_and_disable_idle_are_rejected() {
        let manager = PluginManager::new();
        manager.register_plugin(MockPlugin::new("jobs")).await.unwrap();

        assert!(matches!(
            manager.disable_plugin("jobs").await,
            Err(SlurmdeckError::NotEnabled { .. })
        ));
        manager.enable_plugin("jobs", PluginConfig::new()).await.unwrap();
        assert!(matches!(
            manager.enable_plugin("jobs", PluginConfig::new()).await,
            Err(SlurmdeckError::AlreadyEnabled { .. })
        ));
    }

    #[tokio::test]
    async fn enable_stores_config_and_probes_health() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::new("jobs");
        plugin.set_healthy(false);
        manager.register_plugin(plugin.clone()).await.unwrap();

        let cfg = config(&[("refresh", serde_json::json!(5))]);
        manager.enable_plugin("jobs", cfg.clone()).await.unwrap();

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(state.enabled && state.running);
        assert!(state.start_time.is_some());
        assert!(!state.health.healthy);
        assert_eq!(manager.get_plugin_config("jobs").await.unwrap(), Some(cfg));
        assert_eq!(plugin.calls(Call::Init), 1);
        assert_eq!(plugin.calls(Call::Start), 1);
    }

    #[tokio::test]
    async fn init_failure_leaves_plugin_disabled_and_is_retryable() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::new("jobs");
        plugin.fail(Call::Init, true);
        manager.register_plugin(plugin.clone()).await.unwrap();

        let err = manager
            .enable_plugin("jobs", PluginConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SlurmdeckError::InitializationFailure { .. }));
        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(!state.enabled);
        assert!(state.last_error.is_some());
        assert_eq!(plugin.calls(Call::Start), 0);

        plugin.fail(Call::Init, false);
        manager.enable_plugin("jobs", PluginConfig::new()).await.unwrap();
        assert_eq!(plugin.calls(Call::Init), 2);
    }

    #[tokio::test]
    async fn start_failure_leaves_plugin_disabled() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::new("jobs");
        plugin.fail(Call::Start, true);
        manager.register_plugin(plugin).await.unwrap();

        let err = manager
            .enable_plugin("jobs", PluginConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SlurmdeckError::StartFailure { .. }));
        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(!state.enabled && !state.running);
        assert!(state.last_error.unwrap().contains("start failed"));
    }

    #[tokio::test]
    async fn disable_reaches_disabled_even_if_stop_fails() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::new("jobs");
        manager.register_plugin(plugin.clone()).await.unwrap();
        manager.enable_plugin("jobs", PluginConfig::new()).await.unwrap();

        plugin.fail(Call::Stop, true);
        manager.disable_plugin("jobs").await.unwrap();

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(!state.enabled && !state.running);
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn lifecycle_hooks_run_on_enable_and_disable() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::builder("jobs").lifecycle_aware().build();
        manager.register_plugin(plugin.clone()).await.unwrap();

        manager.enable_plugin("jobs", PluginConfig::new()).await.unwrap();
        manager.disable_plugin("jobs").await.unwrap();

        let journal = plugin.journal().entries();
        assert_eq!(
            journal,
            vec!["jobs:init", "jobs:start", "jobs:health", "jobs:on_enable", "jobs:on_disable", "jobs:stop"]
        );
    }

    #[tokio::test]
    async fn failing_hooks_do_not_block_transitions() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::builder("jobs").lifecycle_aware().build();
        plugin.fail(Call::OnEnable, true);
        plugin.fail(Call::OnDisable, true);
        manager.register_plugin(plugin.clone()).await.unwrap();

        manager.enable_plugin("jobs", PluginConfig::new()).await.unwrap();
        assert!(manager.get_plugin_state("jobs").await.unwrap().running);
        manager.disable_plugin("jobs").await.unwrap();
        assert!(!manager.get_plugin_state("jobs").await.unwrap().enabled);
        assert_eq!(plugin.calls(Call::Stop), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn hook_failures_are_logged() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::builder("jobs").lifecycle_aware().build();
        plugin.fail(Call::OnEnable, true);
        manager.register_plugin(plugin).await.unwrap();

        manager.enable_plugin("jobs", PluginConfig::new()).await.unwrap();

        assert!(logs_contain("lifecycle hook failed"));
        assert!(logs_contain("on_enable hook failed for plugin `jobs`"));
    }

    #[tokio::test]
    async fn capability_filters_only_return_running_plugins() {
        let manager = PluginManager::new();
        manager
            .register_plugin(MockPlugin::builder("views").view_provider().build())
            .await
            .unwrap();
        manager
            .register_plugin(MockPlugin::builder("cols").overlay_provider().build())
            .await
            .unwrap();
        manager
            .register_plugin(MockPlugin::builder("idle-views").view_provider().build())
            .await
            .unwrap();

        manager.enable_plugin("views", PluginConfig::new()).await.unwrap();
        manager.enable_plugin("cols", PluginConfig::new()).await.unwrap();

        let views = manager.get_view_plugins().await;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].info().name, "views");
        let overlays = manager.get_overlay_plugins().await;
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].info().name, "cols");
        assert!(manager.plugins_with(Capability::DataProvider).await.is_empty());
    }

    #[tokio::test]
    async fn update_config_validates_then_applies() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::builder("jobs").configurable().build();
        manager.register_plugin(plugin.clone()).await.unwrap();

        let cfg = config(&[("columns", serde_json::json!(["id", "user"]))]);
        manager.update_plugin_config("jobs", cfg.clone()).await.unwrap();
        assert_eq!(plugin.calls(Call::ValidateConfig), 1);
        assert_eq!(plugin.applied_configs(), vec![cfg.clone()]);
        assert_eq!(manager.get_plugin_config("jobs").await.unwrap(), Some(cfg));
    }

    #[tokio::test]
    async fn update_config_rejected_by_validator_changes_nothing() {
        let manager = PluginManager::new();
        let plugin = MockPlugin::builder("jobs").configurable().build();
        plugin.fail(Call::ValidateConfig, true);
        manager.register_plugin(plugin.clone()).await.unwrap();

        let err = manager
            .update_plugin_config("jobs", config(&[("x", serde_json::json!(1))]))
            .await
            .unwrap_err();
        assert!(matches!(err, SlurmdeckError::ConfigValidationFailure { .. }));
        assert_eq!(plugin.calls(Call::SetConfig), 0);
        assert!(manager.get_plugin_config("jobs").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_config_change_hook_rolls_back() {
        let manager = PluginManager::new();
        let old = config(&[("refresh", serde_json::json!(10))]);
        let plugin = MockPlugin::builder("jobs")
            .configurable()
            .lifecycle_aware()
            .initial_config(old.clone())
            .build();
        plugin.fail(Call::OnConfigChange, true);
        manager.register_plugin(plugin.clone()).await.unwrap();

        let new = config(&[("refresh", serde_json::json!(1))]);
        let err = manager
            .update_plugin_config("jobs", new.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, SlurmdeckError::ConfigApplyFailure { .. }));
        assert_eq!(plugin.applied_configs(), vec![new, old.clone()]);
        assert_eq!(slurmdeck_core::Configurable::get_config(plugin.as_ref()), old);
    }

    #[tokio::test]
    async fn register_hook_requires_hookable_plugin() {
        let manager = PluginManager::new();
        let hooky = MockPlugin::builder("hooky").hookable().build();
        manager.register_plugin(hooky.clone()).await.unwrap();
        manager.register_plugin(MockPlugin::new("plain")).await.unwrap();

        manager
            .register_hook("hooky", "refresh", noop_hook())
            .await
            .unwrap();
        assert_eq!(hooky.fire_hook("refresh", &serde_json::json!({})), 1);
        assert!(manager
            .register_hook("plain", "refresh", noop_hook())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn summary_counts() {
        let manager = PluginManager::new();
        let sick = MockPlugin::new("sick");
        sick.set_healthy(false);
        manager.register_plugin(sick).await.unwrap();
        manager.register_plugin(MockPlugin::new("fine")).await.unwrap();
        manager.register_plugin(MockPlugin::new("idle")).await.unwrap();
        manager.enable_plugin("sick", PluginConfig::new()).await.unwrap();
        manager.enable_plugin("fine", PluginConfig::new()).await.unwrap();

        let summary = manager.summary().await;
        assert_eq!(
            summary,
            ManagerSummary {
                registered: 3,
                enabled: 2,
                running: 2,
                unhealthy: 1,
            }
        );
        assert_eq!(manager.list_plugins().await.len(), 3);
    }

    #[tokio::test]
    async fn enable_all_orders_by_dependencies() {
        let manager = PluginManager::new();
        manager
            .register_plugin(MockPlugin::builder("overlay").requires(["clock"]).build())
            .await
            .unwrap();
        manager.register_plugin(MockPlugin::new("clock")).await.unwrap();

        let report = manager
            .enable_all(["overlay", "clock", "missing"], &HashMap::new())
            .await;
        assert_eq!(report.enabled, vec!["clock", "overlay"]);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, SlurmdeckError::NotFound { .. }));
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn enable_all_reports_cycles_without_aborting() {
        let manager = PluginManager::new();
        manager
            .register_plugin(MockPlugin::builder("a").requires(["b"]).build())
            .await
            .unwrap();
        manager
            .register_plugin(MockPlugin::builder("b").requires(["a"]).build())
            .await
            .unwrap();
        manager.register_plugin(MockPlugin::new("c")).await.unwrap();

        let report = manager.enable_all(["a", "b", "c"], &HashMap::new()).await;
        assert_eq!(report.enabled, vec!["c"]);
        let failed: Vec<&str> = report.failed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(failed, vec!["a", "b"]);
        assert!(report
            .failed
            .iter()
            .all(|(_, e)| matches!(e, SlurmdeckError::MissingDependency { .. })));
    }
}
