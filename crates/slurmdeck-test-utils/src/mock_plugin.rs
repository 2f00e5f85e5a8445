// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable mock plugin for deterministic manager tests.
//!
//! `MockPlugin` implements [`Plugin`] with switchable health, injectable
//! failures for every lifecycle call, per-call counters, and opt-in optional
//! capabilities (configurable, lifecycle-aware, hookable, view, overlay,
//! prioritizable).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use slurmdeck_core::traits::{
    Configurable, HookCallback, Hookable, LifecycleAware, Overlay, OverlayProvider, PluginView,
    Prioritizable, ViewProvider,
};
use slurmdeck_core::types::{
    ColumnPosition, HookInfo, OverlayColumn, OverlayInfo, PluginConfig, ViewInfo,
};
use slurmdeck_core::{HealthStatus, Plugin, PluginContext, PluginInfo, SlurmdeckError};

use crate::journal::CallJournal;

/// Which lifecycle call a counter or failure switch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Init,
    Start,
    Stop,
    Health,
    OnEnable,
    OnDisable,
    OnConfigChange,
    ValidateConfig,
    SetConfig,
}

impl Call {
    const ALL: [Call; 9] = [
        Call::Init,
        Call::Start,
        Call::Stop,
        Call::Health,
        Call::OnEnable,
        Call::OnDisable,
        Call::OnConfigChange,
        Call::ValidateConfig,
        Call::SetConfig,
    ];

    fn label(self) -> &'static str {
        match self {
            Call::Init => "init",
            Call::Start => "start",
            Call::Stop => "stop",
            Call::Health => "health",
            Call::OnEnable => "on_enable",
            Call::OnDisable => "on_disable",
            Call::OnConfigChange => "on_config_change",
            Call::ValidateConfig => "validate_config",
            Call::SetConfig => "set_config",
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MockCapabilities {
    configurable: bool,
    lifecycle_aware: bool,
    hookable: bool,
    view_provider: bool,
    overlay_provider: bool,
    priority: Option<i32>,
}

/// Builder for [`MockPlugin`].
pub struct MockPluginBuilder {
    name: String,
    requires: Vec<String>,
    journal: CallJournal,
    caps: MockCapabilities,
    config: PluginConfig,
}

impl MockPluginBuilder {
    /// Plugins that must be running before this one can be enabled.
    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = names.into_iter().map(Into::into).collect();
        self
    }

    /// Share a journal with other mocks to assert cross-plugin ordering.
    pub fn journal(mut self, journal: CallJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn configurable(mut self) -> Self {
        self.caps.configurable = true;
        self
    }

    /// Initial value returned by `get_config`.
    pub fn initial_config(mut self, config: PluginConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lifecycle_aware(mut self) -> Self {
        self.caps.lifecycle_aware = true;
        self
    }

    pub fn hookable(mut self) -> Self {
        self.caps.hookable = true;
        self
    }

    pub fn view_provider(mut self) -> Self {
        self.caps.view_provider = true;
        self
    }

    pub fn overlay_provider(mut self) -> Self {
        self.caps.overlay_provider = true;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.caps.priority = Some(priority);
        self
    }

    pub fn build(self) -> Arc<MockPlugin> {
        Arc::new(MockPlugin {
            info: PluginInfo::new(self.name, semver::Version::new(0, 1, 0))
                .with_description("mock plugin for tests")
                .with_author("slurmdeck-test-utils")
                .with_license("MIT OR Apache-2.0")
                .with_requires(self.requires),
            journal: self.journal,
            caps: self.caps,
            healthy: AtomicBool::new(true),
            failing: Call::ALL
                .iter()
                .map(|c| (*c, AtomicBool::new(false)))
                .collect(),
            counters: Call::ALL.iter().map(|c| (*c, AtomicU32::new(0))).collect(),
            config: Mutex::new(self.config),
            applied: Mutex::new(Vec::new()),
            hooks: Mutex::new(HashMap::new()),
        })
    }
}

/// A plugin whose every behaviour is controlled by the test.
///
/// All calls are recorded in the plugin's [`CallJournal`] as
/// `"<name>:<call>"` and counted per [`Call`].
pub struct MockPlugin {
    info: PluginInfo,
    journal: CallJournal,
    caps: MockCapabilities,
    healthy: AtomicBool,
    failing: HashMap<Call, AtomicBool>,
    counters: HashMap<Call, AtomicU32>,
    config: Mutex<PluginConfig>,
    /// Every config passed to `set_config`, in order.
    applied: Mutex<Vec<PluginConfig>>,
    hooks: Mutex<HashMap<String, Vec<HookCallback>>>,
}

impl MockPlugin {
    /// Start building a mock plugin named `name`.
    pub fn builder(name: impl Into<String>) -> MockPluginBuilder {
        MockPluginBuilder {
            name: name.into(),
            requires: Vec::new(),
            journal: CallJournal::new(),
            caps: MockCapabilities::default(),
            config: PluginConfig::new(),
        }
    }

    /// A plain healthy plugin with no dependencies or optional capabilities.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::builder(name).build()
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Switch what `health()` reports from now on.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Make `call` fail (or succeed again) from now on.
    pub fn fail(&self, call: Call, failing: bool) {
        if let Some(flag) = self.failing.get(&call) {
            flag.store(failing, Ordering::SeqCst);
        }
    }

    /// How many times `call` has been invoked.
    pub fn calls(&self, call: Call) -> u32 {
        self.counters
            .get(&call)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn journal(&self) -> &CallJournal {
        &self.journal
    }

    /// Configs passed to `set_config`, in order.
    pub fn applied_configs(&self) -> Vec<PluginConfig> {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fire every callback registered for `hook` with `payload`.
    pub fn fire_hook(&self, hook: &str, payload: &serde_json::Value) -> usize {
        let callbacks = self
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hook)
            .cloned()
            .unwrap_or_default();
        for callback in &callbacks {
            let _ = callback(payload);
        }
        callbacks.len()
    }

    fn enter(&self, call: Call) -> Result<(), SlurmdeckError> {
        if let Some(counter) = self.counters.get(&call) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        self.journal.record(&self.info.name, call.label());
        let failing = self
            .failing
            .get(&call)
            .is_some_and(|f| f.load(Ordering::SeqCst));
        if failing {
            Err(SlurmdeckError::plugin(format!(
                "{} failed in {}",
                call.label(),
                self.info.name
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Plugin for MockPlugin {
    fn info(&self) -> PluginInfo {
        self.info.clone()
    }

    async fn init(&self, _ctx: &PluginContext, _config: &PluginConfig) -> Result<(), SlurmdeckError> {
        self.enter(Call::Init)
    }

    async fn start(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        self.enter(Call::Start)
    }

    async fn stop(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        self.enter(Call::Stop)
    }

    async fn health(&self) -> Result<HealthStatus, SlurmdeckError> {
        self.enter(Call::Health)?;
        if self.healthy.load(Ordering::SeqCst) {
            Ok(HealthStatus::healthy("mock ok"))
        } else {
            Ok(HealthStatus::unhealthy("mock unhealthy"))
        }
    }

    fn as_view_provider(&self) -> Option<&dyn ViewProvider> {
        self.caps.view_provider.then_some(self as &dyn ViewProvider)
    }

    fn as_overlay_provider(&self) -> Option<&dyn OverlayProvider> {
        self.caps
            .overlay_provider
            .then_some(self as &dyn OverlayProvider)
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        self.caps.configurable.then_some(self as &dyn Configurable)
    }

    fn as_hookable(&self) -> Option<&dyn Hookable> {
        self.caps.hookable.then_some(self as &dyn Hookable)
    }

    fn as_lifecycle_aware(&self) -> Option<&dyn LifecycleAware> {
        self.caps
            .lifecycle_aware
            .then_some(self as &dyn LifecycleAware)
    }

    fn as_prioritizable(&self) -> Option<&dyn Prioritizable> {
        self.caps
            .priority
            .is_some()
            .then_some(self as &dyn Prioritizable)
    }
}

impl Configurable for MockPlugin {
    fn get_config(&self) -> PluginConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_config(&self, config: &PluginConfig) -> Result<(), SlurmdeckError> {
        self.enter(Call::SetConfig)?;
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(config.clone());
        Ok(())
    }

    fn validate_config(&self, _config: &PluginConfig) -> Result<(), SlurmdeckError> {
        self.enter(Call::ValidateConfig)
    }
}

#[async_trait]
impl LifecycleAware for MockPlugin {
    async fn on_enable(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        self.enter(Call::OnEnable)
    }

    async fn on_disable(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        self.enter(Call::OnDisable)
    }

    async fn on_config_change(
        &self,
        _ctx: &PluginContext,
        _old: &PluginConfig,
        _new: &PluginConfig,
    ) -> Result<(), SlurmdeckError> {
        self.enter(Call::OnConfigChange)
    }
}

impl Hookable for MockPlugin {
    fn hooks(&self) -> Vec<HookInfo> {
        vec![HookInfo {
            name: "refresh".to_string(),
            description: "fired after each data refresh".to_string(),
        }]
    }

    fn register_hook(&self, hook: &str, callback: HookCallback) -> Result<(), SlurmdeckError> {
        if hook != "refresh" {
            return Err(SlurmdeckError::plugin(format!("unknown hook `{hook}`")));
        }
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(hook.to_string())
            .or_default()
            .push(callback);
        Ok(())
    }
}

impl Prioritizable for MockPlugin {
    fn priority(&self) -> i32 {
        self.caps.priority.unwrap_or_default()
    }
}

impl ViewProvider for MockPlugin {
    fn views(&self) -> Vec<ViewInfo> {
        vec![ViewInfo {
            id: format!("{}-view", self.info.name),
            name: format!("{} view", self.info.name),
            description: "mock view".to_string(),
            shortcut: None,
        }]
    }

    fn create_view(
        &self,
        view_id: &str,
        _ctx: &PluginContext,
    ) -> Result<Box<dyn PluginView>, SlurmdeckError> {
        Ok(Box::new(MockView {
            id: view_id.to_string(),
        }))
    }
}

impl OverlayProvider for MockPlugin {
    fn overlays(&self) -> Vec<OverlayInfo> {
        vec![OverlayInfo {
            id: format!("{}-overlay", self.info.name),
            name: format!("{} overlay", self.info.name),
            description: "mock overlay".to_string(),
            target_views: vec!["jobs".to_string()],
            priority: self.caps.priority.unwrap_or_default(),
        }]
    }

    fn create_overlay(&self, overlay_id: &str) -> Result<Box<dyn Overlay>, SlurmdeckError> {
        Ok(Box::new(MockOverlay {
            id: overlay_id.to_string(),
        }))
    }
}

/// A hook callback that accepts every payload.
pub fn noop_hook() -> HookCallback {
    Arc::new(|_: &serde_json::Value| Ok::<(), SlurmdeckError>(()))
}

struct MockView {
    id: String,
}

#[async_trait]
impl PluginView for MockView {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> String {
        format!("Mock {}", self.id)
    }

    async fn refresh(&self) -> Result<(), SlurmdeckError> {
        Ok(())
    }
}

struct MockOverlay {
    id: String,
}

impl Overlay for MockOverlay {
    fn id(&self) -> &str {
        &self.id
    }

    fn target_views(&self) -> Vec<String> {
        vec!["jobs".to_string()]
    }

    fn columns(&self) -> Vec<OverlayColumn> {
        vec![OverlayColumn {
            id: "mock".to_string(),
            title: "MOCK".to_string(),
            width: 6,
            position: ColumnPosition::End,
        }]
    }

    fn cell_value(&self, _view: &str, row_id: &str, _column_id: &str) -> Option<String> {
        Some(format!("m-{row_id}"))
    }
}
