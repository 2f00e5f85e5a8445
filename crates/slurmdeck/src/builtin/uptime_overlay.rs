// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `uptime-overlay`: adds a session uptime column to the jobs view.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use slurmdeck_core::types::{CellStyle, ColumnPosition, OverlayColumn, OverlayInfo};
use slurmdeck_core::{
    HealthStatus, Overlay, OverlayProvider, Plugin, PluginConfig, PluginContext, PluginInfo,
    Prioritizable, SlurmdeckError,
};

use super::session_clock::{self, SessionClock};

pub const NAME: &str = "uptime-overlay";
const OVERLAY_ID: &str = "session-uptime";
const COLUMN_ID: &str = "session_uptime";
const TARGET_VIEW: &str = "jobs";

/// Renders `d` as `HH:MM:SS`, with hours growing past two digits if needed.
pub fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

pub struct UptimeOverlay {
    clock: Arc<SessionClock>,
    running: AtomicBool,
    priority: i32,
}

impl UptimeOverlay {
    pub fn new(clock: Arc<SessionClock>) -> Self {
        Self {
            clock,
            running: AtomicBool::new(false),
            priority: 10,
        }
    }
}

#[async_trait]
impl Plugin for UptimeOverlay {
    fn info(&self) -> PluginInfo {
        PluginInfo::new(NAME, semver::Version::new(0, 1, 0))
            .with_description("Session uptime column for the jobs view")
            .with_author("Slurmdeck Contributors")
            .with_license("MIT OR Apache-2.0")
            .with_requires([session_clock::NAME])
            .with_provides(["overlay:jobs"])
    }

    async fn init(&self, _ctx: &PluginContext, _config: &PluginConfig) -> Result<(), SlurmdeckError> {
        Ok(())
    }

    async fn start(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self, _ctx: &PluginContext) -> Result<(), SlurmdeckError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, SlurmdeckError> {
        if !self.running.load(Ordering::SeqCst) {
            return Ok(HealthStatus::unhealthy("overlay not started"));
        }
        Ok(match self.clock.uptime() {
            Some(_) => HealthStatus::healthy("overlay running"),
            None => HealthStatus::degraded("session clock is not running"),
        })
    }

    fn as_overlay_provider(&self) -> Option<&dyn OverlayProvider> {
        Some(self)
    }

    fn as_prioritizable(&self) -> Option<&dyn Prioritizable> {
        Some(self)
    }
}

impl OverlayProvider for UptimeOverlay {
    fn overlays(&self) -> Vec<OverlayInfo> {
        vec![OverlayInfo {
            id: OVERLAY_ID.to_string(),
            name: "Session uptime".to_string(),
            description: "How long this dashboard session has been open".to_string(),
            target_views: vec![TARGET_VIEW.to_string()],
            priority: self.priority,
        }]
    }

    fn create_overlay(&self, overlay_id: &str) -> Result<Box<dyn Overlay>, SlurmdeckError> {
        if overlay_id != OVERLAY_ID {
            return Err(SlurmdeckError::plugin(format!("unknown overlay `{overlay_id}`")));
        }
        Ok(Box::new(UptimeColumn {
            clock: Arc::clone(&self.clock),
        }))
    }
}

impl Prioritizable for UptimeOverlay {
    fn priority(&self) -> i32 {
        self.priority
    }
}

struct UptimeColumn {
    clock: Arc<SessionClock>,
}

impl Overlay for UptimeColumn {
    fn id(&self) -> &str {
        OVERLAY_ID
    }

    fn target_views(&self) -> Vec<String> {
        vec![TARGET_VIEW.to_string()]
    }

    fn columns(&self) -> Vec<OverlayColumn> {
        vec![OverlayColumn {
            id: COLUMN_ID.to_string(),
            title: "SESSION".to_string(),
            width: 9,
            position: ColumnPosition::End,
        }]
    }

    fn cell_value(&self, view: &str, _row_id: &str, column_id: &str) -> Option<String> {
        if view != TARGET_VIEW || column_id != COLUMN_ID {
            return None;
        }
        self.clock.uptime().map(format_uptime)
    }

    fn cell_style(&self, view: &str, row_id: &str, column_id: &str) -> Option<CellStyle> {
        self.cell_value(view, row_id, column_id).map(|_| CellStyle {
            foreground: Some("cyan".to_string()),
            background: None,
            bold: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(3723)), "01:02:03");
        assert_eq!(format_uptime(Duration::from_secs(360_000)), "100:00:00");
    }

    #[tokio::test]
    async fn column_tracks_clock() {
        let clock = Arc::new(SessionClock::new());
        let overlay = UptimeOverlay::new(Arc::clone(&clock));
        let ctx = PluginContext::background();
        let column = overlay.create_overlay(OVERLAY_ID).unwrap();

        assert_eq!(column.cell_value("jobs", "42", COLUMN_ID), None);

        clock.start(&ctx).await.unwrap();
        overlay.start(&ctx).await.unwrap();
        assert_eq!(
            column.cell_value("jobs", "42", COLUMN_ID).as_deref(),
            Some("00:00:00")
        );
        assert_eq!(column.cell_value("nodes", "42", COLUMN_ID), None);
        assert!(column.cell_style("jobs", "42", COLUMN_ID).is_some());
        assert!(overlay.health().await.unwrap().healthy);

        clock.stop(&ctx).await.unwrap();
        let health = overlay.health().await.unwrap();
        assert!(health.healthy);
        assert_eq!(health.message, "session clock is not running");
    }

    #[test]
    fn declares_dependency_and_priority() {
        let overlay = UptimeOverlay::new(Arc::new(SessionClock::new()));
        assert!(overlay.info().depends_on(session_clock::NAME));
        assert_eq!(overlay.as_prioritizable().map(|p| p.priority()), Some(10));
        assert!(overlay.create_overlay("other").is_err());
    }
}
