// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overlay-provider capability: extra columns and cell styling for existing views.

use crate::error::SlurmdeckError;
use crate::types::{CellStyle, OverlayColumn, OverlayInfo};

/// A live overlay attached to one or more host views.
pub trait Overlay: Send + Sync {
    fn id(&self) -> &str;

    fn target_views(&self) -> Vec<String>;

    fn columns(&self) -> Vec<OverlayColumn>;

    /// Text for `column_id` in the row identified by `row_id` of `view`.
    fn cell_value(&self, view: &str, row_id: &str, column_id: &str) -> Option<String>;

    fn cell_style(&self, _view: &str, _row_id: &str, _column_id: &str) -> Option<CellStyle> {
        None
    }
}

/// Plugins that enumerate and instantiate overlays.
pub trait OverlayProvider: Send + Sync {
    fn overlays(&self) -> Vec<OverlayInfo>;

    fn create_overlay(&self, overlay_id: &str) -> Result<Box<dyn Overlay>, SlurmdeckError>;
}
