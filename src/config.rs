use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM_STEP: f64 = 1e-6;

/// Settings shared by the controller, the DOM binding and the toolbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Id of the scrollable, zoomable content element.
    pub content_id: String,
    /// Id of the button that toggles the theme.
    pub theme_button_id: String,
    /// Share of the viewport kept on screen between two scroll steps.
    pub overlap_ratio: f64,
    pub zoom_step: f64,
    /// Lower zoom bound. `None` leaves zoom unbounded.
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    /// Zoom the page was rendered with.
    pub initial_zoom: f64,
    /// Whether the page was rendered with the dark stylesheets enabled.
    pub dark_theme: bool,
    pub light_icon_class: String,
    pub dark_icon_class: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            content_id: "article".to_string(),
            theme_button_id: "toggleThemeButton".to_string(),
            overlap_ratio: 0.1,
            zoom_step: 0.1,
            min_zoom: Some(0.1),
            max_zoom: None,
            initial_zoom: 1.0,
            dark_theme: false,
            light_icon_class: "fa-sun-o".to_string(),
            dark_icon_class: "fa-moon-o".to_string(),
        }
    }
}

impl ControlsConfig {
    /// Reads a JSON config file, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let config: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        // Zoom is kept at 6 decimals, so a smaller step would never move it.
        if self.zoom_step.is_nan() || self.zoom_step < MIN_ZOOM_STEP {
            anyhow::bail!(
                "zoom_step must be at least {MIN_ZOOM_STEP}, got {}",
                self.zoom_step
            );
        }
        if !(0.0..1.0).contains(&self.overlap_ratio) {
            anyhow::bail!(
                "overlap_ratio must be in [0, 1), got {}",
                self.overlap_ratio
            );
        }
        if let (Some(min), Some(max)) = (self.min_zoom, self.max_zoom) {
            if min > max {
                anyhow::bail!("min_zoom {min} is greater than max_zoom {max}");
            }
        }
        if self.content_id.trim().is_empty() || self.theme_button_id.trim().is_empty() {
            anyhow::bail!("element ids must not be empty");
        }
        Ok(())
    }
}
