//! Editor tuning constants.
//!
//! `EditorConfig` gathers every threshold the editor consults. Its
//! `Default` matches the persisted-format assumptions (10-unit grid,
//! 40×30 minimum nodes), and a TOML file may override any field.

use serde::{Deserialize, Serialize};

/// Grid unit used for structural snapping.
pub const GRID_SIZE: f64 = 10.0;
pub const MIN_NODE_WIDTH: f64 = 40.0;
pub const MIN_NODE_HEIGHT: f64 = 30.0;
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid_size: f64,
    pub min_node_width: f64,
    pub min_node_height: f64,
    pub history_limit: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Cumulative world distance before a drag counts as moved.
    pub drag_epsilon: f64,
    /// Cumulative world distance before a marquee counts as moved.
    pub marquee_epsilon: f64,
    pub group_padding: f64,
    pub collapsed_min_width: f64,
    pub collapsed_min_height: f64,
    pub collapsed_max_width: f64,
    pub collapsed_max_height: f64,
    /// A persisted collapsed frame is reused while its size stays within
    /// this ratio of the fresh estimate.
    pub collapse_hysteresis: f64,
    /// Hit radius of handles and anchor markers, in screen pixels.
    pub handle_radius: f64,
    /// Hit distance from an edge body, in screen pixels.
    pub edge_hit_tolerance: f64,
    pub quick_add_gap: f64,
    /// Distance of quick-add satellites outside their anchor.
    pub quick_add_offset: f64,
    pub paste_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            min_node_width: MIN_NODE_WIDTH,
            min_node_height: MIN_NODE_HEIGHT,
            history_limit: HISTORY_LIMIT,
            min_zoom: 0.2,
            max_zoom: 4.0,
            drag_epsilon: 0.2,
            marquee_epsilon: 2.0,
            group_padding: 20.0,
            collapsed_min_width: 72.0,
            collapsed_min_height: 30.0,
            collapsed_max_width: 320.0,
            collapsed_max_height: 120.0,
            collapse_hysteresis: 2.0,
            handle_radius: 6.0,
            edge_hit_tolerance: 6.0,
            quick_add_gap: 80.0,
            quick_add_offset: 28.0,
            paste_step: 20.0,
        }
    }
}

impl EditorConfig {
    /// Clamp a zoom factor into the configured range.
    pub fn clamp_zoom(&self, scale: f64) -> f64 {
        scale.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_format_constants() {
        let config = EditorConfig::default();
        assert_eq!(config.grid_size, 10.0);
        assert_eq!(config.history_limit, 50);
        assert_eq!((config.collapsed_min_width, config.collapsed_min_height), (72.0, 30.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let config = EditorConfig::default();
        assert_eq!(config.clamp_zoom(10.0), 4.0);
        assert_eq!(config.clamp_zoom(0.01), 0.2);
        assert_eq!(config.clamp_zoom(1.5), 1.5);
    }

    #[test]
    fn partial_json_overrides_keep_other_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"grid_size": 20.0}"#).unwrap();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.history_limit, 50);
    }
}
