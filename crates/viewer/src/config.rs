use formats::tile_url::TileUrls;
use scene::camera::CameraConfig;
use scene::picking::PickConfig;
use scene::transition::TransitionConfig;
use serde::{Deserialize, Serialize};
use streaming::config::StreamingConfig;

/// Configuration for one viewer instance. Every field has a default, so a
/// partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub streaming: StreamingConfig,
    pub camera: CameraConfig,
    pub transition: TransitionConfig,
    pub picking: PickConfig,
    pub urls: TileUrls,

    /// Minimum interval between `CameraChanged` events (ms).
    pub camera_event_interval_ms: u64,

    pub viewport_width_px: u32,
    pub viewport_height_px: u32,

    /// Start with auto-rotation on.
    pub autoplay: bool,

    /// Pointer travel (px) below which a press/release pair is a click.
    pub click_slop_px: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            streaming: StreamingConfig::default(),
            camera: CameraConfig::default(),
            transition: TransitionConfig::default(),
            picking: PickConfig::default(),
            urls: TileUrls::default(),
            camera_event_interval_ms: 100,
            viewport_width_px: 1280,
            viewport_height_px: 720,
            autoplay: false,
            click_slop_px: 5.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
