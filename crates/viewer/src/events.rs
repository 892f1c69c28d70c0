use foundation::ids::SceneId;
use formats::hotspot::HotspotKind;

/// Notifications for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    SceneChanged {
        scene_id: SceneId,
        previous: Option<SceneId>,
    },
    HotspotActivated {
        scene_id: SceneId,
        hotspot_id: String,
        kind: HotspotKind,
        payload: Option<serde_json::Value>,
    },
    /// Throttled; only sent when the pose actually changed.
    CameraChanged { yaw: f64, pitch: f64, fov: f64 },
    LoadingProgress { scene_id: SceneId, percent: u8 },
    AutoplayPaused,
    /// Non-blocking problem worth a banner, e.g. a scene shown from its
    /// preview because the manifest was unusable.
    LoadWarning { scene_id: SceneId, message: String },
    TransitionStarted {
        from: SceneId,
        to: SceneId,
        hotspot_id: String,
    },
}
