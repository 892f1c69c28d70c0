use foundation::ids::SceneId;
use serde::Deserialize;

use crate::hotspot::{Hotspot, HotspotRecord, RecordError};

/// Where the camera should face when a scene is entered without an
/// explicit hotspot heading.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InitialView {
    pub yaw: f64,
    pub pitch: f64,
    pub fov: Option<f64>,
}

/// Per-scene record supplied by the tour backend alongside the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    pub id: SceneId,
    pub initial_view: Option<InitialView>,
    pub hotspots: Vec<Hotspot>,
}

impl SceneRecord {
    /// A record with no hotspots and no preferred heading.
    pub fn bare(id: SceneId) -> Self {
        Self {
            id,
            initial_view: None,
            hotspots: Vec::new(),
        }
    }

    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }
}

#[derive(Debug, Deserialize)]
struct RawSceneRecord {
    id: String,
    #[serde(default, alias = "initialYaw")]
    initial_yaw: Option<f64>,
    #[serde(default, alias = "initialPitch")]
    initial_pitch: Option<f64>,
    #[serde(default, alias = "initialFov")]
    initial_fov: Option<f64>,
    #[serde(default)]
    hotspots: Vec<HotspotRecord>,
}

pub fn parse_scene_record(raw: &str) -> Result<SceneRecord, RecordError> {
    let raw: RawSceneRecord = serde_json::from_str(raw).map_err(RecordError::Json)?;

    let initial_view = match (raw.initial_yaw, raw.initial_pitch) {
        (None, None) => None,
        (yaw, pitch) => Some(InitialView {
            yaw: foundation::math::wrap_yaw(yaw.unwrap_or(0.0)),
            pitch: pitch.unwrap_or(0.0),
            fov: raw.initial_fov,
        }),
    };

    let hotspots = raw
        .hotspots
        .into_iter()
        .map(HotspotRecord::resolve)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SceneRecord {
        id: SceneId::from(raw.id),
        initial_view,
        hotspots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_record_with_hotspots() {
        let raw = r#"{
            "id": "lobby",
            "initialYaw": 30,
            "hotspots": [
                {"id": "to-hall", "kind": "navigation", "yaw": 0, "pitch": 0, "targetSceneId": "hall"},
                {"id": "plaque", "kind": "info", "yaw": 90, "pitch": 10}
            ]
        }"#;
        let rec = parse_scene_record(raw).expect("parse");
        assert_eq!(rec.id, SceneId::from("lobby"));
        assert_eq!(
            rec.initial_view,
            Some(InitialView {
                yaw: 30.0,
                pitch: 0.0,
                fov: None
            })
        );
        assert_eq!(rec.hotspots.len(), 2);
        assert!(rec.hotspot("to-hall").is_some_and(|h| h.is_navigable()));
        assert!(rec.hotspot("missing").is_none());
    }

    #[test]
    fn record_without_view_has_none() {
        let rec = parse_scene_record(r#"{"id": "yard"}"#).expect("parse");
        assert_eq!(rec, SceneRecord::bare(SceneId::from("yard")));
    }
}
