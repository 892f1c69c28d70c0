use foundation::ids::SceneId;
use foundation::math::{direction_from_yaw_pitch, wrap_yaw, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    Navigation,
    Info,
    Link,
}

/// A clickable marker placed at spherical coordinates in a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub id: String,
    pub kind: HotspotKind,
    pub yaw: f64,
    pub pitch: f64,
    pub target_scene_id: Option<SceneId>,
    pub target_yaw: Option<f64>,
    pub target_pitch: Option<f64>,
    /// Decoded payload object, passed through to the host untouched.
    pub payload: Option<serde_json::Value>,
}

impl Hotspot {
    pub fn direction(&self) -> Vec3 {
        direction_from_yaw_pitch(self.yaw, self.pitch)
    }

    /// Navigation hotspot with somewhere to go.
    pub fn is_navigable(&self) -> bool {
        self.kind == HotspotKind::Navigation && self.target_scene_id.is_some()
    }
}

/// Wire form of a hotspot as delivered by the tour backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HotspotRecord {
    pub id: String,
    pub kind: HotspotKind,
    pub yaw: f64,
    pub pitch: f64,
    #[serde(default, alias = "targetSceneId")]
    pub target_scene_id: Option<String>,
    #[serde(default, alias = "targetYaw")]
    pub target_yaw: Option<f64>,
    #[serde(default, alias = "targetPitch")]
    pub target_pitch: Option<f64>,
    /// JSON text; an object here may override the positional fields.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PayloadOverrides {
    yaw: Option<f64>,
    pitch: Option<f64>,
    #[serde(alias = "targetSceneId")]
    target_scene_id: Option<String>,
    #[serde(alias = "targetYaw")]
    target_yaw: Option<f64>,
    #[serde(alias = "targetPitch")]
    target_pitch: Option<f64>,
}

#[derive(Debug)]
pub enum RecordError {
    Json(serde_json::Error),
    NonFinite { id: String, field: &'static str },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Json(e) => write!(f, "record is not valid JSON: {e}"),
            RecordError::NonFinite { id, field } => {
                write!(f, "hotspot {id}: `{field}` is not a finite number")
            }
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::Json(e) => Some(e),
            RecordError::NonFinite { .. } => None,
        }
    }
}

fn finite(value: f64, id: &str, field: &'static str) -> Result<f64, RecordError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RecordError::NonFinite {
            id: id.to_string(),
            field,
        })
    }
}

impl HotspotRecord {
    /// Apply payload overrides and normalize angles.
    ///
    /// A payload that is not JSON, or not an object, is ignored.
    pub fn resolve(self) -> Result<Hotspot, RecordError> {
        let (overrides, payload) = match self.payload.as_deref().map(str::trim) {
            None | Some("") => (PayloadOverrides::default(), None),
            Some(text) => match serde_json::from_str::<serde_json::Value>(text) {
                Ok(value @ serde_json::Value::Object(_)) => {
                    let overrides = serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                        warn!(hotspot = %self.id, "ignoring payload overrides: {e}");
                        PayloadOverrides::default()
                    });
                    (overrides, Some(value))
                }
                Ok(other) => (PayloadOverrides::default(), Some(other)),
                Err(e) => {
                    warn!(hotspot = %self.id, "ignoring malformed payload: {e}");
                    (PayloadOverrides::default(), None)
                }
            },
        };

        let id = self.id;
        let yaw = finite(overrides.yaw.unwrap_or(self.yaw), &id, "yaw")?;
        let pitch = finite(overrides.pitch.unwrap_or(self.pitch), &id, "pitch")?;
        let target_yaw = overrides
            .target_yaw
            .or(self.target_yaw)
            .map(|v| finite(v, &id, "target_yaw").map(wrap_yaw))
            .transpose()?;
        let target_pitch = overrides
            .target_pitch
            .or(self.target_pitch)
            .map(|v| finite(v, &id, "target_pitch"))
            .transpose()?;
        let target_scene_id = overrides
            .target_scene_id
            .or(self.target_scene_id)
            .filter(|s| !s.is_empty())
            .map(SceneId::from);

        Ok(Hotspot {
            id,
            kind: self.kind,
            yaw: wrap_yaw(yaw),
            pitch: pitch.clamp(-90.0, 90.0),
            target_scene_id,
            target_yaw,
            target_pitch: target_pitch.map(|p| p.clamp(-90.0, 90.0)),
            payload,
        })
    }
}

/// Parse a JSON array of hotspot records.
pub fn parse_hotspots(raw: &str) -> Result<Vec<Hotspot>, RecordError> {
    let records: Vec<HotspotRecord> = serde_json::from_str(raw).map_err(RecordError::Json)?;
    records.into_iter().map(HotspotRecord::resolve).collect()
}
