use foundation::ids::SceneId;
use serde::{Deserialize, Serialize};

use crate::manifest::Face;

/// Deterministic URL layout for scene assets.
///
/// Templates use `{base}`, `{scene}`, `{face}`, `{level}`, `{col}` and
/// `{row}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileUrls {
    pub base_url: String,
    pub equirect_tile: String,
    pub cubemap_tile: String,
    pub manifest: String,
    pub scene_record: String,
    pub preview: String,
}

impl Default for TileUrls {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            equirect_tile: "{base}/scenes/{scene}/tiles/l{level}_{row}_{col}.jpg".to_string(),
            cubemap_tile: "{base}/scenes/{scene}/tiles/{face}_l{level}_{col}_{row}.jpg"
                .to_string(),
            manifest: "{base}/scenes/{scene}/manifest.json".to_string(),
            scene_record: "{base}/scenes/{scene}/scene.json".to_string(),
            preview: "{base}/scenes/{scene}/preview.jpg".to_string(),
        }
    }
}

impl TileUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    fn expand(&self, template: &str, scene: &SceneId) -> String {
        template
            .replace("{base}", self.base_url.trim_end_matches('/'))
            .replace("{scene}", scene.as_str())
    }

    pub fn tile(&self, scene: &SceneId, face: Option<Face>, level: u32, col: u32, row: u32) -> String {
        let template = match face {
            Some(_) => &self.cubemap_tile,
            None => &self.equirect_tile,
        };
        self.expand(template, scene)
            .replace("{face}", face.map(Face::code).unwrap_or(""))
            .replace("{level}", &level.to_string())
            .replace("{col}", &col.to_string())
            .replace("{row}", &row.to_string())
    }

    pub fn manifest(&self, scene: &SceneId) -> String {
        self.expand(&self.manifest, scene)
    }

    pub fn scene_record(&self, scene: &SceneId) -> String {
        self.expand(&self.scene_record, scene)
    }

    /// Preview image for a scene.
    ///
    /// Absolute manifest URLs are used as-is, root-relative ones are joined
    /// to the base URL, bare file names are resolved inside the scene
    /// directory. Without a manifest entry the conventional path is used.
    pub fn preview(&self, scene: &SceneId, manifest_preview: Option<&str>) -> String {
        let base = self.base_url.trim_end_matches('/');
        match manifest_preview {
            Some(p) if p.starts_with("http://") || p.starts_with("https://") => p.to_string(),
            Some(p) if p.starts_with('/') => format!("{base}{p}"),
            Some(p) => format!("{base}/scenes/{scene}/{p}"),
            None => self.expand(&self.preview, scene),
        }
    }
}
