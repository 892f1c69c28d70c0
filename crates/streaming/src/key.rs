use foundation::ids::SceneId;
use formats::manifest::Face;

/// Position of a tile inside one level of a scene's pyramid.
///
/// `face` is set for cubemaps only. Ordering sorts equirect tiles before
/// any cube face, then by face, column, row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    pub face: Option<Face>,
    pub col: u32,
    pub row: u32,
}

impl TileCoord {
    pub fn equirect(col: u32, row: u32) -> Self {
        Self {
            face: None,
            col,
            row,
        }
    }

    pub fn cube(face: Face, col: u32, row: u32) -> Self {
        Self {
            face: Some(face),
            col,
            row,
        }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.face {
            Some(face) => write!(f, "{}:{}/{}", face.code(), self.col, self.row),
            None => write!(f, "{}/{}", self.col, self.row),
        }
    }
}

/// Unique identity of a tile in the cache and the load queue.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileKey {
    pub scene_id: SceneId,
    pub level: u32,
    pub coord: TileCoord,
}

impl TileKey {
    pub fn new(scene_id: SceneId, level: u32, coord: TileCoord) -> Self {
        Self {
            scene_id,
            level,
            coord,
        }
    }

    pub fn face(&self) -> Option<Face> {
        self.coord.face
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@l{}:{}", self.scene_id, self.level, self.coord)
    }
}
