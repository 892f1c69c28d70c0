//! Cube face assembly.
//!
//! Each face of a cube level is stitched from `tiles_per_side²` tiles into
//! one offscreen RGBA surface. Faces are only handed out as a complete set
//! of six, so the visible cube never mixes levels.

use std::collections::BTreeSet;

use foundation::ids::SceneId;
use formats::manifest::{Face, LevelSpec};
use image::RgbaImage;
use image::imageops;
use streaming::key::TileKey;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct FaceImage {
    pub face: Face,
    pub image: RgbaImage,
}

#[derive(Debug)]
struct FaceSurface {
    face: Face,
    image: RgbaImage,
    settled: BTreeSet<(u32, u32)>,
}

#[derive(Debug)]
struct Composite {
    scene_id: SceneId,
    level: LevelSpec,
    faces: [FaceSurface; 6],
}

impl Composite {
    fn tiles_per_face(&self) -> usize {
        let n = self.level.tiles_per_side() as usize;
        n * n
    }

    fn is_complete(&self) -> bool {
        let need = self.tiles_per_face();
        self.faces.iter().all(|f| f.settled.len() >= need)
    }
}

/// Builds the six faces of one (scene, level) pair.
#[derive(Debug, Default)]
pub struct FaceCompositor {
    current: Option<Composite>,
}

impl FaceCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start compositing `level` of `scene_id`, abandoning any unfinished
    /// composite.
    pub fn begin(&mut self, scene_id: SceneId, level: LevelSpec) {
        if let Some(old) = &self.current {
            debug!(
                "abandoning cube composite {}@l{} for {scene_id}@l{}",
                old.scene_id, old.level.index, level.index
            );
        }
        let size = level.face_size();
        self.current = Some(Composite {
            scene_id,
            level,
            faces: std::array::from_fn(|i| FaceSurface {
                face: Face::ALL[i],
                image: RgbaImage::new(size, size),
                settled: BTreeSet::new(),
            }),
        });
    }

    pub fn target(&self) -> Option<(&SceneId, u32)> {
        self.current.as_ref().map(|c| (&c.scene_id, c.level.index))
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Settled tiles over tiles needed, across all faces.
    pub fn progress(&self) -> (usize, usize) {
        match &self.current {
            Some(c) => (
                c.faces.iter().map(|f| f.settled.len()).sum(),
                c.tiles_per_face() * 6,
            ),
            None => (0, 0),
        }
    }

    pub fn abandon(&mut self) {
        self.current = None;
    }

    fn surface_for(&mut self, key: &TileKey) -> Option<&mut FaceSurface> {
        let c = self.current.as_mut()?;
        if c.scene_id != key.scene_id || c.level.index != key.level {
            return None;
        }
        let face = key.face()?;
        let n = c.level.tiles_per_side();
        if key.coord.col >= n || key.coord.row >= n {
            return None;
        }
        Some(&mut c.faces[face.index()])
    }

    fn finish_if_complete(&mut self) -> Option<[FaceImage; 6]> {
        if !self.current.as_ref().is_some_and(Composite::is_complete) {
            return None;
        }
        let done = self.current.take()?;
        Some(done.faces.map(|s| FaceImage {
            face: s.face,
            image: s.image,
        }))
    }

    /// Paint a loaded tile into its face.
    ///
    /// Tiles of another scene or level are ignored. Returns all six faces
    /// once every tile has been settled.
    pub fn add_tile(&mut self, key: &TileKey, tile: &RgbaImage) -> Option<[FaceImage; 6]> {
        let tile_size = self.current.as_ref()?.level.tile_size;
        let surface = self.surface_for(key)?;
        let x = i64::from(key.coord.col) * i64::from(tile_size);
        let y = i64::from(key.coord.row) * i64::from(tile_size);
        imageops::replace(&mut surface.image, tile, x, y);
        surface.settled.insert((key.coord.col, key.coord.row));
        self.finish_if_complete()
    }

    /// Count a failed tile towards completion; its region stays blank.
    pub fn add_failure(&mut self, key: &TileKey) -> Option<[FaceImage; 6]> {
        let surface = self.surface_for(key)?;
        surface.settled.insert((key.coord.col, key.coord.row));
        self.finish_if_complete()
    }
}

/// The six face textures currently on the cube.
#[derive(Debug, Default)]
pub struct CubeMaterials {
    installed: Option<(SceneId, u32, [FaceImage; 6])>,
}

impl CubeMaterials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a complete face set in one step. Returns the previous set.
    pub fn swap_all(
        &mut self,
        scene_id: SceneId,
        level: u32,
        faces: [FaceImage; 6],
    ) -> Option<[FaceImage; 6]> {
        self.installed
            .replace((scene_id, level, faces))
            .map(|(_, _, old)| old)
    }

    pub fn faces(&self) -> Option<&[FaceImage; 6]> {
        self.installed.as_ref().map(|(_, _, f)| f)
    }

    pub fn installed(&self) -> Option<(&SceneId, u32)> {
        self.installed.as_ref().map(|(s, l, _)| (s, *l))
    }

    pub fn clear(&mut self) -> Option<[FaceImage; 6]> {
        self.installed.take().map(|(_, _, f)| f)
    }
}
