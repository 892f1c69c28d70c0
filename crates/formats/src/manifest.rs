//! Per-scene tile pyramid description.
//!
//! The upload pipeline emits one manifest per scene. It is parsed once,
//! normalized (levels sorted by resolution) and validated; after that it is
//! immutable and shared by the level selector, the viewport calculator and
//! the URL builder.

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestKind {
    EquirectMultires,
    Cubemap,
}

impl ManifestKind {
    fn from_type_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "multires" | "equirect-multires" | "equirect" => Some(Self::EquirectMultires),
            "cubemap" | "cube" => Some(Self::Cubemap),
            _ => None,
        }
    }
}

/// One of the six faces of a cube-mapped panorama.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
        Face::Up,
        Face::Down,
    ];

    /// Single-letter code used in tile file names.
    pub fn code(self) -> &'static str {
        match self {
            Face::Front => "f",
            Face::Back => "b",
            Face::Left => "l",
            Face::Right => "r",
            Face::Up => "u",
            Face::Down => "d",
        }
    }

    /// Position in [`Face::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Outward direction of the face centre as seen from inside the cube.
    pub fn normal(self) -> Vec3 {
        match self {
            Face::Front => Vec3::new(0.0, 0.0, -1.0),
            Face::Back => Vec3::new(0.0, 0.0, 1.0),
            Face::Left => Vec3::new(-1.0, 0.0, 0.0),
            Face::Right => Vec3::new(1.0, 0.0, 0.0),
            Face::Up => Vec3::new(0.0, 1.0, 0.0),
            Face::Down => Vec3::new(0.0, -1.0, 0.0),
        }
    }
}

/// One resolution tier of the pyramid.
///
/// For cubemaps `width == height` is the face size and `cols == rows` is the
/// number of tiles per face side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub cols: u32,
    pub rows: u32,
}

impl LevelSpec {
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Tiles in the level (per face for cubemaps).
    pub fn tile_count(&self) -> u32 {
        self.cols * self.rows
    }

    pub fn face_size(&self) -> u32 {
        self.width
    }

    pub fn tiles_per_side(&self) -> u32 {
        self.cols
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileManifest {
    pub kind: ManifestKind,
    pub original_width: u32,
    pub original_height: u32,
    pub tile_size: u32,
    /// Pixel overlap between neighbouring equirect tiles; zero for cubemaps.
    pub overlap: u32,
    pub preview_url: Option<String>,
    /// Ascending by resolution, never empty.
    pub levels: Vec<LevelSpec>,
}

impl TileManifest {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn base_level(&self) -> &LevelSpec {
        &self.levels[0]
    }

    pub fn top_level(&self) -> &LevelSpec {
        &self.levels[self.levels.len() - 1]
    }

    pub fn level(&self, index: u32) -> Option<&LevelSpec> {
        self.levels.iter().find(|l| l.index == index)
    }

    pub fn is_cubemap(&self) -> bool {
        self.kind == ManifestKind::Cubemap
    }
}

#[derive(Debug)]
pub enum ManifestError {
    Json(serde_json::Error),
    MissingType,
    UnknownType(String),
    NoLevels,
    MissingField {
        /// Position of the level in the input list.
        level: usize,
        field: &'static str,
    },
    ZeroField {
        level: usize,
        field: &'static str,
    },
    NonSquareFace {
        level: u32,
    },
    InvalidBaseLevel(u32),
    NonContiguousLevels {
        expected: u32,
        found: u32,
    },
    NonIncreasingResolution {
        level: u32,
    },
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Json(e) => write!(f, "manifest is not valid JSON: {e}"),
            ManifestError::MissingType => write!(f, "manifest has no `type`"),
            ManifestError::UnknownType(t) => write!(f, "unsupported manifest type `{t}`"),
            ManifestError::NoLevels => write!(f, "manifest has no levels"),
            ManifestError::MissingField { level, field } => {
                write!(f, "level #{level} is missing `{field}`")
            }
            ManifestError::ZeroField { level, field } => {
                write!(f, "level #{level} has zero `{field}`")
            }
            ManifestError::NonSquareFace { level } => {
                write!(f, "cubemap level {level} is not square")
            }
            ManifestError::InvalidBaseLevel(base) => {
                write!(f, "lowest level index must be 0 or 1, got {base}")
            }
            ManifestError::NonContiguousLevels { expected, found } => {
                write!(f, "level indices not contiguous: expected {expected}, found {found}")
            }
            ManifestError::NonIncreasingResolution { level } => {
                write!(f, "level {level} does not increase resolution")
            }
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(rename = "type")]
    kind: Option<String>,
    original_width: Option<u32>,
    original_height: Option<u32>,
    tile_size: Option<u32>,
    overlap: Option<u32>,
    #[serde(alias = "previewUrl")]
    preview: Option<String>,
    #[serde(default)]
    levels: Vec<RawLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLevel {
    #[serde(alias = "levelIndex")]
    level: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    size: Option<u32>,
    tile_size: Option<u32>,
    cols: Option<u32>,
    rows: Option<u32>,
    tiles: Option<u32>,
}

fn required(value: Option<u32>, level: usize, field: &'static str) -> Result<u32, ManifestError> {
    match value {
        None => Err(ManifestError::MissingField { level, field }),
        Some(0) => Err(ManifestError::ZeroField { level, field }),
        Some(v) => Ok(v),
    }
}

impl RawLevel {
    fn into_spec(
        self,
        position: usize,
        kind: ManifestKind,
        default_tile_size: Option<u32>,
    ) -> Result<LevelSpec, ManifestError> {
        let index = self.level.ok_or(ManifestError::MissingField {
            level: position,
            field: "level",
        })?;
        let tile_size = required(self.tile_size.or(default_tile_size), position, "tileSize")?;

        match kind {
            ManifestKind::Cubemap => {
                let size = required(self.size.or(self.width), position, "size")?;
                let tiles = required(self.tiles.or(self.cols), position, "tiles")?;
                if self.height.is_some_and(|h| h != size) || self.rows.is_some_and(|r| r != tiles) {
                    return Err(ManifestError::NonSquareFace { level: index });
                }
                Ok(LevelSpec {
                    index,
                    width: size,
                    height: size,
                    tile_size,
                    cols: tiles,
                    rows: tiles,
                })
            }
            ManifestKind::EquirectMultires => Ok(LevelSpec {
                index,
                width: required(self.width, position, "width")?,
                height: required(self.height, position, "height")?,
                tile_size,
                cols: required(self.cols, position, "cols")?,
                rows: required(self.rows, position, "rows")?,
            }),
        }
    }
}

/// Parse and validate a tile manifest.
pub fn parse_manifest(raw: &str) -> Result<TileManifest, ManifestError> {
    let raw: RawManifest = serde_json::from_str(raw).map_err(ManifestError::Json)?;

    let tag = raw.kind.ok_or(ManifestError::MissingType)?;
    let kind = ManifestKind::from_type_tag(&tag).ok_or(ManifestError::UnknownType(tag))?;

    if raw.levels.is_empty() {
        return Err(ManifestError::NoLevels);
    }

    let mut levels = raw
        .levels
        .into_iter()
        .enumerate()
        .map(|(pos, l)| l.into_spec(pos, kind, raw.tile_size))
        .collect::<Result<Vec<_>, _>>()?;

    // Producers do not agree on ordering; normalize before validating.
    levels.sort_by_key(|l| (l.pixels(), l.index));
    validate_levels(&levels)?;

    let top = levels[levels.len() - 1];
    let base_tile_size = levels[0].tile_size;

    Ok(TileManifest {
        kind,
        original_width: raw.original_width.unwrap_or(top.width),
        original_height: raw.original_height.unwrap_or(top.height),
        tile_size: raw.tile_size.unwrap_or(base_tile_size),
        overlap: match kind {
            ManifestKind::EquirectMultires => raw.overlap.unwrap_or(0),
            ManifestKind::Cubemap => 0,
        },
        preview_url: raw.preview.filter(|p| !p.is_empty()),
        levels,
    })
}

fn validate_levels(levels: &[LevelSpec]) -> Result<(), ManifestError> {
    let base = levels[0].index;
    if base > 1 {
        return Err(ManifestError::InvalidBaseLevel(base));
    }

    for pair in levels.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hi.index != lo.index + 1 {
            return Err(ManifestError::NonContiguousLevels {
                expected: lo.index + 1,
                found: hi.index,
            });
        }
        if hi.pixels() <= lo.pixels() {
            return Err(ManifestError::NonIncreasingResolution { level: hi.index });
        }
    }
    Ok(())
}
