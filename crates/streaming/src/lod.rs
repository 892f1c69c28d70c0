//! Level-of-detail selection.
//!
//! Narrower fields of view select finer pyramid levels. Small pyramids use
//! fixed fov breakpoint tables; deeper ones pick the coarsest level that
//! still gives one texel per screen pixel.

use formats::manifest::TileManifest;

/// Breakpoints (deg), descending. Fov below entry `i` selects position `i + 1`.
fn breakpoints(level_count: usize) -> Option<&'static [f64]> {
    match level_count {
        0 | 1 => Some(&[]),
        2 => Some(&[60.0]),
        3 => Some(&[75.0, 40.0]),
        4 => Some(&[80.0, 60.0, 35.0]),
        5 => Some(&[85.0, 65.0, 45.0, 25.0]),
        _ => None,
    }
}

/// Position (0 = coarsest) in the manifest's ascending level list.
fn select_position(fov: f64, manifest: &TileManifest, viewport_width_px: u32) -> usize {
    let count = manifest.level_count();
    if count <= 1 {
        return 0;
    }
    let top = count - 1;

    if let Some(table) = breakpoints(count) {
        return table.iter().filter(|bp| fov < **bp).count().min(top);
    }

    if fov.is_nan() || fov <= 0.0 {
        return top;
    }
    let needed = viewport_width_px as f64 * 360.0 / fov;
    manifest
        .levels
        .iter()
        .position(|l| l.width as f64 >= needed)
        .unwrap_or(top)
}

/// Level index for `fov` (vertical degrees).
///
/// Pure and monotonic: for a fixed manifest a smaller fov never selects a
/// coarser level.
pub fn select_level(fov: f64, manifest: &TileManifest, viewport_width_px: u32) -> u32 {
    let pos = select_position(fov, manifest, viewport_width_px);
    manifest.levels[pos].index
}

/// Level selection with hysteresis against flicker at breakpoints.
///
/// Upgrades happen as soon as the fov crosses a breakpoint. Downgrades wait
/// until the fov is `hysteresis_deg` past it.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSelector {
    hysteresis_deg: f64,
    current: Option<usize>,
}

impl LevelSelector {
    pub fn new(hysteresis_deg: f64) -> Self {
        Self {
            hysteresis_deg: hysteresis_deg.max(0.0),
            current: None,
        }
    }

    /// Forget the current level, e.g. on scene change.
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn update(&mut self, fov: f64, manifest: &TileManifest, viewport_width_px: u32) -> u32 {
        let wanted = select_position(fov, manifest, viewport_width_px);
        let pos = match self.current {
            Some(cur) if wanted < cur => {
                let relaxed = select_position(fov - self.hysteresis_deg, manifest, viewport_width_px);
                relaxed.min(cur)
            }
            _ => wanted,
        };
        let pos = pos.min(manifest.level_count().saturating_sub(1));
        self.current = Some(pos);
        manifest.levels[pos].index
    }
}
