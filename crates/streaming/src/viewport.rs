//! Which tiles a camera needs, and in what order.
//!
//! Equirect layout: column 0 starts at yaw -180 and columns advance with
//! yaw; row 0 is the top (pitch +90) band.

use std::collections::BTreeSet;

use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{angle_between, horizontal_fov};
use formats::manifest::{Face, LevelSpec, TileManifest};
use scene::camera::CameraState;

use crate::key::TileCoord;

/// Unwrapped pixel column of `yaw` on a level.
fn yaw_to_x(yaw: f64, level: &LevelSpec) -> f64 {
    (yaw + 180.0) / 360.0 * level.width as f64
}

fn pitch_to_y(pitch: f64, level: &LevelSpec) -> f64 {
    (90.0 - pitch.clamp(-90.0, 90.0)) / 180.0 * level.height as f64
}

/// Tile holding pixel `px`. The last tile of a row or column may be
/// narrower than `tile_size`.
fn first_tile(px: f64, tile_size: u32, count: u32) -> u32 {
    ((px.max(0.0) / tile_size as f64).floor() as u32).min(count - 1)
}

/// Last tile touched by a span ending at pixel `px` (exclusive).
fn last_tile(px: f64, tile_size: u32, count: u32) -> u32 {
    ((px / tile_size as f64).ceil() as u32)
        .saturating_sub(1)
        .min(count - 1)
}

fn all_equirect(level: &LevelSpec) -> BTreeSet<TileCoord> {
    (0..level.rows)
        .flat_map(|row| (0..level.cols).map(move |col| TileCoord::equirect(col, row)))
        .collect()
}

/// Equirect tiles intersecting the camera's view window.
///
/// The horizontal half-width is widened by `1/cos(latitude)` at the window
/// edge farthest from the equator; a window reaching a pole covers every
/// column. Grids of at most `full_grid_max_tiles` tiles are returned whole.
pub fn visible_tiles(
    camera: &CameraState,
    level: &LevelSpec,
    aspect: f64,
    full_grid_max_tiles: u32,
) -> BTreeSet<TileCoord> {
    if level.cols == 0 || level.rows == 0 {
        return BTreeSet::new();
    }
    if level.tile_count() <= full_grid_max_tiles {
        return all_equirect(level);
    }

    let half_v = camera.fov * 0.5;
    let top = camera.pitch + half_v;
    let bottom = camera.pitch - half_v;
    let touches_pole = top >= 90.0 || bottom <= -90.0;

    let r0 = first_tile(pitch_to_y(top, level), level.tile_size, level.rows);
    let r1 = last_tile(pitch_to_y(bottom, level), level.tile_size, level.rows).max(r0);

    let edge_lat = top.abs().max(bottom.abs());
    let half_h = horizontal_fov(camera.fov, aspect) * 0.5 / edge_lat.to_radians().cos();
    let columns = if touches_pole || !half_h.is_finite() || half_h >= 180.0 {
        (0..level.cols).collect()
    } else {
        window_columns(
            yaw_to_x(camera.yaw - half_h, level),
            yaw_to_x(camera.yaw + half_h, level),
            level,
        )
    };

    (r0..=r1)
        .flat_map(|row| columns.iter().map(move |&col| TileCoord::equirect(col, row)))
        .collect()
}

/// Columns covering pixel span `x0..x1`, which may run past either seam.
fn window_columns(x0: f64, x1: f64, level: &LevelSpec) -> BTreeSet<u32> {
    let width = level.width as f64;
    if x1 - x0 >= width {
        return (0..level.cols).collect();
    }
    let mut columns = BTreeSet::new();
    for shift in [-width, 0.0, width] {
        let a = (x0 + shift).max(0.0);
        let b = (x1 + shift).min(width);
        if a < b {
            let c0 = first_tile(a, level.tile_size, level.cols);
            let c1 = last_tile(b, level.tile_size, level.cols).max(c0);
            columns.extend(c0..=c1);
        }
    }
    if columns.is_empty() {
        columns.insert(first_tile(x0.rem_euclid(width), level.tile_size, level.cols));
    }
    columns
}

/// Manhattan distance (in tiles) from the tile under the view centre.
///
/// Column distance wraps around the seam.
pub fn tile_priority(camera: &CameraState, level: &LevelSpec, coord: TileCoord) -> u32 {
    if level.cols == 0 || level.rows == 0 {
        return 0;
    }
    let x = yaw_to_x(camera.yaw, level).rem_euclid(level.width as f64);
    let centre_col = first_tile(x, level.tile_size, level.cols);
    let centre_row = first_tile(pitch_to_y(camera.pitch, level), level.tile_size, level.rows);

    let dc = coord.col.abs_diff(centre_col);
    let dc = dc.min(level.cols - dc.min(level.cols));
    dc + coord.row.abs_diff(centre_row)
}

/// Every tile of every face of a cube level.
pub fn cube_tiles(level: &LevelSpec) -> Vec<TileCoord> {
    let n = level.tiles_per_side();
    Face::ALL
        .iter()
        .flat_map(|&face| (0..n).flat_map(move |row| (0..n).map(move |col| TileCoord::cube(face, col, row))))
        .collect()
}

/// Faces ordered by angle from the view direction, closest first.
pub fn face_ranking(camera: &CameraState) -> [Face; 6] {
    let dir = camera.direction();
    let mut faces = Face::ALL;
    faces.sort_by(|a, b| {
        stable_total_cmp_f64(angle_between(dir, a.normal()), angle_between(dir, b.normal()))
            .then_with(|| a.cmp(b))
    });
    faces
}

/// Face rank plus Manhattan distance from the face centre.
pub fn cube_tile_priority(ranking: &[Face; 6], level: &LevelSpec, coord: TileCoord) -> u32 {
    let rank = coord
        .face
        .and_then(|f| ranking.iter().position(|r| *r == f))
        .unwrap_or(ranking.len()) as u32;
    // Doubled coordinates keep the centre of even-sized faces integral.
    let span = level.tiles_per_side().saturating_sub(1);
    let dc = (2 * coord.col).abs_diff(span);
    let dr = (2 * coord.row).abs_diff(span);
    rank + (dc + dr) / 2
}

/// Tiles to request for the current view with their priorities, most
/// urgent first.
pub fn tiles_for_view(
    camera: &CameraState,
    manifest: &TileManifest,
    level: &LevelSpec,
    aspect: f64,
    full_grid_max_tiles: u32,
) -> Vec<(TileCoord, u32)> {
    let mut out: Vec<(TileCoord, u32)> = if manifest.is_cubemap() {
        let ranking = face_ranking(camera);
        cube_tiles(level)
            .into_iter()
            .map(|c| (c, cube_tile_priority(&ranking, level, c)))
            .collect()
    } else {
        visible_tiles(camera, level, aspect, full_grid_max_tiles)
            .into_iter()
            .map(|c| (c, tile_priority(camera, level, c)))
            .collect()
    };
    out.sort_by_key(|(c, p)| (*p, *c));
    out
}
