use formats::manifest::{Face, LevelSpec};
use image::{RgbaImage, imageops};
use streaming::key::TileCoord;
use streaming::pipeline::TileLoadError;

/// The part of the panorama mesh a tile texture covers.
///
/// `u`/`v` are normalized over the whole equirect image, or over one face
/// for cubemaps; `v` grows downwards.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshPatch {
    pub face: Option<Face>,
    pub level: u32,
    pub u0: f64,
    pub v0: f64,
    pub u1: f64,
    pub v1: f64,
}

impl MeshPatch {
    pub fn for_tile(level: &LevelSpec, coord: TileCoord) -> Self {
        let span = |i: u32, extent: u32| {
            let extent = extent.max(1) as f64;
            let a = (i as f64 * level.tile_size as f64).min(extent);
            let b = ((i + 1) as f64 * level.tile_size as f64).min(extent);
            (a / extent, b / extent)
        };
        let (u0, u1) = span(coord.col, level.width);
        let (v0, v1) = span(coord.row, level.height);
        Self {
            face: coord.face,
            level: level.index,
            u0,
            v0,
            u1,
            v1,
        }
    }

    /// Yaw bounds (deg) of an equirect patch.
    pub fn yaw_range(&self) -> (f64, f64) {
        (self.u0 * 360.0 - 180.0, self.u1 * 360.0 - 180.0)
    }

    /// Pitch bounds (deg) of an equirect patch, bottom first.
    pub fn pitch_range(&self) -> (f64, f64) {
        (90.0 - self.v1 * 180.0, 90.0 - self.v0 * 180.0)
    }
}

/// A decoded tile and the mesh patch it backs.
#[derive(Debug, Clone, PartialEq)]
pub struct TileTexture {
    pub image: RgbaImage,
    pub patch: MeshPatch,
}

impl TileTexture {
    /// Texture for a freshly decoded tile. Equirect tiles carry `overlap`
    /// extra pixels along each edge shared with a neighbour; those are
    /// cropped so the image spans exactly its patch.
    pub fn from_decoded(image: RgbaImage, level: &LevelSpec, coord: TileCoord, overlap: u32) -> Self {
        let image = if overlap == 0 || coord.face.is_some() {
            image
        } else {
            crop_overlap(image, level, coord, overlap)
        };
        Self {
            image,
            patch: MeshPatch::for_tile(level, coord),
        }
    }
}

fn crop_overlap(image: RgbaImage, level: &LevelSpec, coord: TileCoord, overlap: u32) -> RgbaImage {
    // (leading border, own extent) along one axis; the panorama's outer
    // edges carry no border.
    let axis = |i: u32, extent: u32| {
        let start = i.saturating_mul(level.tile_size).min(extent);
        let end = (i + 1).saturating_mul(level.tile_size).min(extent);
        (if start > 0 { overlap } else { 0 }, end - start)
    };
    let (left, own_w) = axis(coord.col, level.width);
    let (top, own_h) = axis(coord.row, level.height);
    let (w, h) = image.dimensions();
    if left >= w || top >= h {
        return image;
    }
    let (own_w, own_h) = (own_w.min(w - left), own_h.min(h - top));
    if (left, top, own_w, own_h) == (0, 0, w, h) {
        return image;
    }
    imageops::crop_imm(&image, left, top, own_w, own_h).to_image()
}

/// Decode a fetched JPEG/PNG tile to RGBA.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, TileLoadError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| TileLoadError::Decode {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn level(width: u32, height: u32, cols: u32, rows: u32) -> LevelSpec {
        LevelSpec {
            index: 2,
            width,
            height,
            tile_size: 512,
            cols,
            rows,
        }
    }

    #[test]
    fn patch_covers_tile_fraction() {
        let p = MeshPatch::for_tile(&level(2048, 1024, 4, 2), TileCoord::equirect(1, 1));
        assert_eq!((p.u0, p.u1, p.v0, p.v1), (0.25, 0.5, 0.5, 1.0));
        assert_eq!(p.yaw_range(), (-90.0, 0.0));
        assert_eq!(p.pitch_range(), (-90.0, 0.0));
        assert_eq!(p.level, 2);
    }

    #[test]
    fn partial_edge_tile_is_clipped() {
        let p = MeshPatch::for_tile(&level(1800, 900, 4, 2), TileCoord::equirect(3, 0));
        assert!((p.u0 - 1536.0 / 1800.0).abs() < 1e-12);
        assert_eq!(p.u1, 1.0);
    }

    #[test]
    fn overlap_border_is_cropped() {
        let l = level(1800, 900, 4, 2);
        // Interior tile: 2 px borders left, right and below.
        let img = RgbaImage::from_fn(516, 514, |x, y| {
            let own = (2..514).contains(&x) && y < 512;
            Rgba([if own { 200 } else { 0 }, 0, 0, 255])
        });
        let tex = TileTexture::from_decoded(img, &l, TileCoord::equirect(1, 0), 2);
        assert_eq!(tex.image.dimensions(), (512, 512));
        assert!(tex.image.pixels().all(|p| p.0[0] == 200));

        // Clipped corner tile: borders only toward its neighbours.
        let img = RgbaImage::from_fn(266, 390, |x, y| {
            Rgba([if x >= 2 && y >= 2 { 200 } else { 0 }, 0, 0, 255])
        });
        let tex = TileTexture::from_decoded(img, &l, TileCoord::equirect(3, 1), 2);
        assert_eq!(tex.image.dimensions(), (264, 388));
        assert!(tex.image.pixels().all(|p| p.0[0] == 200));
        assert_eq!(tex.patch.u1, 1.0);
    }

    #[test]
    fn zero_overlap_keeps_the_image() {
        let l = level(2048, 1024, 4, 2);
        let img = RgbaImage::from_pixel(512, 512, Rgba([1, 2, 3, 255]));
        let tex = TileTexture::from_decoded(img.clone(), &l, TileCoord::equirect(2, 1), 0);
        assert_eq!(tex.image, img);
    }

    #[test]
    fn decodes_png_and_rejects_garbage() {
        let src = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        src.write_to(&mut buf, ImageFormat::Png).expect("encode");

        let decoded = decode_rgba(buf.get_ref()).expect("decode");
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1), &Rgba([10, 20, 30, 255]));

        assert!(matches!(
            decode_rgba(b"not an image"),
            Err(TileLoadError::Decode { .. })
        ));
    }
}
