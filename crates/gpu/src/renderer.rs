use formats::hotspot::Hotspot;
use formats::manifest::Face;
use foundation::ids::SceneId;
use scene::camera::CameraState;
use streaming::key::TileKey;

use crate::compositor::CubeMaterials;
use crate::texture::{MeshPatch, TileTexture};

/// Camera parameters for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanoCamera {
    pub yaw: f64,
    pub pitch: f64,
    pub fov: f64,
    /// Panorama mesh scale; shrinks while walking towards a hotspot.
    pub mesh_scale: f64,
}

impl PanoCamera {
    pub fn from_state(state: &CameraState, mesh_scale: f64) -> Self {
        Self {
            yaw: state.yaw,
            pitch: state.pitch,
            fov: state.fov,
            mesh_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Low-resolution fallback covering the whole sphere.
    Preview { url: String },
    SphereTile { key: TileKey, patch: MeshPatch },
    CubeFace { face: Face, level: u32 },
    Hotspot {
        id: String,
        yaw: f64,
        pitch: f64,
        hovered: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub camera: PanoCamera,
    pub commands: Vec<RenderCommand>,
}

/// Everything the renderer reads for one frame.
pub struct SceneView<'a> {
    pub scene_id: &'a SceneId,
    pub preview_url: Option<&'a str>,
    pub tiles: Vec<(&'a TileKey, &'a TileTexture)>,
    pub cube: &'a CubeMaterials,
    pub hotspots: &'a [Hotspot],
    pub hovered: Option<&'a str>,
}

pub struct Renderer;

impl Renderer {
    /// Back-to-front draw list: preview, then tiles coarse to fine (or the
    /// installed cube faces), then hotspot sprites.
    pub fn collect(view: &SceneView<'_>, camera: PanoCamera) -> RenderFrame {
        let mut commands = Vec::new();

        if let Some(url) = view.preview_url {
            commands.push(RenderCommand::Preview {
                url: url.to_string(),
            });
        }

        if let Some(faces) = view
            .cube
            .installed()
            .filter(|(scene, _)| *scene == view.scene_id)
            .and_then(|(_, level)| view.cube.faces().map(|f| (level, f)))
            .map(|(level, faces)| faces.iter().map(move |f| (f.face, level)))
        {
            commands.extend(faces.map(|(face, level)| RenderCommand::CubeFace { face, level }));
        }

        let mut tiles: Vec<&(&TileKey, &TileTexture)> = view
            .tiles
            .iter()
            .filter(|(k, _)| &k.scene_id == view.scene_id && k.face().is_none())
            .collect();
        tiles.sort_by(|(a, _), (b, _)| a.level.cmp(&b.level).then_with(|| a.cmp(b)));
        commands.extend(tiles.into_iter().map(|(key, tex)| RenderCommand::SphereTile {
            key: (*key).clone(),
            patch: tex.patch,
        }));

        commands.extend(view.hotspots.iter().map(|h| RenderCommand::Hotspot {
            id: h.id.clone(),
            yaw: h.yaw,
            pitch: h.pitch,
            hovered: view.hovered == Some(h.id.as_str()),
        }));

        RenderFrame { camera, commands }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::FaceImage;
    use formats::hotspot::HotspotKind;
    use formats::manifest::LevelSpec;
    use image::RgbaImage;
    use streaming::key::TileCoord;

    fn texture(level: u32, col: u32) -> (TileKey, TileTexture) {
        let spec = LevelSpec {
            index: level,
            width: 2048,
            height: 1024,
            tile_size: 512,
            cols: 4,
            rows: 2,
        };
        let coord = TileCoord::equirect(col, 0);
        (
            TileKey::new(SceneId::from("lobby"), level, coord),
            TileTexture::from_decoded(RgbaImage::new(1, 1), &spec, coord, 0),
        )
    }

    #[test]
    fn draws_preview_tiles_coarse_to_fine_then_hotspots() {
        let scene = SceneId::from("lobby");
        let fine = texture(2, 0);
        let coarse = texture(0, 3);
        let cube = CubeMaterials::new();
        let hotspots = vec![Hotspot {
            id: "door".to_string(),
            kind: HotspotKind::Navigation,
            yaw: 10.0,
            pitch: 0.0,
            target_scene_id: None,
            target_yaw: None,
            target_pitch: None,
            payload: None,
        }];
        let view = SceneView {
            scene_id: &scene,
            preview_url: Some("http://host/p.jpg"),
            tiles: vec![(&fine.0, &fine.1), (&coarse.0, &coarse.1)],
            cube: &cube,
            hotspots: &hotspots,
            hovered: Some("door"),
        };
        let cam = PanoCamera::from_state(&CameraState::new(0.0, 0.0, 75.0), 1.0);
        let frame = Renderer::collect(&view, cam);

        assert!(matches!(&frame.commands[0], RenderCommand::Preview { url } if url == "http://host/p.jpg"));
        assert!(matches!(&frame.commands[1], RenderCommand::SphereTile { key, .. } if key.level == 0));
        assert!(matches!(&frame.commands[2], RenderCommand::SphereTile { key, .. } if key.level == 2));
        assert!(matches!(&frame.commands[3], RenderCommand::Hotspot { hovered: true, .. }));
        assert_eq!(frame.commands.len(), 4);
    }

    #[test]
    fn installed_cube_faces_are_drawn_for_their_scene_only() {
        let scene = SceneId::from("hall");
        let mut cube = CubeMaterials::new();
        cube.swap_all(
            scene.clone(),
            1,
            Face::ALL.map(|face| FaceImage {
                face,
                image: RgbaImage::new(2, 2),
            }),
        );
        let view = SceneView {
            scene_id: &scene,
            preview_url: None,
            tiles: Vec::new(),
            cube: &cube,
            hotspots: &[],
            hovered: None,
        };
        let cam = PanoCamera::from_state(&CameraState::new(0.0, 0.0, 75.0), 0.8);
        let frame = Renderer::collect(&view, cam);
        assert_eq!(frame.commands.len(), 6);
        assert_eq!(frame.camera.mesh_scale, 0.8);

        let other = SceneId::from("yard");
        let view = SceneView {
            scene_id: &other,
            ..view
        };
        assert!(Renderer::collect(&view, cam).commands.is_empty());
    }
}
