//! The viewer instance: one per embedded panorama.
//!
//! A `Viewer` owns the camera, tile streamer, compositor and any running
//! transition. The host drives it with [`Viewer::tick`] once per frame,
//! forwards input, drains [`LoaderCommand`]s to perform fetches and feeds
//! the results back. Nothing here blocks or spawns; all mutation happens on
//! the caller's thread.

use std::collections::{BTreeMap, BTreeSet};

use foundation::ids::SceneId;
use foundation::math::Vec2;
use foundation::time::Time;
use formats::manifest::TileManifest;
use formats::scene_record::SceneRecord;
use gpu::compositor::{CubeMaterials, FaceCompositor};
use gpu::renderer::{PanoCamera, RenderFrame, Renderer, SceneView};
use gpu::texture::TileTexture;
use image::RgbaImage;
use runtime::event_bus::{Event, EventBus};
use runtime::frame::Frame;
use runtime::metrics::Metrics;
use runtime::throttle::Throttle;
use scene::camera::{CameraController, CameraState};
use scene::picking::{ClickOutcome, Viewport, pick_click, pick_hover, screen_ray};
use scene::transition::{NavigationTransition, TransitionPhase};
use streaming::key::TileKey;
use streaming::pipeline::{LoadProgress, TileLoadError, TileOutcome, TileStreamer};
use streaming::request::LoadTicket;
use streaming::lod::LevelSelector;
use streaming::viewport::tiles_for_view;
use tracing::{debug, info, warn};

use crate::commands::{LoaderCommand, SceneLoadError};
use crate::config::ViewerConfig;
use crate::events::ViewerEvent;

/// A fetched scene: its record, and its manifest unless that was unusable.
#[derive(Debug, Clone)]
struct SceneData {
    manifest: Option<TileManifest>,
    record: SceneRecord,
}

#[derive(Debug)]
struct ActiveScene {
    id: SceneId,
    base: LoadProgress,
    level: Option<u32>,
    last_percent: Option<u8>,
}

#[derive(Debug)]
struct TransitionRun {
    from: SceneId,
    nav: NavigationTransition,
    preload: Option<LoadProgress>,
    last_percent: Option<u8>,
}

/// What the pose looks like when entering a scene.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Arrival {
    yaw: f64,
    pitch: f64,
    fov: Option<f64>,
}

pub struct Viewer {
    config: ViewerConfig,
    viewport: Viewport,
    camera: CameraController,
    mesh_scale: f64,
    streamer: TileStreamer<TileTexture>,
    selector: LevelSelector,
    compositor: FaceCompositor,
    cube: CubeMaterials,
    scenes: BTreeMap<SceneId, SceneData>,
    requested: BTreeSet<SceneId>,
    active: Option<ActiveScene>,
    /// Scene asked for by `load_scene` whose data has not arrived yet.
    pending_load: Option<SceneId>,
    transition: Option<TransitionRun>,
    tile_throttle: Throttle,
    camera_throttle: Throttle,
    last_camera: Option<(f64, f64, f64)>,
    pointer_down_at: Option<Vec2>,
    hovered: Option<String>,
    frame: Frame,
    commands: Vec<LoaderCommand>,
    events: EventBus<ViewerEvent>,
}

fn pose_changed(a: (f64, f64, f64), b: (f64, f64, f64)) -> bool {
    const EPS: f64 = 1e-6;
    (a.0 - b.0).abs() > EPS || (a.1 - b.1).abs() > EPS || (a.2 - b.2).abs() > EPS
}

/// Base-level tiles of a scene with their priorities.
fn base_requests(
    scene: &SceneId,
    manifest: &TileManifest,
    camera: &CameraState,
    aspect: f64,
) -> Vec<(TileKey, u32)> {
    let base = manifest.base_level();
    tiles_for_view(camera, manifest, base, aspect, u32::MAX)
        .into_iter()
        .map(|(coord, p)| (TileKey::new(scene.clone(), base.index, coord), p))
        .collect()
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let mut camera = CameraController::new(config.camera);
        camera.set_autoplay(config.autoplay);
        Self {
            viewport: Viewport::new(
                config.viewport_width_px as f64,
                config.viewport_height_px as f64,
            ),
            camera,
            mesh_scale: 1.0,
            streamer: TileStreamer::new(config.streaming.clone()),
            selector: LevelSelector::new(config.streaming.lod_hysteresis_deg),
            compositor: FaceCompositor::new(),
            cube: CubeMaterials::new(),
            scenes: BTreeMap::new(),
            requested: BTreeSet::new(),
            active: None,
            pending_load: None,
            transition: None,
            tile_throttle: Throttle::from_millis(config.streaming.tile_update_interval_ms),
            camera_throttle: Throttle::from_millis(config.camera_event_interval_ms),
            last_camera: None,
            pointer_down_at: None,
            hovered: None,
            frame: Frame::new(0, 0.0),
            commands: Vec::new(),
            events: EventBus::new(),
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraState {
        self.camera.state()
    }

    pub fn active_scene(&self) -> Option<&SceneId> {
        self.active.as_ref().map(|a| &a.id)
    }

    pub fn current_level(&self) -> Option<u32> {
        self.active.as_ref().and_then(|a| a.level)
    }

    pub fn transition_phase(&self) -> TransitionPhase {
        self.transition
            .as_ref()
            .map(|t| t.nav.phase())
            .unwrap_or(TransitionPhase::Idle)
    }

    pub fn hovered_hotspot(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn metrics(&self) -> &Metrics {
        self.streamer.metrics()
    }

    pub fn cached_tiles(&self) -> usize {
        self.streamer.cache().len()
    }

    pub fn tiles_in_flight(&self) -> usize {
        self.streamer.in_flight_len()
    }

    pub fn cube_materials(&self) -> &CubeMaterials {
        &self.cube
    }

    pub fn now(&self) -> Time {
        self.frame.time
    }

    pub fn drain_commands(&mut self) -> Vec<LoaderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn drain_events(&mut self) -> Vec<Event<ViewerEvent>> {
        self.events.drain()
    }

    fn emit(&mut self, event: ViewerEvent) {
        self.events.emit(self.frame, event);
    }

    pub fn set_viewport(&mut self, width_px: f64, height_px: f64) {
        self.viewport = Viewport::new(width_px, height_px);
        self.tile_throttle.force();
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        if !enabled && self.camera.pause_autoplay() {
            self.emit(ViewerEvent::AutoplayPaused);
        } else if enabled {
            self.camera.set_autoplay(true);
        }
    }

    fn request_scene_data(&mut self, scene: &SceneId) {
        if self.scenes.contains_key(scene) || !self.requested.insert(scene.clone()) {
            return;
        }
        let urls = &self.config.urls;
        self.commands.push(LoaderCommand::FetchScene {
            scene_id: scene.clone(),
            manifest_url: urls.manifest(scene),
            record_url: urls.scene_record(scene),
        });
    }

    /// Show `scene` directly, without a transition.
    pub fn load_scene(&mut self, scene: impl Into<SceneId>) {
        let scene = scene.into();
        if self.active.as_ref().is_some_and(|a| a.id == scene) {
            return;
        }
        if let Some(run) = self.transition.take() {
            debug!("load_scene({scene}) cancels transition to {}", run.nav.target_scene());
            self.mesh_scale = 1.0;
            drop(self.streamer.abandon_preload());
        }
        if self.scenes.contains_key(&scene) {
            self.pending_load = None;
            self.enter_scene(scene, None);
        } else {
            self.request_scene_data(&scene);
            self.pending_load = Some(scene);
        }
    }

    /// Deliver a scene's manifest and record.
    ///
    /// An unusable manifest leaves the scene on its preview image; an
    /// unusable record leaves it without hotspots. Both raise a
    /// `LoadWarning`.
    pub fn on_scene_fetched(
        &mut self,
        scene: SceneId,
        manifest: Result<TileManifest, SceneLoadError>,
        record: Result<SceneRecord, SceneLoadError>,
    ) {
        self.requested.remove(&scene);
        let manifest = match manifest {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("scene {scene}: {e}; showing preview only");
                self.emit(ViewerEvent::LoadWarning {
                    scene_id: scene.clone(),
                    message: format!("panorama unavailable, showing preview: {e}"),
                });
                None
            }
        };
        let record = record.unwrap_or_else(|e| {
            warn!("scene {scene}: {e}; no hotspots");
            self.events.emit(
                self.frame,
                ViewerEvent::LoadWarning {
                    scene_id: scene.clone(),
                    message: format!("hotspots unavailable: {e}"),
                },
            );
            SceneRecord::bare(scene.clone())
        });
        self.scenes
            .insert(scene.clone(), SceneData { manifest, record });

        if self.pending_load.as_ref() == Some(&scene) {
            self.pending_load = None;
            self.enter_scene(scene, None);
        } else if self
            .transition
            .as_ref()
            .is_some_and(|t| t.nav.target_scene() == &scene)
        {
            self.start_preload();
        }
    }

    /// Deliver the result of a `FetchTile` command.
    pub fn on_tile_loaded(&mut self, ticket: LoadTicket, result: Result<RgbaImage, TileLoadError>) {
        let level = self
            .scenes
            .get(&ticket.key.scene_id)
            .and_then(|s| s.manifest.as_ref())
            .and_then(|m| Some((m.level(ticket.key.level)?, m.overlap)));
        let result = match (result, level) {
            (Ok(image), Some((level, overlap))) => Ok(TileTexture::from_decoded(
                image,
                level,
                ticket.key.coord,
                overlap,
            )),
            (Ok(_), None) => Err(TileLoadError::Decode {
                message: format!("no level {} in manifest", ticket.key.level),
            }),
            (Err(e), _) => Err(e),
        };

        let now = self.frame.time;
        match self.streamer.complete(ticket, result, now) {
            TileOutcome::Stored { key, evicted } => {
                drop(evicted);
                self.settle(&key);
                let image = self.streamer.cache().get(&key).map(|t| &t.image);
                if let Some(faces) = image.and_then(|img| self.compositor.add_tile(&key, img)) {
                    drop(self.cube.swap_all(key.scene_id.clone(), key.level, faces));
                    debug!("cube faces for {}@l{} installed", key.scene_id, key.level);
                }
            }
            TileOutcome::Failed { key, .. } => {
                self.settle(&key);
                if let Some(faces) = self.compositor.add_failure(&key) {
                    drop(self.cube.swap_all(key.scene_id.clone(), key.level, faces));
                }
            }
            TileOutcome::Stale { .. } => {}
        }
        self.dispatch();
    }

    fn settle(&mut self, key: &TileKey) {
        if let Some(active) = self.active.as_mut()
            && active.id == key.scene_id
        {
            active.base.settle(key);
        }
        if let Some(run) = self.transition.as_mut()
            && run.nav.target_scene() == &key.scene_id
            && let Some(progress) = run.preload.as_mut()
            && progress.settle(key)
            && progress.is_done()
        {
            debug!("preload of {} complete", key.scene_id);
            run.nav.preload_finished();
        }
    }

    fn start_preload(&mut self) {
        let aspect = self.viewport.aspect();
        let Some(run) = self.transition.as_mut() else {
            return;
        };
        let target = run.nav.target_scene().clone();
        let Some(data) = self.scenes.get(&target) else {
            return;
        };
        let Some(manifest) = &data.manifest else {
            // Nothing to preload; the destination will show its preview.
            run.nav.preload_finished();
            return;
        };

        drop(self.streamer.begin_preload(target.clone()));
        let requests = base_requests(&target, manifest, self.camera.state(), aspect);
        let mut progress = LoadProgress::new(requests.iter().map(|(k, _)| k.clone()));
        for (key, priority) in requests {
            if self.streamer.is_settled(&key) {
                progress.settle(&key);
            } else {
                self.streamer.request(key, priority);
            }
        }
        debug!("preloading {} base tiles of {target}", progress.total());
        if progress.is_done() {
            run.nav.preload_finished();
        }
        run.preload = Some(progress);
        self.dispatch();
    }

    /// Make `scene` active. Its data must already be in `self.scenes`.
    fn enter_scene(&mut self, scene: SceneId, arrival: Option<Arrival>) {
        let Some(data) = self.scenes.get(&scene) else {
            return;
        };
        let previous = self.active.as_ref().map(|a| a.id.clone());

        let (generation, evicted) = self.streamer.activate(scene.clone());
        drop(evicted);
        self.selector.reset();
        self.compositor.abandon();
        drop(self.cube.clear());
        self.hovered = None;
        self.mesh_scale = 1.0;

        let arrival = arrival.unwrap_or_else(|| match data.record.initial_view {
            Some(v) => Arrival {
                yaw: v.yaw,
                pitch: v.pitch,
                fov: v.fov,
            },
            None => Arrival {
                yaw: 0.0,
                pitch: 0.0,
                fov: None,
            },
        });
        if let Some(m) = &data.manifest {
            self.camera
                .set_fov_range(self.config.camera.fov_range_for(m.kind));
        }
        self.camera.look_at(
            arrival.yaw,
            arrival.pitch,
            Some(arrival.fov.unwrap_or(self.config.camera.default_fov)),
        );

        let mut base = LoadProgress::default();
        if let Some(m) = &data.manifest {
            let requests = base_requests(&scene, m, self.camera.state(), self.viewport.aspect());
            base = LoadProgress::new(requests.iter().map(|(k, _)| k.clone()));
            for (key, priority) in requests {
                if self.streamer.is_settled(&key) {
                    base.settle(&key);
                } else {
                    self.streamer.request(key, priority);
                }
            }
        }

        info!("entered scene {scene} (generation {})", generation.0);
        self.active = Some(ActiveScene {
            id: scene.clone(),
            base,
            level: None,
            last_percent: None,
        });
        self.tile_throttle.force();
        self.camera_throttle.force();
        self.emit(ViewerEvent::SceneChanged {
            scene_id: scene,
            previous,
        });
        self.update_view();
        self.dispatch();
    }

    fn dispatch(&mut self) {
        for ticket in self.streamer.dispatch() {
            let key = &ticket.key;
            let url = self.config.urls.tile(
                &key.scene_id,
                key.face(),
                key.level,
                key.coord.col,
                key.coord.row,
            );
            self.commands.push(LoaderCommand::FetchTile { ticket, url });
        }
    }

    /// Recompute wanted tiles for the current pose and sweep the cache.
    fn update_view(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(manifest) = self
            .scenes
            .get(&active.id)
            .and_then(|s| s.manifest.as_ref())
        else {
            return;
        };

        let state = *self.camera.state();
        // A running walk narrows the fov; the scene being left keeps its level.
        let level_index = match (self.transition.is_some(), active.level) {
            (true, Some(held)) => held,
            _ => self
                .selector
                .update(state.fov, manifest, self.viewport.width_px.round() as u32),
        };
        let Some(level) = manifest.level(level_index).copied() else {
            return;
        };
        if active.level != Some(level_index) {
            debug!("scene {} now at level {level_index}", active.id);
            active.level = Some(level_index);
        }

        let mut retained: BTreeSet<TileKey> = BTreeSet::new();
        let wanted = tiles_for_view(
            &state,
            manifest,
            &level,
            self.viewport.aspect(),
            self.config.streaming.full_grid_max_tiles,
        );
        for (coord, priority) in wanted {
            let key = TileKey::new(active.id.clone(), level.index, coord);
            retained.insert(key.clone());
            self.streamer.request(key, priority);
        }
        for (key, priority) in base_requests(&active.id, manifest, &state, self.viewport.aspect()) {
            retained.insert(key.clone());
            self.streamer.request(key, priority);
        }
        if let Some(preload) = self.streamer.preloading() {
            let scene = preload.scene_id.clone();
            retained.extend(self.streamer.cache().keys().filter(|k| k.scene_id == scene).cloned());
        }

        if manifest.is_cubemap() {
            // Nothing on the cube yet: the base faces come first.
            let showing = self
                .cube
                .installed()
                .is_some_and(|(scene, _)| *scene == active.id);
            let build = if showing { level } else { *manifest.base_level() };
            let target = (&active.id, build.index);
            let building = self.compositor.target() == Some(target);
            let installed = self.cube.installed() == Some(target);
            if !building && !installed {
                self.compositor.begin(active.id.clone(), build);
                let mut done = None;
                for key in retained.iter().filter(|k| k.scene_id == active.id && k.level == build.index) {
                    let step = match self.streamer.cache().get(key) {
                        Some(tex) => self.compositor.add_tile(key, &tex.image),
                        None if self.streamer.is_settled(key) => self.compositor.add_failure(key),
                        None => None,
                    };
                    done = done.or(step);
                }
                if let Some(faces) = done {
                    debug!("cube faces for {}@l{} installed", active.id, build.index);
                    drop(self.cube.swap_all(active.id.clone(), build.index, faces));
                }
            }
        }

        let now = self.frame.time;
        let evicted = self.streamer.sweep(&retained, now);
        if !evicted.is_empty() {
            debug!("evicted {} tiles", evicted.len());
        }
    }

    /// Advance one frame.
    pub fn tick(&mut self, frame: Frame) {
        self.frame = frame;
        let now = frame.time;

        let mut commit = false;
        if let Some(run) = self.transition.as_mut() {
            let step = run.nav.advance(now);
            self.camera.set_pose(step.pose.yaw, step.pose.pitch, step.pose.fov);
            self.mesh_scale = step.mesh_scale;
            commit = run.nav.is_ready();
        } else {
            self.camera.update(frame.dt_s);
        }
        if commit {
            self.commit_transition();
        }

        if self.tile_throttle.ready(now) {
            self.update_view();
        }
        self.dispatch();
        self.emit_progress();

        if self.camera_throttle.ready(now) {
            let s = self.camera.state();
            let pose = (s.yaw, s.pitch, s.fov);
            if self.last_camera.is_none_or(|last| pose_changed(last, pose)) {
                self.last_camera = Some(pose);
                self.emit(ViewerEvent::CameraChanged {
                    yaw: pose.0,
                    pitch: pose.1,
                    fov: pose.2,
                });
            }
        }
    }

    fn emit_progress(&mut self) {
        let mut out = Vec::new();
        if let Some(active) = self.active.as_mut() {
            let percent = active.base.percent();
            if active.last_percent != Some(percent) {
                active.last_percent = Some(percent);
                out.push(ViewerEvent::LoadingProgress {
                    scene_id: active.id.clone(),
                    percent,
                });
            }
        }
        if let Some(run) = self.transition.as_mut()
            && let Some(progress) = &run.preload
        {
            let percent = progress.percent();
            if run.last_percent != Some(percent) {
                run.last_percent = Some(percent);
                out.push(ViewerEvent::LoadingProgress {
                    scene_id: run.nav.target_scene().clone(),
                    percent,
                });
            }
        }
        for event in out {
            self.emit(event);
        }
    }

    fn commit_transition(&mut self) {
        let Some(run) = self.transition.take() else {
            return;
        };
        let target = run.nav.target_scene().clone();
        let initial = self
            .scenes
            .get(&target)
            .and_then(|s| s.record.initial_view);
        let pose = run.nav.arrival_pose(initial, self.config.camera.default_fov);
        info!("transition {} -> {target} committed", run.from);
        self.enter_scene(
            target,
            Some(Arrival {
                yaw: pose.yaw,
                pitch: pose.pitch,
                fov: Some(pose.fov),
            }),
        );
    }

    /// Activate a hotspot of the active scene by id.
    ///
    /// Navigation hotspots start a transition; every kind emits
    /// `HotspotActivated`. Returns `false` for unknown ids.
    pub fn activate_hotspot(&mut self, hotspot_id: &str) -> bool {
        let Some(active) = &self.active else {
            return false;
        };
        let scene_id = active.id.clone();
        let Some(hotspot) = self
            .scenes
            .get(&scene_id)
            .and_then(|s| s.record.hotspot(hotspot_id))
            .cloned()
        else {
            return false;
        };

        if self.camera.pause_autoplay() {
            self.emit(ViewerEvent::AutoplayPaused);
        }
        self.emit(ViewerEvent::HotspotActivated {
            scene_id: scene_id.clone(),
            hotspot_id: hotspot.id.clone(),
            kind: hotspot.kind,
            payload: hotspot.payload.clone(),
        });

        if self.transition.is_some() {
            return true;
        }
        let Some(target) = hotspot.target_scene_id.clone().filter(|t| *t != scene_id) else {
            return true;
        };
        let Some(nav) = NavigationTransition::begin(
            &hotspot,
            self.camera.state(),
            self.frame.time,
            &self.config.transition,
        ) else {
            return true;
        };

        info!("walking {scene_id} -> {target} via {}", hotspot.id);
        self.transition = Some(TransitionRun {
            from: scene_id.clone(),
            nav,
            preload: None,
            last_percent: None,
        });
        self.emit(ViewerEvent::TransitionStarted {
            from: scene_id,
            to: target.clone(),
            hotspot_id: hotspot.id,
        });
        if self.scenes.contains_key(&target) {
            self.start_preload();
        } else {
            self.request_scene_data(&target);
        }
        true
    }

    fn active_hotspots(&self) -> &[formats::hotspot::Hotspot] {
        self.active
            .as_ref()
            .and_then(|a| self.scenes.get(&a.id))
            .map(|s| s.record.hotspots.as_slice())
            .unwrap_or(&[])
    }

    pub fn pointer_down(&mut self, x_px: f64, y_px: f64) {
        let pos = Vec2::new(x_px, y_px);
        self.pointer_down_at = Some(pos);
        if self.transition.is_none() {
            self.camera.on_pointer_down(pos);
        }
    }

    pub fn pointer_move(&mut self, x_px: f64, y_px: f64) {
        if self.transition.is_none() {
            self.camera.on_pointer_move(Vec2::new(x_px, y_px));
        }
        let hovered = screen_ray(self.camera.state(), self.viewport, x_px, y_px)
            .and_then(|ray| pick_hover(self.active_hotspots(), ray, &self.config.picking))
            .map(|hit| hit.hotspot_id);
        self.hovered = hovered;
    }

    /// Release; a release close to the press position counts as a click.
    pub fn pointer_up(&mut self, x_px: f64, y_px: f64) {
        self.camera.on_pointer_up();
        let Some(down) = self.pointer_down_at.take() else {
            return;
        };
        let travel = (Vec2::new(x_px, y_px) - down).length();
        if travel <= self.config.click_slop_px {
            self.click(x_px, y_px);
        }
    }

    pub fn click(&mut self, x_px: f64, y_px: f64) {
        let busy = self.camera.autoplay_active() || self.transition.is_some();
        let Some(ray) = screen_ray(self.camera.state(), self.viewport, x_px, y_px) else {
            return;
        };
        match pick_click(self.active_hotspots(), ray, &self.config.picking, busy) {
            ClickOutcome::Pause => {
                if self.camera.pause_autoplay() {
                    self.emit(ViewerEvent::AutoplayPaused);
                }
            }
            ClickOutcome::Hit(hit) => {
                self.activate_hotspot(&hit.hotspot_id);
            }
            ClickOutcome::Miss => {}
        }
    }

    /// Positive delta zooms out.
    pub fn wheel(&mut self, delta: f64) {
        if self.transition.is_none() {
            self.camera.on_wheel(delta);
        }
    }

    pub fn look_at(&mut self, yaw: f64, pitch: f64, fov: Option<f64>) {
        if self.transition.is_none() {
            self.camera.look_at(yaw, pitch, fov);
            self.tile_throttle.force();
        }
    }

    /// Draw list for the current frame.
    pub fn render_frame(&self) -> RenderFrame {
        let camera = PanoCamera::from_state(self.camera.state(), self.mesh_scale);
        let Some(active) = &self.active else {
            return RenderFrame {
                camera,
                commands: Vec::new(),
            };
        };
        let data = self.scenes.get(&active.id);
        let preview = self.config.urls.preview(
            &active.id,
            data.and_then(|d| d.manifest.as_ref())
                .and_then(|m| m.preview_url.as_deref()),
        );
        let cache = self.streamer.cache();
        let tiles: Vec<_> = cache
            .keys()
            .filter(|k| k.scene_id == active.id)
            .filter_map(|k| cache.get(k).map(|t| (k, t)))
            .collect();
        let view = SceneView {
            scene_id: &active.id,
            preview_url: Some(preview.as_str()),
            tiles,
            cube: &self.cube,
            hotspots: self.active_hotspots(),
            hovered: self.hovered.as_deref(),
        };
        Renderer::collect(&view, camera)
    }
}
