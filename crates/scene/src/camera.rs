//! Pointer-driven panorama camera with drag inertia and eased zoom.
//!
//! The controller works in per-frame units: velocities are degrees per
//! frame, decay and zoom easing are fixed factors applied once per
//! [`CameraController::update`]. Auto-rotation is the only time-based
//! motion and uses the frame delta.

use foundation::math::{Vec2, Vec3, direction_from_yaw_pitch, wrap_yaw};
use formats::manifest::ManifestKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FovRange {
    pub min: f64,
    pub max: f64,
}

impl FovRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn clamp(&self, fov: f64) -> f64 {
        fov.clamp(self.min, self.max)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub pitch_min: f64,
    pub pitch_max: f64,
    pub equirect_fov: FovRange,
    pub cubemap_fov: FovRange,
    pub default_fov: f64,
    /// Velocity multiplier applied every frame after release.
    pub inertia_decay: f64,
    /// Below this speed (deg/frame) inertia stops.
    pub velocity_epsilon: f64,
    /// Fraction of the remaining fov distance covered per frame.
    pub zoom_ease: f64,
    /// Degrees per dragged pixel at `reference_fov`.
    pub drag_sensitivity: f64,
    pub reference_fov: f64,
    /// Degrees of fov per wheel delta unit.
    pub wheel_step: f64,
    pub auto_rotate_deg_per_s: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pitch_min: -85.0,
            pitch_max: 85.0,
            equirect_fov: FovRange::new(30.0, 100.0),
            cubemap_fov: FovRange::new(30.0, 90.0),
            default_fov: 75.0,
            inertia_decay: 0.92,
            velocity_epsilon: 0.01,
            zoom_ease: 0.15,
            drag_sensitivity: 0.15,
            reference_fov: 75.0,
            wheel_step: 0.05,
            auto_rotate_deg_per_s: 3.0,
        }
    }
}

impl CameraConfig {
    pub fn fov_range_for(&self, kind: ManifestKind) -> FovRange {
        match kind {
            ManifestKind::EquirectMultires => self.equirect_fov,
            ManifestKind::Cubemap => self.cubemap_fov,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    /// Degrees in `(-180, 180]`.
    pub yaw: f64,
    /// Degrees, clamped to the configured pitch range.
    pub pitch: f64,
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub target_fov: f64,
    pub velocity_yaw: f64,
    pub velocity_pitch: f64,
    pub pointer_active: bool,
}

impl CameraState {
    pub fn new(yaw: f64, pitch: f64, fov: f64) -> Self {
        Self {
            yaw: wrap_yaw(yaw),
            pitch,
            fov,
            target_fov: fov,
            velocity_yaw: 0.0,
            velocity_pitch: 0.0,
            pointer_active: false,
        }
    }

    pub fn direction(&self) -> Vec3 {
        direction_from_yaw_pitch(self.yaw, self.pitch)
    }

    pub fn has_velocity(&self) -> bool {
        self.velocity_yaw != 0.0 || self.velocity_pitch != 0.0
    }
}

#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    fov_range: FovRange,
    state: CameraState,
    last_pointer: Option<Vec2>,
    /// Last applied drag step, in degrees (yaw, pitch).
    last_step: (f64, f64),
    autoplay: bool,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        let fov_range = config.equirect_fov;
        Self {
            config,
            fov_range,
            state: CameraState::new(0.0, 0.0, fov_range.clamp(config.default_fov)),
            last_pointer: None,
            last_step: (0.0, 0.0),
            autoplay: false,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn fov_range(&self) -> FovRange {
        self.fov_range
    }

    /// Switch the zoom limits, e.g. when a scene of another kind is entered.
    pub fn set_fov_range(&mut self, range: FovRange) {
        self.fov_range = range;
        self.state.fov = range.clamp(self.state.fov);
        self.state.target_fov = range.clamp(self.state.target_fov);
    }

    /// Snap to an orientation, cancelling inertia and pending zoom.
    pub fn look_at(&mut self, yaw: f64, pitch: f64, fov: Option<f64>) {
        let fov = self.fov_range.clamp(fov.unwrap_or(self.state.target_fov));
        self.state.yaw = wrap_yaw(yaw);
        self.state.pitch = pitch.clamp(self.config.pitch_min, self.config.pitch_max);
        self.state.fov = fov;
        self.state.target_fov = fov;
        self.state.velocity_yaw = 0.0;
        self.state.velocity_pitch = 0.0;
    }

    /// Write an externally animated pose without clamping fov to the zoom
    /// range (transitions narrow fov past it).
    pub fn set_pose(&mut self, yaw: f64, pitch: f64, fov: f64) {
        self.state.yaw = wrap_yaw(yaw);
        self.state.pitch = pitch.clamp(self.config.pitch_min, self.config.pitch_max);
        self.state.fov = fov;
        self.state.target_fov = fov;
        self.state.velocity_yaw = 0.0;
        self.state.velocity_pitch = 0.0;
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
    }

    pub fn autoplay_active(&self) -> bool {
        self.autoplay
    }

    /// Stops auto-rotation. Returns `true` if it was running.
    pub fn pause_autoplay(&mut self) -> bool {
        std::mem::replace(&mut self.autoplay, false)
    }

    fn sensitivity(&self) -> f64 {
        self.config.drag_sensitivity * self.state.fov / self.config.reference_fov.max(1.0)
    }

    pub fn on_pointer_down(&mut self, pos: Vec2) {
        self.state.pointer_active = true;
        self.state.velocity_yaw = 0.0;
        self.state.velocity_pitch = 0.0;
        self.last_pointer = Some(pos);
        self.last_step = (0.0, 0.0);
    }

    pub fn on_pointer_move(&mut self, pos: Vec2) {
        if !self.state.pointer_active {
            return;
        }
        let Some(last) = self.last_pointer.replace(pos) else {
            return;
        };
        let delta = pos - last;
        let s = self.sensitivity();
        // Grab-and-drag: the panorama follows the pointer.
        let step = (-delta.x * s, delta.y * s);
        self.state.yaw = wrap_yaw(self.state.yaw + step.0);
        self.state.pitch =
            (self.state.pitch + step.1).clamp(self.config.pitch_min, self.config.pitch_max);
        self.last_step = step;
    }

    pub fn on_pointer_up(&mut self) {
        if !self.state.pointer_active {
            return;
        }
        self.state.pointer_active = false;
        self.state.velocity_yaw = self.last_step.0;
        self.state.velocity_pitch = self.last_step.1;
        self.last_pointer = None;
        self.last_step = (0.0, 0.0);
    }

    /// Positive delta zooms out.
    pub fn on_wheel(&mut self, delta: f64) {
        let next = self.state.target_fov + delta * self.config.wheel_step;
        self.state.target_fov = self.fov_range.clamp(next);
    }

    pub fn set_target_fov(&mut self, fov: f64) {
        self.state.target_fov = self.fov_range.clamp(fov);
    }

    /// Advance one frame.
    pub fn update(&mut self, dt_s: f64) {
        let st = &mut self.state;
        if !st.pointer_active {
            if st.has_velocity() {
                st.yaw += st.velocity_yaw;
                st.pitch += st.velocity_pitch;
                st.velocity_yaw *= self.config.inertia_decay;
                st.velocity_pitch *= self.config.inertia_decay;
                if st.velocity_yaw.abs() < self.config.velocity_epsilon
                    && st.velocity_pitch.abs() < self.config.velocity_epsilon
                {
                    st.velocity_yaw = 0.0;
                    st.velocity_pitch = 0.0;
                }
            } else if self.autoplay {
                st.yaw += self.config.auto_rotate_deg_per_s * dt_s.max(0.0);
            }
        }

        st.yaw = wrap_yaw(st.yaw);
        st.pitch = st.pitch.clamp(self.config.pitch_min, self.config.pitch_max);

        let gap = st.target_fov - st.fov;
        if gap.abs() < 1e-3 {
            st.fov = st.target_fov;
        } else {
            st.fov += gap * self.config.zoom_ease;
        }
    }
}
