//! Animated walk from the current scene to a hotspot's target scene.
//!
//! A transition runs two independent tasks: the camera animation driven by
//! [`NavigationTransition::advance`], and the destination preload which the
//! owner reports through [`NavigationTransition::preload_finished`]. The
//! scene swap may only be committed once both have arrived at the barrier.

use foundation::ids::SceneId;
use foundation::math::{
    angle_between, direction_from_yaw_pitch, ease_in_out_cubic, lerp, shortest_yaw_delta,
    wrap_yaw,
};
use foundation::time::{Time, ms_to_secs};
use formats::hotspot::Hotspot;
use formats::scene_record::InitialView;
use runtime::barrier::Barrier;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub rotate_speed_deg_per_s: f64,
    pub rotate_max_ms: u64,
    /// Largest yaw or pitch swing the rotating phase will make.
    pub max_rotation_deg: f64,
    pub move_ms: u64,
    /// Mesh scale reached at the end of the moving phase.
    pub move_mesh_scale: f64,
    /// Fov multiplier reached at the end of the moving phase.
    pub move_fov_factor: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            rotate_speed_deg_per_s: 120.0,
            rotate_max_ms: 800,
            max_rotation_deg: 180.0,
            move_ms: 1500,
            move_mesh_scale: 0.6,
            move_fov_factor: 0.7,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Rotating,
    Moving,
    Complete,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransitionTask {
    Preload,
    Animation,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub yaw: f64,
    pub pitch: f64,
    pub fov: f64,
}

/// What the renderer should show for one frame of a transition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransitionFrame {
    pub phase: TransitionPhase,
    pub pose: Pose,
    pub mesh_scale: f64,
}

#[derive(Debug, Clone)]
pub struct NavigationTransition {
    hotspot: Hotspot,
    target_scene: SceneId,
    start: Pose,
    yaw_delta: f64,
    pitch_delta: f64,
    end_fov: f64,
    end_mesh_scale: f64,
    started_at: Time,
    rotate_s: f64,
    move_s: f64,
    phase: TransitionPhase,
    join: Barrier<TransitionTask>,
}

impl NavigationTransition {
    /// Start a transition toward `hotspot`. Returns `None` unless the
    /// hotspot is a navigation hotspot with a target scene.
    pub fn begin(
        hotspot: &Hotspot,
        camera: &CameraState,
        now: Time,
        config: &TransitionConfig,
    ) -> Option<Self> {
        if !hotspot.is_navigable() {
            return None;
        }
        let target_scene = hotspot.target_scene_id.clone()?;

        let limit = config.max_rotation_deg.abs();
        let yaw_delta = shortest_yaw_delta(camera.yaw, hotspot.yaw).clamp(-limit, limit);
        let pitch_delta = (hotspot.pitch - camera.pitch).clamp(-limit, limit);

        let start_dir = direction_from_yaw_pitch(camera.yaw, camera.pitch);
        let facing_dir = direction_from_yaw_pitch(camera.yaw + yaw_delta, camera.pitch + pitch_delta);
        let swing = angle_between(start_dir, facing_dir);
        let rotate_s = if config.rotate_speed_deg_per_s > 0.0 {
            (swing / config.rotate_speed_deg_per_s).min(ms_to_secs(config.rotate_max_ms))
        } else {
            ms_to_secs(config.rotate_max_ms)
        };

        Some(Self {
            hotspot: hotspot.clone(),
            target_scene,
            start: Pose {
                yaw: camera.yaw,
                pitch: camera.pitch,
                fov: camera.fov,
            },
            yaw_delta,
            pitch_delta,
            end_fov: camera.fov * config.move_fov_factor,
            end_mesh_scale: config.move_mesh_scale,
            started_at: now,
            rotate_s,
            move_s: ms_to_secs(config.move_ms),
            phase: TransitionPhase::Rotating,
            join: Barrier::new([TransitionTask::Preload, TransitionTask::Animation]),
        })
    }

    pub fn hotspot(&self) -> &Hotspot {
        &self.hotspot
    }

    pub fn target_scene(&self) -> &SceneId {
        &self.target_scene
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn started_at(&self) -> Time {
        self.started_at
    }

    pub fn animation_duration_s(&self) -> f64 {
        self.rotate_s + self.move_s
    }

    pub fn animation_done(&self) -> bool {
        self.join.has_arrived(&TransitionTask::Animation)
    }

    pub fn preload_done(&self) -> bool {
        self.join.has_arrived(&TransitionTask::Preload)
    }

    /// Both tasks have arrived; the owner may commit the scene swap.
    pub fn is_ready(&self) -> bool {
        self.join.is_open()
    }

    fn facing(&self) -> (f64, f64) {
        (
            wrap_yaw(self.start.yaw + self.yaw_delta),
            self.start.pitch + self.pitch_delta,
        )
    }

    fn settle(&mut self) {
        if self.join.is_open() {
            self.phase = TransitionPhase::Complete;
        }
    }

    /// Report the destination preload as finished.
    ///
    /// Returns `true` if this opened the barrier.
    pub fn preload_finished(&mut self) -> bool {
        let opened = self.join.arrive(TransitionTask::Preload);
        self.settle();
        opened
    }

    /// Compute the animation frame for `now`.
    ///
    /// Once the animation has run its course the final pose is held until
    /// the preload also arrives.
    pub fn advance(&mut self, now: Time) -> TransitionFrame {
        let elapsed = now.since(self.started_at);
        let (facing_yaw, facing_pitch) = self.facing();

        if elapsed < self.rotate_s {
            let t = ease_in_out_cubic(elapsed / self.rotate_s);
            self.phase = TransitionPhase::Rotating;
            return TransitionFrame {
                phase: self.phase,
                pose: Pose {
                    yaw: wrap_yaw(self.start.yaw + self.yaw_delta * t),
                    pitch: self.start.pitch + self.pitch_delta * t,
                    fov: self.start.fov,
                },
                mesh_scale: 1.0,
            };
        }

        let moved = elapsed - self.rotate_s;
        let t = if self.move_s > 0.0 {
            ease_in_out_cubic(moved / self.move_s)
        } else {
            1.0
        };
        if moved >= self.move_s {
            self.join.arrive(TransitionTask::Animation);
        }
        self.phase = TransitionPhase::Moving;
        self.settle();

        TransitionFrame {
            phase: self.phase,
            pose: Pose {
                yaw: facing_yaw,
                pitch: facing_pitch,
                fov: lerp(self.start.fov, self.end_fov, t),
            },
            mesh_scale: lerp(1.0, self.end_mesh_scale, t),
        }
    }

    /// Camera orientation on arrival. Each angle falls back on its own:
    /// the hotspot's explicit target, then the destination's initial view,
    /// then the travel heading (pitch 0).
    pub fn arrival_pose(&self, initial: Option<InitialView>, default_fov: f64) -> Pose {
        let (travel_yaw, _) = self.facing();
        Pose {
            yaw: self
                .hotspot
                .target_yaw
                .or(initial.map(|v| v.yaw))
                .unwrap_or(travel_yaw),
            pitch: self
                .hotspot
                .target_pitch
                .or(initial.map(|v| v.pitch))
                .unwrap_or(0.0),
            fov: initial.and_then(|v| v.fov).unwrap_or(default_fov),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::hotspot::HotspotKind;

    fn door(yaw: f64, pitch: f64) -> Hotspot {
        Hotspot {
            id: "door".to_string(),
            kind: HotspotKind::Navigation,
            yaw,
            pitch,
            target_scene_id: Some(SceneId::from("hall")),
            target_yaw: None,
            target_pitch: None,
            payload: None,
        }
    }

    #[test]
    fn non_navigable_hotspot_does_not_start() {
        let mut h = door(0.0, 0.0);
        h.target_scene_id = None;
        let cam = CameraState::new(0.0, 0.0, 75.0);
        assert!(NavigationTransition::begin(&h, &cam, Time(0.0), &TransitionConfig::default()).is_none());
    }

    #[test]
    fn rotates_then_moves_then_holds() {
        let cfg = TransitionConfig::default();
        let cam = CameraState::new(0.0, 0.0, 80.0);
        let mut tr = NavigationTransition::begin(&door(60.0, 0.0), &cam, Time(0.0), &cfg).unwrap();
        assert!((tr.animation_duration_s() - 2.0).abs() < 1e-9, "60 deg at 120 deg/s + 1.5 s");

        let f = tr.advance(Time(0.25));
        assert_eq!(f.phase, TransitionPhase::Rotating);
        assert!(f.pose.yaw > 0.0 && f.pose.yaw < 60.0);
        assert_eq!(f.mesh_scale, 1.0);

        let f = tr.advance(Time(1.25));
        assert_eq!(f.phase, TransitionPhase::Moving);
        assert!((f.pose.yaw - 60.0).abs() < 1e-9);
        assert!(f.mesh_scale < 1.0 && f.mesh_scale > 0.6);
        assert!(!tr.animation_done());

        let f = tr.advance(Time(2.5));
        assert!(tr.animation_done());
        assert_eq!(f.phase, TransitionPhase::Moving, "holds until preload arrives");
        assert!((f.pose.fov - 56.0).abs() < 1e-9);
        assert!((f.mesh_scale - 0.6).abs() < 1e-9);
        assert!(!tr.is_ready());

        assert!(tr.preload_finished());
        assert_eq!(tr.phase(), TransitionPhase::Complete);
    }

    #[test]
    fn early_preload_waits_for_animation() {
        let cfg = TransitionConfig::default();
        let cam = CameraState::new(0.0, 0.0, 75.0);
        let mut tr = NavigationTransition::begin(&door(0.0, 0.0), &cam, Time(0.0), &cfg).unwrap();
        assert!(!tr.preload_finished());
        assert!(tr.preload_done());
        tr.advance(Time(1.0));
        assert!(!tr.is_ready());
        let f = tr.advance(Time(1.5));
        assert!(tr.is_ready());
        assert_eq!(f.phase, TransitionPhase::Complete);
    }

    #[test]
    fn rotation_takes_shortest_path_across_seam() {
        let cfg = TransitionConfig::default();
        let cam = CameraState::new(170.0, 0.0, 75.0);
        let mut tr = NavigationTransition::begin(&door(-170.0, 0.0), &cam, Time(0.0), &cfg).unwrap();
        let mid = tr.advance(Time(0.05));
        assert!(mid.pose.yaw > 170.0 || mid.pose.yaw < -170.0);
        let f = tr.advance(Time(tr.animation_duration_s()));
        assert!((f.pose.yaw - -170.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_time_is_capped() {
        let cfg = TransitionConfig::default();
        let cam = CameraState::new(0.0, 0.0, 75.0);
        let tr = NavigationTransition::begin(&door(180.0, 0.0), &cam, Time(0.0), &cfg).unwrap();
        assert!((tr.animation_duration_s() - (0.8 + 1.5)).abs() < 1e-9);
    }

    #[test]
    fn arrival_resolves_each_angle_separately() {
        let cfg = TransitionConfig::default();
        let cam = CameraState::new(0.0, 0.0, 75.0);
        let view = InitialView {
            yaw: 90.0,
            pitch: 5.0,
            fov: Some(65.0),
        };

        let tr = NavigationTransition::begin(&door(20.0, 0.0), &cam, Time(0.0), &cfg).unwrap();
        let p = tr.arrival_pose(Some(view), 75.0);
        assert_eq!((p.yaw, p.pitch, p.fov), (90.0, 5.0, 65.0));
        let p = tr.arrival_pose(None, 75.0);
        assert_eq!((p.yaw, p.pitch, p.fov), (20.0, 0.0, 75.0));

        let mut h = door(20.0, 0.0);
        h.target_yaw = Some(-45.0);
        let tr = NavigationTransition::begin(&h, &cam, Time(0.0), &cfg).unwrap();
        let p = tr.arrival_pose(Some(view), 75.0);
        assert_eq!((p.yaw, p.pitch), (-45.0, 5.0));
        let p = tr.arrival_pose(None, 75.0);
        assert_eq!((p.yaw, p.pitch), (-45.0, 0.0));

        let mut h = door(20.0, 0.0);
        h.target_pitch = Some(-10.0);
        let tr = NavigationTransition::begin(&h, &cam, Time(0.0), &cfg).unwrap();
        let p = tr.arrival_pose(Some(view), 75.0);
        assert_eq!((p.yaw, p.pitch, p.fov), (90.0, -10.0, 65.0));
    }
}
