use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Vec3, angle_between};
use formats::hotspot::{Hotspot, HotspotKind};
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px: width_px.max(1.0),
            height_px: height_px.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width_px / self.height_px
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    /// Largest ray-to-hotspot angle the click fallback accepts.
    pub proximity_threshold_deg: f64,
    /// Apparent radius of a hotspot sprite.
    pub sprite_angular_radius_deg: f64,
    /// Distance from the camera at which sprites are placed.
    pub sprite_distance: f64,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_deg: 25.0,
            sprite_angular_radius_deg: 3.0,
            sprite_distance: 10.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickMethod {
    Direct,
    Proximity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub hotspot_id: String,
    pub method: PickMethod,
    /// Distance along the ray for direct hits, zero for proximity hits.
    pub distance: f64,
    /// Angle between the ray and the hotspot direction.
    pub angle_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The click only stops autoplay or an in-progress transition.
    Pause,
    Hit(PickHit),
    Miss,
}

/// Ray from the camera through a pixel.
///
/// `fov` is vertical; horizontal extent follows the viewport aspect.
pub fn screen_ray(camera: &CameraState, viewport: Viewport, x_px: f64, y_px: f64) -> Option<Ray> {
    let forward = camera.direction();
    let yaw = camera.yaw.to_radians();
    let right = Vec3::new(yaw.cos(), 0.0, yaw.sin());
    let up = right.cross(forward);

    let ndc_x = 2.0 * x_px / viewport.width_px - 1.0;
    let ndc_y = 1.0 - 2.0 * y_px / viewport.height_px;
    let tan_v = (camera.fov.to_radians() * 0.5).tan();
    let tan_h = tan_v * viewport.aspect();

    let dir = (forward + right * (ndc_x * tan_h) + up * (ndc_y * tan_v)).normalized()?;
    Some(Ray::new(Vec3::ZERO, dir))
}

fn closer(a: &PickHit, b: &PickHit, key: fn(&PickHit) -> f64) -> bool {
    stable_total_cmp_f64(key(a), key(b))
        .then_with(|| a.hotspot_id.cmp(&b.hotspot_id))
        .is_lt()
}

/// Ray vs. hotspot sprites.
///
/// The nearest hit along the ray wins; equal distances go to the smaller id.
pub fn pick_direct(hotspots: &[Hotspot], ray: Ray, config: &PickConfig) -> Option<PickHit> {
    let dir = ray.dir.normalized()?;
    let radius = config.sprite_distance * config.sprite_angular_radius_deg.to_radians().tan();

    let mut best: Option<PickHit> = None;
    for h in hotspots {
        let center = h.direction() * config.sprite_distance;
        let to_center = center - ray.origin;
        let t_mid = to_center.dot(dir);
        if t_mid <= 0.0 {
            continue;
        }
        let d2 = to_center.dot(to_center) - t_mid * t_mid;
        if d2 > radius * radius {
            continue;
        }
        let hit = PickHit {
            hotspot_id: h.id.clone(),
            method: PickMethod::Direct,
            distance: t_mid - (radius * radius - d2).max(0.0).sqrt(),
            angle_deg: angle_between(dir, to_center),
        };
        if best.as_ref().is_none_or(|b| closer(&hit, b, |h| h.distance)) {
            best = Some(hit);
        }
    }
    best
}

/// Nearest navigation hotspot by angle, if within the threshold.
pub fn pick_proximity(hotspots: &[Hotspot], ray: Ray, config: &PickConfig) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for h in hotspots.iter().filter(|h| h.kind == HotspotKind::Navigation) {
        let angle = angle_between(ray.dir, h.direction() * config.sprite_distance - ray.origin);
        if angle >= config.proximity_threshold_deg {
            continue;
        }
        let hit = PickHit {
            hotspot_id: h.id.clone(),
            method: PickMethod::Proximity,
            distance: 0.0,
            angle_deg: angle,
        };
        if best.as_ref().is_none_or(|b| closer(&hit, b, |h| h.angle_deg)) {
            best = Some(hit);
        }
    }
    best
}

/// Hover picking: exact sprite hits only.
pub fn pick_hover(hotspots: &[Hotspot], ray: Ray, config: &PickConfig) -> Option<PickHit> {
    pick_direct(hotspots, ray, config)
}

/// Click picking.
///
/// While autoplay or a transition is running every click is a pause
/// request. Otherwise a direct sprite hit wins, falling back to the
/// angular-proximity test for navigation hotspots.
pub fn pick_click(hotspots: &[Hotspot], ray: Ray, config: &PickConfig, busy: bool) -> ClickOutcome {
    if busy {
        return ClickOutcome::Pause;
    }
    match pick_direct(hotspots, ray, config).or_else(|| pick_proximity(hotspots, ray, config)) {
        Some(hit) => ClickOutcome::Hit(hit),
        None => ClickOutcome::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::direction_from_yaw_pitch;

    fn hotspot(id: &str, kind: HotspotKind, yaw: f64, pitch: f64) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            kind,
            yaw,
            pitch,
            target_scene_id: None,
            target_yaw: None,
            target_pitch: None,
            payload: None,
        }
    }

    fn ray_towards(yaw: f64, pitch: f64) -> Ray {
        Ray::new(Vec3::ZERO, direction_from_yaw_pitch(yaw, pitch))
    }

    #[test]
    fn centre_pixel_ray_matches_view_direction() {
        let cam = CameraState::new(40.0, 10.0, 70.0);
        let ray = screen_ray(&cam, Viewport::new(800.0, 600.0), 400.0, 300.0).unwrap();
        assert!(angle_between(ray.dir, cam.direction()) < 1e-9);
    }

    #[test]
    fn right_edge_ray_is_half_horizontal_fov_away() {
        let cam = CameraState::new(0.0, 0.0, 90.0);
        let ray = screen_ray(&cam, Viewport::new(500.0, 500.0), 500.0, 250.0).unwrap();
        let (yaw, pitch) = foundation::math::yaw_pitch_from_direction(ray.dir).unwrap();
        assert!((yaw - 45.0).abs() < 1e-9);
        assert!(pitch.abs() < 1e-9);
    }

    #[test]
    fn direct_hit_prefers_sprite_under_pointer() {
        let hs = vec![
            hotspot("a", HotspotKind::Info, 0.0, 0.0),
            hotspot("b", HotspotKind::Navigation, 30.0, 0.0),
        ];
        let hit = pick_direct(&hs, ray_towards(30.5, 0.5), &PickConfig::default()).unwrap();
        assert_eq!(hit.hotspot_id, "b");
        assert_eq!(hit.method, PickMethod::Direct);
        assert!(pick_direct(&hs, ray_towards(15.0, 0.0), &PickConfig::default()).is_none());
    }

    #[test]
    fn equal_distance_hits_break_ties_by_id() {
        let hs = vec![
            hotspot("z", HotspotKind::Info, 0.0, 0.0),
            hotspot("m", HotspotKind::Info, 0.0, 0.0),
        ];
        let hit = pick_direct(&hs, ray_towards(0.0, 0.0), &PickConfig::default()).unwrap();
        assert_eq!(hit.hotspot_id, "m");
    }

    #[test]
    fn click_falls_back_to_proximity_for_navigation_only() {
        let hs = vec![
            hotspot("info", HotspotKind::Info, 10.0, 0.0),
            hotspot("door", HotspotKind::Navigation, 20.0, 0.0),
        ];
        let cfg = PickConfig::default();
        match pick_click(&hs, ray_towards(0.0, 0.0), &cfg, false) {
            ClickOutcome::Hit(hit) => {
                assert_eq!(hit.hotspot_id, "door");
                assert_eq!(hit.method, PickMethod::Proximity);
                assert!((hit.angle_deg - 20.0).abs() < 1e-9);
            }
            other => panic!("expected proximity hit, got {other:?}"),
        }
        assert_eq!(
            pick_click(&hs, ray_towards(-60.0, 0.0), &cfg, false),
            ClickOutcome::Miss
        );
    }

    #[test]
    fn busy_click_is_a_pause() {
        let hs = vec![hotspot("door", HotspotKind::Navigation, 0.0, 0.0)];
        assert_eq!(
            pick_click(&hs, ray_towards(0.0, 0.0), &PickConfig::default(), true),
            ClickOutcome::Pause
        );
    }

    #[test]
    fn hover_ignores_proximity() {
        let hs = vec![hotspot("door", HotspotKind::Navigation, 20.0, 0.0)];
        assert!(pick_hover(&hs, ray_towards(0.0, 0.0), &PickConfig::default()).is_none());
    }
}
