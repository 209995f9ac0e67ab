//! Third-person chase camera.

use glam::Vec3;

/// Configuration for the chase camera.
#[derive(Clone, Debug)]
pub struct ChaseCameraConfig {
    /// Height above the target the camera drifts toward.
    pub height: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Weight of the current height when blending toward the desired one.
    pub height_inertia: f32,
    /// Fraction of the distance error corrected per frame.
    pub distance_correction: f32,
    /// Position at startup and on restart.
    pub start_position: Vec3,
}

impl Default for ChaseCameraConfig {
    fn default() -> Self {
        Self {
            height: 7.0,
            min_distance: 10.0,
            max_distance: 15.0,
            height_inertia: 15.0,
            distance_correction: 0.15,
            start_position: Vec3::new(168.0, 25.0, -12.0),
        }
    }
}

/// Move the camera one frame toward its chase position behind `target`.
///
/// Height is blended as `(inertia * y + target.y + height) / (inertia + 1)`;
/// the distance to the target is then pulled a fraction of the way back
/// into `[min_distance, max_distance]`.
pub fn chase_step(camera: Vec3, target: Vec3, config: &ChaseCameraConfig) -> Vec3 {
    let mut position = camera;
    position.y = (config.height_inertia * camera.y + target.y + config.height)
        / (config.height_inertia + 1.0);

    let to_target = target - position;
    let distance = to_target.length();
    if distance <= f32::EPSILON {
        return position;
    }

    let limit = distance.clamp(config.min_distance, config.max_distance);
    let correction = config.distance_correction * (limit - distance) / distance;
    position - to_target * correction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_blend() {
        let config = ChaseCameraConfig::default();
        let camera = Vec3::new(0.0, 23.0, -12.0);
        let target = Vec3::new(0.0, 1.0, 0.0);
        let next = chase_step(camera, target, &config);
        assert!((next.y - (15.0 * 23.0 + 1.0 + 7.0) / 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_within_range_is_untouched_horizontally() {
        let config = ChaseCameraConfig::default();
        // Already at the chase height so only the distance logic matters.
        let camera = Vec3::new(0.0, 8.0, -12.0);
        let target = Vec3::new(0.0, 1.0, 0.0);
        let next = chase_step(camera, target, &config);
        assert!((next.y - 8.0).abs() < 1e-5);
        assert!((next.z + 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_too_far_moves_closer() {
        let config = ChaseCameraConfig::default();
        let target = Vec3::new(0.0, 1.0, 0.0);
        let camera = Vec3::new(0.0, 8.0, -40.0);
        let before = camera.distance(target);
        let next = chase_step(camera, target, &config);
        let after = next.distance(target);
        assert!(after < before);
        assert!(after > config.max_distance);
    }

    #[test]
    fn test_too_close_backs_off() {
        let config = ChaseCameraConfig::default();
        let target = Vec3::new(0.0, 1.0, 0.0);
        let camera = Vec3::new(0.0, 8.0, -2.0);
        let next = chase_step(camera, target, &config);
        assert!(next.distance(target) > camera.distance(target));
        assert!(next.z < camera.z);
    }

    #[test]
    fn test_converges_into_range() {
        let config = ChaseCameraConfig::default();
        let target = Vec3::new(50.0, 1.0, 50.0);
        let mut camera = config.start_position;
        for _ in 0..500 {
            camera = chase_step(camera, target, &config);
        }
        let distance = camera.distance(target);
        assert!(distance >= config.min_distance - 0.01);
        assert!(distance <= config.max_distance + 0.01);
        assert!((camera.y - 8.0).abs() < 0.01);
    }

    #[test]
    fn test_camera_on_target_does_not_produce_nan() {
        let config = ChaseCameraConfig::default();
        let target = Vec3::new(0.0, 8.0, 0.0);
        let next = chase_step(Vec3::new(0.0, 8.0, 0.0), target, &config);
        assert!(next.is_finite());
    }
}
