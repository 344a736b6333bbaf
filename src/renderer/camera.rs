use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;

// 89 degrees.
const MAX_PITCH: f32 = 1.553_343;

/// Orbit camera: yaw/pitch/distance around a target point, Y up.
pub struct Camera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub rotate_speed: f32,
    pub zoom_step: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            target: Vec3::from_array(config.target),
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,

            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,

            rotate_speed: config.rotate_speed,
            zoom_step: config.zoom_step,
            pan_speed: config.pan_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        };
        camera.look_from(Vec3::from_array(config.position));
        camera
    }

    /// Places the camera at `position`, keeping the current target.
    pub fn look_from(&mut self, position: Vec3) {
        let offset = position - self.target;
        self.distance = offset.length().clamp(self.min_distance, self.max_distance);

        let dir = offset.try_normalize().unwrap_or(Vec3::Z);
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn position(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.distance * self.yaw.cos() * self.pitch.cos(),
                self.distance * self.pitch.sin(),
                self.distance * self.yaw.sin() * self.pitch.cos(),
            )
    }

    fn front(&self) -> Vec3 {
        (self.target - self.position()).normalize()
    }

    fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Drag delta in physical pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw += delta.x * self.rotate_speed;
        self.pitch = (self.pitch + delta.y * self.rotate_speed).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Moves the target in the view plane; scaled by distance so the surface
    /// tracks the cursor roughly one-to-one.
    pub fn pan(&mut self, delta: Vec2) {
        let right = self.right();
        let up = right.cross(self.front()).normalize();
        let scale = self.distance * self.pan_speed;
        self.target += (-right * delta.x + up * delta.y) * scale;
    }

    /// Positive `delta` (wheel up) moves closer.
    pub fn zoom(&mut self, delta: f32) {
        let distance = self.distance * self.zoom_step.powf(delta);
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn default_camera_sits_where_configured() {
        let camera = Camera::default();
        assert!(close(camera.position(), Vec3::new(0.0, -1.0, 20.0)));
        assert!((camera.fov - 35.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let mut camera = Camera::default();
        let before = camera.position().distance(camera.target);
        camera.rotate(Vec2::new(120.0, -45.0));
        camera.rotate(Vec2::new(-10.0, 300.0));
        let after = camera.position().distance(camera.target);
        assert!((before - after).abs() < 1e-3);
    }

    #[test]
    fn pitch_never_reaches_the_pole() {
        let mut camera = Camera::default();
        camera.rotate(Vec2::new(0.0, 100_000.0));
        assert!(camera.pitch <= MAX_PITCH);
        camera.rotate(Vec2::new(0.0, -200_000.0));
        assert!(camera.pitch >= -MAX_PITCH);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.zoom(1_000.0);
        assert_eq!(camera.distance, camera.min_distance);
        camera.zoom(-1_000.0);
        assert_eq!(camera.distance, camera.max_distance);
    }

    #[test]
    fn pan_moves_target_and_position_together() {
        let mut camera = Camera::default();
        let offset = camera.position() - camera.target;
        camera.pan(Vec2::new(30.0, 10.0));
        assert!(camera.target.length() > 0.0);
        assert!(close(camera.position() - camera.target, offset));
    }

    #[test]
    fn target_projects_to_the_center() {
        let camera = Camera::default();
        let clip = camera.view_projection_matrix() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }
}
