use glam::{Mat4, Vec3, Vec4};

/// Camera as seen by the ray caster and the interaction controller
pub trait CameraView {
    fn position(&self) -> Vec3;
    fn front(&self) -> Vec3;
    fn up(&self) -> Vec3;
    fn right(&self) -> Vec3;
    /// View matrix (world -> camera)
    fn view_matrix(&self) -> Mat4;
    /// Projection matrix (camera -> clip)
    fn projection_matrix(&self, aspect: f32) -> Mat4;
}

/// Free-flying yaw/pitch camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Heading around +Y (degrees); -90 looks down -Z
    pub yaw: f32,
    /// Elevation (degrees), kept within ±89
    pub pitch: f32,
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

/// Pitch limit keeping the view matrix away from the up-vector singularity
pub const PITCH_LIMIT: f32 = 89.0;

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 1_000_000.0,
        }
    }

    /// Turn the camera by yaw/pitch deltas in degrees
    pub fn turn(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Project a world point to pixel coordinates of a `width` x `height` surface
    pub fn project(&self, point: Vec3, width: f32, height: f32) -> Option<(f32, f32)> {
        let vp = self.projection_matrix(width / height) * self.view_matrix();
        let p = vp * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        Some(((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

impl CameraView for Camera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    fn up(&self) -> Vec3 {
        self.right().cross(self.front()).normalize()
    }

    fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), self.up())
    }

    fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.near, self.far)
    }
}
