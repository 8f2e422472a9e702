use glam::{Mat4, Vec4};
use uuid::Uuid;

/// Orthographic camera looking at the face.
///
/// The pose (camera-to-world) comes from an external trackball; this type
/// only turns it into view and projection matrices.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub uuid: Uuid,

    // === Projection ===
    pub xmag: f32,
    pub ymag: f32,
    pub znear: f32,
    pub zfar: f32,

    pose: Mat4,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl OrthographicCamera {
    pub const DEFAULT_MAG: f32 = 1.0;
    pub const DEFAULT_ZNEAR: f32 = 0.05;
    pub const DEFAULT_ZFAR: f32 = 100.0;

    #[must_use]
    pub fn new(xmag: f32, ymag: f32, znear: f32, zfar: f32) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            xmag,
            ymag,
            znear,
            zfar,
            pose: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam.set_pose(Self::default_pose());
        cam
    }

    /// Front view of a face centred slightly above the origin.
    #[must_use]
    pub fn default_pose() -> Mat4 {
        let s = std::f32::consts::FRAC_1_SQRT_2;
        // Rows as written, transposed into glam's column-major storage.
        Mat4::from_cols(
            Vec4::new(0.0, -s, s, 0.3),
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, s, s, 0.35),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
        .transpose()
    }

    pub fn update_projection_matrix(&mut self) {
        // glam's orthographic_rh maps depth to [0, 1], as wgpu expects.
        self.projection_matrix =
            Mat4::orthographic_rh(-self.xmag, self.xmag, -self.ymag, self.ymag, self.znear, self.zfar);
    }

    /// Sets the camera-to-world pose. The view matrix is its inverse.
    pub fn set_pose(&mut self, pose: Mat4) {
        self.pose = pose;
        self.view_matrix = pose.inverse();
    }

    #[inline]
    #[must_use]
    pub fn pose(&self) -> Mat4 {
        self.pose
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAG,
            Self::DEFAULT_MAG,
            Self::DEFAULT_ZNEAR,
            Self::DEFAULT_ZFAR,
        )
    }
}
