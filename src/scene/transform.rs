use glam::{Mat4, Quat, Vec3};

/// Euler angles (roll, pitch, yaw) to a unit quaternion.
///
/// Standard aerospace convention: roll about X, pitch about Y, yaw about Z,
/// composed as `yaw * pitch * roll`. Written out term by term so results do
/// not depend on library internals.
#[must_use]
pub fn quat_from_roll_pitch_yaw(roll: f32, pitch: f32, yaw: f32) -> Quat {
    let (sr, cr) = (roll * 0.5).sin_cos();
    let (sp, cp) = (pitch * 0.5).sin_cos();
    let (sy, cy) = (yaw * 0.5).sin_cos();

    Quat::from_xyzw(
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
}

/// User-editable model transform.
///
/// Applied on top of the mesh at render time, never baked into vertex data.
/// `compose()` returns `T * R * S` in column-vector convention.
#[derive(Debug, Clone)]
pub struct TransformStack {
    translation: Vec3,
    /// Roll, pitch, yaw in radians
    euler: Vec3,
    rotation: Quat,
    scale: f32,

    // === Shadow state ===
    matrix: Mat4,
    last_translation: Vec3,
    last_rotation: Quat,
    last_scale: f32,
    force_update: bool,
}

impl TransformStack {
    #[must_use]
    pub fn new() -> Self {
        Self {
            translation: Vec3::ZERO,
            euler: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,

            matrix: Mat4::IDENTITY,
            last_translation: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: 1.0,
            force_update: true,
        }
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub fn set_rotation_euler(&mut self, roll: f32, pitch: f32, yaw: f32) {
        self.euler = Vec3::new(roll, pitch, yaw);
        self.rotation = quat_from_roll_pitch_yaw(roll, pitch, yaw);
    }

    /// Uniform scale, broadcast to all three axes.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Roll, pitch, yaw as last set.
    #[inline]
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        self.euler
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Model matrix `T * R * S`. Recomputed only when a component changed.
    pub fn compose(&mut self) -> Mat4 {
        let changed = self.translation != self.last_translation
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.matrix = Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.translation);

            self.last_translation = self.translation;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        self.matrix
    }

    /// Zero translation and rotation, unit scale.
    pub fn reset(&mut self) {
        self.translation = Vec3::ZERO;
        self.euler = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
        self.scale = 1.0;
        self.force_update = true;
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}
