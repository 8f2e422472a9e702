//! Face Viewer
//!
//! [`FaceViewer`] ties the pipeline together for one mesh:
//!
//! ```text
//! coefficients ─▶ BlendshapeRig::synthesize ─┐
//! vertex snapshot ───────────────────────────┴▶ GeometryBuffer ─▶ DeviceBufferSync::flush ─▶ Rasterizer ─▶ RenderedFrame
//! ```
//!
//! All state is owned by the instance; several viewers can coexist without
//! sharing anything. Rendering is at-most-one-in-flight: a render requested
//! while another is running is dropped and the previous image stays on
//! display.

use glam::{Mat4, Vec3};

use crate::animation::player::PlaybackTarget;
use crate::config::ViewerConfig;
use crate::errors::{FaceMeshError, Result};
use crate::renderer::frame::{RenderedFrame, compose_rgba};
use crate::renderer::guard::RenderGuard;
use crate::renderer::params::{RenderParams, TransformValues};
use crate::renderer::rasterizer::{DrawRequest, Rasterizer};
use crate::renderer::settings::ViewerSettings;
use crate::renderer::sync::{DeviceBufferSync, SyncState};
use crate::renderer::upload::GpuUploader;
use crate::resources::blendshape::BlendshapeRig;
use crate::resources::geometry::GeometryBuffer;
use crate::resources::mesh::Mesh;
use crate::scene::camera::OrthographicCamera;
use crate::scene::history::VertexEditHistory;
use crate::scene::transform::TransformStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerLifecycle {
    Constructed,
    Shown,
    TornDown,
}

/// Why a render request produced no new image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Another render was still in flight.
    InFlight,
    /// The vertex upload failed; the buffer stays dirty for the next render.
    UploadFailed,
    /// The rasterizer reported a recoverable failure.
    RasterFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Dropped(DropReason),
}

pub struct FaceViewer<U, R>
where
    U: GpuUploader,
    R: Rasterizer<U::Buffer>,
{
    settings: ViewerSettings,
    lifecycle: ViewerLifecycle,

    geometry: GeometryBuffer,
    rig: Option<BlendshapeRig>,
    coefficients: Vec<f32>,
    synthesized: Vec<Vec3>,

    sync: DeviceBufferSync<U::Buffer>,
    uploader: U,
    rasterizer: R,

    transform: TransformStack,
    camera: OrthographicCamera,
    history: VertexEditHistory,

    guard: RenderGuard,
    params: RenderParams,
    displayed: Option<RenderedFrame>,
}

impl<U, R> FaceViewer<U, R>
where
    U: GpuUploader,
    R: Rasterizer<U::Buffer>,
{
    #[must_use]
    pub fn new(settings: ViewerSettings, mesh: Mesh, uploader: U, rasterizer: R) -> Self {
        let camera = OrthographicCamera::default();
        let history = VertexEditHistory::new(settings.max_undo);
        let sync = DeviceBufferSync::new(settings.buffer_label.clone());

        Self {
            settings,
            lifecycle: ViewerLifecycle::Constructed,
            geometry: GeometryBuffer::new(mesh),
            rig: None,
            coefficients: Vec::new(),
            synthesized: Vec::new(),
            sync,
            uploader,
            rasterizer,
            transform: TransformStack::new(),
            camera,
            history,
            guard: RenderGuard::new(),
            params: RenderParams::default(),
            displayed: None,
        }
    }

    /// Attaches a blendshape rig. Its vertex count must match the mesh.
    pub fn with_rig(mut self, rig: BlendshapeRig) -> Result<Self> {
        if rig.vertex_count() != self.geometry.vertex_count() {
            return Err(FaceMeshError::ShapeMismatch {
                context: "blendshape rig",
                expected: self.geometry.vertex_count(),
                actual: rig.vertex_count(),
            });
        }
        self.coefficients = vec![0.0; rig.n_blendshapes()];
        self.rig = Some(rig);
        Ok(self)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn lifecycle(&self) -> ViewerLifecycle {
        self.lifecycle
    }

    pub fn show(&mut self) -> Result<()> {
        self.ensure_alive("show")?;
        self.lifecycle = ViewerLifecycle::Shown;
        Ok(())
    }

    /// Releases the device buffer. Every later operation fails with
    /// [`FaceMeshError::UseAfterDestroy`].
    pub fn teardown(&mut self) {
        if self.lifecycle == ViewerLifecycle::TornDown {
            return;
        }
        self.sync.destroy(&mut self.uploader);
        self.lifecycle = ViewerLifecycle::TornDown;
        log::debug!("Viewer torn down");
    }

    fn ensure_alive(&self, operation: &'static str) -> Result<()> {
        if self.lifecycle == ViewerLifecycle::TornDown {
            return Err(FaceMeshError::UseAfterDestroy(operation));
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    #[must_use]
    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    #[must_use]
    pub fn rig(&self) -> Option<&BlendshapeRig> {
        self.rig.as_ref()
    }

    /// Current coefficients, in rig order.
    #[must_use]
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    #[must_use]
    pub fn transform(&self) -> &TransformStack {
        &self.transform
    }

    #[must_use]
    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    #[must_use]
    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    #[must_use]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Parameters of the last render.
    #[must_use]
    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// The image currently on display.
    #[must_use]
    pub fn displayed_frame(&self) -> Option<&RenderedFrame> {
        self.displayed.as_ref()
    }

    /// Handle on the in-flight flag, for event callbacks.
    #[must_use]
    pub fn render_guard(&self) -> RenderGuard {
        self.guard.clone()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Replaces every vertex and renders with the last parameters.
    ///
    /// A vertex array of the wrong shape is logged and rejected; the mesh
    /// keeps its previous positions.
    pub fn update_mesh(&mut self, vertices: &[Vec3]) -> Result<RenderOutcome> {
        self.ensure_alive("update_mesh")?;
        if let Err(err) = self.geometry.replace_positions(vertices, true) {
            log::error!("{err}");
            return Err(err);
        }
        self.history.clear();
        self.sync.mark_dirty()?;

        let params = self.params.clone();
        self.render(&params)
    }

    /// Sets all coefficients from the interactive controls.
    ///
    /// Values are clamped to `[0, 1]` before synthesis.
    pub fn set_coefficients(&mut self, coefficients: &[f32]) -> Result<()> {
        self.ensure_alive("set_coefficients")?;
        let clamped: Vec<f32> = coefficients.iter().map(|c| c.clamp(0.0, 1.0)).collect();
        self.apply_synthesis(&clamped, true)
    }

    /// Sets one coefficient by name, clamped to `[0, 1]`.
    pub fn set_coefficient(&mut self, name: &str, value: f32) -> Result<()> {
        self.ensure_alive("set_coefficient")?;
        let index = match &self.rig {
            Some(rig) => rig.index_of(name)?,
            None => return Err(FaceMeshError::UnknownBlendshape(name.to_string())),
        };
        let mut coefficients = self.coefficients.clone();
        coefficients[index] = value;
        self.set_coefficients(&coefficients)
    }

    /// Back to the neutral pose.
    pub fn reset_coefficients(&mut self) -> Result<()> {
        let zeros = vec![0.0; self.coefficients.len()];
        self.set_coefficients(&zeros)
    }

    fn apply_synthesis(&mut self, coefficients: &[f32], recompute_normals: bool) -> Result<()> {
        let Some(rig) = &self.rig else {
            if coefficients.is_empty() {
                return Ok(());
            }
            return Err(FaceMeshError::CoefficientLengthMismatch {
                expected: 0,
                actual: coefficients.len(),
            });
        };

        self.synthesized.resize(rig.vertex_count(), Vec3::ZERO);
        rig.synthesize_into(coefficients, &mut self.synthesized)?;
        if recompute_normals {
            self.geometry.replace_positions(&self.synthesized, true)?;
        } else {
            self.geometry.replace_positions_no_topology_check(&self.synthesized)?;
        }

        self.coefficients.clear();
        self.coefficients.extend_from_slice(coefficients);
        self.history.clear();
        self.sync.mark_dirty()
    }

    /// Moves individual vertices. The edit can be reverted with
    /// [`FaceViewer::undo_vertex_edit`].
    pub fn edit_vertices(&mut self, edits: &[(u32, Vec3)]) -> Result<()> {
        self.ensure_alive("edit_vertices")?;
        let inverse = self.geometry.edit_vertices(edits)?;
        self.history.push(inverse);
        self.sync.mark_dirty()
    }

    /// Reverts the most recent vertex edit. Returns `false` if there was none.
    pub fn undo_vertex_edit(&mut self) -> Result<bool> {
        self.ensure_alive("undo_vertex_edit")?;
        let undone = self.history.undo(&mut self.geometry)?;
        if undone {
            self.sync.mark_dirty()?;
        }
        Ok(undone)
    }

    // ========================================================================
    // Transform & camera
    // ========================================================================

    pub fn set_transform(&mut self, values: &TransformValues) {
        self.transform.set_translation(values.translation);
        self.transform
            .set_rotation_euler(values.rotation.x, values.rotation.y, values.rotation.z);
        self.transform.set_scale(values.scale);
        self.params.transform = *values;
    }

    pub fn reset_transform(&mut self) {
        self.transform.reset();
        self.params.transform = TransformValues::default();
    }

    /// Camera-to-world pose, as produced by a trackball.
    pub fn set_camera_pose(&mut self, pose: Mat4) {
        self.camera.set_pose(pose);
    }

    #[must_use]
    pub fn export_config(&self) -> ViewerConfig {
        ViewerConfig::from_parts(&self.params.transform, self.camera.pose())
    }

    pub fn apply_config(&mut self, config: &ViewerConfig) {
        self.set_transform(&config.transform());
        self.set_camera_pose(config.camera_pose());
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Uploads pending geometry and renders one frame.
    ///
    /// Dropped requests leave the displayed image untouched.
    pub fn render(&mut self, params: &RenderParams) -> Result<RenderOutcome> {
        self.ensure_alive("render")?;

        let Some(_in_flight) = self.guard.try_begin() else {
            log::debug!("Render already in flight, dropping request");
            return Ok(RenderOutcome::Dropped(DropReason::InFlight));
        };

        self.set_transform(&params.transform);
        self.params = params.clone();

        match self.sync.flush(&mut self.geometry, &mut self.uploader) {
            Ok(report) => log::trace!("Vertex flush: {report:?}"),
            Err(err) if err.is_recoverable() => {
                log::warn!("Dropping frame: {err}");
                return Ok(RenderOutcome::Dropped(DropReason::UploadFailed));
            }
            Err(err) => return Err(err),
        }

        let (Some(vertex_buffer), Some(layout)) = (self.sync.buffer(), self.sync.layout()) else {
            return Err(FaceMeshError::GpuUpload("vertex buffer missing after flush".to_string()));
        };

        let request = DrawRequest {
            vertex_buffer,
            layout,
            triangles: self.geometry.mesh().triangles(),
            model: self.transform.compose(),
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            width: self.settings.width,
            height: self.settings.height,
            params: &self.params,
        };

        let output = match self.rasterizer.rasterize(&request) {
            Ok(output) => output,
            Err(err) if err.is_recoverable() => {
                log::warn!("Dropping frame: {err}");
                return Ok(RenderOutcome::Dropped(DropReason::RasterFailed));
            }
            Err(err) => return Err(err),
        };

        let frame = compose_rgba(
            &output.color,
            &output.coverage,
            self.params.background.as_deref(),
            self.settings.clear_rgba8(),
            self.params.effective_alpha_weight(),
        )?;
        self.displayed = Some(frame);
        Ok(RenderOutcome::Rendered)
    }
}

impl<U, R> PlaybackTarget for FaceViewer<U, R>
where
    U: GpuUploader,
    R: Rasterizer<U::Buffer>,
{
    fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    fn rig(&self) -> Option<&BlendshapeRig> {
        self.rig.as_ref()
    }

    fn apply_positions(&mut self, positions: &[Vec3], recompute_normals: bool) -> Result<()> {
        self.ensure_alive("apply_positions")?;
        if recompute_normals {
            self.geometry.replace_positions(positions, true)?;
        } else {
            self.geometry.replace_positions_no_topology_check(positions)?;
        }
        self.history.clear();
        self.sync.mark_dirty()
    }

    /// Playback coefficients are not clamped.
    fn synthesize_coefficients(&mut self, coefficients: &[f32], recompute_normals: bool) -> Result<()> {
        self.ensure_alive("synthesize_coefficients")?;
        self.apply_synthesis(coefficients, recompute_normals)
    }

    fn store_coefficients(&mut self, coefficients: &[f32]) {
        self.coefficients.clear();
        self.coefficients.extend_from_slice(coefficients);
    }

    fn render_frame(&mut self) -> Result<Option<RenderedFrame>> {
        let params = self.params.clone();
        match self.render(&params)? {
            RenderOutcome::Rendered => Ok(self.displayed.clone()),
            RenderOutcome::Dropped(_) => Ok(None),
        }
    }
}

impl<U, R> Drop for FaceViewer<U, R>
where
    U: GpuUploader,
    R: Rasterizer<U::Buffer>,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
