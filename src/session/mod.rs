//! Annotation session: one open submission on one drawing surface.
//!
//! The session owns the annotation store, the loaded images, the carousel,
//! the drawing state and the display geometry of the active image. Every
//! event handler runs to completion before the next one, so no locking is
//! involved. Geometry is only ever derived from the active image's intrinsic
//! size and the last known container width; pointer events that arrive
//! while no geometry exists are ignored.

use std::sync::Arc;

use toothmark_canvas::{Color, ContainerBounds, DisplayGeometry, Point, Surface};

use crate::carousel::Carousel;
use crate::config::SessionConfig;
use crate::drawing::{DrawingState, Tool, ToolSettings};
use crate::error::Result;
use crate::images::{HandleRegistry, ImageFetcher, ImageHandle, ImageSet};
use crate::model::{
    Condition, Findings, FlagFinding, ImageAnnotations, PatientInfo, SavePayload, Shape,
    Submission, TextFinding,
};
use crate::persist::FindingsSink;
use crate::render::{self, RenderStyle};
use crate::store::AnnotationStore;


/// An open annotation session over one submission.
pub struct AnnotationSession<S: Surface> {
    submission_id: String,
    image_references: Vec<String>,
    patient: PatientInfo,
    findings: Findings,
    store: AnnotationStore,
    registry: HandleRegistry,
    images: ImageSet,
    carousel: Carousel,
    settings: ToolSettings,
    drawing: DrawingState,
    geometry: Option<DisplayGeometry>,
    container_width: Option<f64>,
    style: RenderStyle,
    min_shape_size: f64,
    surface: S,
}

impl<S: Surface> AnnotationSession<S> {
    /// Open a session on a copy of `submission`.
    ///
    /// Prior annotations embedded in the findings hydrate the store; without
    /// them every image starts with an empty record. No images are loaded
    /// yet, see [`load_images`](Self::load_images).
    pub fn open(submission: &Submission, config: &SessionConfig, surface: S) -> Self {
        let (findings, prior) = split_findings(submission);
        let store = AnnotationStore::hydrate(submission.image_references.clone(), prior);

        log::info!(
            "Opened submission '{}' with {} images ({} prior shapes)",
            submission.id,
            submission.image_references.len(),
            store.total_shapes()
        );

        Self {
            submission_id: submission.id.clone(),
            image_references: submission.image_references.clone(),
            patient: submission.patient.clone(),
            findings,
            store,
            registry: HandleRegistry::new(),
            images: ImageSet::empty(),
            carousel: Carousel::empty(),
            settings: ToolSettings::new(None, config.default_color),
            drawing: DrawingState::Idle,
            geometry: None,
            container_width: None,
            style: config.render_style(),
            min_shape_size: config.min_shape_size(),
            surface,
        }
    }

    /// Replace the open submission with another one.
    ///
    /// Everything belonging to the previous submission is discarded and its
    /// image handles are released. Tool and color selection are kept.
    pub fn switch_submission(&mut self, submission: &Submission) {
        log::info!(
            "Switching from submission '{}' to '{}'",
            self.submission_id,
            submission.id
        );
        self.release_images();

        let (findings, prior) = split_findings(submission);
        self.submission_id = submission.id.clone();
        self.image_references = submission.image_references.clone();
        self.patient = submission.patient.clone();
        self.findings = findings;
        self.store = AnnotationStore::hydrate(submission.image_references.clone(), prior);
    }

    /// Fetch and decode every image of the submission, sequentially.
    ///
    /// Handles from a previous load are released first. On a fetch failure
    /// the remaining images are not fetched, every handle is released and
    /// the display list stays empty. Images that fail to decode are kept out
    /// of the carousel. Returns the number of presentable images.
    pub fn load_images<F: ImageFetcher + ?Sized>(&mut self, fetcher: &mut F) -> Result<usize> {
        self.release_images();

        let set = match ImageSet::fetch_all(fetcher, &self.image_references, &self.registry) {
            Ok(set) => set,
            Err(e) => {
                log::warn!(
                    "Image load for submission '{}' aborted: {}",
                    self.submission_id,
                    e
                );
                return Err(e);
            }
        };

        for (index, reference, reason) in set.failures() {
            log::warn!("Image {} ('{}') is unavailable: {}", index, reference, reason);
        }

        self.carousel = Carousel::with_availability(set.availability());
        self.images = set;

        log::info!(
            "Loaded {} of {} images for submission '{}'",
            self.images.ready_count(),
            self.image_references.len(),
            self.submission_id
        );

        self.relayout();
        Ok(self.images.ready_count())
    }

    /// Replace the image list of the open submission.
    ///
    /// Records follow their image reference. Loaded images are released;
    /// call [`load_images`](Self::load_images) to fetch the new list.
    pub fn set_image_references(&mut self, references: Vec<String>) {
        self.release_images();
        self.store.rekey(references.clone());
        self.image_references = references;
    }

    fn release_images(&mut self) {
        self.drawing.cancel();
        self.geometry = None;
        self.carousel = Carousel::empty();
        let released = self.images.ready_count();
        self.images = ImageSet::empty();
        self.surface.clear();
        if released > 0 {
            log::debug!("Released {} image handles", released);
        }
    }

    /// Report a new container width. Returns whether valid geometry exists
    /// afterwards; before the active image has loaded this only records the
    /// width.
    pub fn resize(&mut self, container_width: f64) -> bool {
        self.container_width = Some(container_width);
        self.relayout();
        self.geometry.is_some()
    }

    /// Re-derive geometry from the active image's intrinsic size, resize the
    /// surface to match and repaint.
    fn relayout(&mut self) {
        self.geometry = self.establish_geometry();
        let Some(geometry) = self.geometry else {
            return;
        };

        let (width, height) = geometry.surface_size();
        if let Err(e) = self.surface.resize(width, height) {
            log::warn!("Failed to resize drawing surface: {}", e);
            self.geometry = None;
            return;
        }
        self.redraw();
    }

    fn establish_geometry(&self) -> Option<DisplayGeometry> {
        let index = self.carousel.current_index()?;
        let (width, height) = self.images.dimensions(index)?;
        DisplayGeometry::establish(width, height, self.container_width?)
    }

    /// Pointer pressed at a viewport position. Starts a drag if a tool is
    /// selected, geometry exists and the pointer is inside the container.
    pub fn pointer_down(&mut self, pointer: Point, bounds: &ContainerBounds) -> bool {
        if !self.settings.is_interactive() || !bounds.contains(pointer) {
            return false;
        }
        let Some(native) = self.to_native(pointer, bounds) else {
            return false;
        };
        log::trace!("Pointer down at native ({:.1}, {:.1})", native.x, native.y);
        self.drawing.pointer_down(&self.settings, native)
    }

    /// Pointer moved. While dragging, repaints the committed shapes with the
    /// preview on top. Returns whether a preview was painted.
    pub fn pointer_move(&mut self, pointer: Point, bounds: &ContainerBounds) -> bool {
        if !self.drawing.is_drawing() {
            return false;
        }
        let (Some(native), Some(geometry), Some(index)) = (
            self.to_native(pointer, bounds),
            self.geometry,
            self.carousel.current_index(),
        ) else {
            return false;
        };
        let Some(preview) = self.drawing.pointer_move(&self.settings, native) else {
            return false;
        };
        render::redraw_with_preview(
            &mut self.surface,
            &geometry,
            self.store.get(index),
            &preview,
            &self.style,
        );
        true
    }

    /// Pointer released. Commits the drag to the active image's record and
    /// repaints. Returns the committed shape.
    pub fn pointer_up(&mut self, pointer: Point, bounds: &ContainerBounds) -> Option<Shape> {
        if !self.drawing.is_drawing() {
            return None;
        }
        let (Some(native), Some(index)) = (
            self.to_native(pointer, bounds),
            self.carousel.current_index(),
        ) else {
            self.drawing.cancel();
            self.redraw();
            return None;
        };

        let Some(shape) = self
            .drawing
            .pointer_up(&self.settings, native, self.min_shape_size)
        else {
            self.redraw();
            return None;
        };
        self.store.append(index, shape.clone());
        self.redraw();
        Some(shape)
    }

    /// Pointer left the surface. Abandons an in-progress drag without a
    /// commit and removes its preview. Returns whether a drag was abandoned.
    pub fn pointer_leave(&mut self) -> bool {
        if !self.drawing.cancel() {
            return false;
        }
        log::trace!("Drag cancelled");
        self.redraw();
        true
    }

    fn to_native(&self, pointer: Point, bounds: &ContainerBounds) -> Option<Point> {
        self.geometry?.to_native(pointer, bounds)
    }

    pub fn next_image(&mut self) -> bool {
        let changed = self.carousel.next();
        if changed {
            self.active_image_changed();
        }
        changed
    }

    pub fn previous_image(&mut self) -> bool {
        let changed = self.carousel.previous();
        if changed {
            self.active_image_changed();
        }
        changed
    }

    pub fn go_to_image(&mut self, index: usize) -> bool {
        let changed = self.carousel.go_to(index);
        if changed {
            self.active_image_changed();
        }
        changed
    }

    fn active_image_changed(&mut self) {
        self.drawing.cancel();
        self.geometry = None;
        log::debug!("Active image is now {:?}", self.carousel.current_index());
        self.relayout();
    }

    /// Select a tool, or `None` to make the overlay non-interactive. A drag
    /// in progress is dropped when the tool is deselected.
    pub fn select_tool(&mut self, tool: Option<Tool>) {
        self.settings.tool = tool;
        if tool.is_none() && self.drawing.cancel() {
            self.redraw();
        }
    }

    pub fn select_condition(&mut self, condition: Condition) {
        self.settings.color = condition.color();
    }

    /// Select a stroke color. Only palette colors are accepted.
    pub fn select_color(&mut self, color: Color) -> bool {
        match Condition::from_color(color) {
            Some(condition) => {
                self.select_condition(condition);
                true
            }
            None => false,
        }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Whether the overlay should receive pointer events.
    pub fn is_interactive(&self) -> bool {
        self.settings.is_interactive()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    /// Remove all shapes of the active image. Returns false if no image is
    /// active.
    pub fn clear_current_image(&mut self) -> bool {
        let Some(index) = self.carousel.current_index() else {
            return false;
        };
        self.drawing.cancel();
        self.store.clear(index);
        self.redraw();
        true
    }

    /// Repaint the active image's shapes. Returns false while no geometry
    /// exists.
    pub fn redraw(&mut self) -> bool {
        let (Some(geometry), Some(index)) = (self.geometry, self.carousel.current_index()) else {
            return false;
        };
        render::redraw(&mut self.surface, &geometry, self.store.get(index), &self.style);
        true
    }

    pub fn set_text_finding(&mut self, field: TextFinding, value: impl Into<String>) {
        self.findings.set_text(field, value);
    }

    pub fn set_flag_finding(&mut self, field: FlagFinding, value: bool) {
        self.findings.set_flag(field, value);
    }

    pub fn findings(&self) -> &Findings {
        &self.findings
    }

    pub fn findings_mut(&mut self) -> &mut Findings {
        &mut self.findings
    }

    /// Current annotation sequence, index-aligned with the image list.
    pub fn annotations(&self) -> Arc<Vec<ImageAnnotations>> {
        self.store.snapshot()
    }

    /// Shapes of the active image.
    pub fn current_annotations(&self) -> &[Shape] {
        self.carousel
            .current_index()
            .map(|i| self.store.get(i))
            .unwrap_or(&[])
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Point-in-time export of findings plus the full annotation sequence.
    pub fn snapshot(&self) -> SavePayload {
        SavePayload::new(self.findings.clone(), self.store.records().to_vec())
    }

    /// Hand the current payload to `sink`. The session is unchanged whether
    /// or not the save succeeds.
    pub fn save<K: FindingsSink + ?Sized>(&self, sink: &mut K) -> Result<SavePayload> {
        let payload = self.snapshot();
        if let Err(e) = sink.save(&self.submission_id, &payload) {
            log::warn!("Saving submission '{}' failed: {}", self.submission_id, e);
            return Err(e.into());
        }
        log::info!(
            "Saved submission '{}' ({} shapes)",
            self.submission_id,
            payload.total_shapes()
        );
        Ok(payload)
    }

    /// Tear the session down, releasing every image handle.
    pub fn close(mut self) {
        self.release_images();
        log::info!(
            "Closed submission '{}' ({} handles still live)",
            self.submission_id,
            self.registry.live()
        );
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn image_references(&self) -> &[String] {
        &self.image_references
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    /// Handle of the active image.
    pub fn current_image(&self) -> Option<&ImageHandle> {
        self.images.handle(self.carousel.current_index()?)
    }

    pub fn geometry(&self) -> Option<&DisplayGeometry> {
        self.geometry.as_ref()
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn current_index(&self) -> Option<usize> {
        self.carousel.current_index()
    }

    /// Position label like "Image 2 of 3".
    pub fn progress(&self) -> String {
        self.carousel.progress()
    }

    /// Registry tracking this session's image handles.
    pub fn handle_registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Number of image handles currently held.
    pub fn live_handles(&self) -> usize {
        self.registry.live()
    }
}

fn split_findings(submission: &Submission) -> (Findings, Option<Vec<ImageAnnotations>>) {
    match submission.findings.clone() {
        Some(f) => (f.form, f.annotations),
        None => (Findings::default(), None),
    }
}
