//! Image lightbox for a selected vehicle: navigation, zoom, pan, fullscreen.
//!
//! DESIGN
//! ======
//! The lightbox is plain numeric state with no rendering knowledge. Renderers
//! subscribe to `View` snapshots and redraw from them; every operation that
//! changes state notifies subscribers once. The same state machine backs the
//! public listing, the carousel and the admin dashboard (`GalleryContext`).
//!
//! States are `{inline, fullscreen} x {idle, dragging}`. Image navigation and
//! fullscreen transitions always snap zoom and pan back to the origin.
//!
//! The keyboard listener is attached on entering fullscreen and detached on
//! leaving it (or on closing the gallery), so key handling is inert inline.
//!
//! ERROR HANDLING
//! ==============
//! Every operation is total. Navigation on a vehicle without images, drags
//! at zoom <= 1, and keys while inline are silent no-ops.

pub mod keys;

pub use keys::Key;

use tracing::debug;

use crate::inventory::{Vehicle, VehicleImage};

pub const ZOOM_STEP: f64 = 1.2;
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// A pointer position or pan offset in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which surface a lightbox instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryContext {
    #[default]
    Listing,
    Carousel,
    Dashboard,
}

/// Snapshot of everything a renderer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub open: bool,
    pub index: usize,
    pub image_count: usize,
    pub zoom: f64,
    pub pan: Point,
    pub fullscreen: bool,
    pub dragging: bool,
}

/// Handle returned by [`Lightbox::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&View)>;

// =============================================================================
// LIGHTBOX
// =============================================================================

/// Lightbox state for one gallery. The selected vehicle is borrowed from
/// the list currently on display.
pub struct Lightbox<'v> {
    context: GalleryContext,
    vehicle: Option<&'v Vehicle>,
    open: bool,
    index: usize,
    zoom: f64,
    pan: Point,
    fullscreen: bool,
    /// Last pointer position while a drag gesture is active.
    drag: Option<Point>,
    key_listener: bool,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<'v> Lightbox<'v> {
    #[must_use]
    pub fn new(context: GalleryContext) -> Self {
        Self {
            context,
            vehicle: None,
            open: false,
            index: 0,
            zoom: DEFAULT_ZOOM,
            pan: Point::ORIGIN,
            fullscreen: false,
            drag: None,
            key_listener: false,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // --- accessors ---

    #[must_use]
    pub fn context(&self) -> GalleryContext {
        self.context
    }

    #[must_use]
    pub fn vehicle(&self) -> Option<&'v Vehicle> {
        self.vehicle
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn pan(&self) -> Point {
        self.pan
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether the fullscreen keyboard listener is currently attached.
    #[must_use]
    pub fn is_listening_for_keys(&self) -> bool {
        self.key_listener
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.vehicle.map_or(0, |v| v.images.len())
    }

    #[must_use]
    pub fn current_image(&self) -> Option<&'v VehicleImage> {
        self.vehicle.and_then(|v| v.images.get(self.index))
    }

    #[must_use]
    pub fn view(&self) -> View {
        View {
            open: self.open,
            index: self.index,
            image_count: self.image_count(),
            zoom: self.zoom,
            pan: self.pan,
            fullscreen: self.fullscreen,
            dragging: self.drag.is_some(),
        }
    }

    // --- observers ---

    /// Register a renderer callback invoked with the new `View` after each change.
    pub fn subscribe(&mut self, observer: impl FnMut(&View) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        let view = self.view();
        for (_, observer) in &mut self.observers {
            observer(&view);
        }
    }

    // --- open / close ---

    /// Select `vehicle` and open the gallery on its first image.
    pub fn open_gallery(&mut self, vehicle: &'v Vehicle) {
        self.vehicle = Some(vehicle);
        self.index = 0;
        self.drag = None;
        self.reset_view();
        self.open = true;
        debug!(context = ?self.context, vehicle_id = %vehicle.id, images = vehicle.images.len(), "gallery opened");
        self.notify();
    }

    /// Close the gallery, leaving fullscreen and releasing the keyboard listener.
    pub fn close_gallery(&mut self) {
        if !self.open && self.vehicle.is_none() {
            return;
        }
        self.fullscreen = false;
        self.detach_key_listener();
        self.drag = None;
        self.reset_view();
        self.index = 0;
        self.vehicle = None;
        self.open = false;
        debug!(context = ?self.context, "gallery closed");
        self.notify();
    }

    // --- navigation ---

    pub fn next_image(&mut self) {
        let count = self.image_count();
        if count == 0 {
            return;
        }
        self.index = (self.index + 1) % count;
        self.after_navigation();
    }

    pub fn prev_image(&mut self) {
        let count = self.image_count();
        if count == 0 {
            return;
        }
        self.index = (self.index + count - 1) % count;
        self.after_navigation();
    }

    fn after_navigation(&mut self) {
        self.drag = None;
        self.reset_view();
        self.notify();
    }

    // --- zoom ---

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        self.notify();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        self.notify();
    }

    pub fn reset_zoom_and_pan(&mut self) {
        self.reset_view();
        self.notify();
    }

    fn reset_view(&mut self) {
        self.zoom = DEFAULT_ZOOM;
        self.pan = Point::ORIGIN;
    }

    // --- drag to pan ---

    /// Start a pan gesture. Ignored unless zoomed in past 1.0.
    pub fn begin_drag(&mut self, pointer: Point) {
        if self.zoom <= DEFAULT_ZOOM {
            return;
        }
        self.drag = Some(pointer);
        self.notify();
    }

    /// Move the image by the pointer delta since the last drag event.
    pub fn drag_to(&mut self, pointer: Point) {
        if self.zoom <= DEFAULT_ZOOM {
            return;
        }
        let Some(last) = self.drag else {
            return;
        };
        self.pan.x += pointer.x - last.x;
        self.pan.y += pointer.y - last.y;
        self.drag = Some(pointer);
        self.notify();
    }

    pub fn end_drag(&mut self) {
        let was_dragging = self.drag.take().is_some();
        if was_dragging {
            self.notify();
        }
    }

    // --- fullscreen ---

    pub fn enter_fullscreen(&mut self) {
        self.fullscreen = true;
        self.reset_view();
        self.attach_key_listener();
        self.notify();
    }

    pub fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
        self.reset_view();
        self.detach_key_listener();
        self.notify();
    }

    fn attach_key_listener(&mut self) {
        if !self.key_listener {
            self.key_listener = true;
            debug!(context = ?self.context, "fullscreen key listener attached");
        }
    }

    fn detach_key_listener(&mut self) {
        if self.key_listener {
            self.key_listener = false;
            debug!(context = ?self.context, "fullscreen key listener detached");
        }
    }

    // --- keyboard ---

    /// Dispatch a key press. Returns whether the key was consumed.
    ///
    /// Keys are only handled while the fullscreen listener is attached.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        if !self.key_listener {
            return false;
        }
        match key {
            Key::Escape => self.exit_fullscreen(),
            Key::ArrowLeft => self.prev_image(),
            Key::ArrowRight => self.next_image(),
            Key::Char('+' | '=') => self.zoom_in(),
            Key::Char('-') => self.zoom_out(),
            Key::Char('0') => self.reset_zoom_and_pan(),
            Key::Char(_) | Key::Other(_) => return false,
        }
        true
    }
}

impl Default for Lightbox<'_> {
    fn default() -> Self {
        Self::new(GalleryContext::default())
    }
}

impl std::fmt::Debug for Lightbox<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lightbox")
            .field("context", &self.context)
            .field("vehicle", &self.vehicle.map(|v| v.id.as_str()))
            .field("view", &self.view())
            .field("key_listener", &self.key_listener)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
