// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom factor, scaling helpers, and the surface/viewport pair.

use kurbo::{Point, Size, Vec2};

/// Error returned when a zoom factor is non-positive or non-finite.
///
/// The offending value is carried for diagnostics. Rejection happens before
/// any state is mutated; callers are expected to clamp their input first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidZoom(pub f64);

impl core::fmt::Display for InvalidZoom {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid zoom factor {}", self.0)
    }
}

impl core::error::Error for InvalidZoom {}

/// The view-wide zoom state.
///
/// Holds the current factor and the ratio of the current factor to the
/// previous one. The delta is what whole-surface rescaling consumes: it is
/// recomputed on every successful [`Zoom::set_factor`] call and reused until
/// the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    factor: f64,
    delta: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new()
    }
}

impl Zoom {
    /// A fresh zoom state at factor 1.0.
    pub const fn new() -> Self {
        Self {
            factor: 1.0,
            delta: 1.0,
        }
    }

    /// The current zoom factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Ratio of the current factor to the one before it.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Set a new zoom factor, recording the delta to the old one.
    ///
    /// Fails with [`InvalidZoom`] — leaving factor and delta untouched — if
    /// `factor` is not a finite positive number.
    pub fn set_factor(&mut self, factor: f64) -> Result<(), InvalidZoom> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(InvalidZoom(factor));
        }
        self.delta = factor / self.factor;
        self.factor = factor;
        Ok(())
    }

    /// Scale a logical value to device space.
    pub fn to_device(&self, logical: f64) -> f64 {
        logical * self.factor
    }

    /// Scale a device value back to logical space.
    pub fn to_logical(&self, device: f64) -> f64 {
        device / self.factor
    }

    /// Scale a logical point to device space.
    pub fn point_to_device(&self, logical: Point) -> Point {
        Point::new(logical.x * self.factor, logical.y * self.factor)
    }

    /// Scale a device point back to logical space.
    pub fn point_to_logical(&self, device: Point) -> Point {
        Point::new(device.x / self.factor, device.y / self.factor)
    }

    /// Scale a logical size to device space.
    pub fn size_to_device(&self, logical: Size) -> Size {
        Size::new(logical.width * self.factor, logical.height * self.factor)
    }
}

/// The scrollable window onto the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Size of the visible window, device pixels.
    pub size: Size,
    /// Scroll offset of the window's top-left within the surface.
    pub scroll: Vec2,
}

/// A drawing surface plus the zoom and viewport looking at it.
///
/// The surface size is kept in device pixels; [`View::set_dimensions`] takes
/// logical dimensions and applies the current factor, mirroring how node
/// offsets are scaled by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct View {
    /// The zoom state owned by this view.
    pub zoom: Zoom,
    /// Device size of the drawing surface.
    pub surface: Size,
    /// The scroll viewport.
    pub viewport: Viewport,
}

impl View {
    /// A view at zoom 1.0 with an empty surface.
    pub fn new() -> Self {
        Self {
            zoom: Zoom::new(),
            surface: Size::ZERO,
            viewport: Viewport::default(),
        }
    }

    /// Set the surface size from logical dimensions.
    pub fn set_dimensions(&mut self, logical: Size) {
        self.surface = self.zoom.size_to_device(logical);
    }

    /// Scroll so the center of the surface sits under the viewport center.
    pub fn center(&mut self) {
        let w = self.surface.width - self.viewport.size.width;
        let h = self.surface.height - self.viewport.size.height;
        self.scroll_to(Vec2::new(w / 2.0, h / 2.0));
    }

    /// Scroll the viewport to an absolute offset.
    pub fn scroll_to(&mut self, scroll: Vec2) {
        self.viewport.scroll = scroll;
    }

    /// Pan the viewport by a delta (map dragging).
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.viewport.scroll += delta;
    }

    /// Resize the surface for the latest zoom change and re-derive the
    /// scroll offset so the same logical point stays under the viewport
    /// center.
    ///
    /// Consumes [`Zoom::delta`]: call once per successful
    /// [`Zoom::set_factor`], after which the per-node rescale walk is the
    /// renderer's job.
    pub fn apply_zoom(&mut self) {
        let delta = self.zoom.delta();

        let half_w = self.viewport.size.width / 2.0;
        let half_h = self.viewport.size.height / 2.0;
        let center_x = (half_w + self.viewport.scroll.x) * delta;
        let center_y = (half_h + self.viewport.scroll.y) * delta;

        self.surface = Size::new(self.surface.width * delta, self.surface.height * delta);

        // Scroll only after the surface grew, so the offset stays in range.
        self.scroll_to(Vec2::new(center_x - half_w, center_y - half_h));
    }

    /// Drop the surface and reset the scroll; zoom survives a clear.
    pub fn clear(&mut self) {
        self.surface = Size::ZERO;
        self.viewport.scroll = Vec2::ZERO;
    }
}
