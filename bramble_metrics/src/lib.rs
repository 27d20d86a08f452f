// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Metrics: caption sizing for mind-map nodes.
//!
//! A node's box is exactly as large as its caption needs to be, so caption
//! measurement sits on the hot path of every draw, edit keystroke, and zoom
//! change. This crate provides:
//!
//! - The value types captions carry: [`Font`] (size, weight, style,
//!   decoration, color) and [`Color`].
//! - The measurement seam: [`TextMeasurer`], implemented by hosts that can
//!   ask their text stack for real extents, with
//!   [`MeasurementUnavailable`] as the (recoverable) failure mode.
//! - The caption policy on top of any measurer: [`caption_metrics`] scales
//!   the font by the zoom factor, applies the root/non-root width clamps,
//!   and pads the result — so a measurer only ever answers "how big is this
//!   text at this size, wrapped at this width".
//! - [`HeuristicMeasurer`], a deterministic per-glyph-class estimator with
//!   greedy word wrap, for hosts and tests that have no text stack at hand.
//!
//! Measurement is a pure function of `(font, text, max width)`. An
//! implementation may reuse one scratch measurement surface across calls,
//! but every call must fully overwrite the relevant style properties before
//! reading geometry back — no state may leak between calls.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod heuristic;

pub use heuristic::HeuristicMeasurer;

use kurbo::Size;

/// Minimum caption width for the root node, logical pixels.
pub const ROOT_CAPTION_MIN_WIDTH: f64 = 100.0;

/// Minimum caption width for non-root nodes, logical pixels.
pub const NODE_CAPTION_MIN_WIDTH: f64 = 70.0;

/// Maximum caption width for any node, logical pixels.
pub const NODE_CAPTION_MAX_WIDTH: f64 = 150.0;

/// Safety padding added to each measured axis, device pixels.
///
/// Hosts that render captions into editable surfaces tend to clip the last
/// pixel row; two extra pixels per axis absorb that.
const SAFETY_PADDING: f64 = 2.0;

/// An RGBA color with 8-bit channels.
///
/// Bramble only transports colors between the data model and the host's
/// paint system; it never blends or converts them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Font weight of a caption.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Font slant of a caption.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FontStyle {
    /// Upright glyphs.
    #[default]
    Normal,
    /// Italic glyphs.
    Italic,
}

/// Text decoration of a caption.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Underlined text.
    Underline,
    /// Struck-through text.
    LineThrough,
}

/// Caption font attributes as stored on the data model.
///
/// `size` is the *logical* font size; [`caption_metrics`] scales it by the
/// zoom factor before the measurer sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    /// Logical font size in pixels.
    pub size: f64,
    /// Weight.
    pub weight: FontWeight,
    /// Slant.
    pub style: FontStyle,
    /// Decoration.
    pub decoration: TextDecoration,
    /// Glyph color.
    pub color: Color,
}

impl Font {
    /// A plain black font at the given logical size.
    pub const fn new(size: f64) -> Self {
        Self {
            size,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            decoration: TextDecoration::None,
            color: Color::BLACK,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(15.0)
    }
}

/// Error returned when the host environment cannot report text extents.
///
/// Callers degrade gracefully: the renderer keeps a visual's last measured
/// size rather than failing the draw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MeasurementUnavailable;

impl core::fmt::Display for MeasurementUnavailable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("text measurement unavailable")
    }
}

impl core::error::Error for MeasurementUnavailable {}

/// Measures text extents at device scale.
///
/// `font.size` is already device-scaled when this is called through
/// [`caption_metrics`]. `max_width` bounds line length; text wider than it
/// must wrap and report the wrapped extent. The returned size is raw —
/// clamping and padding are the caller's policy.
pub trait TextMeasurer {
    /// Measure `text` at `font`, wrapping at `max_width` device pixels.
    fn measure(
        &self,
        font: &Font,
        text: &str,
        max_width: f64,
    ) -> Result<Size, MeasurementUnavailable>;
}

/// The size a node must reserve to render `text` as its caption.
///
/// Scales the font by `zoom_factor`, measures through `measurer` with the
/// maximum caption width as the wrap limit, clamps the width between the
/// root/non-root minimum and the shared maximum (all zoom-scaled), and adds
/// the safety padding. Height is unconstrained — it grows with wrapped
/// lines.
pub fn caption_metrics<M: TextMeasurer + ?Sized>(
    measurer: &M,
    font: &Font,
    text: &str,
    is_root: bool,
    zoom_factor: f64,
) -> Result<Size, MeasurementUnavailable> {
    let min_width = zoom_factor
        * if is_root {
            ROOT_CAPTION_MIN_WIDTH
        } else {
            NODE_CAPTION_MIN_WIDTH
        };
    let max_width = zoom_factor * NODE_CAPTION_MAX_WIDTH;

    let device_font = Font {
        size: zoom_factor * font.size,
        ..*font
    };
    let measured = measurer.measure(&device_font, text, max_width)?;

    let width = measured.width.clamp(min_width, max_width);
    Ok(Size::new(
        width + SAFETY_PADDING,
        measured.height + SAFETY_PADDING,
    ))
}
