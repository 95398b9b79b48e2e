// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tone adjustment — brightness, contrast, and hard monochrome threshold over
// RGBA rasters. Alpha is never touched.

use scanwerk_core::ToneSettings;
use tracing::{debug, instrument};

use crate::image::raster::{CHANNELS, RasterImage};

/// Luminance above this becomes white in monochrome mode.
const MONO_THRESHOLD: f64 = 128.0;

/// Per-pixel tone filters over a working raster.
///
/// Each method consumes `self` and returns the adjusted filter, so the
/// fixed order brightness → contrast → monochrome reads top to bottom:
///
/// ```ignore
/// let page = ToneFilter::new(rectified.clone())
///     .brightness(20)
///     .contrast(35)
///     .monochrome()
///     .into_raster();
/// ```
pub struct ToneFilter {
    image: RasterImage,
}

impl ToneFilter {
    pub fn new(image: RasterImage) -> Self {
        Self { image }
    }

    /// Add `value / 100 * 255` to R, G and B. `value` is clamped to
    /// -100..=100.
    pub fn brightness(mut self, value: i32) -> Self {
        let value = value.clamp(-100, 100);
        if value != 0 {
            let offset = value as f64 / 100.0 * 255.0;
            apply_lut(&mut self.image, &build_lut(|c| c + offset));
        }
        self
    }

    /// Stretch R, G and B around 128 by [`contrast_factor`]. `value` is
    /// clamped to -100..=100.
    pub fn contrast(mut self, value: i32) -> Self {
        let value = value.clamp(-100, 100);
        if value != 0 {
            let factor = contrast_factor(value);
            apply_lut(&mut self.image, &build_lut(|c| factor * (c - 128.0) + 128.0));
        }
        self
    }

    /// Replace each pixel with pure white or pure black by perceptual
    /// luminance.
    pub fn monochrome(mut self) -> Self {
        for px in self.image.as_raw_mut().chunks_exact_mut(CHANNELS) {
            let luma = 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
            let bw = if luma > MONO_THRESHOLD { 255 } else { 0 };
            px[..3].fill(bw);
        }
        self
    }

    pub fn as_raster(&self) -> &RasterImage {
        &self.image
    }

    pub fn into_raster(self) -> RasterImage {
        self.image
    }
}

/// Contrast multiplier for a slider value; exactly 1.0 at 0.
pub fn contrast_factor(value: i32) -> f64 {
    let v = value as f64;
    (259.0 * (v + 255.0)) / (255.0 * (259.0 - v))
}

/// Apply `settings` to a copy of `source`.
///
/// Always starts from the untouched source so adjustments never compound.
#[instrument(skip(source), fields(width = source.width(), height = source.height()))]
pub fn apply_tone(source: &RasterImage, settings: ToneSettings) -> RasterImage {
    let settings = settings.clamped();
    if settings.is_identity() {
        return source.clone();
    }

    let mut filter = ToneFilter::new(source.clone())
        .brightness(settings.brightness)
        .contrast(settings.contrast);
    if settings.monochrome {
        filter = filter.monochrome();
    }
    debug!("Tone applied");
    filter.into_raster()
}

/// Tabulate a channel transform, saturating and rounding half-to-even the
/// way 8-bit canvas buffers store fractional values.
fn build_lut(f: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (c, slot) in lut.iter_mut().enumerate() {
        *slot = f(c as f64).clamp(0.0, 255.0).round_ties_even() as u8;
    }
    lut
}

fn apply_lut(image: &mut RasterImage, lut: &[u8; 256]) {
    for px in image.as_raw_mut().chunks_exact_mut(CHANNELS) {
        for channel in &mut px[..3] {
            *channel = lut[*channel as usize];
        }
    }
}
