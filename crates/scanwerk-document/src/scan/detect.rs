// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document corner detection — Sobel edge strength plus a coarse maximum
// search around each of the four inset image corners.

use image::{GrayImage, Luma};
use scanwerk_core::{CornerSet, Point, ScanConfig};
use tracing::{debug, instrument, warn};

use crate::image::raster::{CHANNELS, RasterImage};

/// Estimates the four corners of the dominant document quadrilateral.
///
/// The detector holds no state between calls; identical input always gives
/// identical corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerDetector {
    /// Inset of each search centre as a fraction of the shorter image side.
    margin_ratio: f64,
    /// Grid stride of the search, in pixels.
    stride: u32,
}

impl Default for CornerDetector {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl CornerDetector {
    pub fn new(margin_ratio: f64, stride: u32) -> Self {
        Self {
            margin_ratio: margin_ratio.max(0.0),
            stride: stride.max(1),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.margin_ratio, config.search_stride)
    }

    /// Detect corners, returned in percentage space.
    ///
    /// A search region with no edge response at all keeps its own centre,
    /// so a blank image yields the margin-inset rectangle.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &RasterImage) -> CornerSet {
        let edges = edge_map(image);
        self.detect_in_edges(&edges)
    }

    /// Run only the search stage over a precomputed edge map.
    pub fn detect_in_edges(&self, edges: &GrayImage) -> CornerSet {
        let (width, height) = edges.dimensions();
        let found = self.locate(edges);
        debug!(?found, "Document corners located");
        CornerSet::from_pixels(found, width, height)
    }

    /// Inset of the search centres from the image corners, in pixels.
    pub fn margin(&self, width: u32, height: u32) -> f64 {
        width.min(height) as f64 * self.margin_ratio
    }

    /// The four search centres in pixel space, in corner order.
    pub fn fallback_corners(&self, width: u32, height: u32) -> [Point; 4] {
        let margin = self.margin(width, height);
        let (w, h) = (width as f64, height as f64);
        [
            Point::new(margin, margin),
            Point::new(w - margin, margin),
            Point::new(w - margin, h - margin),
            Point::new(margin, h - margin),
        ]
    }

    /// Strongest edge sample in each region. A region where nothing beats
    /// zero falls back to its own centre; the other regions are unaffected.
    pub fn locate(&self, edges: &GrayImage) -> [Point; 4] {
        let (width, height) = edges.dimensions();
        let radius = self.margin(width, height);
        let centres = self.fallback_corners(width, height);

        let mut found = centres;
        for (index, (slot, centre)) in found.iter_mut().zip(centres).enumerate() {
            match self.search_region(edges, centre, radius) {
                Some(point) => *slot = point,
                None => warn!(region = index, width, height, "No edge response near corner; using inset centre"),
            }
        }
        found
    }

    fn search_region(&self, edges: &GrayImage, centre: Point, radius: f64) -> Option<Point> {
        let (width, height) = edges.dimensions();
        let max_x = width.saturating_sub(1) as f64;
        let max_y = height.saturating_sub(1) as f64;
        let stride = self.stride as f64;
        let steps = (2.0 * radius / stride).floor() as u32;

        let mut best: Option<(u8, Point)> = None;
        for j in 0..=steps {
            let y = (centre.y - radius + j as f64 * stride).clamp(0.0, max_y);
            for i in 0..=steps {
                let x = (centre.x - radius + i as f64 * stride).clamp(0.0, max_x);
                let strength = edges.get_pixel(x as u32, y as u32).0[0];
                let best_so_far = best.map_or(0, |(s, _)| s);
                if strength > best_so_far {
                    best = Some((strength, Point::new(x, y)));
                }
            }
        }
        best.map(|(_, p)| p)
    }
}

/// Gradient magnitude of the channel-average grey level, saturated to 8 bits.
///
/// Uses the 3x3 Sobel pair; the one-pixel border is left at zero.
pub fn edge_map(image: &RasterImage) -> GrayImage {
    let (width, height) = (image.width(), image.height());
    let mut out = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return out;
    }

    let w = width as usize;
    let grey: Vec<f64> = image
        .as_raw()
        .chunks_exact(CHANNELS)
        .map(|px| (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0)
        .collect();

    for y in 1..height as usize - 1 {
        let above = &grey[(y - 1) * w..y * w];
        let row = &grey[y * w..(y + 1) * w];
        let below = &grey[(y + 1) * w..(y + 2) * w];
        for x in 1..w - 1 {
            let gx = (above[x + 1] + 2.0 * row[x + 1] + below[x + 1])
                - (above[x - 1] + 2.0 * row[x - 1] + below[x - 1]);
            let gy = (below[x - 1] + 2.0 * below[x] + below[x + 1])
                - (above[x - 1] + 2.0 * above[x] + above[x + 1]);
            let magnitude = gx.hypot(gy).round_ties_even().min(255.0);
            out.put_pixel(x as u32, y as u32, Luma([magnitude as u8]));
        }
    }
    out
}
