// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — resample a quadrilateral into an upright
// rectangle by inverse mapping with nearest-neighbour sampling.

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::{CornerSet, Point};
use tracing::{debug, info, instrument};

use crate::geometry::Homography;
use crate::image::raster::{CHANNELS, RasterImage};

/// Source coordinates this close to a whole pixel are treated as exact.
const SNAP: f64 = 1e-9;

/// Output size for a quadrilateral given in pixel space.
///
/// Width is the longer of the top and bottom edges, height the longer of
/// the left and right edges, so foreshortened sides are not squeezed.
pub fn target_size(quad: &[Point; 4]) -> (f64, f64) {
    let [tl, tr, br, bl] = quad;
    let width = tl.distance(tr).max(br.distance(bl));
    let height = tr.distance(br).max(bl.distance(tl));
    (width, height)
}

/// Rectify the region of `source` bounded by `corners` (percentage space).
///
/// Each destination pixel is mapped back into the source with a homography
/// estimated from the destination rectangle to the source quadrilateral.
/// Pixels that land outside the source stay fully transparent.
#[instrument(skip_all, fields(src_w = source.width(), src_h = source.height()))]
pub fn rectify(source: &RasterImage, corners: &CornerSet) -> Result<RasterImage> {
    let (src_w, src_h) = (source.width(), source.height());
    let quad = corners.to_pixels(src_w, src_h);
    let (width, height) = target_size(&quad);

    let out_w = width as u32;
    let out_h = height as u32;
    if out_w == 0 || out_h == 0 {
        return Err(ScanError::InvalidInput(format!(
            "corners enclose an empty region ({width:.2} x {height:.2} px)"
        )));
    }

    let rect = [
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
    ];
    let to_source = Homography::from_correspondences(&rect, &quad)?;
    debug!(matrix = ?to_source.matrix(), out_w, out_h, "Inverse homography estimated");

    let mut output = RasterImage::new(out_w, out_h)?;
    let src = source.as_raw();
    let src_stride = src_w as usize * CHANNELS;
    let row_len = out_w as usize * CHANNELS;

    for (y, row) in output.as_raw_mut().chunks_exact_mut(row_len).enumerate() {
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let Some((sx, sy)) = to_source.apply_xy(x as f64, y as f64) else {
                continue;
            };
            let (sx, sy) = (snap(sx), snap(sy));
            if !(sx >= 0.0 && sx < src_w as f64 && sy >= 0.0 && sy < src_h as f64) {
                continue;
            }
            // Source alpha is carried over as-is; page preparation flattens
            // onto white before encoding.
            let offset = sy as usize * src_stride + sx as usize * CHANNELS;
            px.copy_from_slice(&src[offset..offset + CHANNELS]);
        }
    }

    info!(out_w, out_h, "Perspective rectified");
    Ok(output)
}

/// Absorb solver round-off so an exact pixel position does not floor into
/// its left or upper neighbour.
#[inline]
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP { r } else { v }
}
