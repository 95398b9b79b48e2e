// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Four-point projective transform via the direct linear transform.

use scanwerk_core::Point;
use scanwerk_core::error::Result;
use tracing::trace;

use super::solve::solve_linear_system;

/// Homogeneous weights closer to zero than this map to infinity.
const EPS: f64 = 1e-12;

/// A 3x3 projective transform with the bottom-right entry fixed to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    m: [[f64; 3]; 3],
}

impl Homography {
    pub const IDENTITY: Homography = Homography {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Estimate the transform taking each `src[i]` to `dst[i]`.
    ///
    /// Each pair contributes two rows, from cross-multiplying
    /// `x' = (h0 x + h1 y + h2) / (h6 x + h7 y + 1)` and the matching `y'`
    /// equation. Collinear or coincident points make the 8x8 system
    /// singular.
    pub fn from_correspondences(src: &[Point; 4], dst: &[Point; 4]) -> Result<Self> {
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            a[2 * i] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -d.x * s.x, -d.x * s.y];
            a[2 * i + 1] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -d.y * s.x, -d.y * s.y];
            b[2 * i] = d.x;
            b[2 * i + 1] = d.y;
        }

        let h = solve_linear_system(&a, &b)?;
        trace!(?h, "Homography solved");
        Ok(Self::from_row_major([
            h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0,
        ]))
    }

    /// Build from nine entries in row-major order.
    pub fn from_row_major(v: [f64; 9]) -> Self {
        Self {
            m: [[v[0], v[1], v[2]], [v[3], v[4], v[5]], [v[6], v[7], v[8]]],
        }
    }

    pub fn matrix(&self) -> &[[f64; 3]; 3] {
        &self.m
    }

    /// Map `(x, y)` with perspective division.
    ///
    /// Returns `None` when the point lands on the line at infinity.
    #[inline]
    pub fn apply_xy(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let m = &self.m;
        let w = m[2][0] * x + m[2][1] * y + m[2][2];
        if w.abs() < EPS {
            return None;
        }
        Some((
            (m[0][0] * x + m[0][1] * y + m[0][2]) / w,
            (m[1][0] * x + m[1][1] * y + m[1][2]) / w,
        ))
    }

    pub fn apply(&self, p: Point) -> Option<Point> {
        self.apply_xy(p.x, p.y).map(|(x, y)| Point::new(x, y))
    }
}
