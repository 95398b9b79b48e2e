// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry module — dense linear solving and four-point homographies.

pub mod homography;
pub mod solve;

pub use homography::Homography;
pub use solve::solve_linear_system;
