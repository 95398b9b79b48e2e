// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — corner detection, perspective rectification, tone
// filters, and the interactive editing session that ties them together.

pub mod detect;
pub mod editor;
pub mod enhance;
pub mod rectify;

pub use detect::CornerDetector;
pub use editor::{PageEditor, ToneEditor};
pub use enhance::ToneFilter;
pub use rectify::rectify;
