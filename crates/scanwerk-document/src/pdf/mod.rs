// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — finished pages and the multi-page document writer.

pub mod page;
pub mod writer;

pub use page::{DocumentBytes, Page};
pub use writer::PdfWriter;
