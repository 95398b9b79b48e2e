// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Image and document processing for the Scanwerk scanner.
//
// Provides raster decoding and encoding, the projective geometry behind
// perspective correction, document corner detection, tone filters, an
// interactive per-page editing session, and a self-contained multi-page PDF
// writer.

pub mod collection;
pub mod geometry;
pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod scan;

// Re-export the primary structs so callers can use `scanwerk_document::PdfWriter` etc.
pub use collection::PageCollection;
pub use geometry::{Homography, solve_linear_system};
pub use self::image::processor::ImageProcessor;
pub use self::image::raster::RasterImage;
pub use pdf::page::{DocumentBytes, Page};
pub use pdf::writer::PdfWriter;
pub use pipeline::ScanPipeline;
pub use scan::detect::CornerDetector;
pub use scan::editor::{PageEditor, ToneEditor};
pub use scan::enhance::{ToneFilter, apply_tone};
pub use scan::rectify::rectify;
