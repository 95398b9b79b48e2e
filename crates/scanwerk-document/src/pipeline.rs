// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The four operations external callers drive the scanner with: detect,
// rectify, tone, and encode. Callers own all I/O; everything here works on
// in-memory rasters and returns bytes.

use scanwerk_core::error::Result;
use scanwerk_core::{CornerSet, ScanConfig, ToneSettings};
use tracing::{info, instrument};

use crate::image::raster::RasterImage;
use crate::pdf::page::{DocumentBytes, Page};
use crate::pdf::writer::PdfWriter;
use crate::scan::detect::CornerDetector;
use crate::scan::{enhance, rectify};

/// Scanner entry points bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct ScanPipeline {
    config: ScanConfig,
}

impl ScanPipeline {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Corners of the dominant document quadrilateral, in percentages.
    pub fn detect_corners(&self, image: &RasterImage) -> CornerSet {
        CornerDetector::from_config(&self.config).detect(image)
    }

    pub fn rectify(&self, image: &RasterImage, corners: &CornerSet) -> Result<RasterImage> {
        rectify::rectify(image, corners)
    }

    pub fn apply_tone(&self, image: &RasterImage, tone: ToneSettings) -> RasterImage {
        enhance::apply_tone(image, tone)
    }

    /// Prepare each raster as a page and write them, in order, as one PDF.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn encode_document(&self, pages: &[RasterImage]) -> Result<DocumentBytes> {
        let prepared = pages
            .iter()
            .map(|raster| Page::from_raster(raster, &self.config))
            .collect::<Result<Vec<_>>>()?;
        let document = PdfWriter::new().write(&prepared)?;
        info!(bytes = document.len(), "Document encoded");
        Ok(document)
    }

    /// Detect, rectify, and tone one image with no manual corrections.
    pub fn process(&self, image: &RasterImage, tone: ToneSettings) -> Result<RasterImage> {
        let corners = self.detect_corners(image);
        let rectified = self.rectify(image, &corners)?;
        Ok(self.apply_tone(&rectified, tone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::ScanError;

    fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn blank_page_end_to_end() {
        let pipeline = ScanPipeline::default();
        let image = RasterImage::filled(100, 100, [255, 255, 255, 255]).unwrap();

        let corners = pipeline.detect_corners(&image);
        assert_eq!(corners.points().len(), 4);
        let rectified = pipeline.rectify(&image, &corners).unwrap();
        let doc = pipeline.encode_document(&[rectified]).unwrap();
        let bytes = doc.as_bytes();

        assert_eq!(count_occurrences(bytes, b" 0 obj\n"), 5);
        assert_eq!(count_occurrences(bytes, b" 00000 n \n"), 5);
        assert_eq!(count_occurrences(bytes, b"/Count 1 >>"), 1);
        assert_eq!(count_occurrences(bytes, b"/Size 6 /Root 1 0 R"), 1);
    }

    #[test]
    fn process_applies_tone_after_rectify() {
        let pipeline = ScanPipeline::default();
        let image = RasterImage::filled(50, 50, [100, 100, 100, 255]).unwrap();
        let out = pipeline
            .process(
                &image,
                ToneSettings {
                    brightness: 0,
                    contrast: 0,
                    monochrome: true,
                },
            )
            .unwrap();
        assert_eq!((out.width(), out.height()), (40, 40));
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn encode_document_rejects_empty_input() {
        let err = ScanPipeline::default().encode_document(&[]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput(_)));
    }
}
