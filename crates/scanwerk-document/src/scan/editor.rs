// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive editing session for one captured page.
//
// Every change (a dragged corner, a moved slider) triggers a full recompute
// from the untouched source raster. Each recompute is a single call so a
// caching layer could later sit behind it without callers noticing.

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::{Corner, CornerSet, Point, ScanConfig, SourceFormat, ToneSettings, check_import};
use tracing::{debug, instrument};

use super::detect::CornerDetector;
use super::enhance::apply_tone;
use super::rectify::rectify;
use crate::image::processor::ImageProcessor;
use crate::image::raster::RasterImage;
use crate::pdf::page::Page;

/// Corner-adjustment stage: the source image plus the quadrilateral to cut.
#[derive(Debug, Clone)]
pub struct PageEditor {
    source: RasterImage,
    corners: CornerSet,
    tone: ToneSettings,
    detector: CornerDetector,
    config: ScanConfig,
}

impl PageEditor {
    /// Start a session on `source`, running corner detection once.
    #[instrument(skip_all, fields(width = source.width(), height = source.height()))]
    pub fn new(source: RasterImage, config: ScanConfig) -> Self {
        let detector = CornerDetector::from_config(&config);
        let corners = detector.detect(&source);
        Self {
            source,
            corners,
            tone: ToneSettings::default(),
            detector,
            config,
        }
    }

    /// Validate and decode imported bytes, then start a session.
    pub fn from_bytes(data: &[u8], format: SourceFormat, config: ScanConfig) -> Result<Self> {
        check_import(format.mime_type(), data.len() as u64, &config)?;
        let source = ImageProcessor::from_bytes(data, format)?.into_raster();
        Ok(Self::new(source, config))
    }

    pub fn source(&self) -> &RasterImage {
        &self.source
    }

    pub fn corners(&self) -> CornerSet {
        self.corners
    }

    pub fn set_corners(&mut self, corners: CornerSet) {
        self.corners = corners;
    }

    /// Move the corner at `index` (0 = top-left, clockwise) to a percentage
    /// point; coordinates are clamped into [0, 100].
    pub fn set_corner(&mut self, index: usize, point: Point) -> Result<()> {
        let corner = Corner::from_index(index)
            .ok_or_else(|| ScanError::InvalidInput(format!("corner index {index} is out of range")))?;
        self.corners.set(corner, point);
        debug!(index, x = point.x, y = point.y, "Corner moved");
        Ok(())
    }

    /// Discard manual edits and detect corners again.
    pub fn redetect(&mut self) -> CornerSet {
        self.corners = self.detector.detect(&self.source);
        self.corners
    }

    pub fn tone(&self) -> ToneSettings {
        self.tone
    }

    pub fn set_tone(&mut self, tone: ToneSettings) {
        self.tone = tone.clamped();
    }

    /// Rectify the source with the current corners, ignoring tone.
    pub fn rectify(&self) -> Result<RasterImage> {
        rectify(&self.source, &self.corners)
    }

    /// Rectify and tone, recomputed from the source.
    pub fn preview(&self) -> Result<RasterImage> {
        let rectified = self.rectify()?;
        Ok(apply_tone(&rectified, self.tone))
    }

    /// [`PageEditor::preview`] encoded for display.
    pub fn preview_jpeg(&self) -> Result<Vec<u8>> {
        encode_preview(&self.preview()?, &self.config)
    }

    /// Freeze the corners and move on to tone adjustment.
    pub fn enhance(&self) -> Result<ToneEditor> {
        let base = self.rectify()?;
        let mut editor = ToneEditor::new(base, self.config.clone());
        editor.set_tone(self.tone);
        Ok(editor)
    }

    /// Produce the finished page.
    #[instrument(skip_all)]
    pub fn finish(&self) -> Result<Page> {
        Page::from_raster(&self.preview()?, &self.config)
    }
}

/// Tone-adjustment stage over an already-rectified image.
///
/// Settings always apply to the stored base, never to a previous result.
#[derive(Debug, Clone)]
pub struct ToneEditor {
    base: RasterImage,
    tone: ToneSettings,
    config: ScanConfig,
}

impl ToneEditor {
    pub fn new(base: RasterImage, config: ScanConfig) -> Self {
        Self {
            base,
            tone: ToneSettings::default(),
            config,
        }
    }

    pub fn base(&self) -> &RasterImage {
        &self.base
    }

    pub fn tone(&self) -> ToneSettings {
        self.tone
    }

    pub fn set_tone(&mut self, tone: ToneSettings) {
        self.tone = tone.clamped();
    }

    pub fn set_brightness(&mut self, value: i32) {
        self.set_tone(ToneSettings {
            brightness: value,
            ..self.tone
        });
    }

    pub fn set_contrast(&mut self, value: i32) {
        self.set_tone(ToneSettings {
            contrast: value,
            ..self.tone
        });
    }

    pub fn set_monochrome(&mut self, on: bool) {
        self.tone.monochrome = on;
    }

    pub fn preview(&self) -> RasterImage {
        apply_tone(&self.base, self.tone)
    }

    pub fn preview_jpeg(&self) -> Result<Vec<u8>> {
        encode_preview(&self.preview(), &self.config)
    }

    pub fn finish(&self) -> Result<Page> {
        Page::from_raster(&self.preview(), &self.config)
    }
}

fn encode_preview(image: &RasterImage, config: &ScanConfig) -> Result<Vec<u8>> {
    ImageProcessor::from_raster(image.clone())
        .flatten_onto_white()
        .to_jpeg_bytes(config.preview_jpeg_quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> RasterImage {
        RasterImage::filled(width, height, [255, 255, 255, 255]).unwrap()
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn blank_source_starts_with_margin_corners() {
        let editor = PageEditor::new(white(100, 100), ScanConfig::default());
        let expected = CornerSet::default();
        for corner in Corner::ALL {
            assert!(close(editor.corners().get(corner), expected.get(corner)));
        }
    }

    #[test]
    fn set_corner_clamps_and_rejects_bad_index() {
        let mut editor = PageEditor::new(white(40, 40), ScanConfig::default());
        editor.set_corner(2, Point::new(150.0, -5.0)).unwrap();
        assert_eq!(editor.corners().get(Corner::BottomRight), Point::new(100.0, 0.0));

        let err = editor.set_corner(4, Point::new(50.0, 50.0)).unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput(_)));
    }

    #[test]
    fn redetect_discards_manual_edits() {
        let mut editor = PageEditor::new(white(100, 100), ScanConfig::default());
        let detected = editor.corners();
        editor.set_corner(0, Point::new(40.0, 40.0)).unwrap();
        assert_ne!(editor.corners(), detected);
        assert_eq!(editor.redetect(), detected);
    }

    #[test]
    fn rectify_uses_current_corners() {
        let mut editor = PageEditor::new(white(100, 100), ScanConfig::default());
        editor.set_corners(CornerSet::new([
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 25.0),
            Point::new(0.0, 25.0),
        ]));
        let out = editor.rectify().unwrap();
        assert_eq!((out.width(), out.height()), (50, 25));
    }

    #[test]
    fn preview_applies_tone_to_rectified_image() {
        let mut editor = PageEditor::new(white(100, 100), ScanConfig::default());
        editor.set_tone(ToneSettings {
            brightness: -100,
            contrast: 0,
            monochrome: false,
        });
        let out = editor.preview().unwrap();
        assert_eq!((out.width(), out.height()), (80, 80));
        assert_eq!(out.pixel(40, 40), [0, 0, 0, 255]);
    }

    #[test]
    fn preview_jpeg_is_jpeg() {
        let editor = PageEditor::new(white(60, 60), ScanConfig::default());
        let jpeg = editor.preview_jpeg().unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn tone_editor_never_compounds() {
        let editor = PageEditor::new(white(100, 100), ScanConfig::default());
        let mut tone = editor.enhance().unwrap();
        let base = tone.base().clone();

        tone.set_brightness(-50);
        assert_ne!(tone.preview(), base);
        tone.set_brightness(-50);
        tone.set_brightness(0);
        assert_eq!(tone.preview(), base);
    }

    #[test]
    fn tone_editor_clamps_slider_values() {
        let mut tone = ToneEditor::new(white(4, 4), ScanConfig::default());
        tone.set_contrast(500);
        tone.set_brightness(-500);
        tone.set_monochrome(true);
        assert_eq!(
            tone.tone(),
            ToneSettings {
                brightness: -100,
                contrast: 100,
                monochrome: true
            }
        );
    }

    #[test]
    fn finish_produces_page_of_rectified_size() {
        let editor = PageEditor::new(white(100, 100), ScanConfig::default());
        let page = editor.finish().unwrap();
        assert_eq!((page.width(), page.height()), (80, 80));

        let page = editor.enhance().unwrap().finish().unwrap();
        assert_eq!((page.width(), page.height()), (80, 80));
    }

    #[test]
    fn oversize_import_is_rejected_before_decode() {
        let config = ScanConfig {
            max_import_bytes: 4,
            ..ScanConfig::default()
        };
        let err = PageEditor::from_bytes(&[0u8; 16], SourceFormat::Png, config).unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput(_)));
    }
}
