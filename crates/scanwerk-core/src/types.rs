// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};

/// Unique identifier for a captured page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pair of floating-point coordinates.
///
/// The same type carries both pixel positions and percentage positions
/// (0-100 of the displayed image). Only [`CornerSet`] converts between the
/// two, and always against the image's real pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// The four corners of a document quadrilateral, by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners in [`CornerSet`] order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Exactly four corners in percentage space, ordered
/// `[top-left, top-right, bottom-right, bottom-left]`.
///
/// Homography estimation and rectification both depend on this order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet([Point; 4]);

impl CornerSet {
    /// Build from percentage points, clamping each into [0, 100].
    pub fn new(points: [Point; 4]) -> Self {
        Self(points.map(clamp_percent))
    }

    /// Convert pixel-space corners into percentages of `width` x `height`.
    pub fn from_pixels(points: [Point; 4], width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::new(points.map(|p| Point::new(p.x / w * 100.0, p.y / h * 100.0)))
    }

    /// Convert to pixel positions for an image of `width` x `height`.
    pub fn to_pixels(&self, width: u32, height: u32) -> [Point; 4] {
        let (w, h) = (width as f64, height as f64);
        self.0.map(|p| Point::new(p.x / 100.0 * w, p.y / 100.0 * h))
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }

    pub fn get(&self, corner: Corner) -> Point {
        self.0[corner.index()]
    }

    /// Overwrite one corner; the point is clamped into [0, 100].
    pub fn set(&mut self, corner: Corner, point: Point) {
        self.0[corner.index()] = clamp_percent(point);
    }
}

impl Default for CornerSet {
    /// A 10% inset rectangle, used when nothing better is known.
    fn default() -> Self {
        Self::new([
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(90.0, 90.0),
            Point::new(10.0, 90.0),
        ])
    }
}

fn clamp_percent(p: Point) -> Point {
    Point::new(p.x.clamp(0.0, 100.0), p.y.clamp(0.0, 100.0))
}

/// Image formats accepted at the import boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Webp,
}

impl SourceFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Match a MIME type against the allow-list.
    pub fn from_mime_type(mime: &str) -> Result<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::Webp),
            other => Err(ScanError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(ScanError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Validate an import before any decoding happens.
pub fn check_import(mime: &str, byte_len: u64, config: &ScanConfig) -> Result<SourceFormat> {
    let format = SourceFormat::from_mime_type(mime)?;
    if byte_len > config.max_import_bytes {
        return Err(ScanError::InvalidInput(format!(
            "file is {byte_len} bytes, limit is {}",
            config.max_import_bytes
        )));
    }
    Ok(format)
}

/// Brightness, contrast, and monochrome controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToneSettings {
    /// -100..=100, additive.
    pub brightness: i32,
    /// -100..=100, multiplicative around mid-grey.
    pub contrast: i32,
    /// Hard black/white threshold on luminance.
    pub monochrome: bool,
}

impl ToneSettings {
    pub const RANGE: std::ops::RangeInclusive<i32> = -100..=100;

    /// Settings with both sliders pulled into range.
    pub fn clamped(self) -> Self {
        Self {
            brightness: self.brightness.clamp(*Self::RANGE.start(), *Self::RANGE.end()),
            contrast: self.contrast.clamp(*Self::RANGE.start(), *Self::RANGE.end()),
            monochrome: self.monochrome,
        }
    }

    /// True when applying these settings changes nothing.
    pub fn is_identity(&self) -> bool {
        self.brightness == 0 && self.contrast == 0 && !self.monochrome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_pixel_conversion_uses_image_dimensions() {
        let corners = CornerSet::from_pixels(
            [
                Point::new(20.0, 10.0),
                Point::new(180.0, 10.0),
                Point::new(180.0, 90.0),
                Point::new(20.0, 90.0),
            ],
            200,
            100,
        );
        assert_eq!(corners.get(Corner::TopLeft), Point::new(10.0, 10.0));
        assert_eq!(corners.get(Corner::BottomRight), Point::new(90.0, 90.0));

        let pixels = corners.to_pixels(400, 50);
        assert_eq!(pixels[1], Point::new(360.0, 5.0));
    }

    #[test]
    fn set_corner_clamps_into_percent_range() {
        let mut corners = CornerSet::default();
        corners.set(Corner::TopRight, Point::new(130.0, -4.0));
        assert_eq!(corners.get(Corner::TopRight), Point::new(100.0, 0.0));
        assert_eq!(corners.get(Corner::TopLeft), Point::new(10.0, 10.0));
    }

    #[test]
    fn corner_index_round_trips() {
        for (i, corner) in Corner::ALL.iter().enumerate() {
            assert_eq!(corner.index(), i);
            assert_eq!(Corner::from_index(i), Some(*corner));
        }
        assert_eq!(Corner::from_index(4), None);
    }

    #[test]
    fn allow_list_rejects_other_formats() {
        assert_eq!(SourceFormat::from_mime_type("image/webp").unwrap(), SourceFormat::Webp);
        assert!(matches!(
            SourceFormat::from_mime_type("image/gif"),
            Err(ScanError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            SourceFormat::from_extension("tiff"),
            Err(ScanError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn oversize_import_is_rejected() {
        let config = ScanConfig::default();
        assert!(check_import("image/png", 1024, &config).is_ok());
        assert!(matches!(
            check_import("image/png", config.max_import_bytes + 1, &config),
            Err(ScanError::InvalidInput(_))
        ));
    }

    #[test]
    fn tone_settings_clamp_to_slider_range() {
        let settings = ToneSettings {
            brightness: 250,
            contrast: -300,
            monochrome: true,
        }
        .clamped();
        assert_eq!(settings.brightness, 100);
        assert_eq!(settings.contrast, -100);
        assert!(!settings.is_identity());
        assert!(ToneSettings::default().is_identity());
    }
}
