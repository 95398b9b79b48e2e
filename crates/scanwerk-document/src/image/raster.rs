// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// RGBA8 raster buffer shared by every pipeline stage.

use image::RgbaImage;
use scanwerk_core::error::{Result, ScanError};

/// Bytes per pixel: interleaved red, green, blue, alpha.
pub const CHANNELS: usize = 4;

/// A non-empty RGBA8 image in row-major order.
///
/// The buffer length is always `width * height * 4`. Filters mutate it in
/// place; the document encoder only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    buffer: RgbaImage,
}

impl RasterImage {
    /// A fully transparent image.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            buffer: RgbaImage::new(width, height),
        })
    }

    /// An image with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            buffer: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        })
    }

    /// Wrap an existing interleaved RGBA buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(ScanError::InvalidInput(format!(
                "buffer holds {} bytes, {width}x{height} RGBA needs {expected}",
                data.len()
            )));
        }
        let buffer = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            ScanError::InvalidInput(format!("cannot wrap {width}x{height} buffer"))
        })?;
        Ok(Self { buffer })
    }

    /// Take ownership of an `image` crate buffer.
    pub fn from_rgba_image(buffer: RgbaImage) -> Result<Self> {
        check_dimensions(buffer.width(), buffer.height())?;
        Ok(Self { buffer })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Interleaved RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable interleaved RGBA bytes. The length cannot change.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like `image`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        self.buffer.put_pixel(x, y, image::Rgba(rgba));
    }

    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        self.buffer
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.buffer.into_raw()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanError::InvalidInput(format!(
            "image must not be empty (got {width}x{height})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_buffer_length_must_match_dimensions() {
        assert!(RasterImage::from_raw(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            RasterImage::from_raw(2, 2, vec![0; 15]),
            Err(ScanError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_sized_images_are_rejected() {
        assert!(RasterImage::new(0, 10).is_err());
        assert!(RasterImage::filled(10, 0, [0, 0, 0, 255]).is_err());
    }

    #[test]
    fn pixels_are_row_major_rgba() {
        let mut img = RasterImage::new(3, 2).unwrap();
        img.put_pixel(1, 1, [10, 20, 30, 40]);
        let offset = (3 + 1) * CHANNELS;
        assert_eq!(&img.as_raw()[offset..offset + 4], &[10, 20, 30, 40]);
        assert_eq!(img.pixel(1, 1), [10, 20, 30, 40]);
        assert_eq!(img.pixel(0, 0), [0, 0, 0, 0]);
    }
}
