// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — the decode/encode facility around the core pipeline.
// Decodes imports into RGBA rasters, flattens transparency, fits pages into
// the target bounds, and encodes JPEG using the `image` crate.

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader, imageops::FilterType};
use scanwerk_core::SourceFormat;
use scanwerk_core::error::{Result, ScanError};
use tracing::{debug, info, instrument};

use super::raster::RasterImage;

/// Image processing pipeline operating on a single in-memory raster.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining:
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&bytes, SourceFormat::Png)?
///     .flatten_onto_white()
///     .fit_within(1654, 2339)?
///     .to_jpeg_bytes(92)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: RasterImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw bytes whose format the import boundary already checked.
    #[instrument(skip(data), fields(data_len = data.len(), format = format.mime_type()))]
    pub fn from_bytes(data: &[u8], format: SourceFormat) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(data, image_format(format))
            .map_err(|err| ScanError::DecodeFailure(format!("{}: {}", format.mime_type(), err)))?;
        Self::from_dynamic(decoded)
    }

    /// Decode raw bytes, sniffing the format from the content.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes_guessed(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data)
            .map_err(|err| ScanError::DecodeFailure(format!("failed to decode image: {}", err)))?;
        Self::from_dynamic(decoded)
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let image = RasterImage::from_rgba_image(image.to_rgba8())?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded"
        );
        Ok(Self { image })
    }

    /// Wrap an existing raster.
    pub fn from_raster(image: RasterImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying raster.
    pub fn as_raster(&self) -> &RasterImage {
        &self.image
    }

    /// Consume the processor and return the underlying raster.
    pub fn into_raster(self) -> RasterImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Composite every pixel over opaque white.
    ///
    /// Areas the rectifier left transparent become white paper instead of
    /// whatever the JPEG encoder would pick for them.
    pub fn flatten_onto_white(mut self) -> Self {
        for px in self.image.as_raw_mut().chunks_exact_mut(4) {
            let alpha = px[3] as u32;
            if alpha == 255 {
                continue;
            }
            for channel in &mut px[..3] {
                let value = (*channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
                *channel = value as u8;
            }
            px[3] = 255;
        }
        self
    }

    /// Downscale to fit within `max_width` x `max_height`, preserving aspect
    /// ratio. Images already inside the bounds are left untouched.
    #[instrument(skip(self), fields(max_width, max_height))]
    pub fn fit_within(self, max_width: u32, max_height: u32) -> Result<Self> {
        let (w, h) = (self.image.width(), self.image.height());
        let scale = (max_width as f64 / w as f64)
            .min(max_height as f64 / h as f64)
            .min(1.0);
        if scale >= 1.0 {
            return Ok(self);
        }

        let new_w = ((w as f64 * scale) as u32).max(1);
        let new_h = ((h as f64 * scale) as u32).max(1);
        info!(from_w = w, from_h = h, new_w, new_h, "Downscaling page image");

        let resized = image::imageops::resize(
            self.image.as_rgba_image(),
            new_w,
            new_h,
            FilterType::Lanczos3,
        );
        Ok(Self {
            image: RasterImage::from_rgba_image(resized)?,
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as baseline JPEG with the given quality
    /// (1-100). Alpha is discarded.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        encode_jpeg(&self.image, quality)
    }

    /// Encode the current image as PNG bytes (lossless, keeps alpha).
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.image
            .as_rgba_image()
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| ScanError::EncodeFailure(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Encode a raster as JPEG without taking ownership.
pub fn encode_jpeg(image: &RasterImage, quality: u8) -> Result<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let mut buffer = Vec::new();
    let rgb = DynamicImage::ImageRgba8(image.as_rgba_image().clone()).to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| ScanError::EncodeFailure(format!("JPEG encoding failed: {}", err)))?;
    if buffer.is_empty() {
        return Err(ScanError::EncodeFailure("JPEG encoder produced no output".into()));
    }
    Ok(buffer)
}

/// Header facts about an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
}

/// Read an encoded image's format, dimensions and colour type without
/// decoding pixels.
pub fn probe(data: &[u8]) -> Result<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| ScanError::DecodeFailure(format!("cannot read image header: {}", err)))?;
    let format = reader
        .format()
        .ok_or_else(|| ScanError::DecodeFailure("unrecognised image data".into()))?;
    let decoder = reader
        .into_decoder()
        .map_err(|err| ScanError::DecodeFailure(format!("cannot read image header: {}", err)))?;
    let (width, height) = decoder.dimensions();
    Ok(ImageInfo {
        format,
        width,
        height,
        color: decoder.color_type(),
    })
}

fn image_format(format: SourceFormat) -> ImageFormat {
    match format {
        SourceFormat::Jpeg => ImageFormat::Jpeg,
        SourceFormat::Png => ImageFormat::Png,
        SourceFormat::Webp => ImageFormat::WebP,
    }
}
