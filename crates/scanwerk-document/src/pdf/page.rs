// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Finished page images and finished document bytes.

use base64::Engine;
use image::{ColorType, ImageFormat};
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::{PageId, ScanConfig};
use tracing::{debug, instrument};

use crate::image::processor::{self, ImageProcessor};
use crate::image::raster::RasterImage;

/// A finished page: baseline RGB JPEG bytes plus their pixel size.
///
/// The document writer embeds the bytes as-is; 1 pixel becomes 1 unit of
/// page space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    id: PageId,
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

impl Page {
    /// Flatten onto white, fit inside the configured page bounds, and encode.
    #[instrument(skip_all, fields(width = raster.width(), height = raster.height()))]
    pub fn from_raster(raster: &RasterImage, config: &ScanConfig) -> Result<Self> {
        let prepared = ImageProcessor::from_raster(raster.clone())
            .flatten_onto_white()
            .fit_within(config.max_page_width, config.max_page_height)?;
        let jpeg = prepared.to_jpeg_bytes(config.page_jpeg_quality)?;
        debug!(jpeg_bytes = jpeg.len(), "Page encoded");
        Ok(Self {
            id: PageId::new(),
            width: prepared.width(),
            height: prepared.height(),
            jpeg,
        })
    }

    /// Accept already-encoded image bytes.
    ///
    /// RGB JPEGs inside the page bounds are kept byte-for-byte; anything
    /// else is decoded and prepared like [`Page::from_raster`].
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn from_encoded(bytes: Vec<u8>, config: &ScanConfig) -> Result<Self> {
        let info = processor::probe(&bytes)?;
        let passthrough = info.format == ImageFormat::Jpeg
            && info.color == ColorType::Rgb8
            && info.width <= config.max_page_width
            && info.height <= config.max_page_height;
        if passthrough {
            return Ok(Self {
                id: PageId::new(),
                jpeg: bytes,
                width: info.width,
                height: info.height,
            });
        }
        let raster = ImageProcessor::from_bytes_guessed(&bytes)?.into_raster();
        Self::from_raster(&raster, config)
    }

    /// Accept a `data:image/...;base64,` URL, decoding the payload once.
    pub fn from_data_url(url: &str, config: &ScanConfig) -> Result<Self> {
        let bytes = decode_data_url(url)?;
        Self::from_encoded(bytes, config)
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The embedded JPEG payload.
    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }
}

/// Split a base64 data URL and return its raw payload bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ScanError::InvalidInput("not a data URL".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ScanError::InvalidInput("data URL has no payload".into()))?;
    if !meta.ends_with(";base64") {
        return Err(ScanError::InvalidInput(format!(
            "data URL is not base64 encoded ({meta})"
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|err| ScanError::DecodeFailure(format!("bad base64 payload: {}", err)))
}

/// A finished document. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBytes(Vec<u8>);

impl DocumentBytes {
    pub const MIME_TYPE: &'static str = "application/pdf";

    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for DocumentBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
