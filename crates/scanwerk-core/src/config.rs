// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for detection, image re-encoding, and page preparation.
///
/// Missing keys in a JSON config fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Corner search inset as a fraction of the shorter image side.
    pub margin_ratio: f64,
    /// Grid stride (pixels) of the coarse corner search.
    pub search_stride: u32,
    /// JPEG quality (1-100) for rectified and tone-adjusted previews.
    pub preview_jpeg_quality: u8,
    /// JPEG quality (1-100) for page images embedded in documents.
    pub page_jpeg_quality: u8,
    /// Page images wider than this are downscaled before embedding.
    pub max_page_width: u32,
    /// Page images taller than this are downscaled before embedding.
    pub max_page_height: u32,
    /// Largest accepted import, in bytes.
    pub max_import_bytes: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            margin_ratio: 0.1,
            search_stride: 5,
            preview_jpeg_quality: 95,
            page_jpeg_quality: 92,
            // A4 at 200 DPI.
            max_page_width: 1654,
            max_page_height: 2339,
            max_import_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ScanConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write this config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{ "page_jpeg_quality": 80 }"#).unwrap();
        assert_eq!(config.page_jpeg_quality, 80);
        assert_eq!(config.search_stride, 5);
        assert_eq!(config.max_page_width, 1654);
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanwerk.json");
        let config = ScanConfig {
            margin_ratio: 0.05,
            ..ScanConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ScanConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScanConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::ScanError::Io(_)));
    }
}
