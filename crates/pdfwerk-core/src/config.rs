// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PdfwerkError, Result};
use crate::types::{
    CompressionRequest, DEFAULT_DPI, DEFAULT_QUALITY, DPI_RANGE, FULL_PROCESSING_CEILING,
    QUALITY_RANGE,
};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JPEG quality for the lossy compression pass (1-100).
    pub quality: u8,
    /// Rasterisation DPI for the lossy compression pass (72-300).
    pub dpi: u32,
    /// Page ceiling before export to images, pages or DOCX asks for a range.
    pub export_ceiling: u32,
    /// Page ceiling before text extraction asks for a range.
    pub extraction_ceiling: u32,
    /// Page ceiling before table extraction asks for a range.
    pub table_ceiling: u32,
    /// DPI used when exporting pages as PNG images.
    pub export_dpi: u32,
    /// JPEG quality used by the image compressor.
    pub image_quality: u8,
    /// Scale applied by the image compressor, in percent (100 = unchanged).
    pub image_scale_percent: u32,
    /// JPEG quality for images embedded by images-to-PDF.
    pub embed_quality: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            dpi: DEFAULT_DPI,
            export_ceiling: FULL_PROCESSING_CEILING,
            extraction_ceiling: FULL_PROCESSING_CEILING,
            table_ceiling: FULL_PROCESSING_CEILING,
            export_dpi: 300,
            image_quality: 75,
            image_scale_percent: 100,
            embed_quality: 85,
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values outside the ranges the pipeline accepts.
    pub fn validate(&self) -> Result<()> {
        for (name, quality) in [
            ("quality", self.quality),
            ("image_quality", self.image_quality),
            ("embed_quality", self.embed_quality),
        ] {
            if !QUALITY_RANGE.contains(&quality) {
                return Err(PdfwerkError::InvalidRequest(format!(
                    "{name} must be between 1 and 100, got {quality}"
                )));
            }
        }
        for (name, dpi) in [("dpi", self.dpi), ("export_dpi", self.export_dpi)] {
            if !DPI_RANGE.contains(&dpi) {
                return Err(PdfwerkError::InvalidRequest(format!(
                    "{name} must be between 72 and 300, got {dpi}"
                )));
            }
        }
        if self.image_scale_percent == 0 {
            return Err(PdfwerkError::InvalidRequest(
                "image_scale_percent must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The compression request these settings describe.
    pub fn compression_request(&self) -> Result<CompressionRequest> {
        CompressionRequest::new(self.quality, self.dpi)
    }
}
