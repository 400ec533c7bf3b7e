// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: colour-mode normalisation, percentage scaling, and lossy
// JPEG re-encoding. Operates on in-memory images using the `image` crate.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use pdfwerk_core::error::PdfwerkError;
use tracing::{debug, info, instrument};

/// A JPEG byte stream together with the facts a PDF image XObject needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Single-channel (DeviceGray) rather than RGB.
    pub grayscale: bool,
}

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining.
///
/// ```ignore
/// let encoded = ImageProcessor::open("photo.webp")?
///     .normalize_color()
///     .scale_percent(50)
///     .encode_jpeg(75)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfwerkError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            PdfwerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        debug!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap a rendered RGB bitmap.
    pub fn from_rgb(bitmap: RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(bitmap),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Whether the image holds a single luma channel.
    pub fn is_grayscale(&self) -> bool {
        matches!(self.image, DynamicImage::ImageLuma8(_))
    }

    // -- Transformations ------------------------------------------------------

    /// Reduce the image to a mode JPEG can carry: 8-bit luma stays luma,
    /// everything else (alpha, palette, 16-bit, float) becomes 8-bit RGB.
    pub fn normalize_color(self) -> Self {
        match self.image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => self,
            DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA8(_) => Self {
                image: DynamicImage::ImageLuma8(self.image.to_luma8()),
            },
            other => Self {
                image: DynamicImage::ImageRgb8(other.to_rgb8()),
            },
        }
    }

    /// Scale both dimensions by `percent` (100 = unchanged), never below one
    /// pixel. Uses Lanczos3 filtering.
    #[instrument(skip(self), fields(percent))]
    pub fn scale_percent(self, percent: u32) -> Self {
        if percent == 100 {
            return self;
        }
        let scale = |dim: u32| ((u64::from(dim) * u64::from(percent)) / 100).max(1) as u32;
        let (width, height) = (scale(self.image.width()), scale(self.image.height()));
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Scaling image"
        );
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as JPEG at `quality` (1-100), keeping luma images single-channel.
    pub fn encode_jpeg(&self, quality: u8) -> Result<EncodedImage, PdfwerkError> {
        let grayscale = self.is_grayscale();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        let encoded = if grayscale {
            self.image.to_luma8().write_with_encoder(encoder)
        } else {
            self.image.to_rgb8().write_with_encoder(encoder)
        };
        encoded.map_err(|err| {
            PdfwerkError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(EncodedImage {
            jpeg: buffer,
            width: self.image.width(),
            height: self.image.height(),
            grayscale,
        })
    }

    /// Write the image as a JPEG file at `quality`.
    pub fn save_jpeg(&self, path: impl AsRef<Path>, quality: u8) -> Result<(), PdfwerkError> {
        let encoded = self.encode_jpeg(quality)?;
        std::fs::write(path.as_ref(), &encoded.jpeg)?;
        Ok(())
    }

    /// Write the image as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), PdfwerkError> {
        self.image
            .save_with_format(path.as_ref(), ImageFormat::Png)
            .map_err(|err| {
                PdfwerkError::ImageError(format!(
                    "failed to save image to {}: {}",
                    path.as_ref().display(),
                    err
                ))
            })
    }
}
