//! Export surfaces: clipboard (rich text) and PDF.
//!
//! Both exporters consume the rendered document's block tree directly, so
//! the copied HTML and the PDF always match the preview.

pub mod clipboard;
pub mod html;
pub mod pdf;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the PDF export path.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no usable font found: {0}")]
    FontDiscovery(String),
    #[error("failed to assemble PDF: {0}")]
    Pdf(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Encoding applied to raster images embedded in the PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageEncoding {
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
}

/// Output page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A4,
    Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PageSetup {
    /// Page dimensions in millimetres, `(width, height)`.
    pub const fn size_mm(self) -> (f32, f32) {
        let (w, h) = match self.format {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        };
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Fixed configuration for a PDF export run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Uniform page margin in millimetres.
    pub margin_mm: f32,
    /// Output file name.
    pub filename: PathBuf,
    /// Encoding for embedded raster images.
    pub image: ImageEncoding,
    /// Pixel density multiplier for embedded images, relative to 96 dpi.
    pub raster_scale: f32,
    pub page: PageSetup,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            margin_mm: 10.0,
            filename: PathBuf::from("markdown-export.pdf"),
            image: ImageEncoding { quality: 0.98 },
            raster_scale: 2.0,
            page: PageSetup {
                format: PageFormat::A4,
                orientation: Orientation::Portrait,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_export_contract() {
        let config = ExportConfig::default();
        assert!((config.margin_mm - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.filename, PathBuf::from("markdown-export.pdf"));
        assert!((config.image.quality - 0.98).abs() < f32::EPSILON);
        assert!((config.raster_scale - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.page.format, PageFormat::A4);
        assert_eq!(config.page.orientation, Orientation::Portrait);
    }

    #[test]
    fn test_a4_portrait_dimensions() {
        let page = PageSetup {
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
        };
        assert_eq!(page.size_mm(), (210.0, 297.0));
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let page = PageSetup {
            format: PageFormat::A4,
            orientation: Orientation::Landscape,
        };
        assert_eq!(page.size_mm(), (297.0, 210.0));
    }
}
