use std::path::Path;

use super::ContentExtractor;
use crate::analysis::{Category, ExtractOptions, ExtractedContent};
use crate::error::ExtractError;

const METHOD: &str = "image_extractor";

/// OCR output is capped tighter than other excerpts
const MAX_OCR_CHARS: usize = 500;

/// Raster images: dimensions, format, color mode, optional OCR (`images` feature)
pub struct ImageExtractor;

impl ContentExtractor for ImageExtractor {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn label(&self) -> &'static str {
        "image"
    }

    fn category(&self) -> Category {
        Category::Image
    }

    fn accepts(&self, category: Category) -> bool {
        category == Category::Image
    }

    #[cfg(feature = "images")]
    fn try_extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        backend::extract(path, options)
    }

    #[cfg(not(feature = "images"))]
    fn try_extract(
        &self,
        _path: &Path,
        _options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        Err(ExtractError::Unavailable("image backend"))
    }
}

/// Text recognised by the `tesseract` binary, if it is installed
pub fn ocr_text(path: &Path) -> Result<String, ExtractError> {
    duct::cmd!("tesseract", path, "stdout")
        .stderr_null()
        .read()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExtractError::Unavailable("tesseract"),
            _ => ExtractError::Malformed(format!("OCR failed: {}", e)),
        })
}

#[cfg(feature = "images")]
mod backend {
    use std::path::Path;

    use image::{ColorType, ImageReader};
    use serde_json::Value;

    use super::{ocr_text, MAX_OCR_CHARS, METHOD};
    use crate::analysis::extractors::clean_text;
    use crate::analysis::{truncate_chars, Category, ExtractOptions, ExtractedContent, Metadata};
    use crate::error::ExtractError;

    pub(super) fn extract(
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f).to_uppercase())
            .unwrap_or_default();
        let img = reader
            .decode()
            .map_err(|e| ExtractError::Malformed(format!("Failed to open image: {}", e)))?;

        let mut metadata = Metadata::new();
        metadata.insert("width".into(), Value::from(img.width()));
        metadata.insert("height".into(), Value::from(img.height()));
        metadata.insert("format".into(), Value::String(format));
        metadata.insert("mode".into(), Value::String(color_mode(img.color()).to_string()));

        let text = if options.enable_ocr {
            match ocr_text(path) {
                Ok(text) => clean_text(&text),
                Err(e) => {
                    tracing::debug!("[ImageExtractor] OCR skipped for {}: {}", path.display(), e);
                    String::new()
                }
            }
        } else {
            String::new()
        };

        tracing::debug!(
            "[ImageExtractor] {}x{} image, {} OCR chars from {}",
            img.width(),
            img.height(),
            text.chars().count(),
            path.display()
        );

        Ok(ExtractedContent::new(
            truncate_chars(&text, MAX_OCR_CHARS.min(options.max_chars)),
            metadata,
            Category::Image,
            0.7,
            METHOD,
        ))
    }

    /// PIL-style mode names
    fn color_mode(color: ColorType) -> &'static str {
        match (color.has_color(), color.has_alpha()) {
            (false, false) => "L",
            (false, true) => "LA",
            (true, false) => "RGB",
            (true, true) => "RGBA",
        }
    }

}
