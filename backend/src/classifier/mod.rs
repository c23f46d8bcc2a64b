pub mod error;
pub mod features;
pub mod formatter;
pub mod selector;
pub mod taxonomy;
pub mod validator;

use std::path::Path;

use log::{debug, error, info, warn};
use shared::SignatureStrategy;

pub use error::{ClassifierError, ERROR_PREFIX, is_error_label};
pub use features::ColorSignature;
pub use formatter::format_prediction;

/// A raw label, taxonomy member or sentinel, and its display form.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub raw_label: String,
    pub display_label: String,
    pub signature: Option<ColorSignature>,
}

impl Prediction {
    fn labelled(raw_label: &str, signature: ColorSignature) -> Self {
        Self {
            raw_label: raw_label.to_string(),
            display_label: format_prediction(raw_label),
            signature: Some(signature),
        }
    }

    fn failed(err: &ClassifierError) -> Self {
        let raw_label = err.sentinel();
        Self {
            display_label: format_prediction(&raw_label),
            raw_label,
            signature: None,
        }
    }

    pub fn is_success(&self) -> bool {
        !is_error_label(&self.raw_label)
    }
}

/// Deterministic stand-in for a trained leaf classifier.
///
/// Holds no per-request state; clones are free to share across workers.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    strategy: SignatureStrategy,
}

impl Classifier {
    pub fn new(strategy: SignatureStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SignatureStrategy {
        self.strategy
    }

    /// Validates the upload and derives the signature the active strategy
    /// uses: pixel statistics, or the pseudo-signature from name and length.
    pub fn signature_for(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<ColorSignature, ClassifierError> {
        match self.strategy {
            SignatureStrategy::Pixel => {
                let sample = validator::validate(bytes)?;
                Ok(features::summarize(&sample))
            }
            SignatureStrategy::Filename => {
                validator::inspect(bytes)?;
                Ok(features::pseudo_signature(filename, bytes.len()))
            }
        }
    }

    /// Validates the upload and picks a taxonomy label for it.
    pub fn classify(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<(&'static str, ColorSignature), ClassifierError> {
        let signature = self.signature_for(bytes, filename)?;
        let label = match self.strategy {
            SignatureStrategy::Pixel => selector::select_by_signature(&signature),
            SignatureStrategy::Filename => selector::select_by_name(filename),
        };
        Ok((label, signature))
    }

    pub fn predict_bytes(&self, bytes: &[u8], filename: &str) -> Prediction {
        match self.classify(bytes, filename) {
            Ok((label, signature)) => {
                debug!("Signature for {}: {:?}", filename, signature);
                info!("Prediction made for {}: {}", filename, label);
                Prediction::labelled(label, signature)
            }
            Err(e) => {
                log_rejection(filename, &e);
                Prediction::failed(&e)
            }
        }
    }

    /// Reads a persisted upload and predicts on it. `filename` is the name the
    /// client sent, not the stored name.
    pub fn predict_path(&self, path: &Path, filename: &str) -> Prediction {
        match validator::read_checked(path) {
            Ok(bytes) => self.predict_bytes(&bytes, filename),
            Err(e) => {
                log_rejection(&path.display().to_string(), &e);
                Prediction::failed(&e)
            }
        }
    }

    /// Demo confidence score in percent; `None` for sentinel labels.
    pub fn confidence(&self, raw_label: &str) -> Option<f32> {
        if is_error_label(raw_label) {
            return None;
        }
        let hash = selector::fnv1a_64(raw_label);
        let score = if taxonomy::is_healthy(raw_label) {
            85 + hash % 15
        } else {
            70 + hash % 25
        };
        Some(score as f32)
    }
}

fn log_rejection(subject: &str, err: &ClassifierError) {
    match err {
        ClassifierError::DecodeFailure(_) | ClassifierError::Io(_) => {
            error!("Error loading image {}: {}", subject, err)
        }
        _ => warn!("Rejected image {}: {}", subject, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn pure_green_50px_is_healthy() {
        let classifier = Classifier::new(SignatureStrategy::Pixel);
        let prediction = classifier.predict_bytes(&png(50, 50, [0, 255, 0]), "leaf.png");
        assert!(prediction.is_success());
        assert!(taxonomy::is_healthy(&prediction.raw_label));
        assert_eq!(
            prediction.display_label,
            format_prediction(&prediction.raw_label)
        );
    }

    #[test]
    fn undersized_image_yields_sentinel() {
        let classifier = Classifier::new(SignatureStrategy::Pixel);
        let prediction = classifier.predict_bytes(&png(49, 49, [0, 255, 0]), "leaf.png");
        assert_eq!(prediction.raw_label, "Error: Image too small for analysis");
        assert!(!prediction.is_success());
        assert!(prediction.signature.is_none());
    }

    #[test]
    fn fake_jpeg_never_gets_a_label() {
        for strategy in [SignatureStrategy::Pixel, SignatureStrategy::Filename] {
            let prediction =
                Classifier::new(strategy).predict_bytes(b"plain text, not an image", "leaf.jpg");
            assert!(is_error_label(&prediction.raw_label));
            assert!(!taxonomy::contains(&prediction.raw_label));
        }
    }

    #[test]
    fn predictions_are_repeatable() {
        let bytes = png(120, 90, [140, 90, 40]);
        for strategy in [SignatureStrategy::Pixel, SignatureStrategy::Filename] {
            let classifier = Classifier::new(strategy);
            let first = classifier.predict_bytes(&bytes, "brown.png");
            assert!(taxonomy::contains(&first.raw_label));
            assert_eq!(classifier.predict_bytes(&bytes, "brown.png"), first);
        }
    }

    #[test]
    fn filename_strategy_ignores_pixels() {
        let classifier = Classifier::new(SignatureStrategy::Filename);
        let green = classifier.predict_bytes(&png(60, 60, [0, 255, 0]), "same.png");
        let red = classifier.predict_bytes(&png(60, 60, [255, 0, 0]), "same.png");
        assert_eq!(green.raw_label, red.raw_label);
        assert_eq!(green.raw_label, selector::select_by_name("same.png"));
    }

    #[test]
    fn filename_strategy_still_checks_dimensions() {
        let classifier = Classifier::new(SignatureStrategy::Filename);
        let prediction = classifier.predict_bytes(&png(10, 10, [0, 255, 0]), "tiny.png");
        assert!(!prediction.is_success());
    }

    #[test]
    fn signature_for_follows_strategy() {
        let bytes = png(60, 60, [0, 255, 0]);
        let pixel = Classifier::new(SignatureStrategy::Pixel)
            .signature_for(&bytes, "leaf.png")
            .unwrap();
        assert_eq!(pixel.mean, [0.0, 255.0, 0.0]);

        let named = Classifier::new(SignatureStrategy::Filename)
            .signature_for(&bytes, "leaf.png")
            .unwrap();
        assert_eq!(named, features::pseudo_signature("leaf.png", bytes.len()));
    }

    #[test]
    fn signature_for_rejects_invalid_input() {
        for strategy in [SignatureStrategy::Pixel, SignatureStrategy::Filename] {
            let err = Classifier::new(strategy)
                .signature_for(&png(20, 20, [0, 255, 0]), "leaf.png")
                .unwrap_err();
            assert!(matches!(err, ClassifierError::DimensionOutOfRange { .. }));
        }
    }

    #[test]
    fn truncated_png_depends_on_strategy() {
        // Filename mode reads only the header, so a body cut short after a
        // valid IHDR still gets a label; pixel mode has to decode and fails.
        let mut bytes = png(60, 60, [30, 120, 200]);
        let idat = bytes.windows(4).position(|w| w == b"IDAT").unwrap();
        bytes.truncate(idat + 4 + 2);

        let pixel = Classifier::new(SignatureStrategy::Pixel).predict_bytes(&bytes, "cut.png");
        assert_eq!(pixel.raw_label, "Error: Invalid image format");

        let named = Classifier::new(SignatureStrategy::Filename).predict_bytes(&bytes, "cut.png");
        assert!(named.is_success());
        assert!(taxonomy::contains(&named.raw_label));
        assert_eq!(named.raw_label, selector::select_by_name("cut.png"));
    }

    #[test]
    fn missing_file_reports_not_found() {
        let path = std::env::temp_dir().join(format!("absent-{}.png", uuid::Uuid::new_v4()));
        let prediction = Classifier::new(SignatureStrategy::Pixel).predict_path(&path, "x.png");
        assert_eq!(prediction.raw_label, "Error: Image file not found");
    }

    #[test]
    fn confidence_ranges() {
        let classifier = Classifier::new(SignatureStrategy::Pixel);
        for label in taxonomy::CLASS_TAXONOMY {
            let score = classifier.confidence(label).unwrap();
            if taxonomy::is_healthy(label) {
                assert!((85.0..100.0).contains(&score), "{} {}", label, score);
            } else {
                assert!((70.0..95.0).contains(&score), "{} {}", label, score);
            }
        }
        assert_eq!(classifier.confidence("Error: Analysis failed"), None);
    }
}
