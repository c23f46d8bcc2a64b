use std::fmt;

/// Reserved prefix separating sentinel error labels from taxonomy labels.
pub const ERROR_PREFIX: &str = "Error:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionBound {
    TooSmall,
    TooLarge,
}

impl fmt::Display for DimensionBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall => write!(f, "too small"),
            Self::TooLarge => write!(f, "too large"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Image file not found")]
    NotFound,
    #[error("Image file too large ({size} bytes)")]
    Oversized { size: u64 },
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Image {bound} for analysis ({width}x{height})")]
    DimensionOutOfRange {
        bound: DimensionBound,
        width: u32,
        height: u32,
    },
    #[error("Image decode failed: {0}")]
    DecodeFailure(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    /// Renders the error as a label that travels through the same channel as a
    /// successful prediction.
    pub fn sentinel(&self) -> String {
        let reason = match self {
            Self::NotFound => "Image file not found",
            Self::Oversized { .. } => "Image file too large (max 16MB)",
            Self::UnsupportedFormat => "Unsupported image format",
            Self::DimensionOutOfRange {
                bound: DimensionBound::TooSmall,
                ..
            } => "Image too small for analysis",
            Self::DimensionOutOfRange {
                bound: DimensionBound::TooLarge,
                ..
            } => "Image too large for analysis",
            Self::DecodeFailure(_) => "Invalid image format",
            Self::Io(_) => "Analysis failed",
        };
        format!("{} {}", ERROR_PREFIX, reason)
    }
}

pub fn is_error_label(label: &str) -> bool {
    label.starts_with(ERROR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_carry_reserved_prefix() {
        let errors = vec![
            ClassifierError::NotFound,
            ClassifierError::Oversized { size: 1 },
            ClassifierError::UnsupportedFormat,
            ClassifierError::DimensionOutOfRange {
                bound: DimensionBound::TooSmall,
                width: 49,
                height: 49,
            },
            ClassifierError::DecodeFailure("truncated".into()),
            ClassifierError::Io(std::io::Error::other("boom")),
        ];
        for err in errors {
            assert!(is_error_label(&err.sentinel()), "{:?}", err);
        }
    }

    #[test]
    fn dimension_sentinel_names_the_bound() {
        let err = ClassifierError::DimensionOutOfRange {
            bound: DimensionBound::TooLarge,
            width: 5001,
            height: 10,
        };
        assert_eq!(err.sentinel(), "Error: Image too large for analysis");
        assert_eq!(err.to_string(), "Image too large for analysis (5001x10)");
    }

    #[test]
    fn plain_labels_are_not_errors() {
        assert!(!is_error_label("Tomato___healthy"));
        assert!(!is_error_label("error: lowercase is not reserved"));
        assert!(!is_error_label(""));
    }
}
