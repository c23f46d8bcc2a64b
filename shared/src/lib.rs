use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// How the backend derives the colour signature that drives label selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SignatureStrategy {
    /// Decode pixels and compute per-channel statistics.
    #[default]
    Pixel,
    /// Skip pixel decoding and hash the uploaded filename instead.
    Filename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SupportedFormat {
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl SupportedFormat {
    /// Upload extensions accepted by the API, lower-case.
    pub fn extensions() -> Vec<String> {
        Self::iter().map(|format| format.to_string()).collect()
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::iter().find(|format| format.to_string().eq_ignore_ascii_case(ext))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColorSignatureDto {
    pub mean: [f64; 3],
    pub std_dev: [f64; 3],
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: String,
    pub original_prediction: String,
    pub image_url: String,
    pub confidence: f32,
    pub signature: Option<ColorSignatureDto>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_prediction: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
            prediction: None,
            original_prediction: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub supported_formats: Vec<String>,
    pub max_file_size: String,
    pub signature_strategy: SignatureStrategy,
}
