use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::Path;

use image::{ImageFormat, ImageReader, RgbImage};

use super::error::{ClassifierError, DimensionBound};

pub const MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;
pub const MIN_DIMENSION: u32 = 50;
pub const MAX_DIMENSION: u32 = 5000;

const ALLOWED_FORMATS: [ImageFormat; 3] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Gif];

/// A decoded upload, converted to 8-bit RGB.
#[derive(Debug)]
pub struct ImageSample {
    pub format: ImageFormat,
    pub pixels: RgbImage,
}

impl ImageSample {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// What header inspection learns without touching pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

pub fn read_checked(path: &Path) -> Result<Vec<u8>, ClassifierError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ClassifierError::NotFound,
        _ => ClassifierError::Io(e),
    })?;
    check_size(metadata.len())?;
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ClassifierError::NotFound,
        _ => ClassifierError::Io(e),
    })
}

/// Format and dimension checks from the header only.
pub fn inspect(bytes: &[u8]) -> Result<ImageHeader, ClassifierError> {
    check_size(bytes.len() as u64)?;
    let format = sniff_format(bytes)?;
    let (width, height) = reader(bytes, format)
        .into_dimensions()
        .map_err(|e| ClassifierError::DecodeFailure(e.to_string()))?;
    check_dimensions(width, height)?;
    Ok(ImageHeader {
        format,
        width,
        height,
    })
}

/// Full validation: header checks followed by a pixel decode.
pub fn validate(bytes: &[u8]) -> Result<ImageSample, ClassifierError> {
    let header = inspect(bytes)?;
    let decoded = reader(bytes, header.format)
        .decode()
        .map_err(|e| ClassifierError::DecodeFailure(e.to_string()))?;
    Ok(ImageSample {
        format: header.format,
        pixels: decoded.to_rgb8(),
    })
}

fn check_size(len: u64) -> Result<(), ClassifierError> {
    if len > MAX_FILE_BYTES {
        return Err(ClassifierError::Oversized { size: len });
    }
    Ok(())
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ClassifierError> {
    let bound = if width < MIN_DIMENSION || height < MIN_DIMENSION {
        DimensionBound::TooSmall
    } else if width > MAX_DIMENSION || height > MAX_DIMENSION {
        DimensionBound::TooLarge
    } else {
        return Ok(());
    };
    Err(ClassifierError::DimensionOutOfRange {
        bound,
        width,
        height,
    })
}

// The extension the client sent is ignored; only magic bytes count.
fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, ClassifierError> {
    match image::guess_format(bytes) {
        Ok(format) if ALLOWED_FORMATS.contains(&format) => Ok(format),
        _ => Err(ClassifierError::UnsupportedFormat),
    }
}

fn reader(bytes: &[u8], format: ImageFormat) -> ImageReader<Cursor<&[u8]>> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format);
    reader
}
