use super::selector::fnv1a_64;
use super::validator::ImageSample;

/// Per-channel colour statistics standing in for model features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSignature {
    pub mean: [f64; 3],
    pub std_dev: [f64; 3],
}

impl ColorSignature {
    pub fn red(&self) -> f64 {
        self.mean[0]
    }

    pub fn green(&self) -> f64 {
        self.mean[1]
    }

    pub fn blue(&self) -> f64 {
        self.mean[2]
    }
}

impl From<ColorSignature> for shared::ColorSignatureDto {
    fn from(signature: ColorSignature) -> Self {
        Self {
            mean: signature.mean,
            std_dev: signature.std_dev,
        }
    }
}

/// Mean and population standard deviation of each RGB channel.
///
/// Sums are accumulated as integers so the result does not depend on pixel
/// iteration order. An empty sample yields all zeros.
pub fn summarize(sample: &ImageSample) -> ColorSignature {
    let mut sum = [0u64; 3];
    let mut sum_sq = [0u64; 3];
    let mut count = 0u64;

    for pixel in sample.pixels.pixels() {
        for channel in 0..3 {
            let value = pixel.0[channel] as u64;
            sum[channel] += value;
            sum_sq[channel] += value * value;
        }
        count += 1;
    }

    if count == 0 {
        return ColorSignature {
            mean: [0.0; 3],
            std_dev: [0.0; 3],
        };
    }

    let mut mean = [0.0; 3];
    let mut std_dev = [0.0; 3];
    let n = count as u128;
    for channel in 0..3 {
        mean[channel] = sum[channel] as f64 / count as f64;
        // n * sum(x^2) - sum(x)^2 is exact in u128 and never negative.
        let s = sum[channel] as u128;
        let spread = n * sum_sq[channel] as u128 - s * s;
        std_dev[channel] = (spread as f64).sqrt() / count as f64;
    }

    ColorSignature { mean, std_dev }
}

/// Stand-in signature for when pixels are not decoded.
///
/// Derived from the FNV-1a hash of `"<name>:<byte_len>"`: hash bytes 0..3
/// become the means (0..=255) and bytes 3..6, halved, the deviations (0..=127).
pub fn pseudo_signature(name: &str, byte_len: usize) -> ColorSignature {
    let bytes = fnv1a_64(&format!("{}:{}", name, byte_len)).to_le_bytes();
    ColorSignature {
        mean: [bytes[0] as f64, bytes[1] as f64, bytes[2] as f64],
        std_dev: [
            (bytes[3] / 2) as f64,
            (bytes[4] / 2) as f64,
            (bytes[5] / 2) as f64,
        ],
    }
}
