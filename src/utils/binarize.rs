//! Luminance conversion and global thresholding.
//!
//! The pipeline only needs a deterministic dark/light decision per pixel;
//! Otsu's method picks the global threshold from the histogram.

use crate::error::{DecodeError, Result};
use crate::models::BitGrid;

/// Convert RGB bytes (3 per pixel) to luminance.
/// Y = (76*R + 150*G + 29*B) >> 8
pub fn luminance(rgb: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    if width == 0 || height == 0 || rgb.len() != width * height * 3 {
        return Err(DecodeError::BinarizationFailed);
    }
    let mut gray = Vec::with_capacity(width * height);
    for px in rgb.chunks_exact(3) {
        let y = (76 * px[0] as u32 + 150 * px[1] as u32 + 29 * px[2] as u32) >> 8;
        gray.push(y as u8);
    }
    Ok(gray)
}

/// Binarize a grayscale image with Otsu's threshold.
/// Returns a grid where true = dark.
pub fn binarize(gray: &[u8], width: usize, height: usize) -> Result<BitGrid> {
    if width == 0 || height == 0 || gray.len() != width * height {
        return Err(DecodeError::BinarizationFailed);
    }

    let threshold = otsu_threshold(gray);
    let mut grid = BitGrid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            grid.set(x, y, gray[y * width + x] < threshold);
        }
    }
    Ok(grid)
}

/// Otsu's optimal global threshold from the intensity histogram
fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u32; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as f64;
    let mut max_variance = 0.0;
    let mut best = 128u8;

    for threshold in 1..=255u32 {
        let mut dark_pixels = 0u32;
        let mut dark_sum = 0u64;
        let mut light_pixels = 0u32;
        let mut light_sum = 0u64;

        for (intensity, &count) in histogram.iter().enumerate() {
            if (intensity as u32) < threshold {
                dark_pixels += count;
                dark_sum += count as u64 * intensity as u64;
            } else {
                light_pixels += count;
                light_sum += count as u64 * intensity as u64;
            }
        }
        if dark_pixels == 0 || light_pixels == 0 {
            continue;
        }

        let dark_mean = dark_sum as f64 / dark_pixels as f64;
        let light_mean = light_sum as f64 / light_pixels as f64;
        let w_dark = dark_pixels as f64 / total;
        let w_light = light_pixels as f64 / total;
        let variance = w_dark * w_light * (dark_mean - light_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            best = threshold as u8;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_weights() {
        let rgb = [255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = luminance(&rgb, 4, 1).unwrap();
        assert_eq!(gray[0], 75); // (76 * 255) >> 8
        assert_eq!(gray[1], 149);
        assert_eq!(gray[2], 28);
        assert_eq!(gray[3], 254);
    }

    #[test]
    fn test_binarize_two_classes() {
        let mut gray = vec![40u8; 50];
        gray.extend(vec![210u8; 50]);
        let grid = binarize(&gray, 10, 10).unwrap();
        assert!(grid.is_dark(0, 0));
        assert!(!grid.is_dark(0, 9));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            binarize(&[0u8; 10], 0, 10).unwrap_err(),
            DecodeError::BinarizationFailed
        );
        assert_eq!(
            binarize(&[0u8; 10], 3, 3).unwrap_err(),
            DecodeError::BinarizationFailed
        );
        assert_eq!(
            luminance(&[0u8; 10], 2, 2).unwrap_err(),
            DecodeError::BinarizationFailed
        );
    }

    #[test]
    fn test_uniform_image_stays_one_class() {
        let gray = vec![128u8; 64];
        let grid = binarize(&gray, 8, 8).unwrap();
        // No split possible: everything lands on one side
        let dark_count = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.is_dark(x, y))
            .count();
        assert!(dark_count == 0 || dark_count == 64);
    }
}
