//! qrsight - QR code decoding library
//!
//! A pure Rust implementation of the ISO/IEC 18004 recognition pipeline:
//! binarization, finder pattern detection, perspective rectification,
//! format/version recovery, de-masking, de-interleaving, Reed-Solomon
//! error correction and segment decoding. Input is a pixel buffer; output
//! is the raw byte payload of every symbol found.
//!
//! # Quick Start
//!
//! ```no_run
//! let img = image::open("photo.png").unwrap().to_luma8();
//! let (width, height) = img.dimensions();
//!
//! let mut decoder = qrsight::QrDecoder::new();
//! let payloads = decoder.decode_luma(img.as_raw(), width as usize, height as usize);
//! for payload in &payloads {
//!     println!("{}", String::from_utf8_lossy(payload));
//! }
//! ```
//!
//! Decoding never fails hard: an image without a recognizable symbol
//! yields an empty list. After a successful decode the [`QrDecoder`]
//! exposes the metadata of the last symbol for diagnostics.

/// QR code decoding stages (error correction, format/version, segments)
pub mod decoder;
/// QR code detection stages (finder patterns, corners, transforms)
pub mod detector;
/// Error taxonomy of the decode pipeline
pub mod error;
/// Core data structures (BitGrid, ModuleMatrix, Point, Symbol)
pub mod models;
/// The top-level decode loop
pub mod pipeline;
/// Image preparation (luminance, thresholding)
pub mod utils;

pub use error::DecodeError;
pub use models::{BitGrid, EcLevel, Point, Symbol};

use utils::binarize::{binarize, luminance};

/// Decode all QR codes in an RGB image (3 bytes per pixel).
/// Returns full symbol records including version and EC metadata.
pub fn detect(rgb: &[u8], width: usize, height: usize) -> Vec<Symbol> {
    let Ok(gray) = luminance(rgb, width, height) else {
        return Vec::new();
    };
    detect_from_grayscale(&gray, width, height)
}

/// Decode all QR codes in a grayscale image (1 byte per pixel)
pub fn detect_from_grayscale(gray: &[u8], width: usize, height: usize) -> Vec<Symbol> {
    let Ok(grid) = binarize(gray, width, height) else {
        return Vec::new();
    };
    pipeline::decode_grid(&grid)
}

/// Stateful decoder handle.
///
/// The decode methods return one byte payload per recovered symbol, in the
/// order their corners decoded. Metadata of the most recently decoded
/// symbol stays readable on the handle afterwards.
#[derive(Debug, Default)]
pub struct QrDecoder {
    last: Option<Symbol>,
}

impl QrDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an RGB image (3 bytes per pixel)
    pub fn decode_rgb(&mut self, rgb: &[u8], width: usize, height: usize) -> Vec<Vec<u8>> {
        self.collect(detect(rgb, width, height))
    }

    /// Decode a grayscale image (1 byte per pixel)
    pub fn decode_luma(&mut self, gray: &[u8], width: usize, height: usize) -> Vec<Vec<u8>> {
        self.collect(detect_from_grayscale(gray, width, height))
    }

    /// Decode an already binarized grid (true = dark)
    pub fn decode_grid(&mut self, grid: &BitGrid) -> Vec<Vec<u8>> {
        self.collect(pipeline::decode_grid(grid))
    }

    fn collect(&mut self, symbols: Vec<Symbol>) -> Vec<Vec<u8>> {
        if let Some(symbol) = symbols.last() {
            self.last = Some(symbol.clone());
        }
        symbols.into_iter().map(|s| s.data).collect()
    }

    /// Metadata of the last successfully decoded symbol
    pub fn last_symbol(&self) -> Option<&Symbol> {
        self.last.as_ref()
    }

    /// Version of the last decoded symbol, 0 before any success
    pub fn version(&self) -> u8 {
        self.last.as_ref().map_or(0, |s| s.version)
    }

    /// Modules per side of the last decoded symbol, 0 before any success
    pub fn dimension(&self) -> usize {
        self.last.as_ref().map_or(0, |s| s.dimension)
    }

    /// EC level of the last decoded symbol
    pub fn ec_level(&self) -> Option<EcLevel> {
        self.last.as_ref().map(|s| s.ec_level)
    }

    /// Mask index of the last decoded symbol, 0 before any success
    pub fn mask(&self) -> u8 {
        self.last.as_ref().map_or(0, |s| s.mask)
    }

    /// ECI assignment value of the last decoded symbol, -1 if none seen
    pub fn eci_assignment_value(&self) -> i32 {
        self.last.as_ref().map_or(-1, |s| s.eci_assignment_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_empty_image() {
        let image = vec![255u8; 30 * 30 * 3];
        assert!(detect(&image, 30, 30).is_empty());
    }

    #[test]
    fn test_decoder_handle_starts_blank() {
        let decoder = QrDecoder::new();
        assert_eq!(decoder.version(), 0);
        assert_eq!(decoder.dimension(), 0);
        assert!(decoder.ec_level().is_none());
        assert_eq!(decoder.eci_assignment_value(), -1);
    }

    #[test]
    fn test_mismatched_buffer_yields_nothing() {
        let image = vec![0u8; 10];
        assert!(detect(&image, 30, 30).is_empty());
        assert!(detect_from_grayscale(&image, 30, 30).is_empty());
    }
}
