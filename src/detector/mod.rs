//! QR code detection: locating a symbol in the binarized image.
//!
//! - Finder pattern scanning with the 1:1:3:1:1 run signature
//! - Alignment pattern scanning with the n:1:1:1:n signature
//! - Corner construction from finder triples
//! - Module-to-pixel coordinate transforms

/// Alignment pattern scanning inside a search window
pub mod alignment;
/// Corner construction and validation from finder triples
pub mod corner;
/// Finder pattern scanning over rows and columns
pub mod finder;
/// Affine and projective module-to-pixel transforms
pub mod transform;
