//! QR code decoding: everything after a corner has been located.
//!
//! - Format and version information recovery (BCH with Hamming tolerance)
//! - Logical matrix construction, mask removal and codeword unload
//! - Block de-interleaving and Reed-Solomon correction
//! - Segment decoding of the corrected bit stream

/// MSB-first bit reader over corrected codewords
pub mod bitstream;
/// Block de-interleaving and per-block error correction
pub mod deinterleave;
/// Format information recovery (EC level, mask)
pub mod format;
/// Base matrix, sampling, mask removal, zig-zag unload
pub mod matrix;
/// Segment body decoders (numeric, alphanumeric, byte)
pub mod modes;
/// Reed-Solomon error correction over GF(256)
pub mod reed_solomon;
/// Segment loop and ECI handling
pub mod segments;
/// Static tables from the standard
pub mod tables;
/// Version information recovery (versions 7-40)
pub mod version;
