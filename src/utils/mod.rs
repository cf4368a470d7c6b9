//! Image preparation utilities

pub mod binarize;
