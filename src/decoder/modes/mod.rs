//! Segment body decoders for the supported data modes

pub mod alphanumeric;
pub mod byte;
pub mod numeric;
