/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcLevel {
    /// Low (~7% recovery capacity)
    L = 0,
    /// Medium (~15% recovery capacity)
    M = 1,
    /// Quartile (~25% recovery capacity)
    Q = 2,
    /// High (~30% recovery capacity)
    H = 3,
}

impl EcLevel {
    /// Level from the de-masked 2-bit format field.
    ///
    /// The wire ordering is M, L, H, Q; XOR with 1 remaps it to the
    /// L < M < Q < H table ordering.
    pub fn from_format_bits(bits: u8) -> Self {
        match (bits ^ 0x01) & 0x03 {
            0 => EcLevel::L,
            1 => EcLevel::M,
            2 => EcLevel::Q,
            _ => EcLevel::H,
        }
    }

    /// Recoverable codeword share in percent, used for the fixed-module
    /// mismatch budget.
    pub fn percent(&self) -> usize {
        match self {
            EcLevel::L => 7,
            EcLevel::M => 15,
            EcLevel::Q => 25,
            EcLevel::H => 30,
        }
    }
}

/// The eight ISO mask predicates, indexed by the 3-bit mask field.
/// A predicate returning true means the module color is flipped.
pub const MASK_PREDICATES: [fn(usize, usize) -> bool; 8] = [
    |r, c| (r + c) % 2 == 0,
    |r, _| r % 2 == 0,
    |_, c| c % 3 == 0,
    |r, c| (r + c) % 3 == 0,
    |r, c| (r / 2 + c / 3) % 2 == 0,
    |r, c| (r * c) % 2 + (r * c) % 3 == 0,
    |r, c| ((r * c) % 2 + (r * c) % 3) % 2 == 0,
    |r, c| ((r + c) % 2 + (r * c) % 3) % 2 == 0,
];

/// One successfully decoded symbol
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Raw decoded payload bytes
    pub data: Vec<u8>,
    /// Symbol version, 1–40
    pub version: u8,
    /// Modules per side, `17 + 4 * version`
    pub dimension: usize,
    /// Error correction level from the format info
    pub ec_level: EcLevel,
    /// Mask index from the format info, 0–7
    pub mask: u8,
    /// ECI assignment value of the last ECI segment, -1 if none
    pub eci_assignment_value: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ec_level_remap() {
        assert_eq!(EcLevel::from_format_bits(0b01), EcLevel::L);
        assert_eq!(EcLevel::from_format_bits(0b00), EcLevel::M);
        assert_eq!(EcLevel::from_format_bits(0b11), EcLevel::Q);
        assert_eq!(EcLevel::from_format_bits(0b10), EcLevel::H);
    }

    #[test]
    fn test_mask_predicates() {
        // Mask 0: checkerboard
        assert!(MASK_PREDICATES[0](0, 0));
        assert!(!MASK_PREDICATES[0](0, 1));
        assert!(MASK_PREDICATES[0](1, 1));
        // Mask 7 at the origin: (0 + 0) % 2 == 0
        assert!(MASK_PREDICATES[7](0, 0));
    }
}
