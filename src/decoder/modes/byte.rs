//! Byte mode (indicator 0100): 8-bit bytes passed through verbatim.
//! Interpretation (UTF-8, SJIS via ECI, binary) is the caller's concern.

use crate::decoder::bitstream::BitReader;
use crate::error::Result;

pub fn decode(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(reader.read(8)? as u8);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn test_passthrough() {
        let data = [0x48, 0x49, 0xFE];
        let mut reader = BitReader::new(&data);
        assert_eq!(decode(&mut reader, 3).unwrap(), vec![0x48, 0x49, 0xFE]);
    }

    #[test]
    fn test_underflow() {
        let data = [0x48];
        let mut reader = BitReader::new(&data);
        assert_eq!(
            decode(&mut reader, 2).unwrap_err(),
            DecodeError::BitStreamUnderflow
        );
    }
}
