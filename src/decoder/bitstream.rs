//! MSB-first bit reader over the corrected data codewords.
//!
//! A 32-bit buffer is refilled one byte at a time; a read that outruns the
//! stream is a fatal decode error for the containing corner.

use crate::error::{DecodeError, Result};

pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    buffer: u32,
    bits: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            buffer: 0,
            bits: 0,
        }
    }

    /// Bits left in the stream
    pub fn remaining(&self) -> usize {
        self.bits + 8 * (self.data.len() - self.pos)
    }

    /// Read `n` bits (1..=16), MSB first
    pub fn read(&mut self, n: usize) -> Result<u32> {
        debug_assert!(n >= 1 && n <= 16);
        while self.bits < n {
            if self.pos == self.data.len() {
                return Err(DecodeError::BitStreamUnderflow);
            }
            self.buffer = (self.buffer << 8) | self.data[self.pos] as u32;
            self.pos += 1;
            self.bits += 8;
        }
        self.bits -= n;
        Ok((self.buffer >> self.bits) & ((1 << n) - 1))
    }
}
