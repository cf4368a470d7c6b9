//! Codeword de-interleaving and per-block error correction.
//!
//! The encoder splits the data codewords into blocks (group 1, then the
//! one-codeword-longer group 2), interleaves them round-robin, and appends
//! the equally interleaved EC codewords. This module inverts that layout
//! and runs Reed-Solomon over each reassembled block.

use log::debug;

use crate::decoder::reed_solomon::{correct, generator_poly, poly_div};
use crate::decoder::tables::EcBlocks;
use crate::error::{DecodeError, Result};

/// Undo the block interleaving and correct each block, returning the data
/// codewords in encoding order.
pub fn deinterleave_and_correct(codewords: &[u8], blocks: &EcBlocks) -> Result<Vec<u8>> {
    if codewords.len() != blocks.total_codewords() {
        return Err(DecodeError::BitStreamUnderflow);
    }

    let num_blocks = blocks.total_blocks();
    let data_len =
        |b: usize| if b < blocks.blocks_g1 { blocks.dw_g1 } else { blocks.dw_g2 };

    let mut buffers: Vec<Vec<u8>> = (0..num_blocks)
        .map(|b| Vec::with_capacity(data_len(b) + blocks.ec_per_block))
        .collect();

    // Data region: the first dw_g1 rounds cover every block, the remaining
    // rounds only the longer group-2 blocks.
    let mut next = codewords.iter().copied();
    for round in 0..blocks.dw_g2.max(blocks.dw_g1) {
        for (b, buffer) in buffers.iter_mut().enumerate() {
            if round < data_len(b) {
                buffer.push(next.next().ok_or(DecodeError::BitStreamUnderflow)?);
            }
        }
    }

    // EC region: always a full round-robin over every block
    for _ in 0..blocks.ec_per_block {
        for buffer in buffers.iter_mut() {
            buffer.push(next.next().ok_or(DecodeError::BitStreamUnderflow)?);
        }
    }

    let gen = generator_poly(blocks.ec_per_block);
    let mut data_out = Vec::with_capacity(blocks.data_codewords());
    for (b, buffer) in buffers.iter_mut().enumerate() {
        if poly_div(buffer, &gen).iter().any(|&r| r != 0) {
            let corrected = correct(buffer, blocks.ec_per_block)?;
            debug!("block {b}: corrected {corrected} codewords");
        }
        data_out.extend_from_slice(&buffer[..data_len(b)]);
    }
    Ok(data_out)
}
