#![no_std]
#![deny(
    dead_code,
    deprecated,
    future_incompatible,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::inline_always)]

//! Portable SHA-256 (FIPS 180-4).
//!
//! The API is block oriented: callers own a [`Buffer`] and feed complete
//! blocks through [`Sha256::update_blocks`]. This lets HMAC precompute the
//! keyed inner and outer states once and clone them per message.

use core::fmt::Debug;
use crypto_common::blocks::{Block as Block_, Buffer as Buffer_};

pub type Block = Block_<64>;
pub type Buffer = Buffer_<64>;

mod consts;
mod soft;

use soft::compress;

pub const BLOCK_SIZE: usize = 64;
pub const OUTPUT_SIZE: usize = 32;

#[allow(missing_copy_implementations)]
#[derive(Clone)]
pub struct Sha256 {
    state: [u32; 8],
    block_len: u64,
}

impl Default for Sha256 {
    fn default() -> Self {
        Self {
            state: consts::H,
            block_len: 0,
        }
    }
}

impl Sha256 {
    #[inline]
    pub fn update_blocks(&mut self, blocks: &[Block]) {
        self.block_len += blocks.len() as u64;
        compress(&mut self.state, blocks);
    }

    /// Pad the buffered tail and write the digest. `self` must not be reused
    /// without resetting.
    #[inline]
    pub fn finalize(&mut self, buffer: &mut Buffer, out: &mut [u8; OUTPUT_SIZE]) {
        let bit_len = 8 * (buffer.get_pos() as u64 + self.block_len * BLOCK_SIZE as u64);
        buffer.len64_padding_be(bit_len, |b| {
            compress(&mut self.state, core::slice::from_ref(b));
        });
        for (chunk, v) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&v.to_be_bytes());
        }
    }

    #[inline]
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; OUTPUT_SIZE] {
        let mut hasher = Self::default();
        let mut buffer = Buffer::default();
        buffer.digest_blocks(data, |b| hasher.update_blocks(b));
        let mut out = [0; OUTPUT_SIZE];
        hasher.finalize(&mut buffer, &mut out);
        out
    }
}

impl Debug for Sha256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Sha256 { ... }")
    }
}
