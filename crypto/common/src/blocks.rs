//! Fixed-size block buffering for Merkle–Damgård style hashes.

pub type Block<const N: usize> = [u8; N];

/// Accumulates input until a full `N`-byte block is available.
///
/// The buffer never holds a full block: as soon as one is complete it is
/// handed to the compression callback, so `pos < N` always holds.
#[allow(missing_copy_implementations)]
#[derive(Debug, Clone)]
pub struct Buffer<const N: usize> {
    buffer: Block<N>,
    pos: usize,
}

impl<const N: usize> Default for Buffer<N> {
    fn default() -> Self {
        Self {
            buffer: [0; N],
            pos: 0,
        }
    }
}

impl<const N: usize> Buffer<N> {
    /// Feed `input`, calling `compress` on every run of complete blocks.
    #[inline]
    pub fn digest_blocks(&mut self, mut input: &[u8], mut compress: impl FnMut(&[Block<N>])) {
        let free = N - self.pos;
        if input.len() < free {
            self.buffer[self.pos..self.pos + input.len()].copy_from_slice(input);
            self.pos += input.len();
            return;
        }
        if self.pos != 0 {
            let (head, tail) = input.split_at(free);
            self.buffer[self.pos..].copy_from_slice(head);
            compress(core::slice::from_ref(&self.buffer));
            input = tail;
        }
        let (blocks, rest) = split_blocks::<N>(input);
        if !blocks.is_empty() {
            compress(blocks);
        }
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.pos = rest.len();
    }

    #[inline(always)]
    pub const fn reset(&mut self) {
        self.pos = 0;
    }

    /// Number of buffered bytes not yet compressed.
    #[inline(always)]
    #[must_use]
    pub const fn get_pos(&self) -> usize {
        debug_assert!(self.pos < N);
        self.pos
    }

    /// Append the `0x80` terminator and the big-endian 64-bit length, then
    /// compress the final one or two blocks.
    #[inline]
    pub fn len64_padding_be(&mut self, data_len: u64, mut compress: impl FnMut(&Block<N>)) {
        let pos = self.get_pos();
        self.buffer[pos] = 0x80;
        self.buffer[pos + 1..].fill(0);
        let suffix = data_len.to_be_bytes();
        if N - pos - 1 < suffix.len() {
            compress(&self.buffer);
            let mut last = [0; N];
            last[N - suffix.len()..].copy_from_slice(&suffix);
            compress(&last);
        } else {
            self.buffer[N - suffix.len()..].copy_from_slice(&suffix);
            compress(&self.buffer);
        }
        self.pos = 0;
    }
}

impl<const N: usize> super::erase::Erase for Buffer<N> {
    fn erase(&mut self) {
        self.buffer.erase();
        self.pos.erase();
    }
}

#[inline(always)]
fn split_blocks<const N: usize>(data: &[u8]) -> (&[Block<N>], &[u8]) {
    let (blocks, rest) = data.split_at(data.len() - data.len() % N);
    let n = blocks.len() / N;
    // SAFETY: `blocks` is exactly `n * N` bytes and `[u8; N]` has alignment 1.
    let blocks = unsafe { core::slice::from_raw_parts(blocks.as_ptr().cast::<Block<N>>(), n) };
    (blocks, rest)
}
