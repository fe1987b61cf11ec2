use crate::{salsa::STATE_WORDS, Error};
use crypto_common::erase::Erase;

/// One implementation of scrypt's BlockMix.
///
/// Backends may keep the 16 Salsa20 words of each 64-byte sub-block in any
/// fixed order: `LAYOUT[i]` names the Salsa20 word stored at position `i`.
/// ROMix only XORs and copies whole blocks, which is position-wise and so
/// layout agnostic; the layout is applied when bytes enter and leave.
pub trait Mixer {
    const LAYOUT: [usize; STATE_WORDS];
    /// Position of Salsa20 word 0, the low half of `Integerify`.
    const WORD0: usize = position(&Self::LAYOUT, 0);
    /// Position of Salsa20 word 1, the high half of `Integerify`.
    const WORD1: usize = position(&Self::LAYOUT, 1);

    /// `output = BlockMix(input)`. Both slices hold `32 * r` words.
    fn block_mix(&self, input: &[u32], output: &mut [u32]);

    fn import(&self, bytes: &[u8], words: &mut [u32]) {
        for (src, dst) in bytes
            .chunks_exact(4 * STATE_WORDS)
            .zip(words.chunks_exact_mut(STATE_WORDS))
        {
            for (w, &k) in dst.iter_mut().zip(Self::LAYOUT.iter()) {
                let b = &src[4 * k..4 * k + 4];
                *w = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            }
        }
    }

    fn export(&self, words: &[u32], bytes: &mut [u8]) {
        for (src, dst) in words
            .chunks_exact(STATE_WORDS)
            .zip(bytes.chunks_exact_mut(4 * STATE_WORDS))
        {
            for (w, &k) in src.iter().zip(Self::LAYOUT.iter()) {
                dst[4 * k..4 * k + 4].copy_from_slice(&w.to_le_bytes());
            }
        }
    }
}

const fn position(layout: &[usize; STATE_WORDS], word: usize) -> usize {
    let mut i = 0;
    while i < STATE_WORDS {
        if layout[i] == word {
            return i;
        }
        i += 1;
    }
    panic!("layout is not a permutation");
}

/// Heap working memory for [`ro_mix`]: the `V` table plus two blocks.
///
/// Erased on drop.
pub struct Scratch {
    v: Vec<u32>,
    x: Vec<u32>,
    t: Vec<u32>,
}

impl core::fmt::Debug for Scratch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scratch")
            .field("block_words", &self.x.len())
            .field("blocks", &(self.v.len() / self.x.len().max(1)))
            .finish_non_exhaustive()
    }
}

impl Scratch {
    /// Allocate room for `n` blocks of `block_words` words each.
    pub fn new(block_words: usize, n: usize) -> Result<Self, Error> {
        let v_words = block_words
            .checked_mul(n)
            .ok_or(Error::InvalidParams("scratch size overflows usize"))?;
        Ok(Self {
            v: try_zeroed(v_words)?,
            x: try_zeroed(block_words)?,
            t: try_zeroed(block_words)?,
        })
    }

    pub fn parts(&mut self) -> (&mut [u32], &mut [u32], &mut [u32]) {
        (&mut self.v, &mut self.x, &mut self.t)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        self.v.erase();
        self.x.erase();
        self.t.erase();
    }
}

pub(crate) fn try_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure {
            bytes: len.saturating_mul(core::mem::size_of::<T>()),
        })?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// Run ROMix over `b` in place.
///
/// `v` must hold `n` blocks, `x` and `t` one block each, where a block is
/// `b.len() / 4` words. `n` must be a power of two.
pub fn ro_mix<M: Mixer>(
    mixer: &M,
    b: &mut [u8],
    v: &mut [u32],
    x: &mut [u32],
    t: &mut [u32],
    n: usize,
) {
    debug_assert!(n.is_power_of_two());
    debug_assert_eq!(b.len(), 4 * x.len());
    debug_assert_eq!(v.len(), n * x.len());
    mixer.import(b, x);
    fill(mixer, v, x);
    mix(mixer, v, x, t, n);
    mixer.export(x, b);
}

/// Sequential phase: `V[i] = X; X = BlockMix(X)` for every slot of `v`.
pub(crate) fn fill<M: Mixer>(mixer: &M, v: &mut [u32], x: &mut [u32]) {
    for slot in v.chunks_exact_mut(x.len()) {
        slot.copy_from_slice(x);
        mixer.block_mix(slot, x);
    }
}

/// Pseudorandom phase: `X = BlockMix(X ^ V[Integerify(X) mod n])`, `n` times.
pub(crate) fn mix<M: Mixer>(mixer: &M, v: &[u32], x: &mut [u32], t: &mut [u32], n: usize) {
    let len = x.len();
    for _ in 0..n {
        let j = integerify::<M>(x, n);
        let vj = &v[j * len..(j + 1) * len];
        for ((out, a), b) in t.iter_mut().zip(x.iter()).zip(vj) {
            *out = a ^ b;
        }
        mixer.block_mix(t, x);
    }
}

/// Little-endian 64-bit value of the last sub-block's first two words, mod `n`.
#[inline(always)]
#[allow(clippy::cast_possible_truncation)]
fn integerify<M: Mixer>(x: &[u32], n: usize) -> usize {
    let last = &x[x.len() - STATE_WORDS..];
    let j = u64::from(last[M::WORD0]) | (u64::from(last[M::WORD1]) << 32);
    (j as usize) & (n - 1)
}
