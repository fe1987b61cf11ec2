//! Portable Salsa20/8 core and the scalar [`Mixer`].

use crate::romix::Mixer;

pub const STATE_WORDS: usize = 16;
const DOUBLE_ROUNDS: usize = 4;

#[inline(always)]
const fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [u32; STATE_WORDS]) {
    state[b] ^= state[a].wrapping_add(state[d]).rotate_left(7);
    state[c] ^= state[b].wrapping_add(state[a]).rotate_left(9);
    state[d] ^= state[c].wrapping_add(state[b]).rotate_left(13);
    state[a] ^= state[d].wrapping_add(state[c]).rotate_left(18);
}

/// `state = state + rounds(state)`, word-wise modulo 2^32.
#[inline(always)]
pub fn salsa20_8(state: &mut [u32; STATE_WORDS]) {
    let mut x = *state;
    for _ in 0..DOUBLE_ROUNDS {
        // columns
        quarter_round(0, 4, 8, 12, &mut x);
        quarter_round(5, 9, 13, 1, &mut x);
        quarter_round(10, 14, 2, 6, &mut x);
        quarter_round(15, 3, 7, 11, &mut x);
        // rows
        quarter_round(0, 1, 2, 3, &mut x);
        quarter_round(5, 6, 7, 4, &mut x);
        quarter_round(10, 11, 8, 9, &mut x);
        quarter_round(15, 12, 13, 14, &mut x);
    }
    for (s, v) in state.iter_mut().zip(x.iter()) {
        *s = s.wrapping_add(*v);
    }
}

/// Scalar backend; words are kept in natural Salsa20 order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Soft;

impl Mixer for Soft {
    const LAYOUT: [usize; STATE_WORDS] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

    fn block_mix(&self, input: &[u32], output: &mut [u32]) {
        let half = input.len() / 2;
        let mut x = [0; STATE_WORDS];
        x.copy_from_slice(&input[input.len() - STATE_WORDS..]);
        for (i, chunk) in input.chunks_exact(STATE_WORDS).enumerate() {
            for (a, b) in x.iter_mut().zip(chunk) {
                *a ^= b;
            }
            salsa20_8(&mut x);
            let pos = (i / 2) * STATE_WORDS + (i % 2) * half;
            output[pos..pos + STATE_WORDS].copy_from_slice(&x);
        }
    }
}
