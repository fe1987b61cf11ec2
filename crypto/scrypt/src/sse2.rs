//! SSE2 Salsa20/8 and BlockMix.
//!
//! Each 64-byte sub-block is stored diagonally, so that one `__m128i` holds
//! `(x0, x5, x10, x15)`, the next `(x4, x9, x14, x3)`, then
//! `(x8, x13, x2, x7)` and `(x12, x1, x6, x11)`. In that order every
//! quarter-round step of a column round is a single lane-wise operation,
//! and a row round only needs lane rotations of three registers.

use crate::{romix::Mixer, salsa::STATE_WORDS};
#[cfg(target_arch = "x86")]
use core::arch::x86::{
    __m128i, _mm_add_epi32, _mm_loadu_si128, _mm_shuffle_epi32, _mm_slli_epi32, _mm_srli_epi32,
    _mm_storeu_si128, _mm_xor_si128,
};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    __m128i, _mm_add_epi32, _mm_loadu_si128, _mm_shuffle_epi32, _mm_slli_epi32, _mm_srli_epi32,
    _mm_storeu_si128, _mm_xor_si128,
};

target_features::detect!(sse2_cpuid, "sse2");

pub fn available() -> bool {
    sse2_cpuid::get()
}

/// Vector backend. Only constructible on CPUs with SSE2.
#[derive(Debug, Clone, Copy)]
pub struct Sse2(sse2_cpuid::Features);

impl Sse2 {
    pub fn new() -> Option<Self> {
        let token = sse2_cpuid::init();
        token.get().then_some(Self(token))
    }
}

impl Mixer for Sse2 {
    const LAYOUT: [usize; STATE_WORDS] = [0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, 1, 6, 11];

    #[inline]
    fn block_mix(&self, input: &[u32], output: &mut [u32]) {
        debug_assert!(self.0.get());
        debug_assert_eq!(input.len(), output.len());
        debug_assert_eq!(input.len() % (2 * STATE_WORDS), 0);
        // SAFETY: `Sse2` only exists once SSE2 support has been confirmed.
        // Loads and stores go through 16-word subslices, so they stay in
        // bounds.
        unsafe { block_mix(input, output) }
    }
}

#[inline]
#[target_feature(enable = "sse2")]
#[allow(clippy::cast_ptr_alignment)]
unsafe fn load(words: &[u32]) -> [__m128i; 4] {
    let ptr = words.as_ptr().cast::<__m128i>();
    [
        _mm_loadu_si128(ptr),
        _mm_loadu_si128(ptr.add(1)),
        _mm_loadu_si128(ptr.add(2)),
        _mm_loadu_si128(ptr.add(3)),
    ]
}

#[inline]
#[target_feature(enable = "sse2")]
#[allow(clippy::cast_ptr_alignment)]
unsafe fn store(x: &[__m128i; 4], words: &mut [u32]) {
    let ptr = words.as_mut_ptr().cast::<__m128i>();
    for (i, v) in x.iter().enumerate() {
        _mm_storeu_si128(ptr.add(i), *v);
    }
}

#[target_feature(enable = "sse2")]
unsafe fn block_mix(input: &[u32], output: &mut [u32]) {
    let half = input.len() / 2;
    let mut x = load(&input[input.len() - STATE_WORDS..]);
    for (i, chunk) in input.chunks_exact(STATE_WORDS).enumerate() {
        let b = load(chunk);
        for (lane, b) in x.iter_mut().zip(b.iter()) {
            *lane = _mm_xor_si128(*lane, *b);
        }
        salsa20_8(&mut x);
        let pos = (i / 2) * STATE_WORDS + (i % 2) * half;
        store(&x, &mut output[pos..pos + STATE_WORDS]);
    }
}

/// `a ^= (b + c) <<< $rot`, lane-wise.
macro_rules! add_xor_rot {
    ($a:expr, $b:expr, $c:expr, $rot:literal) => {{
        let t = _mm_add_epi32($b, $c);
        $a = _mm_xor_si128($a, _mm_slli_epi32(t, $rot));
        $a = _mm_xor_si128($a, _mm_srli_epi32(t, 32 - $rot));
    }};
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn salsa20_8(state: &mut [__m128i; 4]) {
    let [mut x0, mut x1, mut x2, mut x3] = *state;
    for _ in 0..4 {
        // columns
        add_xor_rot!(x1, x0, x3, 7);
        add_xor_rot!(x2, x1, x0, 9);
        add_xor_rot!(x3, x2, x1, 13);
        add_xor_rot!(x0, x3, x2, 18);
        x1 = _mm_shuffle_epi32(x1, 0b10_01_00_11);
        x2 = _mm_shuffle_epi32(x2, 0b01_00_11_10);
        x3 = _mm_shuffle_epi32(x3, 0b00_11_10_01);
        // rows
        add_xor_rot!(x3, x0, x1, 7);
        add_xor_rot!(x2, x3, x0, 9);
        add_xor_rot!(x1, x2, x3, 13);
        add_xor_rot!(x0, x1, x2, 18);
        x1 = _mm_shuffle_epi32(x1, 0b00_11_10_01);
        x2 = _mm_shuffle_epi32(x2, 0b01_00_11_10);
        x3 = _mm_shuffle_epi32(x3, 0b10_01_00_11);
    }
    for (s, v) in state.iter_mut().zip([x0, x1, x2, x3]) {
        *s = _mm_add_epi32(*s, v);
    }
}
