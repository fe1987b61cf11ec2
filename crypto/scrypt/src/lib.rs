#![deny(
    dead_code,
    deprecated,
    future_incompatible,
    missing_copy_implementations,
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
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::inline_always
)]

//! scrypt (RFC 7914) over SHA-256, with a runtime-selected SSE2 core.
//!
//! [`scrypt_1024_1_1_256`] is the fixed proof-of-work hash used by
//! Litecoin-derived chains: `N = 1024, r = 1, p = 1`, password and salt both
//! set to the 80-byte block header, 32 bytes of output. It keeps its 128 KiB
//! table on the stack and cannot fail. [`scrypt`] is the general form.
//!
//! Building with `--cfg scrypt_backend="soft"` compiles the vector backend
//! out and always uses the portable one.

mod error;
mod hmac;
mod params;
mod pbkdf2;
mod romix;
mod salsa;
#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(scrypt_backend = "soft")
))]
mod sse2;

pub use error::Error;
pub use hmac::Hmac;
pub use params::Params;
pub use pbkdf2::pbkdf2_hmac_sha256;

use crypto_common::erase::Erase;
use romix::Scratch;

/// Fixed proof-of-work input length (a serialized block header).
pub const POW_INPUT_LEN: usize = 80;
/// Digest length of every hash in this crate.
pub const OUTPUT_LEN: usize = 32;

const POW_N: usize = 1024;
const POW_BLOCK_WORDS: usize = 32;

/// Implementation of the Salsa20/8 BlockMix core.
///
/// Every backend produces bit-identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Portable scalar code.
    Soft,
    /// 128-bit SSE2 vectors (`x86`/`x86_64` only).
    Sse2,
}

impl Backend {
    /// Fastest backend the current CPU supports.
    ///
    /// The CPU is probed once per process; later calls read a cached flag.
    #[must_use]
    pub fn detect() -> Self {
        if Self::Sse2.is_available() {
            Self::Sse2
        } else {
            Self::Soft
        }
    }

    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            Self::Soft => true,
            #[cfg(all(
                any(target_arch = "x86", target_arch = "x86_64"),
                not(scrypt_backend = "soft")
            ))]
            Self::Sse2 => sse2::available(),
            #[cfg(not(all(
                any(target_arch = "x86", target_arch = "x86_64"),
                not(scrypt_backend = "soft")
            )))]
            Self::Sse2 => false,
        }
    }
}

/// Probe for SSE2 and cache the answer. Idempotent; calling it is optional,
/// since every hash resolves its backend anyway.
#[must_use]
pub fn detect_sse2() -> bool {
    Backend::Sse2.is_available()
}

/// `scrypt(input, input, N = 1024, r = 1, p = 1, 32)` on the best backend.
#[must_use]
pub fn scrypt_1024_1_1_256(input: &[u8; POW_INPUT_LEN]) -> [u8; OUTPUT_LEN] {
    scrypt_1024_1_1_256_with_backend(input, Backend::detect())
}

/// As [`scrypt_1024_1_1_256`], on a chosen backend. An unavailable backend
/// falls back to [`Backend::Soft`].
#[must_use]
pub fn scrypt_1024_1_1_256_with_backend(
    input: &[u8; POW_INPUT_LEN],
    backend: Backend,
) -> [u8; OUTPUT_LEN] {
    let prf = Hmac::new(input);
    let mut b = [0; 4 * POW_BLOCK_WORDS];
    pbkdf2::pbkdf2(&prf, input, 1, &mut b);
    let mut v = [0; POW_N * POW_BLOCK_WORDS];
    let mut x = [0; POW_BLOCK_WORDS];
    let mut t = [0; POW_BLOCK_WORDS];
    ro_mix_with(backend, &mut b, &mut v, &mut x, &mut t, POW_N);
    let mut out = [0; OUTPUT_LEN];
    pbkdf2::pbkdf2(&prf, &b, 1, &mut out);
    out
}

/// General scrypt on the best backend.
pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    output: &mut [u8],
) -> Result<(), Error> {
    scrypt_with_backend(password, salt, params, output, Backend::detect())
}

/// General scrypt on a chosen backend. An unavailable backend falls back to
/// [`Backend::Soft`].
pub fn scrypt_with_backend(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    output: &mut [u8],
    backend: Backend,
) -> Result<(), Error> {
    if output.is_empty() || u32::try_from(output.len().div_ceil(OUTPUT_LEN)).is_err() {
        return Err(Error::InvalidOutputLength);
    }
    let block_len = params.block_len();
    let p = usize::try_from(params.p).map_err(|_| Error::InvalidParams("p too large"))?;
    let mut scratch = Scratch::new(block_len / 4, params.n())?;
    let mut b = romix::try_zeroed::<u8>(block_len * p)?;
    let prf = Hmac::new(password);
    pbkdf2::pbkdf2(&prf, salt, 1, &mut b);
    let (v, x, t) = scratch.parts();
    for chunk in b.chunks_mut(block_len) {
        ro_mix_with(backend, chunk, v, x, t, params.n());
    }
    pbkdf2::pbkdf2(&prf, &b, 1, output);
    b.erase();
    Ok(())
}

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(scrypt_backend = "soft")
))]
fn ro_mix_with(
    backend: Backend,
    b: &mut [u8],
    v: &mut [u32],
    x: &mut [u32],
    t: &mut [u32],
    n: usize,
) {
    if backend == Backend::Sse2 {
        if let Some(mixer) = sse2::Sse2::new() {
            romix::ro_mix(&mixer, b, v, x, t, n);
            return;
        }
    }
    romix::ro_mix(&salsa::Soft, b, v, x, t, n);
}

#[cfg(not(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(scrypt_backend = "soft")
)))]
fn ro_mix_with(
    _backend: Backend,
    b: &mut [u8],
    v: &mut [u32],
    x: &mut [u32],
    t: &mut [u32],
    n: usize,
) {
    romix::ro_mix(&salsa::Soft, b, v, x, t, n);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rand_core::{OsRng, RngCore};

    const ZERO_HEADER_HASH: [u8; 32] =
        hex!("161d0876f3b93b1048cda1bdeaa7332ee210f7131b42013cb43913a6553a4b69");

    fn both_backends() -> impl Iterator<Item = Backend> {
        [Backend::Soft, Backend::Sse2]
            .into_iter()
            .filter(|b| b.is_available())
    }

    #[test]
    fn rfc7914_vector_1() {
        let params = Params::new(4, 1, 1).unwrap();
        for backend in both_backends() {
            let mut out = [0; 64];
            scrypt_with_backend(b"", b"", &params, &mut out, backend).unwrap();
            assert_eq!(
                out,
                hex!(
                    "77d6576238657b203b19ca42c18a0497f16b4844e3074ae8dfdffa3fede21442"
                    "fcd0069ded0948f8326a753a0fc81f17e8d3e0fb2e0d3628cf35e20c38d18906"
                ),
                "{backend:?}"
            );
        }
    }

    #[test]
    fn rfc7914_vector_2() {
        let params = Params::new(10, 8, 16).unwrap();
        for backend in both_backends() {
            let mut out = [0; 64];
            scrypt_with_backend(b"password", b"NaCl", &params, &mut out, backend).unwrap();
            assert_eq!(
                out,
                hex!(
                    "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162"
                    "2eaf30d92e22a3886ff109279d9830dac727afb94a83ee6d8360cbdfa2cc0640"
                ),
                "{backend:?}"
            );
        }
    }

    #[test]
    fn multi_block_and_truncated_output() {
        let params = Params::new(4, 2, 3).unwrap();
        let mut out = [0; 40];
        scrypt(b"password", b"NaCl", &params, &mut out).unwrap();
        assert_eq!(
            out,
            hex!("6c8185aa3a0815f887ade75aa9d70b1732181a1bc1515e8dc67b43079b8620ab42cb858e27a16a4f")
        );
    }

    #[test]
    fn pow_hash_of_zero_header() {
        for backend in both_backends() {
            assert_eq!(
                scrypt_1024_1_1_256_with_backend(&[0; 80], backend),
                ZERO_HEADER_HASH,
                "{backend:?}"
            );
        }
        assert_eq!(scrypt_1024_1_1_256(&[0; 80]), ZERO_HEADER_HASH);
    }

    #[test]
    fn fixed_path_matches_general_path() {
        let input: [u8; 80] = core::array::from_fn(|i| i as u8);
        let mut general = [0; 32];
        scrypt(&input, &input, &Params::POW, &mut general).unwrap();
        assert_eq!(scrypt_1024_1_1_256(&input), general);
        assert_eq!(
            general,
            hex!("bc540a1a801df96e493005c71e010e2d387607fbf0fec416fd3c2645aa1ba9d2")
        );
    }

    #[test]
    fn backends_agree_on_random_headers() {
        let Some(vector) = both_backends().find(|&b| b == Backend::Sse2) else {
            return;
        };
        for _ in 0..8 {
            let mut input = [0; 80];
            OsRng.fill_bytes(&mut input);
            assert_eq!(
                scrypt_1024_1_1_256_with_backend(&input, Backend::Soft),
                scrypt_1024_1_1_256_with_backend(&input, vector)
            );
        }
    }

    #[test]
    fn deterministic() {
        let mut input = [0; 80];
        OsRng.fill_bytes(&mut input);
        assert_eq!(scrypt_1024_1_1_256(&input), scrypt_1024_1_1_256(&input));
    }

    #[test]
    fn single_bit_flips_avalanche() {
        let mut input = [0; 80];
        OsRng.fill_bytes(&mut input);
        let base = scrypt_1024_1_1_256(&input);
        let mut total = 0;
        for bit in [0, 7, 100, 333, 639] {
            let mut flipped = input;
            flipped[bit / 8] ^= 1 << (bit % 8);
            let changed: u32 = base
                .iter()
                .zip(scrypt_1024_1_1_256(&flipped).iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum();
            assert!((64..=192).contains(&changed), "bit {bit} changed {changed}");
            total += changed;
        }
        assert!((4 * 5 * 24..=4 * 5 * 40).contains(&total), "average {}", total / 5);
    }

    #[test]
    fn unavailable_backend_falls_back() {
        assert!(Backend::Soft.is_available());
        assert_eq!(
            Backend::detect(),
            if detect_sse2() { Backend::Sse2 } else { Backend::Soft }
        );
    }

    #[test]
    fn rejects_bad_output_lengths() {
        assert_eq!(
            scrypt(b"p", b"s", &Params::POW, &mut []),
            Err(Error::InvalidOutputLength)
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_table_reports_allocation_failure() {
        let params = Params::new(54, 4, 1).unwrap();
        let mut out = [0; 32];
        assert_eq!(
            scrypt(b"p", b"s", &params, &mut out),
            Err(Error::AllocationFailure { bytes: 1 << 63 })
        );
        assert_eq!(out, [0; 32]);
    }

    #[test]
    fn concurrent_calls_are_independent() {
        let results: Vec<[u8; 32]> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| scrypt_1024_1_1_256(&[0; 80])))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|h| *h == ZERO_HEADER_HASH));
    }
}
