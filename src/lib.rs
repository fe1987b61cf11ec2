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
#![allow(clippy::missing_errors_doc)]

//! Scrypt proof-of-work hashing for Litecoin-derived block headers.
//!
//! [`scrypt_1024_1_1_256`] hashes a serialized 80-byte header with
//! `scrypt(header, header, N = 1024, r = 1, p = 1, 32)`. The Salsa20/8 core
//! runs on SSE2 when the CPU has it and on portable code otherwise; both give
//! the same bytes. [`pow`] turns headers and compact targets into a
//! proof-of-work check, and [`kdf`] exposes the general scrypt, PBKDF2 and
//! HMAC building blocks.

mod error;
pub mod pow;
mod util;

pub use error::Error;
pub use scrypt as kdf;
pub use scrypt::{Backend, Params, OUTPUT_LEN, POW_INPUT_LEN};

use std::sync::Once;

fn selected_backend() -> Backend {
    static LOGGED: Once = Once::new();
    let backend = Backend::detect();
    LOGGED.call_once(|| tracing::debug!(?backend, "selected scrypt backend"));
    backend
}

/// Probe the CPU for SSE2 once and remember the answer.
///
/// Hashing calls this implicitly, so calling it up front is only useful to
/// move the probe out of the first hash.
#[must_use]
pub fn scrypt_detect_sse2() -> bool {
    selected_backend() == Backend::Sse2
}

/// Proof-of-work hash of an 80-byte header, as stored (not byte-reversed).
#[must_use]
pub fn scrypt_1024_1_1_256(input: &[u8; POW_INPUT_LEN]) -> [u8; OUTPUT_LEN] {
    scrypt::scrypt_1024_1_1_256_with_backend(input, selected_backend())
}

/// [`scrypt_1024_1_1_256`] for callers holding an unsized buffer.
pub fn scrypt_1024_1_1_256_slice(input: &[u8]) -> Result<[u8; OUTPUT_LEN], Error> {
    let Ok(header) = <&[u8; POW_INPUT_LEN]>::try_from(input) else {
        tracing::warn!(len = input.len(), "rejecting proof-of-work input");
        return Err(Error::InvalidInputLength {
            expected: POW_INPUT_LEN,
            got: input.len(),
        });
    };
    Ok(scrypt_1024_1_1_256(header))
}

/// [`scrypt_1024_1_1_256_slice`], writing into `output`, which must be
/// exactly 32 bytes.
pub fn scrypt_1024_1_1_256_into(input: &[u8], output: &mut [u8]) -> Result<(), Error> {
    let len = output.len();
    let output = <&mut [u8; OUTPUT_LEN]>::try_from(output).map_err(|_| {
        tracing::warn!(len, "rejecting proof-of-work output buffer");
        Error::InvalidOutputLength
    })?;
    *output = scrypt_1024_1_1_256_slice(input)?;
    Ok(())
}
