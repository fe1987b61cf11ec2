#![no_std]
#![deny(
    dead_code,
    deprecated,
    future_incompatible,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Runtime CPU feature detection, probed once and cached for the lifetime of
//! the process.
//!
//! # Supported target architectures
//!
//! ## `x86`/`x86_64`
//!
//! OS-independent and `#![no_std]` friendly. Target features:
//!
//! * `sse2`
//!
//! ## Everything else
//!
//! There is no probe, and every feature reports as unavailable. The same
//! holds under Miri, on SGX enclaves and on freestanding/UEFI targets. Code
//! using this crate is expected to keep a portable fallback for that case.
//!
//! # Example
//!
//! ```rust
//! // this creates a `cpuid_sse2` module
//! target_features::detect!(cpuid_sse2, "sse2");
//!
//! // `token` is a ZST proving the probe has run, so later checks are a
//! // single relaxed load
//! let token: cpuid_sse2::Features = cpuid_sse2::init();
//!
//! if token.get() {
//!     println!("CPU supports SSE2 extensions");
//! } else {
//!     println!("SSE2 extensions are not supported");
//! }
//!
//! assert_eq!(cpuid_sse2::get(), token.get());
//! ```
//!
//! If the target features are enabled via compiler options (e.g. using
//! `RUSTFLAGS`, or because `x86_64` always has SSE2), the probe is omitted
//! and `get` returns `true`, letting the compiler drop fallbacks.

use core::sync::atomic::{AtomicU8, Ordering::Relaxed};

#[cfg(any(miri, not(any(target_arch = "x86", target_arch = "x86_64"))))]
mod fallback;
#[cfg(not(miri))]
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[doc(hidden)]
pub mod x86;

const UNPROBED: u8 = u8::MAX;

/// Memoized answer of one probe.
///
/// Racing first callers each run the probe and store the same answer, so
/// relaxed ordering is enough and the cell is never observed half written.
#[derive(Debug)]
pub struct Cache(AtomicU8);

impl Cache {
    /// A cache that has not been probed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(UNPROBED))
    }

    /// The cached answer, or `None` before the first probe.
    #[inline]
    pub fn peek(&self) -> Option<bool> {
        match self.0.load(Relaxed) {
            UNPROBED => None,
            v => Some(v == 1),
        }
    }

    /// The cached answer, running `probe` first if there is none.
    #[inline]
    pub fn get_or_probe(&self, probe: impl FnOnce() -> bool) -> bool {
        self.peek().unwrap_or_else(|| {
            let found = probe();
            self.0.store(u8::from(found), Relaxed);
            found
        })
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a module containing the CPU feature detection code.
#[macro_export]
macro_rules! detect {
    ($name:ident, $($tf:tt),+$(,)?) => {
        #[allow(unused, clippy::missing_const_for_fn, clippy::inline_always)]
        mod $name {
            static CACHE: $crate::Cache = $crate::Cache::new();

            /// Proof that the probe has run.
            #[derive(Debug, Clone, Copy)]
            pub struct Features(());

            impl Features {
                /// The cached answer.
                #[inline(always)]
                pub fn get(&self) -> bool {
                    $crate::__unless! {
                        $($tf),+ => CACHE.peek() == Some(true)
                    }
                }
            }

            /// Probe if needed and return the answer.
            #[inline]
            pub fn get() -> bool {
                $crate::__unless! {
                    $($tf),+ => CACHE.get_or_probe(|| $crate::__detect!($($tf),+))
                }
            }

            /// Probe if needed and return a token whose
            /// [`get`][Features::get] skips that step.
            #[inline]
            pub fn init() -> Features {
                let _ = get();
                Features(())
            }
        }
    };
}
