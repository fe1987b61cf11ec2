//! `CPUID` probes for `x86`/`x86_64`.

#[cfg(target_arch = "x86")]
use core::arch::x86::{CpuidResult, __cpuid, _xgetbv, _XCR_XFEATURE_ENABLED_MASK};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{CpuidResult, __cpuid, _xgetbv, _XCR_XFEATURE_ENABLED_MASK};

/// XSAVE and OSXSAVE in leaf 1 `ecx`.
const OSXSAVE: u32 = 0b11 << 26;
/// SSE state in `XCR0`.
pub const XCR0_XMM: u64 = 0b10;

/// Processor info and feature bits.
#[must_use]
#[allow(unused_unsafe)]
pub fn leaf1() -> CpuidResult {
    // SAFETY: every target this module builds for has CPUID.
    unsafe { __cpuid(1) }
}

/// Whether the OS saves the register state named by `mask` on context
/// switches.
#[must_use]
pub fn os_saves(leaf1: &CpuidResult, mask: u64) -> bool {
    if leaf1.ecx & OSXSAVE != OSXSAVE {
        return false;
    }
    // SAFETY: OSXSAVE is set, so XGETBV is enabled.
    let xcr0 = unsafe { xgetbv() };
    xcr0 & mask == mask
}

#[target_feature(enable = "xsave")]
unsafe fn xgetbv() -> u64 {
    _xgetbv(_XCR_XFEATURE_ENABLED_MASK)
}

#[macro_export]
#[doc(hidden)]
macro_rules! __unless {
    ($($tf:tt),+ => $body:expr) => {{
        #[cfg(not(all($(target_feature = $tf,)+)))]
        {
            #[cfg(not(any(target_env = "sgx", target_os = "none", target_os = "uefi")))]
            {
                $body
            }
            // no CPUID on SGX, and freestanding targets don't save SIMD
            // registers with the default compilation flags
            #[cfg(any(target_env = "sgx", target_os = "none", target_os = "uefi"))]
            {
                false
            }
        }
        #[cfg(all($(target_feature = $tf,)+))]
        {
            true
        }
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __detect {
    ($($tf:tt),+) => {{
        let leaf1 = $crate::x86::leaf1();
        $($crate::__check!(leaf1, $tf) & )+ true
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __check {
    ($leaf1:ident, "sse2") => {
        $crate::x86::os_saves(&$leaf1, $crate::x86::XCR0_XMM) & ($leaf1.edx & (1 << 26) != 0)
    };
}
