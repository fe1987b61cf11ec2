//! Targets without a detection routine.
//!
//! Covers Miri (an interpreter that doesn't emulate target features) and
//! architectures this crate has no probe for. Every query reports the
//! feature as missing so callers take their portable path.

#[macro_export]
#[doc(hidden)]
macro_rules! __unless {
    ($($tf:tt),+ => $body:expr) => {
        false
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __detect {
    ($($tf:tt),+) => {
        false
    };
}
