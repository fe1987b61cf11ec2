//! Best-effort erasure of transient secrets.
//!
//! Writes go through [`core::ptr::write_volatile`] followed by a compiler
//! fence so the zeroing survives dead-store elimination.

use core::sync::atomic::{compiler_fence, Ordering};

pub trait Erase {
    fn erase(&mut self);
}

trait DefaultIsErased: Copy + Default + Sized {}

impl<E: DefaultIsErased> Erase for E {
    #[inline]
    fn erase(&mut self) {
        // SAFETY: `self` is a valid, aligned, exclusive reference.
        unsafe { core::ptr::write_volatile(self, E::default()) };
        compiler_fence(Ordering::SeqCst);
    }
}

macro_rules! impl_default_is_erased {
    ($($t:ty),*) => {
        $(
            impl DefaultIsErased for $t {}
        )*
    };
}

#[rustfmt::skip]
impl_default_is_erased! {
    bool,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize
}

impl<E: Erase> Erase for [E] {
    fn erase(&mut self) {
        for elem in self {
            elem.erase();
        }
    }
}

impl<E: Erase, const N: usize> Erase for [E; N] {
    fn erase(&mut self) {
        self.as_mut_slice().erase();
    }
}
