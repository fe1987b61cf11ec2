use crate::Error;

/// scrypt cost parameters: `N = 2^log_n`, block size `r`, parallelism `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Params {
    pub(crate) log_n: u8,
    pub(crate) r: u32,
    pub(crate) p: u32,
}

impl Params {
    /// The proof-of-work parameter set, `N = 1024, r = 1, p = 1`.
    pub const POW: Self = Self {
        log_n: 10,
        r: 1,
        p: 1,
    };

    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self, Error> {
        if r == 0 {
            return Err(Error::InvalidParams("r must be positive"));
        }
        if p == 0 {
            return Err(Error::InvalidParams("p must be positive"));
        }
        if log_n == 0 {
            return Err(Error::InvalidParams("N must be greater than 1"));
        }
        if u32::from(log_n) >= usize::BITS {
            return Err(Error::InvalidParams("N does not fit in usize"));
        }
        let r_words = usize::try_from(r).map_err(|_| Error::InvalidParams("r too large"))?;
        let p_words = usize::try_from(p).map_err(|_| Error::InvalidParams("p too large"))?;
        // N < 2^(128 r / 8)
        if usize::from(log_n) >= r_words.saturating_mul(16) {
            return Err(Error::InvalidParams("N must be less than 2^(16 r)"));
        }
        if u64::from(r) * u64::from(p) >= 1 << 30 {
            return Err(Error::InvalidParams("r * p must be less than 2^30"));
        }
        let r128 = r_words
            .checked_mul(128)
            .ok_or(Error::InvalidParams("block size overflows usize"))?;
        r128.checked_mul(p_words)
            .ok_or(Error::InvalidParams("p * block size overflows usize"))?;
        r128.checked_mul(1 << log_n)
            .ok_or(Error::InvalidParams("N * block size overflows usize"))?;
        Ok(Self { log_n, r, p })
    }

    #[must_use]
    pub const fn log_n(&self) -> u8 {
        self.log_n
    }

    #[must_use]
    pub const fn n(&self) -> usize {
        1 << self.log_n
    }

    #[must_use]
    pub const fn r(&self) -> u32 {
        self.r
    }

    #[must_use]
    pub const fn p(&self) -> u32 {
        self.p
    }

    /// Bytes in one ROMix block, `128 r`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn block_len(&self) -> usize {
        self.r as usize * 128
    }
}
