use core::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Cost parameters out of range.
    InvalidParams(&'static str),
    /// Empty output, or more than `2^32 - 1` PBKDF2 blocks requested.
    InvalidOutputLength,
    /// The scratch buffer could not be allocated.
    AllocationFailure { bytes: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidParams(why) => write!(f, "invalid scrypt parameters: {why}"),
            Self::InvalidOutputLength => f.write_str("invalid output length"),
            Self::AllocationFailure { bytes } => {
                write!(f, "failed to allocate {bytes} bytes of scratch memory")
            }
        }
    }
}

impl std::error::Error for Error {}
