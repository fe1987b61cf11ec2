use std::fmt::{Debug, Display};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Error {
    AllocationFailure { bytes: usize },
    /// A merge-mined header was checked without its parent header, or a
    /// parent was supplied for a header that is not merge-mined.
    AuxPowParent { required: bool },
    InvalidHex,
    InvalidInputLength { expected: usize, got: usize },
    InvalidOutputLength,
    InvalidParams(&'static str),
    InvalidTarget(u32),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllocationFailure { bytes } => write!(
                f,
                "could not allocate {bytes} bytes of scrypt scratch memory ({} KiB)",
                bytes / 1024
            ),
            Self::AuxPowParent { required: true } => {
                f.write_str("merge-mined header needs its parent header to check proof of work")
            }
            Self::AuxPowParent { required: false } => {
                f.write_str("header is not merge-mined and has no parent header")
            }
            Self::InvalidHex => f.write_str("invalid hex digit"),
            Self::InvalidInputLength { expected, got } => {
                write!(f, "expected {expected} bytes of input, got {got}")
            }
            Self::InvalidOutputLength => f.write_str("invalid output buffer length"),
            Self::InvalidParams(why) => write!(f, "invalid scrypt parameters: {why}"),
            Self::InvalidTarget(bits) => write!(f, "invalid compact target {bits:#010x}"),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl From<scrypt::Error> for Error {
    fn from(value: scrypt::Error) -> Self {
        match value {
            scrypt::Error::AllocationFailure { bytes } => Self::AllocationFailure { bytes },
            scrypt::Error::InvalidOutputLength => Self::InvalidOutputLength,
            scrypt::Error::InvalidParams(why) => Self::InvalidParams(why),
        }
    }
}
