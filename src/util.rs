use crate::Error;

struct Hex<I: Iterator<Item = u8>> {
    inner: I,
    next: Option<u8>,
}

const TABLE: &[u8; 16] = b"0123456789abcdef";

impl<I: Iterator<Item = u8>> Iterator for Hex<I> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next.take() {
            Some(c) => Some(char::from(c)),
            None => self.inner.next().map(|b| {
                self.next = Some(TABLE[usize::from(b & 0xf)]);
                char::from(TABLE[usize::from(b >> 4)])
            }),
        }
    }
}

/// Lowercase hex of `bytes` in the given order.
pub fn hex(bytes: &[u8]) -> String {
    Hex {
        inner: bytes.iter().copied(),
        next: None,
    }
    .collect()
}

/// Lowercase hex of `bytes` last byte first, the way block explorers print
/// 256-bit hashes.
pub fn hex_reversed(bytes: &[u8]) -> String {
    Hex {
        inner: bytes.iter().rev().copied(),
        next: None,
    }
    .collect()
}

pub fn from_hex(s: &str, buf: &mut [u8]) -> Result<(), Error> {
    const fn decode_char(b: u8) -> Result<u8, Error> {
        match b {
            b'a'..=b'f' => Ok(b - b'a' + 10),
            b'A'..=b'F' => Ok(b - b'A' + 10),
            b'0'..=b'9' => Ok(b - b'0'),
            _ => Err(Error::InvalidHex),
        }
    }
    let bytes = s.as_bytes();
    if bytes.len() != buf.len() * 2 {
        return Err(Error::InvalidInputLength {
            expected: buf.len() * 2,
            got: bytes.len(),
        });
    }
    for (b, pair) in buf.iter_mut().zip(bytes.chunks_exact(2)) {
        *b = decode_char(pair[0])? << 4 | decode_char(pair[1])?;
    }
    Ok(())
}
