use crypto_common::{blocks::Block, erase::Erase};
use sha256::{Buffer, Sha256, BLOCK_SIZE, OUTPUT_SIZE};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// HMAC-SHA256 with the keyed inner and outer states precomputed.
///
/// Cloning a keyed instance is cheap, which is how PBKDF2 reuses one key
/// for every block and iteration.
#[derive(Clone)]
pub struct Hmac {
    inner: Sha256,
    outer: Sha256,
    buffer: Buffer,
}

impl core::fmt::Debug for Hmac {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Hmac { ... }")
    }
}

impl Hmac {
    #[must_use]
    pub fn new(key: &[u8]) -> Self {
        let mut pad = block_sized_key(key);
        for b in &mut pad {
            *b ^= IPAD;
        }
        let mut inner = Sha256::default();
        inner.update_blocks(core::slice::from_ref(&pad));
        for b in &mut pad {
            *b ^= IPAD ^ OPAD;
        }
        let mut outer = Sha256::default();
        outer.update_blocks(core::slice::from_ref(&pad));
        Self {
            inner,
            outer,
            buffer: Buffer::default(),
        }
    }

    /// One-shot `HMAC(key, message)`.
    #[must_use]
    pub fn mac(key: &[u8], message: &[u8]) -> [u8; OUTPUT_SIZE] {
        let mut hmac = Self::new(key);
        hmac.update(message);
        hmac.finalize()
    }

    #[inline]
    pub fn update(&mut self, input: &[u8]) {
        let Self { inner, buffer, .. } = self;
        buffer.digest_blocks(input, |blocks| inner.update_blocks(blocks));
    }

    #[inline]
    #[must_use]
    pub fn finalize(mut self) -> [u8; OUTPUT_SIZE] {
        let mut inner_hash = [0; OUTPUT_SIZE];
        self.inner.finalize(&mut self.buffer, &mut inner_hash);
        let Self { outer, buffer, .. } = &mut self;
        buffer.reset();
        buffer.digest_blocks(&inner_hash, |blocks| outer.update_blocks(blocks));
        let mut out = [0; OUTPUT_SIZE];
        outer.finalize(buffer, &mut out);
        out
    }
}

impl Drop for Hmac {
    fn drop(&mut self) {
        self.buffer.erase();
    }
}

/// Keys longer than a block are hashed first; shorter ones are zero padded.
fn block_sized_key(key: &[u8]) -> Block<BLOCK_SIZE> {
    let mut padded = [0; BLOCK_SIZE];
    if key.len() <= BLOCK_SIZE {
        padded[..key.len()].copy_from_slice(key);
    } else {
        padded[..OUTPUT_SIZE].copy_from_slice(&Sha256::digest(key));
    }
    padded
}
