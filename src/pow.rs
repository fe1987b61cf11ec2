//! Block headers, compact targets and the proof-of-work check.

use crate::{
    util::{from_hex, hex, hex_reversed},
    Error, OUTPUT_LEN, POW_INPUT_LEN,
};
use sha256::Sha256;
use std::fmt::{self, Debug, Display};

/// Version bit set on merge-mined (AuxPoW) blocks.
const VERSION_AUXPOW: i32 = 0x100;

/// The six consensus fields of a block header.
///
/// Hashes are kept in serialized (little-endian) byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub version: i32,
    pub prev_block: [u8; 32],
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl Header {
    pub const LEN: usize = POW_INPUT_LEN;

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0; Self::LEN];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_block);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.time.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::LEN]) -> Self {
        let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        let mut prev_block = [0; 32];
        prev_block.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = [0; 32];
        merkle_root.copy_from_slice(&bytes[36..68]);
        Self {
            version: i32::from_le_bytes(word(0)),
            prev_block,
            merkle_root,
            time: u32::from_le_bytes(word(68)),
            bits: u32::from_le_bytes(word(72)),
            nonce: u32::from_le_bytes(word(76)),
        }
    }

    /// Parse a header from the raw bytes of a block, ignoring anything
    /// after the first 80.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        bytes
            .get(..Self::LEN)
            .and_then(|b| <&[u8; Self::LEN]>::try_from(b).ok())
            .map(Self::from_bytes)
            .ok_or(Error::InvalidInputLength {
                expected: Self::LEN,
                got: bytes.len(),
            })
    }

    /// Parse the 160 hex digits of a serialized header.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let mut bytes = [0; Self::LEN];
        from_hex(s, &mut bytes)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Double SHA-256 of the header, the block's identity.
    #[must_use]
    pub fn block_hash(&self) -> [u8; OUTPUT_LEN] {
        Sha256::digest(&Sha256::digest(&self.to_bytes()))
    }

    /// scrypt hash the header's work is measured by.
    #[must_use]
    pub fn pow_hash(&self) -> [u8; OUTPUT_LEN] {
        crate::scrypt_1024_1_1_256(&self.to_bytes())
    }

    /// Block version with the chain ID and AuxPoW flag masked off.
    #[must_use]
    pub const fn base_version(&self) -> i32 {
        self.version & 0xff
    }

    /// Merge-mining chain ID from the upper half of the version.
    #[must_use]
    pub const fn chain_id(&self) -> i32 {
        self.version >> 16
    }

    #[must_use]
    pub const fn is_aux_pow(&self) -> bool {
        self.version & VERSION_AUXPOW != 0
    }

    /// Whether the header predates chain IDs.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        let version = self.base_version();
        version == 1 || (version == 2 && self.chain_id() == 0)
    }

    pub fn target(&self) -> Result<Target, Error> {
        Target::from_compact(self.bits)
    }

    /// Whether [`pow_hash`](Self::pow_hash) lies at or below the target
    /// encoded in `bits`.
    ///
    /// Merge-mined headers carry their work in the parent chain's header,
    /// so they are rejected here; use
    /// [`check_proof_of_work_with_parent`](Self::check_proof_of_work_with_parent).
    pub fn check_proof_of_work(&self) -> Result<bool, Error> {
        if self.is_aux_pow() {
            return Err(Error::AuxPowParent { required: true });
        }
        let target = self.target()?;
        Ok(target.is_met_by(&self.pow_hash()))
    }

    /// Proof of work of a merge-mined header: the parent header's scrypt
    /// hash checked against this header's `bits`.
    ///
    /// Only the hash is checked. The AuxPoW merkle branches tying `parent`
    /// to this header are not verified.
    pub fn check_proof_of_work_with_parent(&self, parent: &Self) -> Result<bool, Error> {
        if !self.is_aux_pow() {
            return Err(Error::AuxPowParent { required: false });
        }
        let target = self.target()?;
        Ok(target.is_met_by(&parent.pow_hash()))
    }
}

impl Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("version", &format_args!("{:#010x}", self.version))
            .field("prev_block", &format_args!("{}", hex_reversed(&self.prev_block)))
            .field("merkle_root", &format_args!("{}", hex_reversed(&self.merkle_root)))
            .field("time", &self.time)
            .field("bits", &format_args!("{:#010x}", self.bits))
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// Display form of a 256-bit hash: byte-reversed hex.
#[must_use]
pub fn display_hash(hash: &[u8; OUTPUT_LEN]) -> String {
    hex_reversed(hash)
}

/// A 256-bit proof-of-work target, as 32 big-endian bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target([u8; 32]);

impl Target {
    /// Decode the compact "bits" form: an 8-bit base-256 exponent, a sign
    /// bit and a 23-bit mantissa.
    ///
    /// Negative, zero and overflowing targets are rejected, since no hash
    /// could meet them.
    pub fn from_compact(bits: u32) -> Result<Self, Error> {
        let [size, ..] = bits.to_be_bytes();
        let size = usize::from(size);
        let word = bits & 0x007f_ffff;
        let negative = word != 0 && bits & 0x0080_0000 != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        if negative || overflow {
            return Err(Error::InvalidTarget(bits));
        }
        let mut be = [0; 32];
        // mantissa byte k (most significant first) has weight 256^(size - 1 - k)
        for (k, byte) in word.to_be_bytes()[1..].iter().enumerate() {
            let Some(shift) = size.checked_sub(k + 1) else {
                break;
            };
            if let Some(at) = 31usize.checked_sub(shift) {
                be[at] = *byte;
            }
        }
        if be == [0; 32] {
            return Err(Error::InvalidTarget(bits));
        }
        Ok(Self(be))
    }

    /// Whether a hash in serialized (little-endian) order is at or below
    /// the target.
    #[must_use]
    pub fn is_met_by(&self, hash: &[u8; OUTPUT_LEN]) -> bool {
        let mut be = *hash;
        be.reverse();
        be <= self.0
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex(&self.0))
    }
}

impl Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::{display_hash, Header, Target};
    use crate::Error;
    use hex_literal::hex;

    const LITECOIN_GENESIS: &str = "01000000000000000000000000000000000000000000000000000000000000000000\
        0000d9ced4ed1130f7b7faad9be25323ffafa33232a17c3edf6cfd97bee6bafbdd97b9aa8e4ef0ff0f1ecd513f7c";

    fn dogecoin_genesis() -> Header {
        let mut merkle_root =
            hex!("5b2a3f53f605d62c53e62932dac6925e3d74afa5a4b459745c36d42d0ed26a69");
        merkle_root.reverse();
        Header {
            version: 1,
            prev_block: [0; 32],
            merkle_root,
            time: 1_386_325_540,
            bits: 0x1e0f_fff0,
            nonce: 99943,
        }
    }

    #[test]
    fn litecoin_genesis() {
        let header = Header::from_hex(LITECOIN_GENESIS).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.time, 1_317_972_665);
        assert_eq!(header.bits, 0x1e0f_fff0);
        assert_eq!(header.nonce, 2_084_524_493);
        assert_eq!(
            display_hash(&header.merkle_root),
            "97ddfbbae6be97fd6cdf3e7ca13232a3afff2353e29badfab7f73011edd4ced9"
        );
        assert_eq!(
            display_hash(&header.block_hash()),
            "12a765e31ffd4059bada1e25190f6e98c99d9714d334efa41a195a7e7e04bfe2"
        );
        assert_eq!(
            header.pow_hash(),
            hex!("001e67b013726fd7382e9acb69165b4b6316227fb3156b5b414ba6340c050000")
        );
        assert_eq!(header.check_proof_of_work(), Ok(true));
    }

    #[test]
    fn dogecoin_genesis_meets_target() {
        let header = dogecoin_genesis();
        assert_eq!(
            display_hash(&header.block_hash()),
            "1a91e3dace36e2be3bf030a65679fe821aa1d6ef92e7c9902eb318182c355691"
        );
        assert_eq!(
            display_hash(&header.pow_hash()),
            "0000026f3f7874ca0c251314eaed2d2fcf83d7da3acfaacf59417d485310b448"
        );
        assert_eq!(header.check_proof_of_work(), Ok(true));
    }

    #[test]
    fn tampered_nonce_fails() {
        let mut header = Header::from_hex(LITECOIN_GENESIS).unwrap();
        header.nonce += 1;
        assert_eq!(
            display_hash(&header.pow_hash()),
            "0123c8787e1009044d66ec6162e3d16601401e0fbdc53bb30286409c531b78f9"
        );
        assert_eq!(header.check_proof_of_work(), Ok(false));
    }

    #[test]
    fn merge_mined_work_comes_from_the_parent() {
        let parent = Header::from_hex(LITECOIN_GENESIS).unwrap();
        let mut child = dogecoin_genesis();
        child.version = 0x0062_0104;
        child.nonce = 0;

        assert_eq!(
            child.check_proof_of_work(),
            Err(Error::AuxPowParent { required: true })
        );
        assert_eq!(child.check_proof_of_work_with_parent(&parent), Ok(true));

        let mut stale = parent;
        stale.nonce += 1;
        assert_eq!(child.check_proof_of_work_with_parent(&stale), Ok(false));

        child.bits = 0x0492_3456;
        assert_eq!(
            child.check_proof_of_work_with_parent(&parent),
            Err(Error::InvalidTarget(0x0492_3456))
        );
    }

    #[test]
    fn parent_is_refused_for_plain_headers() {
        let header = dogecoin_genesis();
        assert_eq!(
            header.check_proof_of_work_with_parent(&header),
            Err(Error::AuxPowParent { required: false })
        );
    }

    #[test]
    fn bytes_round_trip() {
        let header = dogecoin_genesis();
        let bytes = header.to_bytes();
        assert_eq!(Header::from_bytes(&bytes), header);
        assert_eq!(bytes[76..80], 99943u32.to_le_bytes());

        let mut block = bytes.to_vec();
        block.extend_from_slice(&[0xab; 20]);
        assert_eq!(Header::from_slice(&block), Ok(header));
        assert_eq!(
            Header::from_slice(&bytes[..79]),
            Err(Error::InvalidInputLength {
                expected: 80,
                got: 79
            })
        );
    }

    #[test]
    fn version_fields() {
        let mut header = dogecoin_genesis();
        assert!(header.is_legacy());
        assert!(!header.is_aux_pow());

        header.version = 0x0062_0104;
        assert_eq!(header.base_version(), 4);
        assert_eq!(header.chain_id(), 0x62);
        assert!(header.is_aux_pow());
        assert!(!header.is_legacy());

        header.version = 2;
        assert!(header.is_legacy());
        header.version = 0x0062_0002;
        assert!(!header.is_legacy());
    }

    #[test]
    fn compact_targets() {
        assert_eq!(
            Target::from_compact(0x1e0f_fff0).unwrap().as_bytes(),
            &hex!("00000ffff0000000000000000000000000000000000000000000000000000000")
        );
        assert_eq!(
            Target::from_compact(0x1d00_ffff).unwrap().as_bytes(),
            &hex!("00000000ffff0000000000000000000000000000000000000000000000000000")
        );
        let mut small = [0; 32];
        small[28..].copy_from_slice(&hex!("92340000"));
        assert_eq!(Target::from_compact(0x0500_9234).unwrap().as_bytes(), &small);
        small = [0; 32];
        small[31] = 0x12;
        assert_eq!(Target::from_compact(0x0112_3456).unwrap().as_bytes(), &small);
        let mut top = [0; 32];
        top[0] = 0x7f;
        top[1] = 0xff;
        top[2] = 0xff;
        assert_eq!(Target::from_compact(0x207f_ffff).unwrap().as_bytes(), &top);
        top = [0; 32];
        top[0] = 0x01;
        assert_eq!(Target::from_compact(0x2200_0001).unwrap().as_bytes(), &top);
    }

    #[test]
    fn rejects_unmeetable_targets() {
        for bits in [
            0x0492_3456,
            0xff12_3456,
            0x2301_0000,
            0x2201_0000,
            0x2102_0000,
            0,
            0x0100_3456,
        ] {
            assert_eq!(Target::from_compact(bits), Err(Error::InvalidTarget(bits)));
        }
    }

    #[test]
    fn comparison_is_inclusive() {
        let target = Target::from_compact(0x1e0f_fff0).unwrap();
        let mut hash = *target.as_bytes();
        hash.reverse();
        assert!(target.is_met_by(&hash));
        hash[0] = 1;
        assert!(!target.is_met_by(&hash));
        assert!(target.is_met_by(&[0; 32]));
    }
}
