use crate::{hmac::Hmac, Error};
use sha256::OUTPUT_SIZE;

/// PBKDF2-HMAC-SHA256 (RFC 8018), filling all of `out`.
pub fn pbkdf2_hmac_sha256(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    out: &mut [u8],
) -> Result<(), Error> {
    if rounds == 0 {
        return Err(Error::InvalidParams("PBKDF2 needs at least one round"));
    }
    if out.is_empty() || u32::try_from(out.len().div_ceil(OUTPUT_SIZE)).is_err() {
        return Err(Error::InvalidOutputLength);
    }
    pbkdf2(&Hmac::new(password), salt, rounds, out);
    Ok(())
}

/// Unchecked core: `out` must need fewer than `2^32` blocks.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn pbkdf2(prf: &Hmac, salt: &[u8], rounds: u32, out: &mut [u8]) {
    for (i, chunk) in out.chunks_mut(OUTPUT_SIZE).enumerate() {
        block(prf, salt, rounds, i as u32 + 1, chunk);
    }
}

/// `T_i = U_1 ^ U_2 ^ ... ^ U_c`, truncated to `chunk.len()`.
#[inline(always)]
fn block(prf: &Hmac, salt: &[u8], rounds: u32, index: u32, chunk: &mut [u8]) {
    let mut h = prf.clone();
    h.update(salt);
    h.update(&index.to_be_bytes());
    let mut u = h.finalize();
    chunk.copy_from_slice(&u[..chunk.len()]);
    for _ in 1..rounds {
        let mut h = prf.clone();
        h.update(&u);
        u = h.finalize();
        for (c, b) in chunk.iter_mut().zip(u.iter()) {
            *c ^= b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pbkdf2_hmac_sha256;
    use crate::Error;
    use hex_literal::hex;

    #[test]
    fn rfc7914_pbkdf2_vector() {
        let mut out = [0; 64];
        pbkdf2_hmac_sha256(b"passwd", b"salt", 1, &mut out).unwrap();
        assert_eq!(
            out,
            hex!(
                "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
                "49ca9cccf179b645991664b39d77ef317c71b845b1e30bd509112041d3a19783"
            )
        );
    }

    #[test]
    fn truncated_output_is_a_prefix() {
        let mut long = [0; 64];
        let mut short = [0; 20];
        pbkdf2_hmac_sha256(b"passwd", b"salt", 3, &mut long).unwrap();
        pbkdf2_hmac_sha256(b"passwd", b"salt", 3, &mut short).unwrap();
        assert_eq!(long[..20], short);
    }

    #[test]
    fn rejects_degenerate_requests() {
        assert_eq!(
            pbkdf2_hmac_sha256(b"p", b"s", 1, &mut []),
            Err(Error::InvalidOutputLength)
        );
        assert!(matches!(
            pbkdf2_hmac_sha256(b"p", b"s", 0, &mut [0; 32]),
            Err(Error::InvalidParams(_))
        ));
    }
}
