use {
    crate::constants::SHA256_OUTPUT_LEN,
    hmac::{Hmac, Mac},
    sha2::{Digest, Sha256},
};

/// Wrapper function to form a HMAC-SHA256 operation using the RustCrypto `hmac` crate.
#[inline(always)]
pub(crate) fn hmac_sha256(key: &[u8], value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(value);
    mac.finalize().into_bytes().into()
}

#[inline(always)]
pub(crate) fn sha256(value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    Sha256::digest(value).into()
}

#[inline(always)]
pub(crate) fn sha256_hex(value: &[u8]) -> String {
    hex::encode(sha256(value))
}

#[cfg(test)]
mod tests {
    use {
        super::{hmac_sha256, sha256_hex},
        crate::constants::SHA256_EMPTY,
    };

    #[test]
    fn test_sha256_empty() {
        assert_eq!(sha256_hex(b""), SHA256_EMPTY);
    }

    #[test]
    fn test_hmac_sha256_rfc4231_case_2() {
        // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?"
        let tag = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(hex::encode(tag), "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");
    }
}
