//! W-MBus telegram codec utilities (hex input & AES-128-CTR payload decrypt).
//!
//! The codec handles:
//! - Strict hex decoding of operator input (key and telegram) with the offending pair reported.
//! - AES-128 in counter mode over the whole telegram buffer; output length always equals input length.
//! - Counter block selection through an explicit [`IvPolicy`].
//!
//! Security Notes:
//! - The default policy decrypts under an all-zero counter block regardless of telegram content.
//!   Real OMS security profiles derive the counter from header fields (M-field, A-field, CC, SN);
//!   such a derivation belongs in a new [`IvPolicy`] variant, not in [`decrypt_ctr`].
//! - Key bytes are never logged; only lengths and short ciphertext/plaintext prefixes at `debug`.
use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use tracing::debug;

use crate::error::{DecodeError, HexFault};

/// AES-128 key length in bytes.
pub const KEY_LEN: usize = 16;

/// AES block / counter block length in bytes.
pub const BLOCK_LEN: usize = 16;

type Aes128Ctr = Ctr128BE<Aes128>;

/// Decode a hex string into bytes. Odd length is rejected before any pair is inspected;
/// otherwise the first non-hex pair is reported together with its character offset.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, HexFault> {
    hex::decode(text).map_err(|e| match e {
        hex::FromHexError::OddLength => HexFault::OddLength(text.len()),
        hex::FromHexError::InvalidHexCharacter { index, .. } => {
            let offset = index & !1;
            let raw = text.as_bytes();
            let pair = String::from_utf8_lossy(&raw[offset..(offset + 2).min(raw.len())]).into_owned();
            HexFault::InvalidPair { pair, offset }
        }
        hex::FromHexError::InvalidStringLength => HexFault::OddLength(text.len()),
    })
}

/// Lowercase hex rendering of a byte buffer.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Counter block used to seed CTR decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IvPolicy {
    /// All-zero 16 byte counter block for every telegram.
    #[default]
    Zero,
    /// Caller-supplied counter block (e.g. derived from telegram header fields).
    Fixed([u8; BLOCK_LEN]),
}

impl IvPolicy {
    pub fn counter_block(&self) -> [u8; BLOCK_LEN] {
        match self {
            IvPolicy::Zero => [0u8; BLOCK_LEN],
            IvPolicy::Fixed(iv) => *iv,
        }
    }
}

/// Check a decoded key buffer and pin it to a fixed 16 byte array.
pub fn aes_key(key: &[u8]) -> Result<[u8; KEY_LEN], DecodeError> {
    <[u8; KEY_LEN]>::try_from(key).map_err(|_| DecodeError::InvalidKeySize { expected: KEY_LEN, actual: key.len() })
}

/// Decrypt `ciphertext` with AES-128-CTR under `key` and the counter block chosen by `iv`.
/// The key length is validated before the ciphertext is touched. No partial plaintext is
/// returned on failure; the cipher state is dropped before this function returns.
pub fn decrypt_ctr(key: &[u8], ciphertext: &[u8], iv: &IvPolicy) -> Result<Vec<u8>, DecodeError> {
    let key = aes_key(key)?;
    debug!(ct_len = ciphertext.len(), ct_first16 = %encode_hex(ciphertext.get(0..16).unwrap_or(ciphertext)), iv = ?iv, "decrypt_ctr: starting");
    let counter = iv.counter_block();
    let mut cipher = Aes128Ctr::new(&key.into(), &counter.into());
    let mut out = ciphertext.to_vec();
    cipher
        .try_apply_keystream(&mut out)
        .map_err(|e| DecodeError::DecryptionFailed(format!("keystream: {e}")))?;
    debug!(pt_len = out.len(), pt_first16 = %encode_hex(out.get(0..16).unwrap_or(&out[..])), "decrypt_ctr: done");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_mixed_case() {
        assert_eq!(decode_hex("00ff0A1b").unwrap(), vec![0x00, 0xFF, 0x0A, 0x1B]);
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_hex_round_trips_case_insensitively() {
        for s in ["", "00", "DEADbeef", "0123456789abcdefABCDEF00"] {
            let bytes = decode_hex(s).expect("valid hex");
            assert_eq!(encode_hex(&bytes), s.to_ascii_lowercase());
        }
    }

    #[test]
    fn decode_hex_rejects_odd_length() {
        assert_eq!(decode_hex("abc").unwrap_err(), HexFault::OddLength(3));
        // odd length wins over bad characters
        assert_eq!(decode_hex("zzz").unwrap_err(), HexFault::OddLength(3));
    }

    #[test]
    fn decode_hex_reports_first_bad_pair() {
        let err = decode_hex("00112g33zz").unwrap_err();
        assert_eq!(err, HexFault::InvalidPair { pair: "2g".into(), offset: 4 });
        let err = decode_hex("x0").unwrap_err();
        assert_eq!(err, HexFault::InvalidPair { pair: "x0".into(), offset: 0 });
        let err = decode_hex("0 ").unwrap_err();
        assert_eq!(err, HexFault::InvalidPair { pair: "0 ".into(), offset: 0 });
    }

    #[test]
    fn decrypt_rejects_wrong_key_sizes() {
        for len in [0usize, 1, 15, 17, 24, 32] {
            let key = vec![0u8; len];
            match decrypt_ctr(&key, &[1, 2, 3], &IvPolicy::Zero) {
                Err(DecodeError::InvalidKeySize { expected, actual }) => {
                    assert_eq!(expected, 16);
                    assert_eq!(actual, len);
                }
                other => panic!("expected InvalidKeySize, got {:?}", other),
            }
        }
    }

    #[test]
    fn decrypt_preserves_length() {
        let key = [0x11u8; 16];
        for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
            let ct = vec![0xA5u8; len];
            assert_eq!(decrypt_ctr(&key, &ct, &IvPolicy::Zero).unwrap().len(), len);
        }
    }

    #[test]
    fn zero_key_zero_iv_keystream() {
        // AES-128(0^128, 0^128) = 66e94bd4ef8a2c3b884cfa59ca342b2e
        let pt = decrypt_ctr(&[0u8; 16], &[0u8; 16], &IvPolicy::Zero).unwrap();
        assert_eq!(encode_hex(&pt), "66e94bd4ef8a2c3b884cfa59ca342b2e");
        let one = decrypt_ctr(&[0u8; 16], &[0u8], &IvPolicy::Zero).unwrap();
        assert_eq!(one, vec![0x66]);
    }

    #[test]
    fn fixed_counter_block_sp800_38a() {
        // SP 800-38A F.5.2 CTR-AES128.Decrypt, block #1
        let key = decode_hex("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let iv: [u8; 16] = decode_hex("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").unwrap().try_into().unwrap();
        let ct = decode_hex("874d6191b620e3261bef6864990db6ce").unwrap();
        let pt = decrypt_ctr(&key, &ct, &IvPolicy::Fixed(iv)).unwrap();
        assert_eq!(encode_hex(&pt), "6bc1bee22e409f96e93d7e117393172a");
    }

    #[test]
    fn ctr_is_symmetric() {
        let key = [0x42u8; 16];
        let data = b"meter history bytes spanning two blocks".to_vec();
        let ct = decrypt_ctr(&key, &data, &IvPolicy::Zero).unwrap();
        assert_ne!(ct, data);
        assert_eq!(decrypt_ctr(&key, &ct, &IvPolicy::Zero).unwrap(), data);
    }
}
