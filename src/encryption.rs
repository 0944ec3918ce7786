//! ECIES encryption adapter (spec §4.J) on the secp256k1 curve.
//!
//! Wire format of an encrypted-owned-data block:
//! `[ephemeralPublicKey (65B, 0x04-prefixed) | iv (16B) | authTag (16B) | ciphertext | random-fill]`
//! padded to exactly `blockSize`.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hkdf::Hkdf;
use rand::RngCore;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::Sha256;

use crate::error::EncryptionError;

const PUBKEY_LEN: usize = 65;
const IV_LEN: usize = 16;
const TAG_LEN: usize = 16;

/// ECDH + HKDF-SHA256 shared-secret derivation, then AES-256-GCM. The IV stored on
/// the wire is 16 bytes; only the first 12 are used as the GCM nonce (the remaining
/// 4 are reserved padding so the wire layout in spec §4.J matches byte-for-byte).
fn derive_key(ephemeral_secret: &SecretKey, recipient_public: &PublicKey) -> [u8; 32] {
    let shared = secp256k1::ecdh::SharedSecret::new(recipient_public, ephemeral_secret);
    let hk = Hkdf::<Sha256>::new(None, shared.as_ref());
    let mut key = [0u8; 32];
    hk.expand(b"brightchain-ecies", &mut key)
        .expect("32 is a valid HKDF-SHA256 output length");
    key
}

/// Encrypt `plaintext` for `recipient_public_key` (65-byte uncompressed key).
/// Returns `ephemeralPublicKey ∥ iv ∥ authTag ∥ ciphertext` with no block padding —
/// callers pad to `blockSize` when wrapping the result in an `EncryptedOwnedDataBlock`.
pub fn ecies_encrypt(
    recipient_public_key: &[u8; PUBKEY_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let secp = Secp256k1::new();
    let recipient_public =
        PublicKey::from_slice(recipient_public_key).map_err(|_| EncryptionError::InvalidPublicKey)?;

    let mut rng = rand::thread_rng();
    let mut ephemeral_bytes = [0u8; 32];
    rng.fill_bytes(&mut ephemeral_bytes);
    let ephemeral_secret =
        SecretKey::from_slice(&ephemeral_bytes).map_err(|_| EncryptionError::InvalidPublicKey)?;
    let ephemeral_public = PublicKey::from_secret_key(&secp, &ephemeral_secret);

    let key_bytes = derive_key(&ephemeral_secret, &recipient_public);
    let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
    let cipher = Aes256Gcm::new(key);

    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv[..12]);

    let ciphertext_and_tag = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad: &[] })
        .map_err(|_| EncryptionError::DecryptionFailed)?;
    let split_at = ciphertext_and_tag.len() - TAG_LEN;
    let (ciphertext, tag) = ciphertext_and_tag.split_at(split_at);

    let mut out = Vec::with_capacity(PUBKEY_LEN + IV_LEN + TAG_LEN + ciphertext.len());
    out.extend_from_slice(&ephemeral_public.serialize_uncompressed());
    out.extend_from_slice(&iv);
    out.extend_from_slice(tag);
    out.extend_from_slice(ciphertext);
    Ok(out)
}

/// Decrypt a buffer produced by [`ecies_encrypt`] (header prefix only — callers trim
/// block padding before calling this).
pub fn ecies_decrypt(
    recipient_secret_key: &SecretKey,
    data: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < PUBKEY_LEN + IV_LEN + TAG_LEN {
        return Err(EncryptionError::DecryptionFailed);
    }
    let ephemeral_public_bytes: [u8; PUBKEY_LEN] = data[..PUBKEY_LEN]
        .try_into()
        .map_err(|_| EncryptionError::InvalidPublicKey)?;
    let ephemeral_public =
        PublicKey::from_slice(&ephemeral_public_bytes).map_err(|_| EncryptionError::InvalidPublicKey)?;
    let iv = &data[PUBKEY_LEN..PUBKEY_LEN + IV_LEN];
    let tag = &data[PUBKEY_LEN + IV_LEN..PUBKEY_LEN + IV_LEN + TAG_LEN];
    let ciphertext = &data[PUBKEY_LEN + IV_LEN + TAG_LEN..];

    let key_bytes = derive_key(recipient_secret_key, &ephemeral_public);
    let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
    let cipher = Aes256Gcm::new(key);
    let nonce = Nonce::from_slice(&iv[..12]);

    let mut ciphertext_and_tag = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    ciphertext_and_tag.extend_from_slice(ciphertext);
    ciphertext_and_tag.extend_from_slice(tag);

    cipher
        .decrypt(nonce, Payload { msg: &ciphertext_and_tag, aad: &[] })
        .map_err(|_| EncryptionError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair(seed: u8) -> (SecretKey, [u8; PUBKEY_LEN]) {
        let secp = Secp256k1::new();
        let mut bytes = [0x22u8; 32];
        bytes[0] = seed;
        let secret = SecretKey::from_slice(&bytes).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let mut public_bytes = [0u8; PUBKEY_LEN];
        public_bytes.copy_from_slice(&public.serialize_uncompressed());
        (secret, public_bytes)
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let (secret, public) = keypair(7);
        let plaintext = b"owner-free filesystem payload";
        let ciphertext = ecies_encrypt(&public, plaintext).unwrap();
        let recovered = ecies_decrypt(&secret, &ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn decrypt_fails_with_wrong_key() {
        let (_secret_a, public_a) = keypair(8);
        let (secret_b, _public_b) = keypair(9);
        let ciphertext = ecies_encrypt(&public_a, b"secret").unwrap();
        assert!(ecies_decrypt(&secret_b, &ciphertext).is_err());
    }

    #[test]
    fn decrypt_fails_on_tampered_ciphertext() {
        let (secret, public) = keypair(10);
        let mut ciphertext = ecies_encrypt(&public, b"secret payload").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        assert!(ecies_decrypt(&secret, &ciphertext).is_err());
    }
}
