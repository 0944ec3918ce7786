//! The `Member` collaborator (spec §6): an opaque identity with sign/verify and
//! public-key-encrypt capabilities. The core never issues identities (non-goal,
//! §1) — it only consumes this trait.

use secp256k1::{ecdsa::RecoverableSignature, ecdsa::RecoveryId, Message, Secp256k1, SecretKey};

use crate::error::MemberError;

/// Stable 16-byte identifier for a member (spec §6 `IdBytes`).
pub type MemberId = [u8; 16];

/// Uncompressed, 0x04-prefixed secp256k1 public key.
pub type PublicKeyBytes = [u8; 65];

/// 65-byte ECDSA-recoverable signature (64-byte signature + 1-byte recovery id).
pub type SignatureBytes = [u8; 65];

pub trait Member {
    fn id(&self) -> MemberId;
    fn public_key(&self) -> PublicKeyBytes;
    fn sign(&self, msg: &[u8]) -> Result<SignatureBytes, MemberError>;
    fn verify(&self, sig: &SignatureBytes, msg: &[u8]) -> bool;
    fn encrypt_data(&self, bytes: &[u8]) -> Result<Vec<u8>, MemberError>;
    fn decrypt_data(&self, bytes: &[u8]) -> Result<Vec<u8>, MemberError>;
}

/// Reference `Member` implementation backed by an in-process secp256k1 keypair.
/// Not a substitute for a real wallet/identity service (out of scope, spec §1); used
/// by tests and the CLI demo harness.
pub struct LocalMember {
    id: MemberId,
    secret_key: SecretKey,
    public_key: PublicKeyBytes,
}

impl LocalMember {
    pub fn generate(id: MemberId, secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
        let mut public_key_bytes = [0u8; 65];
        public_key_bytes.copy_from_slice(&public_key.serialize_uncompressed());
        LocalMember {
            id,
            secret_key,
            public_key: public_key_bytes,
        }
    }

    fn message_from(msg: &[u8]) -> Message {
        let digest = crate::checksum::checksum(msg);
        // secp256k1 messages are 32 bytes; use the first half of the SHA3-512
        // digest, matching the wire contract in spec §4.G (`sign(SHA3-512(toSign))`)
        // reduced to the curve's message size.
        let mut msg32 = [0u8; 32];
        msg32.copy_from_slice(&digest.as_bytes()[..32]);
        Message::from_slice(&msg32).expect("32-byte slice is always a valid message")
    }
}

impl Member for LocalMember {
    fn id(&self) -> MemberId {
        self.id
    }

    fn public_key(&self) -> PublicKeyBytes {
        self.public_key
    }

    fn sign(&self, msg: &[u8]) -> Result<SignatureBytes, MemberError> {
        let secp = Secp256k1::new();
        let message = Self::message_from(msg);
        let recoverable: RecoverableSignature =
            secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = recoverable.serialize_compact();
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&compact);
        out[64] = recovery_id.to_i32() as u8;
        Ok(out)
    }

    fn verify(&self, sig: &SignatureBytes, msg: &[u8]) -> bool {
        let secp = Secp256k1::new();
        let message = Self::message_from(msg);
        let recovery_id = match RecoveryId::from_i32(sig[64] as i32) {
            Ok(id) => id,
            Err(_) => return false,
        };
        let recoverable = match RecoverableSignature::from_compact(&sig[..64], recovery_id) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let public_key = match secp256k1::PublicKey::from_slice(&self.public_key) {
            Ok(k) => k,
            Err(_) => return false,
        };
        match secp.recover_ecdsa(&message, &recoverable) {
            Ok(recovered) => recovered == public_key,
            Err(_) => false,
        }
    }

    fn encrypt_data(&self, bytes: &[u8]) -> Result<Vec<u8>, MemberError> {
        crate::encryption::ecies_encrypt(&self.public_key, bytes)
            .map_err(|_| MemberError::EncryptionFailed)
    }

    fn decrypt_data(&self, bytes: &[u8]) -> Result<Vec<u8>, MemberError> {
        crate::encryption::ecies_decrypt(&self.secret_key, bytes)
            .map_err(|_| MemberError::DecryptionFailed)
    }
}

/// A `Member` that only knows a public key — enough to verify signatures without
/// holding the corresponding secret key (spec §4.G `validateSignature(data, creator,
/// blockSize)` takes only the creator's public key).
pub struct VerifyOnlyMember {
    public_key: PublicKeyBytes,
}

impl VerifyOnlyMember {
    pub fn new(public_key: PublicKeyBytes) -> Self {
        VerifyOnlyMember { public_key }
    }
}

impl Member for VerifyOnlyMember {
    fn id(&self) -> MemberId {
        [0; 16]
    }

    fn public_key(&self) -> PublicKeyBytes {
        self.public_key
    }

    fn sign(&self, _msg: &[u8]) -> Result<SignatureBytes, MemberError> {
        Err(MemberError::SigningFailed)
    }

    fn verify(&self, sig: &SignatureBytes, msg: &[u8]) -> bool {
        let secp = Secp256k1::new();
        let message = Self::message_from_public(msg);
        let recovery_id = match RecoveryId::from_i32(sig[64] as i32) {
            Ok(id) => id,
            Err(_) => return false,
        };
        let recoverable = match RecoverableSignature::from_compact(&sig[..64], recovery_id) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let public_key = match secp256k1::PublicKey::from_slice(&self.public_key) {
            Ok(k) => k,
            Err(_) => return false,
        };
        match secp.recover_ecdsa(&message, &recoverable) {
            Ok(recovered) => recovered == public_key,
            Err(_) => false,
        }
    }

    fn encrypt_data(&self, bytes: &[u8]) -> Result<Vec<u8>, MemberError> {
        crate::encryption::ecies_encrypt(&self.public_key, bytes)
            .map_err(|_| MemberError::EncryptionFailed)
    }

    fn decrypt_data(&self, _bytes: &[u8]) -> Result<Vec<u8>, MemberError> {
        Err(MemberError::DecryptionFailed)
    }
}

impl VerifyOnlyMember {
    fn message_from_public(msg: &[u8]) -> Message {
        LocalMember::message_from(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_member(id_byte: u8) -> LocalMember {
        let mut sk_bytes = [0x11u8; 32];
        sk_bytes[0] = id_byte;
        let secret_key = SecretKey::from_slice(&sk_bytes).unwrap();
        LocalMember::generate([id_byte; 16], secret_key)
    }

    #[test]
    fn sign_then_verify_succeeds() {
        let member = test_member(1);
        let msg = b"hello brightchain";
        let sig = member.sign(msg).unwrap();
        assert!(member.verify(&sig, msg));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let member = test_member(2);
        let msg = b"hello brightchain";
        let sig = member.sign(msg).unwrap();
        assert!(!member.verify(&sig, b"hello brightchait"));
    }

    #[test]
    fn verify_rejects_wrong_signer() {
        let alice = test_member(3);
        let bob = test_member(4);
        let msg = b"hello brightchain";
        let sig = alice.sign(msg).unwrap();
        assert!(!bob.verify(&sig, msg));
    }
}
