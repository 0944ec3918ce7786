//! Content-addressing checksum service (spec §4.A).
//!
//! SHA3-512 is the sole hash used to address blocks. `idChecksum` on every block is
//! `Checksum::of(block.data())`.

use sha3::{Digest, Sha3_512};
use std::fmt;

/// Length in bytes of a checksum (SHA3-512 digest).
pub const CHECKSUM_LEN: usize = 64;

/// A SHA3-512 digest, used as the content address of a block.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum([u8; CHECKSUM_LEN]);

impl Checksum {
    /// Compute the checksum of `data`.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha3_512::new();
        hasher.update(data);
        let digest = hasher.finalize();
        let mut bytes = [0u8; CHECKSUM_LEN];
        bytes.copy_from_slice(&digest);
        Checksum(bytes)
    }

    pub fn from_bytes(bytes: [u8; CHECKSUM_LEN]) -> Self {
        Checksum(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CHECKSUM_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({}...)", &self.to_hex()[..16])
    }
}

impl std::str::FromStr for Checksum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let bytes: [u8; CHECKSUM_LEN] = bytes
            .try_into()
            .map_err(|_| format!("checksum must be {CHECKSUM_LEN} bytes"))?;
        Ok(Checksum(bytes))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Constant-time equality over the full digest. Never short-circuits on the first
/// differing byte, so comparison time does not leak which byte differed.
pub fn constant_time_eq(a: &Checksum, b: &Checksum) -> bool {
    let mut diff: u8 = 0;
    for i in 0..CHECKSUM_LEN {
        diff |= a.0[i] ^ b.0[i];
    }
    diff == 0
}

impl PartialEq<[u8; CHECKSUM_LEN]> for Checksum {
    fn eq(&self, other: &[u8; CHECKSUM_LEN]) -> bool {
        constant_time_eq(self, &Checksum(*other))
    }
}

/// Compute the SHA3-512 checksum of `data`. Thin functional entry point used where a
/// full `Checksum` type isn't needed (e.g. deriving `toSign` for CBL signatures).
pub fn checksum(data: &[u8]) -> Checksum {
    Checksum::of(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_deterministic() {
        let a = checksum(b"brightchain");
        let b = checksum(b"brightchain");
        assert!(constant_time_eq(&a, &b));
    }

    #[test]
    fn checksum_differs_on_different_input() {
        let a = checksum(b"brightchain");
        let b = checksum(b"brightchainx");
        assert!(!constant_time_eq(&a, &b));
    }

    #[test]
    fn checksum_length_is_64_bytes() {
        let c = checksum(b"");
        assert_eq!(c.as_bytes().len(), CHECKSUM_LEN);
    }

    #[test]
    fn constant_time_eq_does_not_short_circuit_logically() {
        // Differ only in the last byte; equality must still correctly report false.
        let mut bytes_a = [0u8; CHECKSUM_LEN];
        let mut bytes_b = [0u8; CHECKSUM_LEN];
        bytes_a[CHECKSUM_LEN - 1] = 1;
        bytes_b[CHECKSUM_LEN - 1] = 2;
        let a = Checksum::from_bytes(bytes_a);
        let b = Checksum::from_bytes(bytes_b);
        assert!(!constant_time_eq(&a, &b));
    }

    #[test]
    fn hex_round_trips_through_display_and_from_str() {
        let original = checksum(b"brightchain");
        let parsed: Checksum = original.to_hex().parse().unwrap();
        assert!(constant_time_eq(&original, &parsed));
    }

    #[test]
    fn from_str_rejects_wrong_length() {
        assert!("deadbeef".parse::<Checksum>().is_err());
    }
}
