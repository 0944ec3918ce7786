//! `EncryptedOwnedDataBlock` (spec §3, §4.J): an owned block whose payload has been
//! ECIES-sealed for a single recipient. Wire layout:
//! `[ephemeralPublicKey(65B) | iv(16B) | authTag(16B) | ciphertext | random-fill]`.

use chrono::{DateTime, Utc};

use crate::block::{pad_with_random, BlockDataType, BlockOps, BlockType, HeaderLayer};
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::encryption;
use crate::error::{BlockError, EncryptionError};

const HEADER_LEN: usize = 65 + 16 + 16;

#[derive(Debug, Clone)]
pub struct EncryptedOwnedDataBlock {
    block_size: BlockSize,
    data: Vec<u8>,
    id_checksum: Checksum,
    date_created: DateTime<Utc>,
}

impl EncryptedOwnedDataBlock {
    /// Encrypt `plaintext` for `recipient_public_key` and pad the sealed envelope to
    /// `block_size` with random fill (spec §4.J).
    pub fn seal(
        recipient_public_key: &[u8; 65],
        plaintext: &[u8],
        block_size: BlockSize,
    ) -> Result<Self, BlockError> {
        let sealed = encryption::ecies_encrypt(recipient_public_key, plaintext)
            .map_err(|_| BlockError::InvalidStructure("ECIES encryption failed".into()))?;
        if sealed.len() > block_size.bytes() {
            return Err(BlockError::DataLengthExceedsBlockSize {
                max: block_size.bytes(),
                actual: sealed.len(),
            });
        }
        let data = pad_with_random(sealed, block_size);
        let id_checksum = Checksum::of(&data);
        Ok(EncryptedOwnedDataBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
        })
    }

    pub fn from_bytes(block_size: BlockSize, data: Vec<u8>) -> Result<Self, BlockError> {
        if data.len() != block_size.bytes() {
            return Err(BlockError::DataLengthExceedsBlockSize {
                max: block_size.bytes(),
                actual: data.len(),
            });
        }
        let id_checksum = Checksum::of(&data);
        Ok(EncryptedOwnedDataBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
        })
    }

    /// Decrypt with the recipient's secret key. Callers pass the trailing
    /// random-fill along; [`encryption::ecies_decrypt`] only reads the prefix it
    /// consumed during AES-GCM decryption, so the fill bytes are ignored.
    pub fn open(&self, recipient_secret_key: &secp256k1::SecretKey) -> Result<Vec<u8>, EncryptionError> {
        encryption::ecies_decrypt(recipient_secret_key, &self.data)
    }
}

impl BlockOps for EncryptedOwnedDataBlock {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        BlockType::EncryptedOwnedData
    }

    fn block_data_type(&self) -> BlockDataType {
        BlockDataType::EncryptedData
    }

    fn id_checksum(&self) -> Checksum {
        self.id_checksum
    }

    fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    fn can_read(&self) -> bool {
        true
    }

    fn can_persist(&self) -> bool {
        true
    }

    fn layer_header_data(&self) -> Vec<HeaderLayer> {
        vec![HeaderLayer::new(self.data[..HEADER_LEN.min(self.data.len())].to_vec())]
    }
}
