//! `WhitenedBlock` (spec §3): a `RawDataBlock` produced by XORing a source block
//! against a random fill of the same length. `canEncrypt = canDecrypt = canSign =
//! false` — whitened blocks are inert payload, never signed or re-encrypted.

use chrono::{DateTime, Utc};

use crate::block::{BlockDataType, BlockOps, BlockType, HeaderLayer};
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::error::BlockError;
use crate::xor;

#[derive(Debug, Clone)]
pub struct WhitenedBlock {
    block_size: BlockSize,
    data: Vec<u8>,
    id_checksum: Checksum,
    date_created: DateTime<Utc>,
    pub pool_id: Option<String>,
}

impl WhitenedBlock {
    /// `other ⊕ random_fill`; both inputs must already be exactly `block_size` bytes.
    pub fn from_data(
        other: &[u8],
        random_fill: &[u8],
        block_size: BlockSize,
        pool_id: Option<String>,
    ) -> Result<Self, BlockError> {
        if other.len() != block_size.bytes() || random_fill.len() != block_size.bytes() {
            return Err(BlockError::DataLengthExceedsBlockSize {
                max: block_size.bytes(),
                actual: other.len().max(random_fill.len()),
            });
        }
        let data = xor::xor(other, random_fill)
            .map_err(|_| BlockError::InvalidStructure("xor length mismatch".into()))?;
        let id_checksum = Checksum::of(&data);
        Ok(WhitenedBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
            pool_id,
        })
    }

    /// Wrap bytes that are already the result of an XOR fold (e.g. a whole tuple's
    /// `source ⊕ randoms ⊕ whiteners`) without re-XORing them. Used by the streaming
    /// tuple generator (spec §4.F step 5).
    pub fn from_xor_result(
        data: Vec<u8>,
        block_size: BlockSize,
        pool_id: Option<String>,
    ) -> Result<Self, BlockError> {
        if data.len() != block_size.bytes() {
            return Err(BlockError::DataLengthExceedsBlockSize {
                max: block_size.bytes(),
                actual: data.len(),
            });
        }
        let id_checksum = Checksum::of(&data);
        Ok(WhitenedBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
            pool_id,
        })
    }

    pub fn can_encrypt(&self) -> bool {
        false
    }

    pub fn can_decrypt(&self) -> bool {
        false
    }

    pub fn can_sign(&self) -> bool {
        false
    }
}

impl BlockOps for WhitenedBlock {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        BlockType::OwnerFreeWhitened
    }

    fn block_data_type(&self) -> BlockDataType {
        BlockDataType::RawData
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
        vec![HeaderLayer::empty()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitening_is_reversible() {
        let source = vec![0xABu8; BlockSize::Tiny.bytes()];
        let filler = vec![0x55u8; BlockSize::Tiny.bytes()];
        let whitened = WhitenedBlock::from_data(&source, &filler, BlockSize::Tiny, None).unwrap();
        let recovered = xor::xor(whitened.data(), &filler).unwrap();
        assert_eq!(recovered, source);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let source = vec![0u8; BlockSize::Tiny.bytes()];
        let filler = vec![0u8; BlockSize::Small.bytes()];
        assert!(WhitenedBlock::from_data(&source, &filler, BlockSize::Tiny, None).is_err());
    }
}
