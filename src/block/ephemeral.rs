//! `EphemeralOwnedDataBlock` (spec §3): the source block produced mid-pipeline by the
//! streaming tuple generator. Never persisted — it is XORed away into a prime-whitened
//! block or consumed by the encryption adapter, then dropped.

use chrono::{DateTime, Utc};

use crate::block::{pad_with_random, BlockDataType, BlockOps, BlockType, HeaderLayer};
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::error::BlockError;
use crate::member::MemberId;

const LENGTH_HEADER_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct EphemeralOwnedDataBlock {
    block_size: BlockSize,
    data: Vec<u8>,
    id_checksum: Checksum,
    date_created: DateTime<Utc>,
    pub creator_id: MemberId,
    /// Length of the caller-supplied payload before it was zero-padded to
    /// `block_size`. Carried so the tuple service can trim padding on decompose.
    pub length_before_encryption: u64,
}

impl EphemeralOwnedDataBlock {
    /// Build from caller payload, zero-padding to `block_size` per spec §4.F step 7.
    pub fn from_payload(
        creator_id: MemberId,
        payload: &[u8],
        block_size: BlockSize,
    ) -> Result<Self, BlockError> {
        if payload.len() > block_size.bytes() {
            return Err(BlockError::DataLengthExceedsBlockSize {
                max: block_size.bytes(),
                actual: payload.len(),
            });
        }
        let length_before_encryption = payload.len() as u64;
        let mut data = payload.to_vec();
        data.resize(block_size.bytes(), 0u8);
        let id_checksum = Checksum::of(&data);
        Ok(EphemeralOwnedDataBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
            creator_id,
            length_before_encryption,
        })
    }

    /// Header layer encoding `length_before_encryption` as an 8-byte big-endian
    /// integer, so the prime-whitened block carries enough framing to restore the
    /// original length once recovered (spec §4.H `xorPrimeWhitenedToOwned`).
    pub fn length_header(&self) -> [u8; LENGTH_HEADER_LEN] {
        self.length_before_encryption.to_be_bytes()
    }

    pub fn pad_to_block_size(payload: &[u8], block_size: BlockSize) -> Vec<u8> {
        pad_with_random(payload.to_vec(), block_size)
    }
}

impl BlockOps for EphemeralOwnedDataBlock {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        BlockType::EphemeralOwnedData
    }

    fn block_data_type(&self) -> BlockDataType {
        BlockDataType::EphemeralStructuredData
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
        false
    }

    fn layer_header_data(&self) -> Vec<HeaderLayer> {
        vec![HeaderLayer::new(self.length_header().to_vec())]
    }
}
