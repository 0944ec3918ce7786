//! `RandomBlock` (spec §3): uniformly random content supplied by the whitening pool.

use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::block::{BlockDataType, BlockOps, BlockType, HeaderLayer};
use crate::block_size::BlockSize;
use crate::checksum::Checksum;

#[derive(Debug, Clone)]
pub struct RandomBlock {
    block_size: BlockSize,
    data: Vec<u8>,
    id_checksum: Checksum,
    date_created: DateTime<Utc>,
    pub pool_id: Option<String>,
}

impl RandomBlock {
    /// Generate a fresh random block of `block_size` bytes, optionally tagged with a
    /// `pool_id` (spec §4.D pool scoping).
    pub fn generate(block_size: BlockSize, pool_id: Option<String>) -> Self {
        let mut data = vec![0u8; block_size.bytes()];
        rand::thread_rng().fill_bytes(&mut data);
        let id_checksum = Checksum::of(&data);
        RandomBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
            pool_id,
        }
    }

    pub fn from_bytes(block_size: BlockSize, data: Vec<u8>, pool_id: Option<String>) -> Self {
        let id_checksum = Checksum::of(&data);
        RandomBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
            pool_id,
        }
    }
}

impl BlockOps for RandomBlock {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        BlockType::Random
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
    fn generate_fills_exact_block_size() {
        let block = RandomBlock::generate(BlockSize::Tiny, None);
        assert_eq!(block.data().len(), BlockSize::Tiny.bytes());
    }

    #[test]
    fn two_generated_blocks_differ() {
        let a = RandomBlock::generate(BlockSize::Small, None);
        let b = RandomBlock::generate(BlockSize::Small, None);
        assert_ne!(a.data(), b.data());
    }
}
