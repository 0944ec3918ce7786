//! `ParityBlock` (spec §3): a Reed–Solomon parity shard, framed like a raw block but
//! tagged `BlockType::Parity` so readers never mistake it for user data.

use chrono::{DateTime, Utc};

use crate::block::{BlockDataType, BlockOps, BlockType, HeaderLayer};
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::error::BlockError;

#[derive(Debug, Clone)]
pub struct ParityBlock {
    block_size: BlockSize,
    data: Vec<u8>,
    id_checksum: Checksum,
    date_created: DateTime<Utc>,
    pub shard_index: usize,
}

impl ParityBlock {
    pub fn new(block_size: BlockSize, data: Vec<u8>, shard_index: usize) -> Result<Self, BlockError> {
        if data.len() != block_size.bytes() {
            return Err(BlockError::DataLengthExceedsBlockSize {
                max: block_size.bytes(),
                actual: data.len(),
            });
        }
        let id_checksum = Checksum::of(&data);
        Ok(ParityBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
            shard_index,
        })
    }
}

impl BlockOps for ParityBlock {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        BlockType::Parity
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
    fn parity_block_tags_shard_index() {
        let block = ParityBlock::new(BlockSize::Tiny, vec![0u8; BlockSize::Tiny.bytes()], 3).unwrap();
        assert_eq!(block.shard_index, 3);
        assert_eq!(block.block_type(), BlockType::Parity);
    }
}
