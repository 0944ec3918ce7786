//! `SuperCBL` (spec §3): a hierarchical CBL whose addresses name sub-CBL blocks
//! rather than data primes, letting a file exceed one CBL's address capacity.

use chrono::{DateTime, Utc};

use crate::block::{BlockDataType, BlockOps, BlockType, HeaderLayer};
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::member::MemberId;

#[derive(Debug, Clone)]
pub struct SuperCbl {
    pub block_size: BlockSize,
    pub creator_id: MemberId,
    pub date_created: DateTime<Utc>,
    /// Nesting depth: 1 if children are leaf CBLs, 2+ if children are themselves
    /// SuperCBLs.
    pub depth: u16,
    pub total_block_count: u32,
    pub original_data_checksum: Checksum,
    /// Checksums of the sub-CBL blocks, in order.
    pub sub_cbl_addresses: Vec<Checksum>,
    pub encoded: Vec<u8>,
}

impl BlockOps for SuperCbl {
    fn data(&self) -> &[u8] {
        &self.encoded
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        BlockType::SuperCbl
    }

    fn block_data_type(&self) -> BlockDataType {
        BlockDataType::RawData
    }

    fn id_checksum(&self) -> Checksum {
        Checksum::of(&self.encoded)
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
        vec![HeaderLayer::new(
            self.encoded[..self.encoded.len().min(16)].to_vec(),
        )]
    }
}
