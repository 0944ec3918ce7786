//! `ConstituentBlockList` (CBL) block shape (spec §3). This module holds the decoded
//! struct and its `BlockOps` framing; wire pack/unpack and signing live in
//! `crate::cbl_codec` so the two concerns — "what a CBL is" and "how it's
//! serialized" — stay separable, as spec §9 asks for breaking the
//! encryption/owned-data/CBL cycle via leaf modules.

use chrono::{DateTime, Utc};

use crate::block::{BlockDataType, BlockOps, BlockType, HeaderLayer};
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::member::MemberId;

/// File-metadata carried by an `ExtendedCBL` (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedMetadata {
    pub file_name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct ConstituentBlockList {
    pub block_size: BlockSize,
    pub creator_id: MemberId,
    pub date_created: DateTime<Utc>,
    pub original_data_length: u64,
    pub tuple_size: u8,
    pub extended: Option<ExtendedMetadata>,
    pub creator_signature: [u8; 65],
    pub addresses: Vec<Checksum>,
    /// Full encoded wire bytes (header ∥ addresses ∥ random padding), exactly
    /// `block_size` long. This is what gets whitened and persisted like any other
    /// block.
    pub encoded: Vec<u8>,
}

impl ConstituentBlockList {
    pub fn is_extended(&self) -> bool {
        self.extended.is_some()
    }

    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }
}

impl BlockOps for ConstituentBlockList {
    fn data(&self) -> &[u8] {
        &self.encoded
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        if self.extended.is_some() {
            BlockType::ExtendedCbl
        } else {
            BlockType::ConstituentBlockList
        }
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
