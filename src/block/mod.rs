//! Typed block hierarchy and layered header framing (spec §4.C).
//!
//! Source modeled a deep class hierarchy for blocks; here it collapses to a closed
//! `BlockType` tag plus the `BlockOps` trait, matching the re-architecture direction
//! in spec §9 ("replace with a tagged variant ... plus trait BlockOps").

pub mod cbl;
pub mod encrypted;
pub mod ephemeral;
pub mod handle;
pub mod parity;
pub mod random;
pub mod super_cbl;
pub mod whitened;

use chrono::{DateTime, Utc};

use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::error::BlockError;

/// Closed block-type enumeration (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Unknown,
    OwnerFreeWhitened,
    Random,
    RawData,
    FecData,
    EphemeralOwnedData,
    ConstituentBlockList,
    ExtendedCbl,
    SuperCbl,
    EncryptedOwnedData,
    EncryptedCbl,
    MultiEncrypted,
    Handle,
    Parity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockDataType {
    RawData,
    EphemeralStructuredData,
    EncryptedData,
}

/// One layer's contribution to a block's header. Layers are concatenated in
/// inheritance order to form `fullHeaderData`.
#[derive(Debug, Clone, Default)]
pub struct HeaderLayer {
    pub data: Vec<u8>,
}

impl HeaderLayer {
    pub fn empty() -> Self {
        HeaderLayer { data: Vec::new() }
    }

    pub fn new(data: Vec<u8>) -> Self {
        HeaderLayer { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Common accessors every block variant exposes (spec §4.C public contract).
///
/// Blocks are immutable after construction; there is deliberately no setter in this
/// trait. `validate` is the only operation allowed to fail after construction.
pub trait BlockOps {
    fn data(&self) -> &[u8];
    fn block_size(&self) -> BlockSize;
    fn block_type(&self) -> BlockType;
    fn block_data_type(&self) -> BlockDataType;
    fn id_checksum(&self) -> Checksum;
    fn date_created(&self) -> DateTime<Utc>;
    fn can_read(&self) -> bool;
    fn can_persist(&self) -> bool;
    fn layer_header_data(&self) -> Vec<HeaderLayer>;

    fn full_header_data(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for layer in self.layer_header_data() {
            out.extend_from_slice(&layer.data);
        }
        out
    }

    fn total_overhead(&self) -> usize {
        self.layer_header_data().iter().map(HeaderLayer::len).sum()
    }

    fn capacity(&self) -> usize {
        self.block_size().bytes().saturating_sub(self.total_overhead())
    }

    /// Recompute the checksum from `data` and compare against `id_checksum` (spec
    /// §4.C `validateSync`).
    fn validate(&self) -> Result<(), BlockError> {
        if self.data().len() != self.block_size().bytes() {
            return Err(BlockError::InvalidStructure(format!(
                "data length {} does not match block size {}",
                self.data().len(),
                self.block_size().bytes()
            )));
        }
        let recomputed = Checksum::of(self.data());
        if !crate::checksum::constant_time_eq(&recomputed, &self.id_checksum()) {
            return Err(BlockError::ChecksumMismatch);
        }
        Ok(())
    }
}

/// A plain, owner-free block holding exactly `blockSize` bytes with no further
/// framing. The base case most other block variants are built from.
#[derive(Debug, Clone)]
pub struct RawDataBlock {
    pub block_size: BlockSize,
    pub data: Vec<u8>,
    pub id_checksum: Checksum,
    pub date_created: DateTime<Utc>,
}

impl RawDataBlock {
    pub fn new(block_size: BlockSize, data: Vec<u8>) -> Result<Self, BlockError> {
        if data.len() != block_size.bytes() {
            return Err(BlockError::DataLengthExceedsBlockSize {
                max: block_size.bytes(),
                actual: data.len(),
            });
        }
        let id_checksum = Checksum::of(&data);
        Ok(RawDataBlock {
            block_size,
            data,
            id_checksum,
            date_created: Utc::now(),
        })
    }
}

impl BlockOps for RawDataBlock {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn block_type(&self) -> BlockType {
        BlockType::RawData
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

/// Pad `data` on the right with cryptographically random bytes up to `block_size`.
/// Panics if `data` already exceeds `block_size` — callers must check capacity first.
pub fn pad_with_random(mut data: Vec<u8>, block_size: BlockSize) -> Vec<u8> {
    let target = block_size.bytes();
    assert!(data.len() <= target, "data already exceeds block size");
    if data.len() < target {
        let mut fill = vec![0u8; target - data.len()];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut fill);
        data.extend_from_slice(&fill);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_data_block_rejects_wrong_length() {
        let err = RawDataBlock::new(BlockSize::Tiny, vec![0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            BlockError::DataLengthExceedsBlockSize {
                max: BlockSize::Tiny.bytes(),
                actual: 10
            }
        );
    }

    #[test]
    fn raw_data_block_validates_checksum() {
        let block = RawDataBlock::new(BlockSize::Tiny, vec![0x42; BlockSize::Tiny.bytes()]).unwrap();
        assert!(block.validate().is_ok());
    }

    #[test]
    fn capacity_is_block_size_minus_overhead() {
        let block = RawDataBlock::new(BlockSize::Tiny, vec![0u8; BlockSize::Tiny.bytes()]).unwrap();
        assert_eq!(block.total_overhead(), 0);
        assert_eq!(block.capacity(), BlockSize::Tiny.bytes());
    }

    #[test]
    fn pad_with_random_reaches_target_length() {
        let padded = pad_with_random(vec![1, 2, 3], BlockSize::Tiny);
        assert_eq!(padded.len(), BlockSize::Tiny.bytes());
        assert_eq!(&padded[..3], &[1, 2, 3]);
    }
}
