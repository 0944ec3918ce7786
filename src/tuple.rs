//! Tuple primitive (spec §4.E): a fixed-size group `{prime, randoms…, whiteners…}`
//! whose XOR fold recovers (or produces) the original source block.

use crate::block::ephemeral::EphemeralOwnedDataBlock;
use crate::block::random::RandomBlock;
use crate::block::whitened::WhitenedBlock;
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::error::TupleError;
use crate::xor;

/// Minimal surface a block needs to participate in a tuple: its bytes, its block
/// size, and (optionally) the pool it was borrowed from.
pub trait TupleMember {
    fn data(&self) -> &[u8];
    fn block_size(&self) -> BlockSize;
    fn pool_id(&self) -> Option<&str>;
    fn id_checksum(&self) -> Checksum {
        Checksum::of(self.data())
    }
}

impl TupleMember for EphemeralOwnedDataBlock {
    fn data(&self) -> &[u8] {
        crate::block::BlockOps::data(self)
    }
    fn block_size(&self) -> BlockSize {
        crate::block::BlockOps::block_size(self)
    }
    fn pool_id(&self) -> Option<&str> {
        None
    }
}

impl TupleMember for RandomBlock {
    fn data(&self) -> &[u8] {
        crate::block::BlockOps::data(self)
    }
    fn block_size(&self) -> BlockSize {
        crate::block::BlockOps::block_size(self)
    }
    fn pool_id(&self) -> Option<&str> {
        self.pool_id.as_deref()
    }
}

impl TupleMember for WhitenedBlock {
    fn data(&self) -> &[u8] {
        crate::block::BlockOps::data(self)
    }
    fn block_size(&self) -> BlockSize {
        crate::block::BlockOps::block_size(self)
    }
    fn pool_id(&self) -> Option<&str> {
        self.pool_id.as_deref()
    }
}

/// A fixed-size group of blocks. `blocks[0]` is the prime (the one whose checksum a
/// CBL records); the rest are its companions in the fixed XOR order.
pub struct Tuple {
    blocks: Vec<Box<dyn TupleMember>>,
    pub pool_id: Option<String>,
}

impl Tuple {
    /// Build a tuple, enforcing the three construction rules in spec §4.E order.
    pub fn new(
        blocks: Vec<Box<dyn TupleMember>>,
        tuple_size: usize,
        pool_id: Option<String>,
    ) -> Result<Self, TupleError> {
        if blocks.len() != tuple_size {
            return Err(TupleError::InvalidTupleCount {
                expected: tuple_size,
                actual: blocks.len(),
            });
        }
        let expected_size = blocks[0].block_size();
        if blocks.iter().any(|b| b.block_size() != expected_size) {
            return Err(TupleError::BlockSizeMismatch);
        }
        if let Some(ref id) = pool_id {
            if blocks.iter().any(|b| b.pool_id() != Some(id.as_str())) {
                return Err(TupleError::PoolIdMismatch);
            }
        }
        Ok(Tuple { blocks, pool_id })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Fold every block's bytes with XOR, left to right: `source ⊕ randoms ⊕
    /// whiteners` (spec §4.E `xor()`).
    pub fn xor(&self) -> Vec<u8> {
        let slices: Vec<&[u8]> = self.blocks.iter().map(|b| b.data()).collect();
        xor::xor_multiple(slices).expect("tuple construction already enforced equal lengths")
    }

    pub fn prime_checksum(&self) -> Checksum {
        self.blocks[0].id_checksum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random(block_size: BlockSize, pool_id: Option<&str>) -> Box<dyn TupleMember> {
        Box::new(RandomBlock::generate(block_size, pool_id.map(str::to_string)))
    }

    #[test]
    fn construction_enforces_tuple_size() {
        let blocks = vec![random(BlockSize::Tiny, None), random(BlockSize::Tiny, None)];
        let err = Tuple::new(blocks, 3, None).unwrap_err();
        assert_eq!(
            err,
            TupleError::InvalidTupleCount {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn construction_enforces_block_size_uniformity() {
        let blocks = vec![random(BlockSize::Tiny, None), random(BlockSize::Small, None)];
        assert_eq!(Tuple::new(blocks, 2, None).unwrap_err(), TupleError::BlockSizeMismatch);
    }

    #[test]
    fn construction_enforces_pool_id_match() {
        let blocks = vec![
            random(BlockSize::Tiny, Some("alpha")),
            random(BlockSize::Tiny, Some("beta")),
        ];
        let err = Tuple::new(blocks, 2, Some("alpha".into())).unwrap_err();
        assert_eq!(err, TupleError::PoolIdMismatch);
    }

    #[test]
    fn legacy_mode_accepts_mixed_pools() {
        let blocks = vec![
            random(BlockSize::Tiny, Some("alpha")),
            random(BlockSize::Tiny, Some("beta")),
        ];
        assert!(Tuple::new(blocks, 2, None).is_ok());
    }

    #[test]
    fn xor_is_deterministic_left_to_right() {
        let a: Box<dyn TupleMember> = Box::new(RandomBlock::from_bytes(
            BlockSize::Tiny,
            vec![0x01; BlockSize::Tiny.bytes()],
            None,
        ));
        let b: Box<dyn TupleMember> = Box::new(RandomBlock::from_bytes(
            BlockSize::Tiny,
            vec![0x02; BlockSize::Tiny.bytes()],
            None,
        ));
        let tuple = Tuple::new(vec![a, b], 2, None).unwrap();
        assert_eq!(tuple.xor(), vec![0x03; BlockSize::Tiny.bytes()]);
    }
}
