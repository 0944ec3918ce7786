//! Streaming prime-tuple generator (spec §4.F): pulls bytes from a reader and lazily
//! yields one `Tuple` per `blockSize` window, zero-padding the final short block.

use std::io::Read;
use std::sync::Arc;

use crate::block::ephemeral::EphemeralOwnedDataBlock;
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::error::BrightChainError;
use crate::member::MemberId;
use crate::pool::{PoolScope, WhitenerSlot};
use crate::tuple::{Tuple, TupleMember};

/// One generated tuple: the prime-whitened bytes, its companions' checksums and
/// bytes (same order), and the true length of the source window before
/// zero-padding.
pub struct GeneratedTuple {
    pub prime: Vec<u8>,
    pub prime_checksum: Checksum,
    pub companions: Vec<Checksum>,
    pub companion_bytes: Vec<Vec<u8>>,
    pub length_before_padding: u64,
}

/// Pull-driven transform from a byte stream into a lazy sequence of tuples. Each
/// `next()` call either borrows exactly the companions it needs and folds them in
/// the same step, or returns already-borrowed blocks before propagating an error —
/// there is no partial-borrow state left between calls, so dropping the generator
/// mid-stream never leaks whiteners (spec §4.F "Cancellation").
pub struct PrimeTupleGenerator<R: Read> {
    source: R,
    pool: Arc<PoolScope>,
    block_size: BlockSize,
    random_count: usize,
    whitener_count: usize,
    creator_id: MemberId,
    pool_id: Option<String>,
    finished: bool,
}

impl<R: Read> PrimeTupleGenerator<R> {
    pub fn new(
        source: R,
        pool: Arc<PoolScope>,
        random_count: usize,
        whitener_count: usize,
        creator_id: MemberId,
        pool_id: Option<String>,
    ) -> Self {
        let block_size = pool.block_size;
        PrimeTupleGenerator {
            source,
            pool,
            block_size,
            random_count,
            whitener_count,
            creator_id,
            pool_id,
            finished: false,
        }
    }

    pub fn tuple_size(&self) -> usize {
        self.random_count + self.whitener_count + 1
    }

    fn fill_window(&mut self) -> std::io::Result<(Vec<u8>, bool)> {
        let mut buf = vec![0u8; self.block_size.bytes()];
        let mut filled = 0usize;
        while filled < buf.len() {
            let read = self.source.read(&mut buf[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        let is_final_short = filled < buf.len();
        buf.truncate(filled);
        Ok((buf, is_final_short))
    }
}

impl<R: Read> Iterator for PrimeTupleGenerator<R> {
    type Item = Result<GeneratedTuple, BrightChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let (window, is_final_short) = match self.fill_window() {
            Ok(v) => v,
            Err(e) => {
                self.finished = true;
                return Some(Err(BrightChainError::Block(
                    crate::error::BlockError::InvalidStructure(e.to_string()),
                )));
            }
        };
        if window.is_empty() {
            self.finished = true;
            return None;
        }
        if is_final_short {
            self.finished = true;
        }

        let length_before_padding = window.len() as u64;
        let source =
            match EphemeralOwnedDataBlock::from_payload(self.creator_id, &window, self.block_size) {
                Ok(b) => b,
                Err(e) => return Some(Err(BrightChainError::Block(e))),
            };

        let (randoms, whitener_slots) =
            match self.pool.borrow_companions(self.random_count, self.whitener_count) {
                Ok(v) => v,
                Err(e) => return Some(Err(BrightChainError::Pool(e))),
            };

        let mut members: Vec<Box<dyn TupleMember>> = Vec::with_capacity(self.tuple_size());
        members.push(Box::new(source));
        let mut companion_checksums = Vec::with_capacity(randoms.len() + whitener_slots.len());
        let mut companion_bytes = Vec::with_capacity(randoms.len() + whitener_slots.len());
        for r in randoms {
            companion_checksums.push(crate::block::BlockOps::id_checksum(&r));
            companion_bytes.push(crate::block::BlockOps::data(&r).to_vec());
            members.push(Box::new(r));
        }
        for slot in whitener_slots {
            match slot {
                WhitenerSlot::Whitened(w) => {
                    companion_checksums.push(crate::block::BlockOps::id_checksum(&w));
                    companion_bytes.push(crate::block::BlockOps::data(&w).to_vec());
                    members.push(Box::new(w));
                }
                WhitenerSlot::Fallback(r) => {
                    companion_checksums.push(crate::block::BlockOps::id_checksum(&r));
                    companion_bytes.push(crate::block::BlockOps::data(&r).to_vec());
                    members.push(Box::new(r));
                }
            }
        }

        let tuple = match Tuple::new(members, self.tuple_size(), self.pool_id.clone()) {
            Ok(t) => t,
            Err(e) => return Some(Err(BrightChainError::Tuple(e))),
        };
        let prime = tuple.xor();
        let prime_checksum = Checksum::of(&prime);

        Some(Ok(GeneratedTuple {
            prime,
            prime_checksum,
            companions: companion_checksums,
            companion_bytes,
            length_before_padding,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::random::RandomBlock;
    use crate::block::whitened::WhitenedBlock;

    fn pool_with(randoms: usize, whiteners: usize, block_size: BlockSize) -> Arc<PoolScope> {
        let pool = Arc::new(PoolScope::create("test-pool", block_size));
        for _ in 0..randoms {
            pool.add_random(RandomBlock::generate(block_size, Some("test-pool".into())));
        }
        for _ in 0..whiteners {
            let source = vec![0x10u8; block_size.bytes()];
            let filler = vec![0x20u8; block_size.bytes()];
            let w =
                WhitenedBlock::from_data(&source, &filler, block_size, Some("test-pool".into()))
                    .unwrap();
            pool.add_whitened(w);
        }
        pool
    }

    #[test]
    fn emits_one_tuple_per_full_block() {
        let pool = pool_with(10, 10, BlockSize::Tiny);
        let data = vec![0x7Fu8; BlockSize::Tiny.bytes() * 3];
        let cursor = std::io::Cursor::new(data);
        let generator = PrimeTupleGenerator::new(cursor, pool, 2, 2, [1; 16], Some("test-pool".into()));
        let tuples: Vec<_> = generator.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(tuples.len(), 3);
        for t in &tuples {
            assert_eq!(t.companions.len(), 4);
            assert_eq!(t.length_before_padding, BlockSize::Tiny.bytes() as u64);
        }
    }

    #[test]
    fn final_short_block_is_padded_but_length_recorded() {
        let pool = pool_with(10, 10, BlockSize::Tiny);
        let short_len = BlockSize::Tiny.bytes() / 2;
        let data = vec![0x11u8; short_len];
        let cursor = std::io::Cursor::new(data);
        let generator = PrimeTupleGenerator::new(cursor, pool, 1, 1, [2; 16], Some("test-pool".into()));
        let tuples: Vec<_> = generator.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].length_before_padding, short_len as u64);
    }

    #[test]
    fn exhausted_random_pool_errors_on_first_pull() {
        let pool = pool_with(1, 10, BlockSize::Tiny);
        let data = vec![0x33u8; BlockSize::Tiny.bytes() * 2];
        let cursor = std::io::Cursor::new(data);
        let mut generator =
            PrimeTupleGenerator::new(cursor, pool, 2, 0, [3; 16], Some("test-pool".into()));
        let first = generator.next();
        assert!(first.unwrap().is_err());
    }

    #[test]
    fn falls_back_to_random_when_whitener_pool_empty() {
        let pool = pool_with(10, 0, BlockSize::Tiny);
        let data = vec![0x44u8; BlockSize::Tiny.bytes()];
        let cursor = std::io::Cursor::new(data);
        let generator = PrimeTupleGenerator::new(cursor, pool, 1, 2, [4; 16], Some("test-pool".into()));
        let tuples: Vec<_> = generator.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].companions.len(), 3);
    }
}
