//! Whitening pool (`PoolScope`, spec §4.D): a process-local, mutex-guarded FIFO of
//! random and whitened blocks from which tuples borrow their companions.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::block::random::RandomBlock;
use crate::block::whitened::WhitenedBlock;
use crate::block::BlockOps;
use crate::block_size::BlockSize;
use crate::checksum::Checksum;
use crate::error::PoolError;

struct PoolState {
    randoms: VecDeque<RandomBlock>,
    whiteners: VecDeque<WhitenedBlock>,
    /// Checksums of whiteners currently checked out, so `return_whitener` can reject
    /// blocks that didn't come from this pool (spec §4.D invariant 1).
    borrowed_whiteners: HashSet<Checksum>,
}

/// Distinguishes whether a whitener slot ended up holding a real `WhitenedBlock` or
/// the fallback `RandomBlock` used when the whitener pool runs dry (spec §4.F step 4).
pub enum WhitenerSlot {
    Whitened(WhitenedBlock),
    Fallback(RandomBlock),
}

/// A named, size-scoped pool of random/whitener blocks (spec §4.D). Borrow and
/// return are serialized through a single mutex; ordering doesn't affect
/// correctness because the contents are uniformly random.
pub struct PoolScope {
    pub pool_id: String,
    pub block_size: BlockSize,
    state: Mutex<PoolState>,
}

impl PoolScope {
    pub fn create(pool_id: impl Into<String>, block_size: BlockSize) -> Self {
        PoolScope {
            pool_id: pool_id.into(),
            block_size,
            state: Mutex::new(PoolState {
                randoms: VecDeque::new(),
                whiteners: VecDeque::new(),
                borrowed_whiteners: HashSet::new(),
            }),
        }
    }

    pub fn add_random(&self, block: RandomBlock) {
        assert_eq!(
            block.block_size(),
            self.block_size,
            "random block size does not match pool block size"
        );
        self.state.lock().unwrap().randoms.push_back(block);
    }

    pub fn add_whitened(&self, block: WhitenedBlock) {
        assert_eq!(
            block.block_size(),
            self.block_size,
            "whitened block size does not match pool block size"
        );
        self.state.lock().unwrap().whiteners.push_back(block);
    }

    pub fn borrow_random(&self) -> Result<RandomBlock, PoolError> {
        self.state
            .lock()
            .unwrap()
            .randoms
            .pop_front()
            .ok_or(PoolError::FailedToGetRandomBlock)
    }

    /// `None` is a legal outcome: the caller falls back to an extra random block
    /// (spec §4.F step 4).
    pub fn borrow_whitener(&self) -> Option<WhitenedBlock> {
        let mut state = self.state.lock().unwrap();
        let block = state.whiteners.pop_front()?;
        state.borrowed_whiteners.insert(block.id_checksum());
        Some(block)
    }

    pub fn return_whitener(&self, block: WhitenedBlock) -> Result<(), PoolError> {
        let mut state = self.state.lock().unwrap();
        if !state.borrowed_whiteners.remove(&block.id_checksum()) {
            return Err(PoolError::BorrowedFromDifferentPool);
        }
        state.whiteners.push_back(block);
        Ok(())
    }

    /// Random non-repeating sample of whitener checksums currently in the pool, used
    /// by tests and backward-compatible lookup paths (spec §4.D).
    pub fn random_whitener_checksums(&self, n: usize) -> Vec<Checksum> {
        let state = self.state.lock().unwrap();
        state
            .whiteners
            .iter()
            .take(n)
            .map(|b| b.id_checksum())
            .collect()
    }

    pub fn random_count(&self) -> usize {
        self.state.lock().unwrap().randoms.len()
    }

    pub fn whitener_count(&self) -> usize {
        self.state.lock().unwrap().whiteners.len()
    }

    /// Borrow `random_count` random blocks and `whitener_count` whitener slots,
    /// falling back to an extra random block per empty whitener slot (spec §4.F step
    /// 4). On any failure, everything already borrowed this call is returned before
    /// the error propagates — used by both the streaming generator and the tuple
    /// service's CBL self-whitening step.
    pub fn borrow_companions(
        &self,
        random_count: usize,
        whitener_count: usize,
    ) -> Result<(Vec<RandomBlock>, Vec<WhitenerSlot>), PoolError> {
        let mut randoms = Vec::with_capacity(random_count);
        for _ in 0..random_count {
            match self.borrow_random() {
                Ok(block) => randoms.push(block),
                Err(e) => {
                    for block in randoms {
                        self.add_random(block);
                    }
                    return Err(e);
                }
            }
        }

        let mut whitener_slots = Vec::with_capacity(whitener_count);
        for _ in 0..whitener_count {
            if let Some(whitened) = self.borrow_whitener() {
                whitener_slots.push(WhitenerSlot::Whitened(whitened));
            } else {
                match self.borrow_random() {
                    Ok(block) => whitener_slots.push(WhitenerSlot::Fallback(block)),
                    Err(_) => {
                        for block in randoms {
                            self.add_random(block);
                        }
                        for slot in whitener_slots {
                            if let WhitenerSlot::Whitened(w) = slot {
                                let _ = self.return_whitener(w);
                            }
                        }
                        return Err(PoolError::FailedToGetWhiteningBlock);
                    }
                }
            }
        }

        Ok((randoms, whitener_slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_pool(randoms: usize, whiteners: usize) -> PoolScope {
        let pool = PoolScope::create("alpha", BlockSize::Tiny);
        for _ in 0..randoms {
            pool.add_random(RandomBlock::generate(BlockSize::Tiny, Some("alpha".into())));
        }
        for _ in 0..whiteners {
            let source = vec![0x11u8; BlockSize::Tiny.bytes()];
            let filler = vec![0x22u8; BlockSize::Tiny.bytes()];
            let whitened =
                WhitenedBlock::from_data(&source, &filler, BlockSize::Tiny, Some("alpha".into()))
                    .unwrap();
            pool.add_whitened(whitened);
        }
        pool
    }

    #[test]
    fn borrow_random_drains_pool_then_errors() {
        let pool = filled_pool(1, 0);
        assert!(pool.borrow_random().is_ok());
        assert_eq!(pool.borrow_random().unwrap_err(), PoolError::FailedToGetRandomBlock);
    }

    #[test]
    fn borrow_whitener_returns_none_when_empty() {
        let pool = filled_pool(0, 0);
        assert!(pool.borrow_whitener().is_none());
    }

    #[test]
    fn returned_whitener_is_available_again() {
        let pool = filled_pool(0, 1);
        let block = pool.borrow_whitener().unwrap();
        assert_eq!(pool.whitener_count(), 0);
        pool.return_whitener(block).unwrap();
        assert_eq!(pool.whitener_count(), 1);
    }

    #[test]
    fn return_whitener_rejects_foreign_block() {
        let pool = filled_pool(0, 0);
        let source = vec![0x33u8; BlockSize::Tiny.bytes()];
        let filler = vec![0x44u8; BlockSize::Tiny.bytes()];
        let foreign = WhitenedBlock::from_data(&source, &filler, BlockSize::Tiny, None).unwrap();
        assert_eq!(
            pool.return_whitener(foreign).unwrap_err(),
            PoolError::BorrowedFromDifferentPool
        );
    }

    #[test]
    #[should_panic(expected = "random block size does not match pool block size")]
    fn add_random_panics_on_size_mismatch() {
        let pool = PoolScope::create("alpha", BlockSize::Tiny);
        pool.add_random(RandomBlock::generate(BlockSize::Small, None));
    }
}
