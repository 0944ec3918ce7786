//! `BlockStore` collaborator (spec §6, §3 Open Question 1): persists blocks keyed by
//! checksum and, resolving the open question on companion storage, persists the
//! `prime → companions[]` mapping explicitly rather than widening the CBL wire
//! format to carry every tuple member's checksum.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::checksum::Checksum;
use crate::error::BlockError;

pub trait BlockStore {
    fn get(&self, checksum: &Checksum) -> Option<Vec<u8>>;
    fn put(&self, checksum: Checksum, data: Vec<u8>);

    /// Record which companion checksums complete the tuple for `prime`, in the fixed
    /// XOR order `randoms ⊕ whiteners` (the source is never stored, spec §3).
    fn put_tuple(&self, prime: Checksum, companions: Vec<Checksum>);
    fn get_companions(&self, prime: &Checksum) -> Option<Vec<Checksum>>;

    /// `n` random-block checksums, used by legacy callers and tests (spec §6
    /// `BlockStore.getRandomBlocks`).
    fn get_random_checksums(&self, n: usize) -> Vec<Checksum>;
}

/// Reference `BlockStore` backed by in-process hash maps. Not a substitute for a
/// real disk-backed store (out of scope, spec §1); used by tests and the CLI.
#[derive(Default)]
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Checksum, Vec<u8>>>,
    tuples: RwLock<HashMap<Checksum, Vec<Checksum>>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        InMemoryBlockStore {
            blocks: RwLock::new(HashMap::new()),
            tuples: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn require(&self, checksum: &Checksum) -> Result<Vec<u8>, BlockError> {
        self.get(checksum).ok_or(BlockError::NotReadable)
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, checksum: &Checksum) -> Option<Vec<u8>> {
        self.blocks.read().unwrap().get(checksum).cloned()
    }

    fn put(&self, checksum: Checksum, data: Vec<u8>) {
        self.blocks.write().unwrap().insert(checksum, data);
    }

    fn put_tuple(&self, prime: Checksum, companions: Vec<Checksum>) {
        self.tuples.write().unwrap().insert(prime, companions);
    }

    fn get_companions(&self, prime: &Checksum) -> Option<Vec<Checksum>> {
        self.tuples.read().unwrap().get(prime).cloned()
    }

    fn get_random_checksums(&self, n: usize) -> Vec<Checksum> {
        self.blocks.read().unwrap().keys().take(n).copied().collect()
    }
}
