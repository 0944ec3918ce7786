//! High-level tuple service (spec §4.H): the public compose/decompose API built on
//! top of the streaming generator, the pool, and the CBL codec.

use std::io::Read;
use std::sync::Arc;

use chrono::Utc;

use crate::block::cbl::{ConstituentBlockList, ExtendedMetadata};
use crate::cbl_codec;
use crate::checksum::Checksum;
use crate::error::{BrightChainError, CblError, TupleError};
use crate::generator::PrimeTupleGenerator;
use crate::member::Member;
use crate::pool::PoolScope;
use crate::store::BlockStore;
use crate::xor;

/// Clamp a sizing heuristic for how many random blocks a stream of `data_length`
/// bytes should draw from the pool (spec §4.H `getRandomBlockCount`). Not
/// security-critical — purely a capacity hint.
pub fn get_random_block_count(data_length: u64, min_random_blocks: usize, max_random_blocks: usize) -> usize {
    let estimate = ((data_length + 1023) / 1024).max(1) as usize;
    estimate.clamp(min_random_blocks, max_random_blocks)
}

/// XOR a source block against its companions to produce the prime-whitened block
/// (spec §4.H `makeTupleFromSourceXor`). All slices must be the same length.
pub fn make_tuple_from_source_xor(
    source: &[u8],
    companions: &[&[u8]],
) -> Result<Vec<u8>, TupleError> {
    let mut all: Vec<&[u8]> = Vec::with_capacity(companions.len() + 1);
    all.push(source);
    all.extend_from_slice(companions);
    xor::xor_multiple(all).map_err(|_| TupleError::BlockSizeMismatch)
}

/// Recover the source block from a prime-whitened block and its companions, then
/// trim to `length_before_encryption` (spec §4.H `xorPrimeWhitenedToOwned`). Fails
/// `MissingParameters` when the caller can't supply the original length for what
/// might be a zero-padded final block.
pub fn xor_prime_whitened_to_owned(
    prime: &[u8],
    companions: &[&[u8]],
    length_before_encryption: Option<u64>,
) -> Result<Vec<u8>, BrightChainError> {
    let mut all: Vec<&[u8]> = Vec::with_capacity(companions.len() + 1);
    all.push(prime);
    all.extend_from_slice(companions);
    let recovered = xor::xor_multiple(all).map_err(|_| BrightChainError::Tuple(TupleError::BlockSizeMismatch))?;
    match length_before_encryption {
        Some(len) => {
            let len = len as usize;
            if len > recovered.len() {
                return Err(BrightChainError::Cbl(CblError::MissingParameters));
            }
            Ok(recovered[..len].to_vec())
        }
        None => Ok(recovered),
    }
}

/// Stream `source` into prime-whitened tuples and persist each to `store`, then
/// build (but do not yet whiten) the signed CBL indexing them.
fn stream_tuples_and_build_cbl<R: Read>(
    creator: &dyn Member,
    pool: Arc<PoolScope>,
    store: &dyn BlockStore,
    source: R,
    source_length: u64,
    random_count: usize,
    whitener_count: usize,
    pool_id: Option<String>,
    extended: Option<ExtendedMetadata>,
) -> Result<ConstituentBlockList, BrightChainError> {
    let block_size = pool.block_size;
    let creator_id = creator.id();
    let generator = PrimeTupleGenerator::new(
        source,
        pool,
        random_count,
        whitener_count,
        creator_id,
        pool_id,
    );

    let mut addresses = Vec::new();
    for tuple in generator {
        let tuple = tuple?;
        for (checksum, bytes) in tuple.companions.iter().zip(tuple.companion_bytes.into_iter()) {
            store.put(*checksum, bytes);
        }
        store.put(tuple.prime_checksum, tuple.prime);
        store.put_tuple(tuple.prime_checksum, tuple.companions);
        addresses.push(tuple.prime_checksum);
    }

    let tuple_size = (random_count + whitener_count + 1) as u8;
    cbl_codec::encode_cbl(
        creator,
        block_size,
        Utc::now(),
        source_length,
        tuple_size,
        &addresses,
        extended,
    )
    .map_err(BrightChainError::Cbl)
}

/// Stream `source` into plaintext prime-whitened tuples, persist each to `store`,
/// and build the signed CBL indexing them. The CBL block itself is whitened with a
/// fresh companion set and persisted under its own prime checksum, which is
/// returned alongside the decoded CBL as the caller's root handle.
pub fn data_stream_to_plaintext_tuples_and_cbl<R: Read>(
    creator: &dyn Member,
    pool: Arc<PoolScope>,
    store: &dyn BlockStore,
    source: R,
    source_length: u64,
    random_count: usize,
    whitener_count: usize,
    pool_id: Option<String>,
    extended: Option<ExtendedMetadata>,
) -> Result<(ConstituentBlockList, Checksum), BrightChainError> {
    let cbl = stream_tuples_and_build_cbl(
        creator,
        pool.clone(),
        store,
        source,
        source_length,
        random_count,
        whitener_count,
        pool_id,
        extended,
    )?;

    let cbl_prime_checksum = whiten_and_persist(&pool, store, &cbl.encoded, random_count, whitener_count)?;

    Ok((cbl, cbl_prime_checksum))
}

/// Same as [`data_stream_to_plaintext_tuples_and_cbl`], but the CBL block is ECIES-
/// sealed for `recipient_public_key` before it is whitened (spec §4.H
/// `dataStreamToEncryptedTuplesAndCBL`).
pub fn data_stream_to_encrypted_tuples_and_cbl<R: Read>(
    creator: &dyn Member,
    recipient_public_key: &[u8; 65],
    pool: Arc<PoolScope>,
    store: &dyn BlockStore,
    source: R,
    source_length: u64,
    random_count: usize,
    whitener_count: usize,
    pool_id: Option<String>,
    extended: Option<ExtendedMetadata>,
) -> Result<(ConstituentBlockList, Checksum), BrightChainError> {
    let cbl = stream_tuples_and_build_cbl(
        creator,
        pool.clone(),
        store,
        source,
        source_length,
        random_count,
        whitener_count,
        pool_id,
        extended,
    )?;

    let sealed = crate::encryption::ecies_encrypt(recipient_public_key, &cbl.encoded)
        .map_err(BrightChainError::Encryption)?;
    if sealed.len() > pool.block_size.bytes() {
        return Err(BrightChainError::Block(crate::error::BlockError::DataLengthExceedsBlockSize {
            max: pool.block_size.bytes(),
            actual: sealed.len(),
        }));
    }
    let sealed = crate::block::pad_with_random(sealed, pool.block_size);
    let cbl_prime_checksum = whiten_and_persist(&pool, store, &sealed, random_count, whitener_count)?;

    Ok((cbl, cbl_prime_checksum))
}

fn whiten_and_persist(
    pool: &PoolScope,
    store: &dyn BlockStore,
    data: &[u8],
    random_count: usize,
    whitener_count: usize,
) -> Result<Checksum, BrightChainError> {
    let (randoms, whitener_slots) = pool
        .borrow_companions(random_count, whitener_count)
        .map_err(BrightChainError::Pool)?;

    let mut companion_bytes: Vec<Vec<u8>> = randoms
        .iter()
        .map(|r| crate::block::BlockOps::data(r).to_vec())
        .collect();
    let mut companion_checksums: Vec<Checksum> = randoms
        .iter()
        .map(crate::block::BlockOps::id_checksum)
        .collect();
    for slot in &whitener_slots {
        match slot {
            crate::pool::WhitenerSlot::Whitened(w) => {
                companion_bytes.push(crate::block::BlockOps::data(w).to_vec());
                companion_checksums.push(crate::block::BlockOps::id_checksum(w));
            }
            crate::pool::WhitenerSlot::Fallback(r) => {
                companion_bytes.push(crate::block::BlockOps::data(r).to_vec());
                companion_checksums.push(crate::block::BlockOps::id_checksum(r));
            }
        }
    }

    let refs: Vec<&[u8]> = companion_bytes.iter().map(Vec::as_slice).collect();
    let prime = make_tuple_from_source_xor(data, &refs).map_err(BrightChainError::Tuple)?;
    let prime_checksum = Checksum::of(&prime);

    for (checksum, bytes) in companion_checksums.iter().zip(companion_bytes.into_iter()) {
        store.put(*checksum, bytes);
    }
    store.put(prime_checksum, prime);
    store.put_tuple(prime_checksum, companion_checksums);

    Ok(prime_checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_size::BlockSize;
    use crate::member::LocalMember;
    use crate::store::InMemoryBlockStore;
    use secp256k1::SecretKey;

    fn member() -> LocalMember {
        LocalMember::generate([5; 16], SecretKey::from_slice(&[0x22; 32]).unwrap())
    }

    fn filled_pool(block_size: BlockSize, randoms: usize, whiteners: usize) -> Arc<PoolScope> {
        let pool = Arc::new(PoolScope::create("svc-pool", block_size));
        for _ in 0..randoms {
            pool.add_random(crate::block::random::RandomBlock::generate(
                block_size,
                Some("svc-pool".into()),
            ));
        }
        for _ in 0..whiteners {
            let source = vec![0x77u8; block_size.bytes()];
            let filler = vec![0x88u8; block_size.bytes()];
            let w = crate::block::whitened::WhitenedBlock::from_data(
                &source,
                &filler,
                block_size,
                Some("svc-pool".into()),
            )
            .unwrap();
            pool.add_whitened(w);
        }
        pool
    }

    #[test]
    fn round_trip_small_input_through_cbl() {
        let creator = member();
        let block_size = BlockSize::Small;
        let pool = filled_pool(block_size, 64, 64);
        let store = InMemoryBlockStore::new();

        let payload = vec![0x42u8; 12_288];
        let (cbl, _root) = data_stream_to_plaintext_tuples_and_cbl(
            &creator,
            pool.clone(),
            &store,
            std::io::Cursor::new(payload.clone()),
            payload.len() as u64,
            2,
            2,
            Some("svc-pool".into()),
            None,
        )
        .unwrap();

        assert_eq!(cbl.address_count(), 3);
        assert_eq!(cbl.original_data_length, 12_288);
        assert!(cbl_codec::validate_signature(&cbl, &creator.public_key()).unwrap());

        let mut recovered = Vec::new();
        for prime_checksum in &cbl.addresses {
            let prime = store.require(prime_checksum).unwrap();
            let companion_checksums = store.get_companions(prime_checksum).unwrap();
            let companion_bytes: Vec<Vec<u8>> = companion_checksums
                .iter()
                .map(|c| store.require(c).unwrap())
                .collect();
            let refs: Vec<&[u8]> = companion_bytes.iter().map(Vec::as_slice).collect();
            recovered.extend_from_slice(&xor_prime_whitened_to_owned(&prime, &refs, None).unwrap());
        }
        recovered.truncate(cbl.original_data_length as usize);
        assert_eq!(recovered, payload);
    }

    #[test]
    fn random_block_count_clamps_to_bounds() {
        assert_eq!(get_random_block_count(0, 2, 128), 2);
        assert_eq!(get_random_block_count(1_000_000, 2, 128), 128);
        assert_eq!(get_random_block_count(10_240, 2, 128), 10);
    }

    #[test]
    fn xor_prime_whitened_to_owned_trims_to_recorded_length() {
        let block_size = BlockSize::Tiny.bytes();
        let source = vec![0x10u8; block_size];
        let companion = vec![0x20u8; block_size];
        let prime = make_tuple_from_source_xor(&source, &[&companion]).unwrap();
        let recovered =
            xor_prime_whitened_to_owned(&prime, &[&companion], Some(5)).unwrap();
        assert_eq!(recovered, source[..5].to_vec());
    }
}
