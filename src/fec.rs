//! FEC façade (spec §4.I): thin wrapper over Reed–Solomon erasure coding. The core
//! only checks preconditions and shapes shards; the actual math is external.

use reed_solomon_erasure::galois_8::ReedSolomon;

use crate::error::FecError;

/// Encode `data` (exactly `shard_size * data_shards` bytes) into `parity_shards`
/// parity shards of `shard_size` bytes each. When `parity_only` is set, only the
/// parity shards are returned; otherwise data and parity shards are concatenated.
pub fn encode(
    data: &[u8],
    shard_size: usize,
    data_shards: usize,
    parity_shards: usize,
    parity_only: bool,
    max_shard_size: usize,
) -> Result<Vec<u8>, FecError> {
    check_preconditions(data_shards, parity_shards, shard_size, max_shard_size)?;
    if data.len() != shard_size * data_shards {
        return Err(FecError::InvalidDataLength);
    }

    let rs = ReedSolomon::new(data_shards, parity_shards).map_err(|_| FecError::FecEncodingFailed)?;
    let mut shards: Vec<Vec<u8>> = data.chunks(shard_size).map(|c| c.to_vec()).collect();
    shards.extend((0..parity_shards).map(|_| vec![0u8; shard_size]));

    rs.encode(&mut shards).map_err(|_| FecError::FecEncodingFailed)?;

    let mut out = Vec::new();
    if parity_only {
        for shard in shards.into_iter().skip(data_shards) {
            out.extend_from_slice(&shard);
        }
    } else {
        for shard in shards {
            out.extend_from_slice(&shard);
        }
    }
    Ok(out)
}

/// Reconstruct the original `data_shards * shard_size` bytes from `interleaved`
/// (`data_shards + parity_shards` shards of `shard_size` bytes, data shards first),
/// given which shards are present per `availability`.
pub fn decode(
    interleaved: &[u8],
    shard_size: usize,
    data_shards: usize,
    parity_shards: usize,
    availability: &[bool],
    max_shard_size: usize,
) -> Result<Vec<u8>, FecError> {
    check_preconditions(data_shards, parity_shards, shard_size, max_shard_size)?;
    let total_shards = data_shards + parity_shards;
    if availability.len() != total_shards {
        return Err(FecError::InvalidDataLength);
    }
    if availability.iter().filter(|&&present| present).count() < data_shards {
        return Err(FecError::NotEnoughShardsAvailable);
    }
    if interleaved.len() != shard_size * total_shards {
        return Err(FecError::InvalidDataLength);
    }

    let rs = ReedSolomon::new(data_shards, parity_shards).map_err(|_| FecError::FecDecodingFailed)?;
    let mut shards: Vec<Option<Vec<u8>>> = interleaved
        .chunks(shard_size)
        .zip(availability.iter())
        .map(|(chunk, &present)| if present { Some(chunk.to_vec()) } else { None })
        .collect();

    rs.reconstruct(&mut shards).map_err(|_| FecError::FecDecodingFailed)?;

    let mut out = Vec::with_capacity(shard_size * data_shards);
    for shard in shards.into_iter().take(data_shards) {
        out.extend_from_slice(&shard.ok_or(FecError::FecDecodingFailed)?);
    }
    Ok(out)
}

fn check_preconditions(
    data_shards: usize,
    parity_shards: usize,
    shard_size: usize,
    max_shard_size: usize,
) -> Result<(), FecError> {
    if data_shards == 0 || parity_shards == 0 {
        return Err(FecError::DataRequired);
    }
    if shard_size == 0 {
        return Err(FecError::DataRequired);
    }
    if shard_size > max_shard_size {
        return Err(FecError::ShardSizeExceedsMaximum);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_SHARD_SIZE: usize = 16 * 1024 * 1024;

    #[test]
    fn encode_then_decode_with_two_missing_data_shards_recovers() {
        let shard_size = 1024;
        let data: Vec<u8> = (0..(shard_size * 4)).map(|i| (i % 251) as u8).collect();
        let encoded = encode(&data, shard_size, 4, 2, false, MAX_SHARD_SIZE).unwrap();

        let mut availability = vec![true; 6];
        availability[0] = false;
        availability[1] = false;

        let recovered = decode(&encoded, shard_size, 4, 2, &availability, MAX_SHARD_SIZE).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn decode_fails_when_three_of_six_shards_missing() {
        let shard_size = 1024;
        let data: Vec<u8> = vec![0x5A; shard_size * 4];
        let encoded = encode(&data, shard_size, 4, 2, false, MAX_SHARD_SIZE).unwrap();

        let mut availability = vec![true; 6];
        availability[0] = false;
        availability[1] = false;
        availability[2] = false;

        let err = decode(&encoded, shard_size, 4, 2, &availability, MAX_SHARD_SIZE).unwrap_err();
        assert_eq!(err, FecError::NotEnoughShardsAvailable);
    }

    #[test]
    fn encode_rejects_shard_size_over_maximum() {
        let data = vec![0u8; 16];
        let err = encode(&data, 8, 2, 1, false, 4).unwrap_err();
        assert_eq!(err, FecError::ShardSizeExceedsMaximum);
    }

    #[test]
    fn encode_rejects_mismatched_data_length() {
        let data = vec![0u8; 10];
        let err = encode(&data, 8, 2, 1, false, MAX_SHARD_SIZE).unwrap_err();
        assert_eq!(err, FecError::InvalidDataLength);
    }

    #[test]
    fn parity_only_returns_just_parity_shards() {
        let shard_size = 64;
        let data = vec![0x11u8; shard_size * 2];
        let parity = encode(&data, shard_size, 2, 2, true, MAX_SHARD_SIZE).unwrap();
        assert_eq!(parity.len(), shard_size * 2);
    }
}
