//! Crate-wide error taxonomy (spec §7).
//!
//! Each subsystem gets its own plain enum with a manual `Display` and
//! `std::error::Error` impl, the same shape as the teacher's `ChainstateError` —
//! this crate does not pull in `thiserror`.

use std::fmt;

use crate::xor::XorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    NotReadable,
    NotPersistable,
    DataLengthExceedsBlockSize { max: usize, actual: usize },
    ChecksumMismatch,
    InvalidStructure(String),
    CreatorIdMismatch,
    InvalidSignature,
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::NotReadable => write!(f, "block is not readable"),
            BlockError::NotPersistable => write!(f, "block is not persistable"),
            BlockError::DataLengthExceedsBlockSize { max, actual } => write!(
                f,
                "data length {actual} exceeds block capacity {max}"
            ),
            BlockError::ChecksumMismatch => write!(f, "checksum mismatch"),
            BlockError::InvalidStructure(s) => write!(f, "invalid block structure: {s}"),
            BlockError::CreatorIdMismatch => write!(f, "creator id mismatch"),
            BlockError::InvalidSignature => write!(f, "invalid signature"),
        }
    }
}

impl std::error::Error for BlockError {}

impl BlockError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            BlockError::NotReadable => "error.block.not_readable",
            BlockError::NotPersistable => "error.block.not_persistable",
            BlockError::DataLengthExceedsBlockSize { .. } => {
                "error.block.data_length_exceeds_block_size"
            }
            BlockError::ChecksumMismatch => "error.block.checksum_mismatch",
            BlockError::InvalidStructure(_) => "error.block.invalid_structure",
            BlockError::CreatorIdMismatch => "error.block.creator_id_mismatch",
            BlockError::InvalidSignature => "error.block.invalid_signature",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    FailedToGetRandomBlock,
    FailedToGetWhiteningBlock,
    BlockSizeMismatch,
    BorrowedFromDifferentPool,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::FailedToGetRandomBlock => write!(f, "pool has no random block available"),
            PoolError::FailedToGetWhiteningBlock => {
                write!(f, "pool has no whitening block available")
            }
            PoolError::BlockSizeMismatch => write!(f, "block size does not match pool block size"),
            PoolError::BorrowedFromDifferentPool => {
                write!(f, "block was not borrowed from this pool")
            }
        }
    }
}

impl std::error::Error for PoolError {}

impl PoolError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            PoolError::FailedToGetRandomBlock => "error.pool.failed_to_get_random_block",
            PoolError::FailedToGetWhiteningBlock => "error.pool.failed_to_get_whitening_block",
            PoolError::BlockSizeMismatch => "error.pool.block_size_mismatch",
            PoolError::BorrowedFromDifferentPool => "error.pool.borrowed_from_different_pool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleError {
    InvalidTupleCount { expected: usize, actual: usize },
    BlockSizeMismatch,
    PoolIdMismatch,
}

impl fmt::Display for TupleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleError::InvalidTupleCount { expected, actual } => write!(
                f,
                "tuple has {actual} blocks, expected {expected}"
            ),
            TupleError::BlockSizeMismatch => write!(f, "tuple blocks have mismatched block sizes"),
            TupleError::PoolIdMismatch => write!(f, "tuple blocks have mismatched pool ids"),
        }
    }
}

impl std::error::Error for TupleError {}

impl TupleError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            TupleError::InvalidTupleCount { .. } => "error.tuple.invalid_tuple_count",
            TupleError::BlockSizeMismatch => "error.tuple.block_size_mismatch",
            TupleError::PoolIdMismatch => "error.tuple.pool_id_mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CblError {
    InvalidStructure(String),
    ChecksumMismatch,
    InvalidSignature,
    MissingParameters,
}

impl fmt::Display for CblError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CblError::InvalidStructure(s) => write!(f, "invalid CBL structure: {s}"),
            CblError::ChecksumMismatch => write!(f, "CBL checksum mismatch"),
            CblError::InvalidSignature => write!(f, "CBL signature invalid"),
            CblError::MissingParameters => write!(f, "missing required CBL parameters"),
        }
    }
}

impl std::error::Error for CblError {}

impl CblError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            CblError::InvalidStructure(_) => "error.cbl.invalid_structure",
            CblError::ChecksumMismatch => "error.cbl.checksum_mismatch",
            CblError::InvalidSignature => "error.cbl.invalid_signature",
            CblError::MissingParameters => "error.cbl.missing_parameters",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FecError {
    DataRequired,
    InvalidDataLength,
    ShardSizeExceedsMaximum,
    NotEnoughShardsAvailable,
    FecEncodingFailed,
    FecDecodingFailed,
}

impl fmt::Display for FecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FecError::DataRequired => write!(f, "FEC data is required"),
            FecError::InvalidDataLength => write!(f, "FEC data length does not match shard layout"),
            FecError::ShardSizeExceedsMaximum => write!(f, "FEC shard size exceeds maximum"),
            FecError::NotEnoughShardsAvailable => {
                write!(f, "not enough shards available to decode")
            }
            FecError::FecEncodingFailed => write!(f, "FEC encoding failed"),
            FecError::FecDecodingFailed => write!(f, "FEC decoding failed"),
        }
    }
}

impl std::error::Error for FecError {}

impl FecError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            FecError::DataRequired => "error.fec.data_required",
            FecError::InvalidDataLength => "error.fec.invalid_data_length",
            FecError::ShardSizeExceedsMaximum => "error.fec.shard_size_exceeds_maximum",
            FecError::NotEnoughShardsAvailable => "error.fec.not_enough_shards_available",
            FecError::FecEncodingFailed => "error.fec.encoding_failed",
            FecError::FecDecodingFailed => "error.fec.decoding_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    DecryptionFailed,
    NotEncrypted,
    InvalidPublicKey,
}

impl fmt::Display for EncryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionError::DecryptionFailed => write!(f, "decryption failed"),
            EncryptionError::NotEncrypted => write!(f, "block is not encrypted"),
            EncryptionError::InvalidPublicKey => write!(f, "invalid public key format"),
        }
    }
}

impl std::error::Error for EncryptionError {}

impl EncryptionError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            EncryptionError::DecryptionFailed => "error.encryption.decryption_failed",
            EncryptionError::NotEncrypted => "error.encryption.not_encrypted",
            EncryptionError::InvalidPublicKey => "error.encryption.invalid_public_key",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberError {
    SigningFailed,
    EncryptionFailed,
    DecryptionFailed,
}

impl fmt::Display for MemberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberError::SigningFailed => write!(f, "signing failed"),
            MemberError::EncryptionFailed => write!(f, "member-level encryption failed"),
            MemberError::DecryptionFailed => write!(f, "member-level decryption failed"),
        }
    }
}

impl std::error::Error for MemberError {}

/// Top-level error wrapping every subsystem error, used at the `TupleService`
/// boundary (spec §4.H, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrightChainError {
    Xor(XorError),
    Block(BlockError),
    Pool(PoolError),
    Tuple(TupleError),
    Cbl(CblError),
    Fec(FecError),
    Encryption(EncryptionError),
    Member(MemberError),
}

impl fmt::Display for BrightChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrightChainError::Xor(e) => write!(f, "{e}"),
            BrightChainError::Block(e) => write!(f, "{e}"),
            BrightChainError::Pool(e) => write!(f, "{e}"),
            BrightChainError::Tuple(e) => write!(f, "{e}"),
            BrightChainError::Cbl(e) => write!(f, "{e}"),
            BrightChainError::Fec(e) => write!(f, "{e}"),
            BrightChainError::Encryption(e) => write!(f, "{e}"),
            BrightChainError::Member(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BrightChainError {}

macro_rules! from_subsystem_error {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for BrightChainError {
            fn from(e: $ty) -> Self {
                BrightChainError::$variant(e)
            }
        }
    };
}

from_subsystem_error!(Xor, XorError);
from_subsystem_error!(Block, BlockError);
from_subsystem_error!(Pool, PoolError);
from_subsystem_error!(Tuple, TupleError);
from_subsystem_error!(Cbl, CblError);
from_subsystem_error!(Fec, FecError);
from_subsystem_error!(Encryption, EncryptionError);
from_subsystem_error!(Member, MemberError);
