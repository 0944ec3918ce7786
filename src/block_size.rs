//! Fixed `BlockSize` ladder (spec §3). Every block on the wire is exactly one of
//! these sizes; shorter payloads are padded with cryptographically random bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockSize {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl BlockSize {
    pub const ALL: [BlockSize; 5] = [
        BlockSize::Tiny,
        BlockSize::Small,
        BlockSize::Medium,
        BlockSize::Large,
        BlockSize::Huge,
    ];

    /// Size in bytes for this rung of the ladder.
    pub const fn bytes(self) -> usize {
        match self {
            BlockSize::Tiny => 256,
            BlockSize::Small => 4096,
            BlockSize::Medium => 1024 * 1024,
            BlockSize::Large => 16 * 1024 * 1024,
            BlockSize::Huge => 256 * 1024 * 1024,
        }
    }

    /// Resolve a byte count back to a rung, if it names one exactly.
    pub fn from_bytes(bytes: usize) -> Option<BlockSize> {
        Self::ALL.into_iter().find(|s| s.bytes() == bytes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockSize::Tiny => "Tiny",
            BlockSize::Small => "Small",
            BlockSize::Medium => "Medium",
            BlockSize::Large => "Large",
            BlockSize::Huge => "Huge",
        }
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BlockSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tiny" => Ok(BlockSize::Tiny),
            "Small" => Ok(BlockSize::Small),
            "Medium" => Ok(BlockSize::Medium),
            "Large" => Ok(BlockSize::Large),
            "Huge" => Ok(BlockSize::Huge),
            other => Err(format!("unknown block size: {other}")),
        }
    }
}
