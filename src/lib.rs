//! BrightChain: an owner-free, content-addressed block store.
//!
//! Every block on the wire is a fixed-size, XOR-whitened payload; nothing is ever
//! persisted unwhitened except inside an active `Tuple`. The modules below layer
//! bottom-up: checksums and XOR are the primitives, `block` gives them a typed
//! shape, `pool` and `tuple` compose them into whitened tuples, `cbl_codec` indexes
//! a stream of tuples into a signed directory block, and `tuple_service` is the
//! façade most callers want.

pub mod block;
pub mod block_size;
pub mod cbl_codec;
pub mod checksum;
pub mod config;
pub mod encryption;
pub mod error;
pub mod fec;
pub mod generator;
pub mod header_cache;
pub mod member;
pub mod metrics;
pub mod pool;
pub mod store;
pub mod telemetry;
pub mod tuple;
pub mod tuple_service;
pub mod xor;

pub use block::{BlockDataType, BlockOps, BlockType};
pub use block_size::BlockSize;
pub use checksum::Checksum;
pub use error::BrightChainError;
pub use member::Member;
pub use pool::PoolScope;
pub use store::BlockStore;
