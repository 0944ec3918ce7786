//! BrightChain configuration (spec §13): pool, tuple, FEC, and random-fill sizing,
//! loaded the same way the ambient config layer is — `config::Config` over a
//! `config.toml`, cached behind a process-global `OnceCell`.

pub use config::Config;
pub use once_cell::sync::OnceCell;
use std::error::Error;

use crate::block_size::BlockSize;

static GLOBAL_CONFIG: OnceCell<BrightChainConfig> = OnceCell::new();

/// Whitening-pool sizing (spec §4.D).
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub block_size: BlockSize,
    pub min_randoms: usize,
    pub min_whiteners: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            block_size: BlockSize::Small,
            min_randoms: 64,
            min_whiteners: 64,
        }
    }
}

/// Tuple composition sizing (spec §4.F/§4.H).
#[derive(Debug, Clone)]
pub struct TupleSettings {
    pub random_count: usize,
    pub whitener_count: usize,
    pub min_random_blocks: usize,
    pub max_random_blocks: usize,
}

impl Default for TupleSettings {
    fn default() -> Self {
        TupleSettings {
            random_count: 2,
            whitener_count: 2,
            min_random_blocks: 2,
            max_random_blocks: 128,
        }
    }
}

/// FEC shard sizing (spec §4.I).
#[derive(Debug, Clone)]
pub struct FecSettings {
    pub data_shards: usize,
    pub parity_shards: usize,
    pub max_shard_size: usize,
}

impl Default for FecSettings {
    fn default() -> Self {
        FecSettings {
            data_shards: 4,
            parity_shards: 2,
            max_shard_size: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrightChainConfig {
    pub pool: PoolSettings,
    pub tuple: TupleSettings,
    pub fec: FecSettings,
}

impl BrightChainConfig {
    /// Parse a loaded `config::Config` into typed BrightChain settings, falling
    /// back to defaults for any section or key the file omits.
    fn from_raw(raw: &Config) -> Self {
        let mut cfg = BrightChainConfig::default();

        if let Ok(name) = raw.get_string("pool.block_size") {
            if let Ok(size) = name.parse::<BlockSize>() {
                cfg.pool.block_size = size;
            }
        }
        if let Ok(v) = raw.get_int("pool.min_randoms") {
            cfg.pool.min_randoms = v.max(0) as usize;
        }
        if let Ok(v) = raw.get_int("pool.min_whiteners") {
            cfg.pool.min_whiteners = v.max(0) as usize;
        }

        if let Ok(v) = raw.get_int("tuple.random_count") {
            cfg.tuple.random_count = v.max(0) as usize;
        }
        if let Ok(v) = raw.get_int("tuple.whitener_count") {
            cfg.tuple.whitener_count = v.max(0) as usize;
        }
        if let Ok(v) = raw.get_int("tuple.min_random_blocks") {
            cfg.tuple.min_random_blocks = v.max(0) as usize;
        }
        if let Ok(v) = raw.get_int("tuple.max_random_blocks") {
            cfg.tuple.max_random_blocks = v.max(0) as usize;
        }

        if let Ok(v) = raw.get_int("fec.data_shards") {
            cfg.fec.data_shards = v.max(0) as usize;
        }
        if let Ok(v) = raw.get_int("fec.parity_shards") {
            cfg.fec.parity_shards = v.max(0) as usize;
        }
        if let Ok(v) = raw.get_int("fec.max_shard_size") {
            cfg.fec.max_shard_size = v.max(0) as usize;
        }

        cfg
    }
}

pub fn init_global_config() -> Result<(), Box<dyn Error>> {
    let raw = Config::builder()
        .add_source(config::File::with_name("config.toml").required(false))
        .build()?;
    let config = BrightChainConfig::from_raw(&raw);
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| "Config already set")?;
    Ok(())
}

pub fn get_global_config() -> &'static BrightChainConfig {
    GLOBAL_CONFIG.get().unwrap_or_else(|| {
        eprintln!("FATAL: Config not initialized - call init_global_config() first");
        std::process::exit(1);
    })
}

/// Load config for standalone binaries/utilities without touching the global cell.
pub fn load_config() -> Result<BrightChainConfig, Box<dyn Error>> {
    let raw = Config::builder()
        .add_source(config::File::with_name("config.toml").required(false))
        .build()?;
    Ok(BrightChainConfig::from_raw(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = BrightChainConfig::default();
        assert_eq!(cfg.pool.block_size, BlockSize::Small);
        assert_eq!(cfg.tuple.random_count, 2);
        assert_eq!(cfg.tuple.whitener_count, 2);
        assert_eq!(cfg.fec.data_shards, 4);
        assert_eq!(cfg.fec.parity_shards, 2);
    }

    #[test]
    fn missing_config_file_still_loads_defaults() {
        let cfg = load_config().unwrap();
        assert_eq!(cfg.pool.min_randoms, 64);
    }
}
