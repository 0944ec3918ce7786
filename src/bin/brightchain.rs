//! Thin demonstration CLI over the `brightchain` library (spec §4.H facade). Not a
//! replacement for the REST/WebSocket surfaces explicitly out of scope.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use brightchain::block::random::RandomBlock;
use brightchain::block::whitened::WhitenedBlock;
use brightchain::block_size::BlockSize;
use brightchain::cbl_codec;
use brightchain::checksum::Checksum;
use brightchain::member::{LocalMember, Member};
use brightchain::pool::PoolScope;
use brightchain::store::BlockStore;
use brightchain::tuple_service;
use clap::{Parser, Subcommand};
use rand::RngCore;
use secp256k1::SecretKey;

#[derive(Parser)]
#[clap(name = "brightchain")]
#[clap(about = "Owner-free, content-addressed block store demo harness", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Pool {
        #[clap(subcommand)]
        action: PoolAction,
    },
    Store {
        #[clap(subcommand)]
        action: StoreAction,
    },
    Cbl {
        #[clap(subcommand)]
        action: CblAction,
    },
}

#[derive(Subcommand)]
enum PoolAction {
    /// Populate an in-memory pool with fresh random/whitened blocks and report counts.
    Fill {
        #[clap(long, default_value = "demo-pool")]
        pool_id: String,
        #[clap(long, default_value = "Small")]
        block_size: BlockSize,
        #[clap(long, default_value_t = 64)]
        count: usize,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Run a file through the tuple service and print the resulting CBL's root checksum.
    PutFile {
        #[clap(long)]
        input: PathBuf,
        #[clap(long, default_value = "demo-pool")]
        pool_id: String,
        #[clap(long, default_value = "Small")]
        block_size: BlockSize,
        #[clap(long, default_value = "./brightchain-store")]
        store_dir: PathBuf,
        #[clap(long, default_value = "./brightchain-member.key")]
        key_file: PathBuf,
        #[clap(long, default_value_t = 2)]
        random_count: usize,
        #[clap(long, default_value_t = 2)]
        whitener_count: usize,
    },
    /// Reverse of `put-file`: reconstruct plaintext from a CBL's root checksum.
    GetFile {
        #[clap(long)]
        cbl: Checksum,
        #[clap(long)]
        output: PathBuf,
        #[clap(long, default_value = "./brightchain-store")]
        store_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum CblAction {
    /// Print parsed CBL header fields for a root checksum.
    Inspect {
        #[clap(long)]
        cbl: Checksum,
        #[clap(long, default_value = "./brightchain-store")]
        store_dir: PathBuf,
    },
}

/// A directory-backed `BlockStore` for the CLI demo harness. Disk-directory layout
/// is explicitly out of scope for the core library (spec §1); this is just enough
/// persistence for `put-file`/`get-file` to round-trip across separate invocations.
struct FileBlockStore {
    dir: PathBuf,
}

impl FileBlockStore {
    fn open(dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(FileBlockStore { dir })
    }

    fn block_path(&self, checksum: &Checksum) -> PathBuf {
        self.dir.join(format!("{}.block", checksum.to_hex()))
    }

    fn tuple_path(&self, checksum: &Checksum) -> PathBuf {
        self.dir.join(format!("{}.tuple", checksum.to_hex()))
    }
}

impl BlockStore for FileBlockStore {
    fn get(&self, checksum: &Checksum) -> Option<Vec<u8>> {
        fs::read(self.block_path(checksum)).ok()
    }

    fn put(&self, checksum: Checksum, data: Vec<u8>) {
        let _ = fs::write(self.block_path(&checksum), data);
    }

    fn put_tuple(&self, prime: Checksum, companions: Vec<Checksum>) {
        let joined = companions
            .iter()
            .map(Checksum::to_hex)
            .collect::<Vec<_>>()
            .join("\n");
        let _ = fs::write(self.tuple_path(&prime), joined);
    }

    fn get_companions(&self, prime: &Checksum) -> Option<Vec<Checksum>> {
        let content = fs::read_to_string(self.tuple_path(prime)).ok()?;
        content
            .lines()
            .map(|line| line.parse::<Checksum>().ok())
            .collect()
    }

    fn get_random_checksums(&self, n: usize) -> Vec<Checksum> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name();
                let name = name.to_str()?;
                let stem = name.strip_suffix(".block")?;
                stem.parse::<Checksum>().ok()
            })
            .take(n)
            .collect()
    }
}

fn load_or_generate_member(key_file: &Path) -> Result<LocalMember, Box<dyn std::error::Error>> {
    let secret_key = if let Ok(hex_str) = fs::read_to_string(key_file) {
        let bytes = hex::decode(hex_str.trim())?;
        SecretKey::from_slice(&bytes)?
    } else {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let key = SecretKey::from_slice(&bytes)?;
        fs::write(key_file, hex::encode(bytes))?;
        key
    };
    let mut id = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut id);
    Ok(LocalMember::generate(id, secret_key))
}

fn fill_pool(pool: &PoolScope, pool_id: &str, randoms: usize, whiteners: usize) {
    let block_size = pool.block_size;
    for _ in 0..randoms {
        pool.add_random(RandomBlock::generate(block_size, Some(pool_id.to_string())));
    }
    for _ in 0..whiteners {
        let mut source = vec![0u8; block_size.bytes()];
        let mut filler = vec![0u8; block_size.bytes()];
        rand::thread_rng().fill_bytes(&mut source);
        rand::thread_rng().fill_bytes(&mut filler);
        let whitened =
            WhitenedBlock::from_data(&source, &filler, block_size, Some(pool_id.to_string()))
                .expect("fresh random buffers always satisfy WhitenedBlock::from_data");
        pool.add_whitened(whitened);
    }
}

/// Recover a tuple's original bytes from its prime checksum by reading its prime and
/// companion blocks back out of `store` and XOR-folding them.
fn recover_block(store: &dyn BlockStore, prime_checksum: &Checksum) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let prime = store
        .get(prime_checksum)
        .ok_or("prime block missing from store")?;
    let companion_checksums = store
        .get_companions(prime_checksum)
        .ok_or("companion list missing from store")?;
    let companion_bytes: Vec<Vec<u8>> = companion_checksums
        .iter()
        .map(|c| store.get(c).ok_or_else(|| format!("companion block {c} missing from store")))
        .collect::<Result<_, _>>()?;
    let refs: Vec<&[u8]> = companion_bytes.iter().map(Vec::as_slice).collect();
    Ok(tuple_service::xor_prime_whitened_to_owned(&prime, &refs, None)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    brightchain::telemetry::init_tracing(brightchain::telemetry::TelemetryConfig::default())?;

    let cli = Cli::parse();

    match cli.command {
        Command::Pool { action: PoolAction::Fill { pool_id, block_size, count } } => {
            let pool = PoolScope::create(pool_id.clone(), block_size);
            fill_pool(&pool, &pool_id, count, count);
            println!("pool '{pool_id}' filled: {} randoms, {} whiteners ({} bytes each)",
                pool.random_count(), pool.whitener_count(), block_size.bytes());
        }

        Command::Store { action: StoreAction::PutFile {
            input, pool_id, block_size, store_dir, key_file, random_count, whitener_count,
        } } => {
            let creator = load_or_generate_member(&key_file)?;
            let store = FileBlockStore::open(store_dir)?;
            let data = fs::read(&input)?;
            let data_len = data.len() as u64;

            let tuple_count = (data_len as usize).div_ceil(block_size.bytes()).max(1);
            let margin = 8;
            let needed_randoms = (tuple_count + 1) * random_count + margin;
            let needed_whiteners = (tuple_count + 1) * whitener_count + margin;

            let pool = Arc::new(PoolScope::create(pool_id.clone(), block_size));
            fill_pool(&pool, &pool_id, needed_randoms, needed_whiteners);

            let (cbl, root) = tuple_service::data_stream_to_plaintext_tuples_and_cbl(
                &creator,
                pool,
                &store,
                std::io::Cursor::new(data),
                data_len,
                random_count,
                whitener_count,
                Some(pool_id),
                None,
            )?;

            println!("root checksum: {root}");
            println!("addresses:     {}", cbl.address_count());
            println!("original size: {} bytes", cbl.original_data_length);
        }

        Command::Store { action: StoreAction::GetFile { cbl, output, store_dir } } => {
            let store = FileBlockStore::open(store_dir)?;
            let recovered_root = recover_block(&store, &cbl)?;
            let block_size = BlockSize::from_bytes(recovered_root.len())
                .ok_or("recovered CBL block length does not match any known block size")?;
            let parsed = cbl_codec::decode_cbl(block_size, &recovered_root)?;

            let mut plaintext = Vec::with_capacity(parsed.original_data_length as usize);
            for address in &parsed.addresses {
                plaintext.extend_from_slice(&recover_block(&store, address)?);
            }
            plaintext.truncate(parsed.original_data_length as usize);

            fs::write(&output, &plaintext)?;
            println!("wrote {} bytes to {}", plaintext.len(), output.display());
        }

        Command::Cbl { action: CblAction::Inspect { cbl, store_dir } } => {
            let store = FileBlockStore::open(store_dir)?;
            let recovered_root = recover_block(&store, &cbl)?;
            let block_size = BlockSize::from_bytes(recovered_root.len())
                .ok_or("recovered CBL block length does not match any known block size")?;
            let parsed = cbl_codec::decode_cbl(block_size, &recovered_root)?;

            println!("block size:      {block_size}");
            println!("creator id:      {}", hex::encode(parsed.creator_id));
            println!("date created:    {}", parsed.date_created);
            println!("original length: {} bytes", parsed.original_data_length);
            println!("tuple size:      {}", parsed.tuple_size);
            println!("addresses:       {}", parsed.address_count());
            println!("extended:        {}", parsed.is_extended());
            if let Some(meta) = &parsed.extended {
                println!("  file name:     {}", meta.file_name);
                println!("  mime type:     {}", meta.mime_type);
            }
        }
    }

    Ok(())
}
