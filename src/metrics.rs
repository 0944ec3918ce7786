/// Metrics module: Prometheus instrumentation for the pool, tuple, and FEC paths
/// (spec §16). A handful of counters, not a full observability surface.
use prometheus::{
    Registry, IntCounter, IntCounterVec, Opts, Encoder, TextEncoder,
};
use lazy_static::lazy_static;
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Successful whitener/random borrows from a pool
    /// Labels: pool_id
    pub static ref POOL_BORROWS: IntCounterVec = IntCounterVec::new(
        Opts::new("brightchain_pool_borrows_total", "Total companion blocks borrowed from a pool"),
        &["pool_id"]
    ).unwrap();

    /// Whiteners returned to a pool after use
    /// Labels: pool_id
    pub static ref POOL_RETURNS: IntCounterVec = IntCounterVec::new(
        Opts::new("brightchain_pool_returns_total", "Total whitener blocks returned to a pool"),
        &["pool_id"]
    ).unwrap();

    /// Borrow attempts that failed because a pool ran dry
    /// Labels: pool_id
    pub static ref POOL_EXHAUSTED: IntCounterVec = IntCounterVec::new(
        Opts::new("brightchain_pool_exhausted_total", "Total borrow attempts that found an empty pool"),
        &["pool_id"]
    ).unwrap();

    /// Tuples produced by the streaming generator
    pub static ref TUPLES_GENERATED: IntCounter = IntCounter::new(
        "brightchain_tuples_generated_total",
        "Total prime-whitened tuples generated"
    ).unwrap();

    /// CBLs signed by a creator
    pub static ref CBL_SIGNED: IntCounter = IntCounter::new(
        "brightchain_cbl_signed_total",
        "Total constituent block lists signed"
    ).unwrap();

    /// CBL signature verifications, by outcome
    /// Labels: result (valid, invalid)
    pub static ref CBL_VERIFIED: IntCounterVec = IntCounterVec::new(
        Opts::new("brightchain_cbl_verified_total", "Total CBL signature verifications by outcome"),
        &["result"]
    ).unwrap();

    /// FEC shard encode operations
    pub static ref FEC_ENCODE: IntCounter = IntCounter::new(
        "brightchain_fec_encode_total",
        "Total FEC shard-set encode operations"
    ).unwrap();

    /// FEC shard decode/reconstruction operations
    pub static ref FEC_DECODE: IntCounter = IntCounter::new(
        "brightchain_fec_decode_total",
        "Total FEC shard-set decode/reconstruction operations"
    ).unwrap();
}

static INIT: std::sync::Once = std::sync::Once::new();

/// Register all metrics with the global registry. Call once at process startup;
/// safe to call more than once (later calls are no-ops).
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = (|| {
            REGISTRY.register(Box::new(POOL_BORROWS.clone()))?;
            REGISTRY.register(Box::new(POOL_RETURNS.clone()))?;
            REGISTRY.register(Box::new(POOL_EXHAUSTED.clone()))?;
            REGISTRY.register(Box::new(TUPLES_GENERATED.clone()))?;
            REGISTRY.register(Box::new(CBL_SIGNED.clone()))?;
            REGISTRY.register(Box::new(CBL_VERIFIED.clone()))?;
            REGISTRY.register(Box::new(FEC_ENCODE.clone()))?;
            REGISTRY.register(Box::new(FEC_DECODE.clone()))?;
            Ok(())
        })();
    });
    result
}

/// Gather metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Alias for [`gather_metrics`]; the name callers reach for when wiring a `/metrics`
/// endpoint.
pub fn render() -> String {
    gather_metrics()
}

/// Timer for measuring durations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Record a successful companion borrow from a pool
pub fn increment_pool_borrows(pool_id: &str, count: u64) {
    POOL_BORROWS.with_label_values(&[pool_id]).inc_by(count);
}

/// Record a whitener returned to a pool
pub fn increment_pool_returns(pool_id: &str) {
    POOL_RETURNS.with_label_values(&[pool_id]).inc();
}

/// Record a borrow attempt against an empty pool
pub fn increment_pool_exhausted(pool_id: &str) {
    POOL_EXHAUSTED.with_label_values(&[pool_id]).inc();
}

/// Record tuples generated
pub fn increment_tuples_generated(count: u64) {
    TUPLES_GENERATED.inc_by(count);
}

/// Record a CBL signed
pub fn increment_cbl_signed() {
    CBL_SIGNED.inc();
}

/// Record a CBL signature verification outcome
pub fn increment_cbl_verified(valid: bool) {
    let result = if valid { "valid" } else { "invalid" };
    CBL_VERIFIED.with_label_values(&[result]).inc();
}

/// Record an FEC encode operation
pub fn increment_fec_encode() {
    FEC_ENCODE.inc();
}

/// Record an FEC decode/reconstruction operation
pub fn increment_fec_decode() {
    FEC_DECODE.inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics() {
        init_metrics().unwrap();
    }

    #[test]
    fn test_gather_metrics() {
        init_metrics().unwrap();

        increment_pool_borrows("demo", 4);
        increment_cbl_verified(true);

        let output = gather_metrics();

        assert!(output.contains("brightchain_pool_borrows_total"));
        assert!(output.contains("brightchain_cbl_verified_total"));
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let elapsed = timer.elapsed_secs();
        assert!(elapsed >= 0.01);
    }
}
