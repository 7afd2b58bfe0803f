//! Benchmark utilities and performance testing
//!
//! Simple timing helpers for the framing layer. Only available with the
//! std feature, and only built for tests.

#[cfg(feature = "std")]
use std::time::{Duration, Instant};

use alloc::vec::Vec;

use crate::block::{decode_block, encode_block};
use crate::error::Result;

/// Simple benchmark statistics
#[derive(Debug, Clone)]
pub struct BenchStats {
    /// Number of operations
    pub count: usize,
    /// Bytes of input handled per operation
    pub bytes_per_op: usize,
    /// Total duration
    pub total_duration: Duration,
    /// Average time per operation
    pub avg_ns_per_op: u64,
    /// Operations per second
    pub ops_per_sec: f64,
}

impl BenchStats {
    /// Create new stats from measurements
    pub fn new(count: usize, bytes_per_op: usize, total_duration: Duration) -> Self {
        let total_ns = total_duration.as_nanos() as u64;
        let avg_ns_per_op = if count > 0 {
            total_ns / count as u64
        } else {
            0
        };
        let ops_per_sec = if total_ns > 0 {
            (count as f64) * 1_000_000_000.0 / (total_ns as f64)
        } else {
            0.0
        };

        Self {
            count,
            bytes_per_op,
            total_duration,
            avg_ns_per_op,
            ops_per_sec,
        }
    }

    /// Input throughput in MB/s
    pub fn megabytes_per_sec(&self) -> f64 {
        self.ops_per_sec * self.bytes_per_op as f64 / 1_000_000.0
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for BenchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ops, {:.2}ms total, {} ns/op, {:.0} ops/sec, {:.1} MB/s",
            self.count,
            self.total_duration.as_secs_f64() * 1000.0,
            self.avg_ns_per_op,
            self.ops_per_sec,
            self.megabytes_per_sec()
        )
    }
}

/// Repetitive record-like payload of `len` bytes
pub fn sample_payload(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut i = 0u32;
    while out.len() < len {
        out.extend_from_slice(b"{\"id\":");
        out.extend_from_slice(&(i % 1000).to_be_bytes());
        out.extend_from_slice(b",\"symbol\":\"AAPL\",\"qty\":100}");
        i += 1;
    }
    out.truncate(len);
    out
}

/// Benchmark block encoding
#[cfg(feature = "std")]
pub fn bench_compress(count: usize, payload_len: usize) -> Result<BenchStats> {
    let payload = sample_payload(payload_len);
    let start = Instant::now();

    for _ in 0..count {
        let framed = encode_block(&payload)?;
        std::hint::black_box(framed);
    }

    let duration = start.elapsed();
    Ok(BenchStats::new(count, payload_len, duration))
}

/// Benchmark block decoding
#[cfg(feature = "std")]
pub fn bench_decompress(count: usize, payload_len: usize) -> Result<BenchStats> {
    let framed = encode_block(&sample_payload(payload_len))?;
    let start = Instant::now();

    for _ in 0..count {
        let payload = decode_block(&framed)?;
        std::hint::black_box(payload);
    }

    let duration = start.elapsed();
    Ok(BenchStats::new(count, payload_len, duration))
}

/// Benchmark encode + decode roundtrip
#[cfg(feature = "std")]
pub fn bench_roundtrip(count: usize, payload_len: usize) -> Result<BenchStats> {
    let payload = sample_payload(payload_len);
    let start = Instant::now();

    for _ in 0..count {
        let framed = encode_block(&payload)?;
        let restored = decode_block(&framed)?;
        std::hint::black_box(restored);
    }

    let duration = start.elapsed();
    Ok(BenchStats::new(count, payload_len, duration))
}

/// Run simple performance test suite
#[cfg(feature = "std")]
pub fn run_perf_test() -> Result<()> {
    run_perf_suite(10_000)
}

#[cfg(feature = "std")]
fn run_perf_suite(count: usize) -> Result<()> {
    std::println!("packlz Performance Test Suite");
    std::println!("=============================");

    for payload_len in [256, 4096, 65_536] {
        std::println!("\n{} byte payloads, {} operations:", payload_len, count);

        let compress_stats = bench_compress(count, payload_len)?;
        std::println!("Compress: {}", compress_stats);

        let decompress_stats = bench_decompress(count, payload_len)?;
        std::println!("Decompress: {}", decompress_stats);

        let framed = encode_block(&sample_payload(payload_len))?;
        std::println!(
            "Ratio: {:.3} ({} -> {} bytes)",
            framed.len() as f64 / payload_len as f64,
            payload_len,
            framed.len()
        );
    }

    Ok(())
}
