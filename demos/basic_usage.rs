//! Basic usage example for packlz
//!
//! Run with: cargo run --example basic_usage

use packlz::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Quote {
    seq: u32,
    symbol: String,
    bid: i64,
    ask: i64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    println!("packlz Basic Usage Example");
    println!("==========================");

    // Example 1: Short payloads are stored as-is
    println!("\n1. Below the threshold:");
    {
        let payload = b"hello";
        let framed = maybe_compress(payload)?;
        println!("  {} bytes -> {} bytes (raw: {})", payload.len(), framed.len(), framed == payload);
        assert_eq!(maybe_decompress(&framed)?, payload);
    }

    // Example 2: A MessagePack batch is wrapped in one extension block
    println!("\n2. MessagePack batch:");
    {
        let quotes: Vec<Quote> = (0..500)
            .map(|i| Quote {
                seq: i,
                symbol: ["AAPL", "MSFT"][i as usize % 2].to_string(),
                bid: 50_000_000 + i as i64,
                ask: 50_000_100 + i as i64,
            })
            .collect();
        let bytes = rmp_serde::to_vec(&quotes).unwrap_or_default();

        let framed = maybe_compress(&bytes)?;
        println!(
            "  {} bytes -> {} bytes ({:.1}%)",
            bytes.len(),
            framed.len(),
            framed.len() as f64 * 100.0 / bytes.len() as f64
        );

        if let BlockKind::Lz4(info) = inspect(&framed)? {
            println!(
                "  ext type {}, declared length {}, stream {} bytes",
                LZ4_BLOCK_EXT_TYPE,
                info.uncompressed_len,
                info.stream.len()
            );
        }

        let restored: Vec<Quote> = rmp_serde::from_slice(&maybe_decompress(&framed)?).unwrap_or_default();
        println!("  Restored {} quotes, equal: {}", restored.len(), restored == quotes);
    }

    // Example 3: Incompressible data falls back to raw storage
    println!("\n3. Incompressible payload:");
    {
        let mut state = 0x9E37_79B9u32;
        let noise: Vec<u8> = (0..1000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        let framed = encode_block(&noise)?;
        println!("  {} bytes -> {} bytes", noise.len(), framed.len());
    }

    // Example 4: Explicit codec with custom options
    println!("\n4. Explicit codec:");
    {
        let options = BlockOptions::default()
            .with_threshold(16)
            .with_max_uncompressed_len(1024 * 1024);
        let mut codec = BlockCodec::new(options)?;

        let payload = b"ticker ticker ticker ticker ticker".to_vec();
        let framed = codec.encode(&payload)?;
        println!("  {} bytes -> {} bytes", payload.len(), framed.len());

        let mut out = Vec::new();
        codec.decode_into(&framed, &mut out)?;
        println!("  Decoded: {}", String::from_utf8_lossy(&out));
    }

    // Example 5: Corruption is reported, never returned as data
    println!("\n5. Corrupt block:");
    {
        let framed = encode_block(&[0x41u8; 10_000])?;
        let truncated = &framed[..framed.len() - 3];
        match decode_block(truncated) {
            Ok(_) => println!("  unexpectedly decoded"),
            Err(e) => println!("  rejected: {} (corruption: {})", e, e.is_corruption()),
        }

        let strict = BlockOptions::default().with_max_uncompressed_len(4096);
        match decode_block_with(&strict, &framed) {
            Ok(_) => println!("  unexpectedly decoded"),
            Err(e) => println!("  rejected: {}", e),
        }
    }

    println!("\nAll examples completed successfully!");
    Ok(())
}
