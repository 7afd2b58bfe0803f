//! Interoperability with `lz4_flex` and the `rmp` MessagePack crates

use packlz::decoder::decompress;
use packlz::ext::{self, ExtHeader};
use packlz::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Trade {
    seq: u32,
    timestamp_ns: u64,
    price: i64,
    quantity: u32,
    symbol: String,
    note: Option<String>,
}

fn trades(count: u32) -> Vec<Trade> {
    (0..count)
        .map(|i| Trade {
            seq: i,
            timestamp_ns: 1_700_000_000_000_000_000 + i as u64 * 1000,
            price: 50_000_000 + (i as i64 % 100),
            quantity: 100 + i % 7,
            symbol: ["AAPL", "TSLA", "MSFT"][i as usize % 3].to_string(),
            note: (i % 5 == 0).then(|| format!("order #{}", i)),
        })
        .collect()
}

fn block_info(framed: &[u8]) -> BlockInfo {
    match inspect(framed).unwrap() {
        BlockKind::Lz4(info) => info,
        BlockKind::Raw => panic!("expected a compressed block"),
    }
}

fn payloads() -> Vec<Vec<u8>> {
    vec![
        rmp_serde::to_vec(&trades(100)).unwrap(),
        rmp_serde::to_vec(&trades(5000)).unwrap(),
        vec![0x41u8; 10_000],
        b"abcdefgh".repeat(20_000),
    ]
}

#[test]
fn test_lz4_flex_decodes_our_streams() {
    for payload in payloads() {
        let framed = encode_block(&payload).unwrap();
        let info = block_info(&framed);

        let decoded = lz4_flex::block::decompress(&framed[info.stream], info.uncompressed_len).unwrap();
        assert_eq!(decoded, payload);
    }
}

#[test]
fn test_we_decode_lz4_flex_streams() {
    for payload in payloads() {
        let stream = lz4_flex::block::compress(&payload);

        let mut decoded = vec![0u8; payload.len()];
        assert_eq!(decompress(&stream, &mut decoded).unwrap(), stream.len());
        assert_eq!(decoded, payload);
    }
}

#[test]
fn test_rmp_reads_our_envelope() {
    let payload = rmp_serde::to_vec(&trades(200)).unwrap();
    let framed = encode_block(&payload).unwrap();

    let mut rd = &framed[..];
    let meta = rmp::decode::read_ext_meta(&mut rd).unwrap();
    assert_eq!(meta.typeid, LZ4_BLOCK_EXT_TYPE);
    assert_eq!(meta.size as usize, rd.len());

    let declared = rmp::decode::read_i32(&mut rd).unwrap();
    assert_eq!(declared as usize, payload.len());

    let decoded = lz4_flex::block::decompress(rd, declared as usize).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_we_read_rmp_envelopes() {
    let payload = rmp_serde::to_vec(&trades(300)).unwrap();
    let stream = lz4_flex::block::compress(&payload);

    // fixed-width length, as we write it
    let mut framed = Vec::new();
    rmp::encode::write_ext_meta(&mut framed, (5 + stream.len()) as u32, LZ4_BLOCK_EXT_TYPE).unwrap();
    rmp::encode::write_i32(&mut framed, payload.len() as i32).unwrap();
    framed.extend_from_slice(&stream);
    assert_eq!(decode_block(&framed).unwrap(), payload);

    // compact length, as a generic MessagePack writer may produce
    let mut length = Vec::new();
    rmp::encode::write_uint(&mut length, payload.len() as u64).unwrap();
    let mut framed = Vec::new();
    rmp::encode::write_ext_meta(&mut framed, (length.len() + stream.len()) as u32, LZ4_BLOCK_EXT_TYPE)
        .unwrap();
    framed.extend_from_slice(&length);
    framed.extend_from_slice(&stream);
    assert_eq!(decode_block(&framed).unwrap(), payload);
}

#[test]
fn test_ext_header_matches_rmp_bytes() {
    for len in [0u32, 1, 2, 3, 4, 8, 16, 17, 255, 256, 65_535, 65_536, 1_000_000] {
        let mut expected = Vec::new();
        rmp::encode::write_ext_meta(&mut expected, len, LZ4_BLOCK_EXT_TYPE).unwrap();

        let header = ExtHeader::new(LZ4_BLOCK_EXT_TYPE, len);
        let mut ours = [0u8; ExtHeader::MAX_SIZE];
        let size = header.encode(&mut ours).unwrap();
        assert_eq!(&ours[..size], &expected[..], "ext length {}", len);
    }

    let mut expected = Vec::new();
    rmp::encode::write_i32(&mut expected, 123_456).unwrap();
    let mut ours = [0u8; ext::FIXED_I32_SIZE];
    ext::encode_fixed_i32(123_456, &mut ours).unwrap();
    assert_eq!(&ours[..], &expected[..]);
}

#[test]
fn test_serde_payload_roundtrip() {
    for count in [1, 3, 100, 10_000] {
        let original = trades(count);
        let bytes = rmp_serde::to_vec(&original).unwrap();

        let framed = maybe_compress(&bytes).unwrap();
        let restored: Vec<Trade> = rmp_serde::from_slice(&maybe_decompress(&framed).unwrap()).unwrap();
        assert_eq!(restored, original);
    }
}

#[test]
fn test_compression_ratio_close_to_lz4_flex() {
    let payload = rmp_serde::to_vec(&trades(5000)).unwrap();
    let framed = encode_block(&payload).unwrap();
    let ours = framed[block_info(&framed).stream].len();
    let reference = lz4_flex::block::compress(&payload).len();

    // both are greedy single-probe matchers
    assert!(ours * 100 <= reference * 125, "ours {} vs lz4_flex {}", ours, reference);
}

#[test]
fn test_logging_under_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();

    let payload = rmp_serde::to_vec(&trades(50)).unwrap();
    let framed = encode_block(&payload).unwrap();
    assert_eq!(decode_block(&framed).unwrap(), payload);

    assert!(decode_block(&framed[..framed.len() - 1]).is_err());
    let strict = BlockOptions::default().with_max_uncompressed_len(16);
    assert_eq!(decode_block_with(&strict, &framed), Err(Error::LengthLimitExceeded));
}
