use criterion::{black_box, criterion_group, criterion_main, Criterion};

use squeeze::compression::{ArithmeticCoder, Compression, HuffmanCoder, Lzss};
use squeeze::compression::lzss::SearchMode;

/// Generates a vector of highly compressible data.
fn generate_low_entropy_bytes(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let pattern = b"abcdefgABCDEFG12345";
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

/// Generates a vector of less compressible, more random-looking data.
fn generate_high_entropy_bytes(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let pattern: Vec<u8> = (0..=255u8).collect();
    while data.len() < size {
        data.extend_from_slice(&pattern);
    }
    data.truncate(size);
    data
}

const BENCH_DATA_SIZE: usize = 16384; // 16 KB

fn bench_codecs(c: &mut Criterion) {
    let low_entropy = generate_low_entropy_bytes(BENCH_DATA_SIZE);
    let high_entropy = generate_high_entropy_bytes(BENCH_DATA_SIZE);

    let arithmetic = ArithmeticCoder::new();
    let huffman = HuffmanCoder::new();
    let lzss_serial = Lzss::new();
    let lzss_parallel = Lzss::new().search_mode(SearchMode::Parallel);

    let arithmetic_low = arithmetic.compress(&low_entropy).unwrap();
    let huffman_low = huffman.compress(&low_entropy).unwrap();
    let lzss_low = lzss_serial.compress(&low_entropy).unwrap();

    let mut group = c.benchmark_group("codecs");
    group.throughput(criterion::Throughput::Bytes(BENCH_DATA_SIZE as u64));

    group.bench_function("arithmetic compress (low entropy)", |b| {
        b.iter(|| black_box(arithmetic.compress(black_box(&low_entropy))))
    });
    group.bench_function("arithmetic compress (high entropy)", |b| {
        b.iter(|| black_box(arithmetic.compress(black_box(&high_entropy))))
    });
    group.bench_function("arithmetic decompress (low entropy)", |b| {
        b.iter(|| black_box(arithmetic.decompress(black_box(&arithmetic_low))))
    });

    group.bench_function("huffman compress (low entropy)", |b| {
        b.iter(|| black_box(huffman.compress(black_box(&low_entropy))))
    });
    group.bench_function("huffman decompress (low entropy)", |b| {
        b.iter(|| black_box(huffman.decompress(black_box(&huffman_low))))
    });

    group.bench_function("lzss serial compress (low entropy)", |b| {
        b.iter(|| black_box(lzss_serial.compress(black_box(&low_entropy))))
    });
    group.bench_function("lzss parallel compress (low entropy)", |b| {
        b.iter(|| black_box(lzss_parallel.compress(black_box(&low_entropy))))
    });
    group.bench_function("lzss decompress (low entropy)", |b| {
        b.iter(|| black_box(lzss_serial.decompress(black_box(&lzss_low))))
    });

    group.finish();
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
