use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scrypt_pow::{kdf, pow::Header, Backend, Params};

fn pow_hash(c: &mut Criterion) {
    let header = Header {
        version: 1,
        prev_block: [0; 32],
        merkle_root: [0x5a; 32],
        time: 1_386_325_540,
        bits: 0x1e0f_fff0,
        nonce: 99943,
    }
    .to_bytes();

    let mut group = c.benchmark_group("scrypt_1024_1_1_256");
    group.throughput(Throughput::Elements(1));
    for backend in [Backend::Soft, Backend::Sse2] {
        if !backend.is_available() {
            continue;
        }
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{backend:?}")),
            &backend,
            |b, &backend| {
                b.iter(|| kdf::scrypt_1024_1_1_256_with_backend(black_box(&header), backend));
            },
        );
    }
    group.bench_function("detected", |b| {
        b.iter(|| scrypt_pow::scrypt_1024_1_1_256(black_box(&header)));
    });
    group.finish();
}

fn general_scrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("scrypt");
    for (log_n, r) in [(10, 1), (10, 8), (14, 8)] {
        let params = Params::new(log_n, r, 1).unwrap();
        let mut out = [0; 64];
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("N=2^{log_n},r={r}")),
            &params,
            |b, params| {
                b.iter(|| kdf::scrypt(b"password", b"NaCl", params, &mut out).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = pow_hash, general_scrypt
}
criterion_main!(benches);
