//! Criterion benchmarks for Wraith crypto: DH keypair, shared secret, stealth derivation.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use wraith_crypto::{
    compute_shared_secret, derive_dh_keypair, derive_stealth_keypair, spend_public_key,
    validate_public_key,
};

fn bench_dh_keypair(c: &mut Criterion) {
    let mut g = c.benchmark_group("dh_keypair");
    g.throughput(Throughput::Elements(1));
    g.bench_function("derive_dh_keypair", |b| {
        b.iter(|| black_box(derive_dh_keypair(black_box(&[0x01; 32]))));
    });
    g.finish();
}

fn bench_shared_secret(c: &mut Criterion) {
    let scan = derive_dh_keypair(&[0x01; 32]);
    let eph = derive_dh_keypair(&[0x03; 32]);
    let eph_pub = eph.public.to_bytes();

    let mut g = c.benchmark_group("shared_secret");
    g.throughput(Throughput::Elements(1));
    g.bench_function("validate_public_key", |b| {
        b.iter(|| black_box(validate_public_key(&eph_pub)).unwrap());
    });
    g.bench_function("compute_shared_secret", |b| {
        b.iter(|| black_box(compute_shared_secret(&scan.secret, &eph_pub)).unwrap());
    });
    g.finish();
}

fn bench_stealth_derivation(c: &mut Criterion) {
    let scan = derive_dh_keypair(&[0x01; 32]);
    let eph = derive_dh_keypair(&[0x03; 32]);
    let spend = spend_public_key(&[0x02; 32]);
    let shared = compute_shared_secret(&eph.secret, scan.public.as_bytes()).unwrap();

    let mut g = c.benchmark_group("stealth_derivation");
    g.throughput(Throughput::Elements(1));
    g.bench_function("derive_stealth_keypair", |b| {
        b.iter(|| black_box(derive_stealth_keypair(&shared, &spend).address()));
    });
    // One full trial: what the scanner pays per candidate
    g.bench_function("trial_scan", |b| {
        let eph_pub = eph.public.to_bytes();
        b.iter(|| {
            let shared = compute_shared_secret(&scan.secret, &eph_pub).unwrap();
            black_box(derive_stealth_keypair(&shared, &spend).address())
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_dh_keypair,
    bench_shared_secret,
    bench_stealth_derivation
);
criterion_main!(benches);
