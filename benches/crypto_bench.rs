use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use warren::core::cipher::{decrypt, encrypt, GroupKey};
use warren::{PrivateKey, PublicKey};

/// Generate a payload of given size.
fn generate_payload(size: usize) -> String {
    "x".repeat(size)
}

/// Benchmark symmetric encrypt/decrypt roundtrip with varying payload sizes.
fn bench_encrypt_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_decrypt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let key = GroupKey::generate();
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let payload = generate_payload(size);

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("roundtrip", format!("{}B", size)),
            &payload,
            |b, payload| {
                b.iter(|| {
                    let encrypted = encrypt(black_box(payload), black_box(&key));
                    let decrypted = decrypt(black_box(&encrypted), black_box(&key)).unwrap();
                    black_box(decrypted);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark group-key wrapping and unwrapping under an RSA keypair.
fn bench_wrap_unwrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrap_unwrap");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let private = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();
    let private_pem = private.to_pkcs8_pem(LineEnding::LF).unwrap();

    let public = PublicKey::from_pem(&public_pem, None).unwrap();
    let private = PrivateKey::from_pem(&private_pem, None).unwrap();
    let group_key = GroupKey::generate();

    group.bench_function("wrap", |b| {
        b.iter(|| {
            let wrapped = public.wrap(black_box(&group_key)).unwrap();
            black_box(wrapped);
        });
    });

    let wrapped = public.wrap(&group_key).unwrap();
    group.bench_function("unwrap", |b| {
        b.iter(|| {
            let recovered = private.unwrap(black_box(&wrapped)).unwrap();
            black_box(recovered);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encrypt_decrypt, bench_wrap_unwrap);
criterion_main!(benches);
