use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use ksat_engine::{EncryptConfig, Encryptor};
use ksat_gen::{KeyGenerator, KeyParams};

fn bench_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("keygen");
    group.sample_size(10);
    group.bench_function("generate_pair_n64", |b| {
        b.iter(|| {
            let params = KeyParams::for_vars(64);
            let mut gen = KeyGenerator::new(ChaCha20Rng::from_seed([1u8; 32]), params);
            gen.generate_pair().expect("key pair");
        });
    });
    group.finish();
}

fn bench_encryption(c: &mut Criterion) {
    let params = KeyParams::for_vars(32);
    let mut gen = KeyGenerator::new(ChaCha20Rng::from_seed([2u8; 32]), params);
    let pair = gen.generate_pair().expect("key pair");
    let mut public = pair.public.clone();
    public.canonicalize();

    let mut group = c.benchmark_group("encryption");
    group.sample_size(10);
    group.bench_function("encrypt_bit_n32", |b| {
        let engine = Encryptor::new(EncryptConfig::default());
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        b.iter(|| {
            engine
                .encrypt_bit(&mut rng, &public, true)
                .expect("encryption succeeds")
        });
    });
    group.bench_function("decrypt_bit_n32", |b| {
        let engine = Encryptor::new(EncryptConfig::default());
        let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
        let cipher = engine
            .encrypt_bit(&mut rng, &public, true)
            .expect("encryption succeeds");
        b.iter(|| ksat_engine::decrypt_bit(&cipher, &pair.private).expect("well-formed cipher"));
    });
    group.finish();
}

criterion_group!(benches, bench_key_generation, bench_encryption);
criterion_main!(benches);
