//! Demonstrates a full key generation, encryption, decryption round trip.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use ksat_engine::{decrypt_stream, EncryptConfig, Encryptor};
use ksat_gen::{KeyGenerator, KeyParams};

fn main() {
    // Deterministic seed for reproducibility in the example.
    let params = KeyParams {
        vars: 16,
        clauses: 128,
        clause_width: 3,
    };
    let mut gen = KeyGenerator::new(ChaCha20Rng::from_seed([1u8; 32]), params);
    let pair = gen.generate_pair().expect("key pair");
    assert!(pair.is_valid());

    let plaintext: Vec<bool> = b"hi"
        .iter()
        .flat_map(|byte| (0..8).map(move |i| byte >> i & 1 == 1))
        .collect();

    let engine = Encryptor::new(EncryptConfig::default());
    let stream = engine
        .encrypt_stream(&pair.public, &plaintext, 0xC0FFEE)
        .expect("encryption succeeds");

    let recovered = decrypt_stream(&stream, &pair.private).expect("well-formed cipher");
    assert_eq!(recovered, plaintext);

    println!(
        "example succeeded; {} bits round-tripped through {} clauses",
        plaintext.len(),
        pair.public.clause_count()
    );
}
